#![allow(dead_code)]

use serde_json::{Value, json};

use htan_fhir::ontology::OntologyIndex;
use htan_fhir::table::Row;

fn class(id: &str, name: &str, parent: &str) -> Value {
    json!({
        "@id": id,
        "@type": "rdfs:Class",
        "sms:displayName": name,
        "rdfs:subClassOf": [{"@id": parent}],
    })
}

/// A trimmed-down HTAN model covering every branch the pipeline projects.
pub fn schema_json() -> String {
    let mut graph = vec![
        class("bts:IndividualOrganism", "Individual Organism", "bts:Thing"),
        class("bts:Patient", "Patient", "bts:IndividualOrganism"),
        class("bts:HTANParticipantID", "HTAN Participant ID", "bts:Patient"),
        class("bts:Biosample", "Biosample", "bts:Thing"),
        class("bts:Biospecimen", "Biospecimen", "bts:Biosample"),
        class("bts:HTANBiospecimenID", "HTAN Biospecimen ID", "bts:Biospecimen"),
        class(
            "bts:HTANParentBiospecimenID",
            "HTAN Parent Biospecimen ID",
            "bts:Biospecimen",
        ),
        class("bts:InformationContentEntity", "Information Content Entity", "bts:Thing"),
        class("bts:File", "File", "bts:InformationContentEntity"),
        class("bts:HTANDataFileID", "HTAN Data File ID", "bts:File"),
        class("bts:Filename", "Filename", "bts:Thing"),
        class("bts:FileFormat", "File Format", "bts:Thing"),
        class("bts:Publication", "Publication", "bts:Thing"),
        class("bts:HTANCenterID", "HTAN Center ID", "bts:Publication"),
        class("bts:DataType", "Data Type", "bts:Publication"),
        class("bts:Imaging", "Imaging", "bts:DataType"),
        class("bts:ImagingChannel", "Imaging Channel", "bts:Imaging"),
        class("bts:CODEX", "CODEX", "bts:DataType"),
        class("bts:Assay", "Assay", "bts:Thing"),
        class("bts:AssayType", "Assay Type", "bts:Assay"),
        class("bts:ScRNA-seq", "scRNA-seq", "bts:SingleCellSequencing"),
        class("bts:SingleCellSequencing", "Single Cell Sequencing", "bts:ScRNA-seqLevel"),
        class("bts:ReadLength", "Read Length", "bts:Assay"),
        class("bts:BulkRNA-seq", "Bulk RNA-seq", "bts:BulkSequencing"),
        class("bts:BulkSequencing", "Bulk Sequencing", "bts:BulkRNA-seqLevel"),
        class("bts:BulkRNA-seqLevel1", "Bulk RNA-seq Level 1", "bts:Sequencing"),
        class("bts:Sequencing", "Sequencing", "bts:Assay"),
    ];
    graph.push(json!({
        "@id": "bts:ScRNA-seqLevel1",
        "sms:displayName": "scRNA-seq Level 1",
        "rdfs:subClassOf": [{"@id": "bts:Assay"}],
        "sms:requiresDependency": [
            {"@id": "bts:HTANParticipantID"},
            {"@id": "bts:HTANBiospecimenID"},
            {"@id": "bts:HTANDataFileID"},
            {"@id": "bts:Filename"},
            {"@id": "bts:ReadLength"},
        ],
    }));
    json!({"@context": {}, "@graph": graph}).to_string()
}

pub fn ontology() -> OntologyIndex {
    OntologyIndex::from_json_str(&schema_json()).unwrap()
}

/// A fully populated scRNA-seq row with two biospecimens.
pub fn scrna_row() -> Row {
    Row::from_pairs([
        ("Assay", "scRNA-seq"),
        ("Level", "1"),
        ("Biospecimen", "HTA9_1_2,HTA9_1_3"),
        ("HTAN Participant ID", "HTA9_1"),
        ("HTAN Data File ID", "HTA9_1_100"),
        ("Filename", "fastq/HTA9_1_100.fastq.gz"),
        ("File Format", "fastq"),
        ("Read Length", "150"),
        ("HTAN Center ID", "HTAN OHSU"),
        ("Synapse Id", "syn123"),
        ("Data Access", "open"),
    ])
}
