//! Fixed identifiers of the HTAN ontology and the FHIR systems records point at.

/// Namespace of every class in the HTAN ontology.
pub const BTS: &str = "bts:";
/// Namespace for assay classes minted when the ontology has no match.
pub const OHSU: &str = "ohsu:";

pub const THING: &str = "bts:Thing";
pub const ASSAY: &str = "bts:Assay";
pub const ASSAY_TYPE: &str = "bts:AssayType";
pub const DATA_TYPE: &str = "bts:DataType";
pub const FILE: &str = "bts:File";
pub const DATA_ACCESS: &str = "bts:DataAccess";
pub const SYNAPSE_ID: &str = "bts:SynapseID";

pub const INDIVIDUAL_ORGANISM: &str = "bts:IndividualOrganism";
pub const PATIENT: &str = "bts:Patient";
pub const BIOSAMPLE: &str = "bts:Biosample";
pub const BIOSPECIMEN: &str = "bts:Biospecimen";
pub const INFORMATION_CONTENT_ENTITY: &str = "bts:InformationContentEntity";
pub const PUBLICATION: &str = "bts:Publication";

pub const PARTICIPANT_ID: &str = "bts:HTANParticipantID";
pub const BIOSPECIMEN_ID: &str = "bts:HTANBiospecimenID";
pub const PARENT_BIOSPECIMEN_ID: &str = "bts:HTANParentBiospecimenID";
pub const DATA_FILE_ID: &str = "bts:HTANDataFileID";
pub const CENTER_ID: &str = "bts:HTANCenterID";
pub const FILENAME: &str = "bts:Filename";
pub const FILE_FORMAT: &str = "bts:FileFormat";

/// Dependencies given to every synthetic assay class.
pub const DEFAULT_ASSAY_DEPENDENCIES: [&str; 4] =
    [PARTICIPANT_ID, BIOSPECIMEN_ID, PARENT_BIOSPECIMEN_ID, DATA_FILE_ID];

/// Table columns read directly by the pipeline.
pub mod columns {
    pub const ASSAY: &str = "Assay";
    pub const LEVEL: &str = "Level";
    pub const BIOSPECIMEN: &str = "Biospecimen";
    pub const PARTICIPANT_ID: &str = "HTAN Participant ID";
}

/// Reserved keys of the normalized tree.
pub mod keys {
    /// Holds a scalar that was displaced when children were added to its node.
    pub const RECOVERED_SCALAR: &str = "_";
    /// Top-level bucket for columns that resolve to no ontology class.
    pub const MISSING_MAPPING: &str = "MISSING_MAPPING";
}

pub mod systems {
    pub const FHIR_TYPES: &str = "http://hl7.org/fhir/fhir-types";
    pub const BIOTHINGS: &str = "http://schema.biothings.io/";
    pub const HTAN: &str = "https://htan.org";
    pub const HTAN_ASSAY_TYPE: &str = "https://htan.org/assay_type";
    pub const HTAN_DATA_FILE_ID: &str = "https://htan.org/HTANDataFileID";
    pub const SYNAPSE: &str = "https://synapse.org";
    pub const DATA_ACCESS: &str = "https://biothings.io/DataAccess";
}
