mod common;

use assert_matches::assert_matches;

use htan_fhir::error::HtanError;
use htan_fhir::fhir::{Resource, to_resource_id};
use htan_fhir::pipeline::{Pipeline, PipelineOptions};
use htan_fhir::project::{BranchKind, ResourceProjector};
use htan_fhir::tree::{Branch, Node, NormalizedTree};
use htan_fhir::vocab;

fn scrna_tree() -> NormalizedTree {
    let index = common::ontology();
    let mut pipeline = Pipeline::new(&index, PipelineOptions::default());
    pipeline.normalize_row(common::scrna_row()).unwrap().unwrap()
}

fn branch(tree: &NormalizedTree, class: &str) -> Node {
    tree.thing().unwrap().get(class).unwrap().clone()
}

#[test]
fn assay_branch_becomes_task() {
    let tree = scrna_tree();
    let records = ResourceProjector::default()
        .project(&branch(&tree, vocab::ASSAY), BranchKind::Assay)
        .unwrap();
    assert_eq!(records.len(), 1);
    let Resource::Task(task) = &records[0] else {
        panic!("expected a Task, got {:?}", records[0]);
    };

    assert_eq!(task.id, "HTA9-1-100-HTA9-1-2");
    assert_eq!(task.id, to_resource_id("HTA9_1_100-HTA9_1_2"));
    assert_eq!(task.identifier[0].value, "ScRNA-seqLevel1");
    assert_eq!(task.identifier[1].value, "HTA9_1_100");
    assert_eq!(task.focus.reference, "Specimen/HTA9-1-2");
    assert_eq!(task.for_subject.reference, "Patient/HTA9-1");
    assert_eq!(task.code.coding[0].code, "bts_Assay");
    assert_eq!(
        task.description,
        "Assay that created fastq/HTA9_1_100.fastq.gz file for "
    );
    assert_eq!(
        task.output[0].value_reference.as_ref().unwrap().reference,
        "DocumentReference/HTA9-1-100"
    );

    let patients = task
        .input
        .iter()
        .filter(|input| input.kind.coding[0].code == "Patient")
        .count();
    let specimens = task
        .input
        .iter()
        .filter_map(|input| {
            (input.kind.coding[0].code == "Specimen")
                .then(|| input.value_reference.as_ref().unwrap().reference.as_str())
        })
        .collect::<Vec<_>>();
    assert_eq!(patients, 1);
    assert_eq!(specimens, ["Specimen/HTA9-1-2", "Specimen/HTA9-1-3"]);

    let generic = task
        .input
        .iter()
        .filter_map(|input| {
            let value = input.value_string.as_deref()?;
            Some((input.kind.coding[0].code.as_str(), value))
        })
        .collect::<Vec<_>>();
    assert_eq!(generic, [("ReadLength", "150")]);
}

#[test]
fn task_serializes_fhir_field_names() {
    let tree = scrna_tree();
    let records = ResourceProjector::default()
        .project(&branch(&tree, vocab::ASSAY), BranchKind::Assay)
        .unwrap();
    let json = serde_json::to_value(&records[0]).unwrap();
    assert_eq!(json["resourceType"], "Task");
    assert_eq!(json["for"]["reference"], "Patient/HTA9-1");
    assert_eq!(json["input"][0]["type"]["coding"][0]["system"], vocab::systems::FHIR_TYPES);
    assert_eq!(json["input"][0]["valueReference"]["reference"], "Patient/HTA9-1");
    assert_eq!(json["input"][1]["valueString"], "150");
    assert!(json["input"][1].get("valueReference").is_none());
}

#[test]
fn parent_biospecimen_is_used_when_biospecimen_is_absent() {
    let mut fields = Branch::new();
    fields.insert(vocab::PARENT_BIOSPECIMEN_ID, Node::leaf("HTA9_5_1"));
    fields.insert(vocab::PARTICIPANT_ID, Node::leaf("HTA9_5"));
    fields.insert(vocab::DATA_FILE_ID, Node::leaf("HTA9_5_7"));
    let mut assay = Branch::new();
    assay.insert("ohsu:Foo1", Node::Branch(fields));

    let records = ResourceProjector::default()
        .project(&Node::Branch(assay), BranchKind::Assay)
        .unwrap();
    assert_eq!(records[0].id(), "HTA9-5-7-HTA9-5-1");
    let Resource::Task(task) = &records[0] else {
        panic!("expected a Task");
    };
    assert_eq!(task.identifier[0].value, "Foo1");
    assert_eq!(task.description, "Assay that created  file for HTA9_5_1");
}

#[test]
fn task_without_specimen_is_a_contract_failure() {
    let mut fields = Branch::new();
    fields.insert(vocab::PARTICIPANT_ID, Node::leaf("HTA9_5"));
    fields.insert(vocab::DATA_FILE_ID, Node::leaf("HTA9_5_7"));
    let mut assay = Branch::new();
    assay.insert("ohsu:Foo1", Node::Branch(fields));

    let err = ResourceProjector::default()
        .project(&Node::Branch(assay), BranchKind::Assay)
        .unwrap_err();
    assert_matches!(err, HtanError::MissingSpecimen { .. });
}

#[test]
fn organism_branch_becomes_patient_and_subject() {
    let tree = scrna_tree();
    let records = ResourceProjector::new("HTA1")
        .project(&branch(&tree, vocab::INDIVIDUAL_ORGANISM), BranchKind::IndividualOrganism)
        .unwrap();
    let types = records.iter().map(Resource::resource_type).collect::<Vec<_>>();
    assert_eq!(types, ["Patient", "ResearchSubject"]);

    let Resource::ResearchSubject(subject) = &records[1] else {
        panic!("expected a ResearchSubject");
    };
    assert_eq!(subject.id, "HTA9-1-HTA1");
    assert_eq!(subject.subject.reference, "Patient/HTA9-1");
    assert_eq!(subject.study.reference, "ResearchStudy/HTA1");
    assert_eq!(subject.status, "candidate");
}

#[test]
fn organism_without_participant_is_a_contract_failure() {
    let mut organism = Branch::new();
    organism.branch_mut(vocab::PATIENT);
    let err = ResourceProjector::default()
        .project(&Node::Branch(organism), BranchKind::IndividualOrganism)
        .unwrap_err();
    assert_matches!(err, HtanError::MissingParticipant { .. });
}

#[test]
fn biosample_branch_becomes_one_specimen_per_token() {
    let tree = scrna_tree();
    let records = ResourceProjector::default()
        .project(&branch(&tree, vocab::BIOSAMPLE), BranchKind::Biosample)
        .unwrap();
    let ids = records.iter().map(Resource::id).collect::<Vec<_>>();
    assert_eq!(ids, ["HTA9-1-2", "HTA9-1-3"]);
    let Resource::Specimen(specimen) = &records[1] else {
        panic!("expected a Specimen");
    };
    assert_eq!(specimen.identifier[0].value, "HTA9_1_3");
    assert_eq!(specimen.subject.reference, "Patient/HTA9-1");
}

#[test]
fn file_branch_becomes_document_reference() {
    let tree = scrna_tree();
    let records = ResourceProjector::default()
        .project(
            &branch(&tree, vocab::INFORMATION_CONTENT_ENTITY),
            BranchKind::InformationContentEntity,
        )
        .unwrap();
    let Resource::DocumentReference(document) = &records[0] else {
        panic!("expected a DocumentReference");
    };
    assert_eq!(document.id, "HTA9-1-100");
    assert_eq!(document.status, "current");
    let systems = document
        .identifier
        .iter()
        .map(|id| (id.system.as_str(), id.value.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        systems,
        [
            (vocab::systems::HTAN, "HTA9_1_100"),
            (vocab::systems::SYNAPSE, "syn123"),
            (vocab::systems::DATA_ACCESS, "open"),
        ]
    );
    let attachment = &document.content[0].attachment;
    assert_eq!(attachment.url.as_deref(), Some("fastq/HTA9_1_100.fastq.gz"));
    assert_eq!(attachment.content_type.as_deref(), Some("fastq"));
}

#[test]
fn publication_branch_becomes_research_study() {
    let tree = scrna_tree();
    let records = ResourceProjector::default()
        .project(&branch(&tree, vocab::PUBLICATION), BranchKind::Publication)
        .unwrap();
    assert_eq!(records[0].resource_type(), "ResearchStudy");
    assert_eq!(records[0].id(), "HTANOHSU");

    let mut center = Branch::new();
    center.insert("bts:HTANOHSU", Node::leaf("HTA9"));
    let mut publication = Branch::new();
    publication.insert(vocab::CENTER_ID, Node::Branch(center));
    let records = ResourceProjector::default()
        .project(&Node::Branch(publication), BranchKind::Publication)
        .unwrap();
    assert_eq!(records[0].id(), "HTA9");
}

#[test]
fn projection_is_idempotent() {
    let tree = scrna_tree();
    let projector = ResourceProjector::default();
    for (class, node) in tree.thing().unwrap().iter() {
        let kind: BranchKind = class.parse().unwrap();
        let first = serde_json::to_string(&projector.project(node, kind).unwrap()).unwrap();
        let second = serde_json::to_string(&projector.project(node, kind).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
