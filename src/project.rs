//! Projects the top-level branches of a normalized tree into FHIR resources.

use std::fmt;
use std::str::FromStr;

use crate::error::HtanError;
use crate::fhir::{
    Attachment, CodeableConcept, DocumentContent, DocumentReference, Identifier, Patient,
    Reference, ResearchStudy, ResearchSubject, Resource, Specimen, Task, TaskParameter,
    to_resource_id,
};
use crate::tree::{Branch, Node};
use crate::vocab::{self, systems};

/// Assay fields that never become generic task inputs.
const TASK_INPUT_EXCLUDED: [&str; 7] = [
    vocab::PARENT_BIOSPECIMEN_ID,
    vocab::PARTICIPANT_ID,
    vocab::FILENAME,
    vocab::DATA_FILE_ID,
    vocab::BIOSPECIMEN_ID,
    "_id",
    "_type",
];

pub const DEFAULT_STUDY_ID: &str = "HTA9";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchKind {
    Assay,
    IndividualOrganism,
    Biosample,
    InformationContentEntity,
    Publication,
}

impl BranchKind {
    pub fn class_id(&self) -> &'static str {
        match self {
            BranchKind::Assay => vocab::ASSAY,
            BranchKind::IndividualOrganism => vocab::INDIVIDUAL_ORGANISM,
            BranchKind::Biosample => vocab::BIOSAMPLE,
            BranchKind::InformationContentEntity => vocab::INFORMATION_CONTENT_ENTITY,
            BranchKind::Publication => vocab::PUBLICATION,
        }
    }
}

impl fmt::Display for BranchKind {
    /// The HTAN type tag, e.g. `bts_Assay`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class_id().replace(':', "_"))
    }
}

impl FromStr for BranchKind {
    type Err = HtanError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        [
            BranchKind::Assay,
            BranchKind::IndividualOrganism,
            BranchKind::Biosample,
            BranchKind::InformationContentEntity,
            BranchKind::Publication,
        ]
        .into_iter()
        .find(|kind| kind.class_id() == value || kind.to_string() == value)
        .ok_or_else(|| HtanError::UnknownBranch(value.replace(':', "_")))
    }
}

#[derive(Debug, Clone)]
pub struct ResourceProjector {
    study_id: String,
}

impl Default for ResourceProjector {
    fn default() -> Self {
        Self::new(DEFAULT_STUDY_ID)
    }
}

impl ResourceProjector {
    pub fn new(study_id: impl Into<String>) -> Self {
        Self {
            study_id: study_id.into(),
        }
    }

    pub fn project(&self, branch: &Node, kind: BranchKind) -> Result<Vec<Resource>, HtanError> {
        match kind {
            BranchKind::Assay => self.task(branch, kind),
            BranchKind::IndividualOrganism => self.patient(branch, kind),
            BranchKind::Biosample => self.specimens(branch, kind),
            BranchKind::InformationContentEntity => self.document_reference(branch, kind),
            BranchKind::Publication => self.research_study(branch, kind),
        }
    }

    fn task(&self, branch: &Node, kind: BranchKind) -> Result<Vec<Resource>, HtanError> {
        let (assay_type, assay) = first_child(branch, kind)?;

        let specimen_id = assay
            .leaf(vocab::BIOSPECIMEN_ID)
            .or_else(|| assay.leaf(vocab::PARENT_BIOSPECIMEN_ID))
            .ok_or_else(|| HtanError::MissingSpecimen {
                branch: kind.to_string(),
            })?;
        let specimen_ids = specimen_id.split(',').collect::<Vec<_>>();
        let participant = participant_id(assay, kind)?;
        let data_file_id = required(assay, vocab::DATA_FILE_ID, kind)?;

        let mut input = vec![TaskParameter::reference("Patient", participant)];
        input.extend(assay.iter().filter_map(|(key, node)| {
            if TASK_INPUT_EXCLUDED.contains(&key) {
                return None;
            }
            let value = node.as_str()?;
            Some(TaskParameter::string(strip_namespace(key), value))
        }));
        input.extend(
            specimen_ids
                .iter()
                .map(|id| TaskParameter::reference("Specimen", id)),
        );

        let filename = assay.leaf(vocab::FILENAME).unwrap_or_default();
        let parent_specimen = assay
            .leaf(vocab::PARENT_BIOSPECIMEN_ID)
            .unwrap_or_default();

        Ok(vec![Resource::Task(Task {
            id: to_resource_id(&format!("{data_file_id}-{}", specimen_ids[0])),
            identifier: vec![
                Identifier::new(
                    systems::HTAN_ASSAY_TYPE,
                    strip_namespace(assay_type).trim_start_matches(vocab::OHSU),
                ),
                Identifier::new(systems::HTAN_DATA_FILE_ID, data_file_id),
            ],
            status: "requested".to_string(),
            intent: "order".to_string(),
            focus: Reference::to("Specimen", specimen_ids[0]),
            for_subject: Reference::to("Patient", participant),
            code: CodeableConcept::code(systems::HTAN, kind.to_string()),
            description: format!("Assay that created {filename} file for {parent_specimen}"),
            input,
            output: vec![TaskParameter::reference("DocumentReference", data_file_id)],
        })])
    }

    fn patient(&self, branch: &Node, kind: BranchKind) -> Result<Vec<Resource>, HtanError> {
        let patient = child_branch(branch, vocab::PATIENT, kind)?;
        let participant = participant_id(patient, kind)?;

        Ok(vec![
            Resource::Patient(Patient {
                id: to_resource_id(participant),
                identifier: vec![Identifier::new(systems::HTAN, participant)],
            }),
            Resource::ResearchSubject(ResearchSubject {
                id: to_resource_id(&format!("{participant}-{}", self.study_id)),
                subject: Reference::to("Patient", participant),
                status: "candidate".to_string(),
                study: Reference::to("ResearchStudy", &self.study_id),
            }),
        ])
    }

    fn specimens(&self, branch: &Node, kind: BranchKind) -> Result<Vec<Resource>, HtanError> {
        let (_, biospecimen) = first_child(branch, kind)?;
        let specimen_ids =
            biospecimen
                .leaf(vocab::BIOSPECIMEN_ID)
                .ok_or_else(|| HtanError::MissingSpecimen {
                    branch: kind.to_string(),
                })?;
        let participant = participant_id(biospecimen, kind)?;

        Ok(specimen_ids
            .split(',')
            .map(|specimen_id| {
                Resource::Specimen(Specimen {
                    id: to_resource_id(specimen_id),
                    identifier: vec![Identifier::new(systems::HTAN, specimen_id)],
                    subject: Reference::to("Patient", participant),
                })
            })
            .collect())
    }

    fn document_reference(
        &self,
        branch: &Node,
        kind: BranchKind,
    ) -> Result<Vec<Resource>, HtanError> {
        let file = child_branch(branch, vocab::FILE, kind)?;
        let data_file_id = required(file, vocab::DATA_FILE_ID, kind)?;
        let participant = participant_id(file, kind)?;

        let mut identifier = vec![Identifier::new(systems::HTAN, data_file_id)];
        if let Some(synapse_id) = file.leaf(vocab::SYNAPSE_ID) {
            identifier.push(Identifier::new(systems::SYNAPSE, synapse_id));
        }
        if let Some(data_access) = file.leaf(vocab::DATA_ACCESS) {
            identifier.push(Identifier::new(systems::DATA_ACCESS, data_access));
        }

        Ok(vec![Resource::DocumentReference(DocumentReference {
            id: to_resource_id(data_file_id),
            status: "current".to_string(),
            identifier,
            subject: Reference::to("Patient", participant),
            content: vec![DocumentContent {
                attachment: Attachment {
                    url: file.leaf(vocab::FILENAME).map(str::to_string),
                    content_type: file.leaf(vocab::FILE_FORMAT).map(str::to_string),
                },
            }],
        })])
    }

    fn research_study(&self, branch: &Node, kind: BranchKind) -> Result<Vec<Resource>, HtanError> {
        let center_id = as_branch(branch, kind)?
            .get(vocab::CENTER_ID)
            .and_then(|center| match center {
                Node::Branch(children) => children
                    .first()
                    .and_then(|(_, node)| node.first_scalar()),
                Node::Leaf(value) => value.as_deref(),
            })
            .ok_or_else(|| HtanError::MissingField {
                branch: kind.to_string(),
                field: vocab::CENTER_ID.to_string(),
            })?;

        Ok(vec![Resource::ResearchStudy(ResearchStudy {
            id: to_resource_id(center_id),
            status: "completed".to_string(),
        })])
    }
}

fn strip_namespace(key: &str) -> &str {
    key.trim_start_matches(vocab::BTS)
}

fn as_branch(node: &Node, kind: BranchKind) -> Result<&Branch, HtanError> {
    node.as_branch().ok_or_else(|| HtanError::MissingField {
        branch: kind.to_string(),
        field: kind.class_id().to_string(),
    })
}

fn first_child(node: &Node, kind: BranchKind) -> Result<(&str, &Branch), HtanError> {
    let missing = || HtanError::MissingField {
        branch: kind.to_string(),
        field: kind.class_id().to_string(),
    };
    let (key, child) = as_branch(node, kind)?.first().ok_or_else(missing)?;
    Ok((key, child.as_branch().ok_or_else(missing)?))
}

fn child_branch<'a>(node: &'a Node, key: &str, kind: BranchKind) -> Result<&'a Branch, HtanError> {
    as_branch(node, kind)?
        .branch(key)
        .ok_or_else(|| HtanError::MissingField {
            branch: kind.to_string(),
            field: key.to_string(),
        })
}

fn required<'a>(branch: &'a Branch, key: &str, kind: BranchKind) -> Result<&'a str, HtanError> {
    branch.leaf(key).ok_or_else(|| HtanError::MissingField {
        branch: kind.to_string(),
        field: key.to_string(),
    })
}

fn participant_id(branch: &Branch, kind: BranchKind) -> Result<&str, HtanError> {
    branch
        .leaf(vocab::PARTICIPANT_ID)
        .ok_or_else(|| HtanError::MissingParticipant {
            branch: kind.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn branch_kind_round_trips_through_tag() {
        let kind: BranchKind = "bts:Biosample".parse().unwrap();
        assert_eq!(kind, BranchKind::Biosample);
        assert_eq!(kind.to_string(), "bts_Biosample");
        assert_eq!("bts_Assay".parse::<BranchKind>().unwrap(), BranchKind::Assay);
    }

    #[test]
    fn unknown_branch_is_rejected() {
        let err = "bts:Component".parse::<BranchKind>().unwrap_err();
        assert_matches!(err, HtanError::UnknownBranch(tag) if tag == "bts_Component");
    }
}
