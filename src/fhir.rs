//! FHIR resource records emitted by the projector.

use serde::Serialize;

use crate::vocab::systems;

/// Turns an arbitrary HTAN identifier into a valid FHIR id. The replacement
/// order is fixed: colons become underscores before underscores become
/// hyphens, so independently sanitized references agree.
pub fn to_resource_id(raw: &str) -> String {
    raw.replace(':', "_")
        .replace(' ', "")
        .replace('_', "-")
        .replace(',', "-")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub reference: String,
}

impl Reference {
    /// Reference to `resource_type/<sanitized id>`.
    pub fn to(resource_type: &str, id: &str) -> Self {
        Self {
            reference: format!("{resource_type}/{}", to_resource_id(id)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identifier {
    pub system: String,
    pub value: String,
}

impl Identifier {
    pub fn new(system: &str, value: impl Into<String>) -> Self {
        Self {
            system: system.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Coding {
    pub system: String,
    pub code: String,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeableConcept {
    pub coding: Vec<Coding>,
}

impl CodeableConcept {
    /// Single coding whose display repeats the code.
    pub fn code(system: &str, code: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            coding: vec![Coding {
                system: system.to_string(),
                display: code.clone(),
                code,
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskParameter {
    #[serde(rename = "type")]
    pub kind: CodeableConcept,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_reference: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
}

impl TaskParameter {
    pub fn reference(resource_type: &str, id: &str) -> Self {
        Self {
            kind: CodeableConcept::code(systems::FHIR_TYPES, resource_type),
            value_reference: Some(Reference::to(resource_type, id)),
            value_string: None,
        }
    }

    pub fn string(code: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: CodeableConcept::code(systems::BIOTHINGS, code),
            value_reference: None,
            value_string: Some(value.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Patient {
    pub id: String,
    pub identifier: Vec<Identifier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResearchSubject {
    pub id: String,
    pub subject: Reference,
    pub status: String,
    pub study: Reference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Specimen {
    pub id: String,
    pub identifier: Vec<Identifier>,
    pub subject: Reference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentContent {
    pub attachment: Attachment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentReference {
    pub id: String,
    pub status: String,
    pub identifier: Vec<Identifier>,
    pub subject: Reference,
    pub content: Vec<DocumentContent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: String,
    pub identifier: Vec<Identifier>,
    pub status: String,
    pub intent: String,
    pub focus: Reference,
    #[serde(rename = "for")]
    pub for_subject: Reference,
    pub code: CodeableConcept,
    pub description: String,
    pub input: Vec<TaskParameter>,
    pub output: Vec<TaskParameter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResearchStudy {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "resourceType")]
pub enum Resource {
    Patient(Patient),
    ResearchSubject(ResearchSubject),
    Specimen(Specimen),
    DocumentReference(DocumentReference),
    Task(Task),
    ResearchStudy(ResearchStudy),
}

impl Resource {
    pub fn resource_type(&self) -> &'static str {
        match self {
            Resource::Patient(_) => "Patient",
            Resource::ResearchSubject(_) => "ResearchSubject",
            Resource::Specimen(_) => "Specimen",
            Resource::DocumentReference(_) => "DocumentReference",
            Resource::Task(_) => "Task",
            Resource::ResearchStudy(_) => "ResearchStudy",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Resource::Patient(r) => &r.id,
            Resource::ResearchSubject(r) => &r.id,
            Resource::Specimen(r) => &r.id,
            Resource::DocumentReference(r) => &r.id,
            Resource::Task(r) => &r.id,
            Resource::ResearchStudy(r) => &r.id,
        }
    }
}
