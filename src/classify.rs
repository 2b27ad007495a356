use std::collections::HashSet;

use tracing::warn;

use crate::error::HtanError;
use crate::ontology::{OntologyIndex, strip_spaces};
use crate::table::Row;
use crate::vocab::{self, columns};

/// Where a row's assay sits in the class graph, or was synthesized into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssayLineage {
    pub grandparent: Option<String>,
    pub parent: String,
    pub class: String,
    pub dependencies: Vec<String>,
    pub synthetic: bool,
}

impl AssayLineage {
    fn synthetic(class: String) -> Self {
        Self {
            grandparent: Some(vocab::THING.to_string()),
            parent: vocab::ASSAY.to_string(),
            class,
            dependencies: vocab::DEFAULT_ASSAY_DEPENDENCIES
                .iter()
                .map(|id| id.to_string())
                .collect(),
            synthetic: true,
        }
    }

    pub fn depends_on(&self, id: &str) -> bool {
        self.dependencies.iter().any(|dep| dep == id)
    }

    /// Path of the assay node from the tree root.
    pub fn node_path(&self) -> Vec<&str> {
        self.grandparent
            .as_deref()
            .into_iter()
            .chain([self.parent.as_str(), self.class.as_str()])
            .collect()
    }
}

/// Run-scoped record of diagnostics already reported.
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    seen: HashSet<String>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs `message` unless the exact text was logged before. Returns whether
    /// it was logged now.
    pub fn warn_once(&mut self, message: String) -> bool {
        if self.seen.contains(&message) {
            return false;
        }
        warn!("{message}");
        self.seen.insert(message);
        true
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn contains(&self, message: &str) -> bool {
        self.seen.contains(message)
    }
}

pub struct RowClassifier<'a> {
    ontology: &'a OntologyIndex,
}

impl<'a> RowClassifier<'a> {
    pub fn new(ontology: &'a OntologyIndex) -> Self {
        Self { ontology }
    }

    pub fn classify(&self, row: &Row, log: &mut DiagnosticLog) -> Result<AssayLineage, HtanError> {
        let assay = row.value(columns::ASSAY);
        let level = row.value(columns::LEVEL);

        let Some(assay_type) = self.ontology.resolve_column(assay, assay) else {
            log.warn_once(format!("Assay type {assay} not found in the schema"));
            return Ok(AssayLineage::synthetic(format!(
                "{}{}",
                vocab::OHSU,
                strip_spaces(&format!("{assay}{level}"))
            )));
        };

        let type_parent = assay_type
            .superclass()
            .ok_or_else(|| HtanError::MissingAssayLineage(assay_type.id.clone()))?;
        if type_parent == vocab::DATA_TYPE {
            log.warn_once(format!(
                "Assay type {assay} parent not an {} is {type_parent}",
                vocab::ASSAY
            ));
            return Ok(AssayLineage::synthetic(format!(
                "{}{}",
                vocab::OHSU,
                strip_spaces(assay)
            )));
        }

        let level_root = self
            .ontology
            .superclass_of(type_parent)
            .ok_or_else(|| HtanError::MissingAssayLineage(type_parent.to_string()))?;
        let level_class = format!("{level_root}{}", strip_spaces(level));
        let assay_class =
            self.ontology
                .by_id(&level_class)
                .ok_or_else(|| HtanError::MissingAssayClass {
                    assay_type: assay_type.id.clone(),
                    parent: type_parent.to_string(),
                    class: level_class.clone(),
                })?;

        let parent = assay_class
            .superclass()
            .ok_or_else(|| HtanError::MissingAssayLineage(assay_class.id.clone()))?;
        let grandparent = self.ontology.superclass_of(parent);
        // Projection only reads assays under bts:Thing/bts:Assay.
        if parent != vocab::ASSAY || grandparent != Some(vocab::THING) {
            return Err(HtanError::MissingAssayLineage(assay_class.id.clone()));
        }

        Ok(AssayLineage {
            grandparent: grandparent.map(str::to_string),
            parent: parent.to_string(),
            class: assay_class.id.clone(),
            dependencies: assay_class.dependencies().map(str::to_string).collect(),
            synthetic: false,
        })
    }
}
