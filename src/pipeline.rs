use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::{debug, info};

use crate::classify::{DiagnosticLog, RowClassifier};
use crate::emit::RecordSink;
use crate::error::HtanError;
use crate::fhir::Resource;
use crate::normalize::{NormalizeOptions, TreeBuilder};
use crate::ontology::OntologyIndex;
use crate::project::{BranchKind, ResourceProjector};
use crate::table::Row;
use crate::tree::{Branch, NormalizedTree};
use crate::vocab::columns;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub normalize: NormalizeOptions,
    /// Process only the first row of every distinct assay type.
    pub sample_assays: bool,
    pub study_id: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            normalize: NormalizeOptions::default(),
            sample_assays: false,
            study_id: crate::project::DEFAULT_STUDY_ID.to_string(),
        }
    }
}

/// Run-wide set of `(resource type, id)` pairs already emitted.
#[derive(Debug, Default)]
pub struct EmittedIds {
    seen: HashSet<(&'static str, String)>,
}

impl EmittedIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the resource; false when an earlier one had the same key.
    pub fn insert(&mut self, resource: &Resource) -> bool {
        self.seen
            .insert((resource.resource_type(), resource.id().to_string()))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub records: BTreeMap<String, usize>,
    pub duplicates_discarded: usize,
    pub diagnostics: usize,
}

pub struct Pipeline<'a> {
    ontology: &'a OntologyIndex,
    options: PipelineOptions,
    projector: ResourceProjector,
    diagnostics: DiagnosticLog,
    emitted: EmittedIds,
    duplicates: usize,
    assays_seen: HashSet<String>,
}

impl<'a> Pipeline<'a> {
    pub fn new(ontology: &'a OntologyIndex, options: PipelineOptions) -> Self {
        let projector = ResourceProjector::new(options.study_id.clone());
        Self {
            ontology,
            options,
            projector,
            diagnostics: DiagnosticLog::new(),
            emitted: EmittedIds::new(),
            duplicates: 0,
            assays_seen: HashSet::new(),
        }
    }

    pub fn diagnostics(&self) -> &DiagnosticLog {
        &self.diagnostics
    }

    /// Normalizes one row. Returns `None` for rows skipped by assay sampling.
    pub fn normalize_row(&mut self, mut row: Row) -> Result<Option<NormalizedTree>, HtanError> {
        let assay = row.value(columns::ASSAY).to_string();
        if self.options.sample_assays && self.assays_seen.contains(&assay) {
            return Ok(None);
        }
        row.backfill_participant_id();
        self.assays_seen.insert(assay);

        let lineage = RowClassifier::new(self.ontology).classify(&row, &mut self.diagnostics)?;
        debug!(class = %lineage.class, synthetic = lineage.synthetic, "classified row");
        let tree = TreeBuilder::new(self.ontology, self.options.normalize).build(&row, &lineage);
        Ok(Some(tree))
    }

    /// Projects every top-level branch of `tree`. Records already emitted
    /// earlier in the run are dropped.
    pub fn project_tree(&mut self, tree: &NormalizedTree) -> Result<Vec<Resource>, HtanError> {
        let mut records = Vec::new();
        let Some(thing) = tree.thing() else {
            return Ok(records);
        };
        for (class, branch) in thing.iter() {
            if branch.as_branch().is_some_and(Branch::is_empty) {
                debug!(class, "skipping empty branch");
                continue;
            }
            let kind: BranchKind = class.parse()?;
            for record in self.projector.project(branch, kind)? {
                if self.emitted.insert(&record) {
                    records.push(record);
                } else {
                    self.duplicates += 1;
                    debug!(
                        resource_type = record.resource_type(),
                        id = record.id(),
                        "discarding duplicate record"
                    );
                }
            }
        }
        Ok(records)
    }

    pub fn run<I>(&mut self, rows: I, sink: &mut dyn RecordSink) -> Result<RunSummary, HtanError>
    where
        I: IntoIterator<Item = Result<Row, HtanError>>,
    {
        let mut summary = RunSummary::default();
        for row in rows {
            summary.rows_read += 1;
            let Some(tree) = self.normalize_row(row?)? else {
                summary.rows_skipped += 1;
                continue;
            };
            let records = self.project_tree(&tree)?;
            for record in &records {
                sink.write(record)?;
                *summary
                    .records
                    .entry(record.resource_type().to_string())
                    .or_default() += 1;
            }
        }
        sink.finish()?;

        let written: usize = summary.records.values().sum();
        summary.duplicates_discarded = self.duplicates;
        summary.diagnostics = self.diagnostics.len();
        info!(
            rows = summary.rows_read,
            skipped = summary.rows_skipped,
            records = written,
            duplicates = summary.duplicates_discarded,
            "conversion finished"
        );
        Ok(summary)
    }
}
