use camino::Utf8PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum HtanError {
    #[error("failed to read schema file at {0}")]
    SchemaRead(Utf8PathBuf),

    #[error("failed to load schema: {0}")]
    SchemaLoad(String),

    #[error("failed to read table at {0}")]
    TableRead(Utf8PathBuf),

    #[error("failed to parse table: {0}")]
    TableParse(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(Utf8PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("assay {assay_type} ({parent}) level class {class} not found in the schema")]
    MissingAssayClass {
        assay_type: String,
        parent: String,
        class: String,
    },

    #[error("assay class {0} does not descend from bts:Assay under bts:Thing in the schema")]
    MissingAssayLineage(String),

    #[error("{branch} has no specimen identifier")]
    MissingSpecimen { branch: String },

    #[error("{branch} has no participant identifier")]
    MissingParticipant { branch: String },

    #[error("{branch} is missing required field {field}")]
    MissingField { branch: String, field: String },

    #[error("unknown HTAN type {0}")]
    UnknownBranch(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("failed to serialize record: {0}")]
    Serialize(String),
}
