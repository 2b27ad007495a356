use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use crate::error::HtanError;
use crate::fhir::Resource;

/// Destination for emitted records, grouped by resource type.
pub trait RecordSink {
    fn write(&mut self, record: &Resource) -> Result<(), HtanError>;

    /// Flushes and closes every stream. Called once, after the last record.
    fn finish(&mut self) -> Result<(), HtanError>;
}

/// Writes `<dir>/<ResourceType>.ndjson`, opening each file on first use.
pub struct NdjsonEmitter {
    dir: Utf8PathBuf,
    writers: BTreeMap<&'static str, BufWriter<File>>,
}

impl NdjsonEmitter {
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            writers: BTreeMap::new(),
        }
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    pub fn path_for(&self, resource_type: &str) -> Utf8PathBuf {
        self.dir.join(format!("{resource_type}.ndjson"))
    }

    fn writer(&mut self, resource_type: &'static str) -> Result<&mut BufWriter<File>, HtanError> {
        if !self.writers.contains_key(resource_type) {
            fs::create_dir_all(self.dir.as_std_path())
                .map_err(|err| HtanError::Filesystem(format!("create {}: {err}", self.dir)))?;
            let path = self.path_for(resource_type);
            let file = File::create(path.as_std_path())
                .map_err(|err| HtanError::Filesystem(format!("create {path}: {err}")))?;
            debug!(path = %path, "opened output stream");
            self.writers.insert(resource_type, BufWriter::new(file));
        }
        self.writers
            .get_mut(resource_type)
            .ok_or_else(|| HtanError::Filesystem(format!("no stream for {resource_type}")))
    }
}

impl RecordSink for NdjsonEmitter {
    fn write(&mut self, record: &Resource) -> Result<(), HtanError> {
        let line =
            serde_json::to_string(record).map_err(|err| HtanError::Serialize(err.to_string()))?;
        let writer = self.writer(record.resource_type())?;
        writer
            .write_all(line.as_bytes())
            .and_then(|_| writer.write_all(b"\n"))
            .map_err(|err| HtanError::Filesystem(err.to_string()))
    }

    fn finish(&mut self) -> Result<(), HtanError> {
        for (resource_type, mut writer) in std::mem::take(&mut self.writers) {
            writer.flush().map_err(|err| {
                HtanError::Filesystem(format!("flush {resource_type}.ndjson: {err}"))
            })?;
        }
        Ok(())
    }
}
