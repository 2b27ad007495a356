use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::HtanError;
use crate::normalize::NormalizeOptions;
use crate::pipeline::PipelineOptions;
use crate::project::DEFAULT_STUDY_ID;

pub const DEFAULT_CONFIG_FILE: &str = "htan-fhir.json";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub schema: Option<Utf8PathBuf>,
    #[serde(default)]
    pub table: Option<Utf8PathBuf>,
    #[serde(default)]
    pub output_dir: Option<Utf8PathBuf>,
    #[serde(default)]
    pub study_id: Option<String>,
    #[serde(default)]
    pub skip_empty: Option<bool>,
    #[serde(default)]
    pub sample_assays: Option<bool>,
}

/// Values given on the command line; they win over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub schema: Option<Utf8PathBuf>,
    pub table: Option<Utf8PathBuf>,
    pub output_dir: Option<Utf8PathBuf>,
    pub study_id: Option<String>,
    pub keep_empty: bool,
    pub sample_assays: bool,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub schema: Utf8PathBuf,
    pub table: Utf8PathBuf,
    pub output_dir: Utf8PathBuf,
    pub study_id: String,
    pub skip_empty: bool,
    pub sample_assays: bool,
}

impl ResolvedConfig {
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            normalize: NormalizeOptions {
                skip_empty: self.skip_empty,
            },
            sample_assays: self.sample_assays,
            study_id: self.study_id.clone(),
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Reads the config at `path`, or `htan-fhir.json` when present. Without
    /// an explicit path a missing file means defaults.
    pub fn resolve(
        path: Option<&Utf8Path>,
        overrides: ConfigOverrides,
    ) -> Result<ResolvedConfig, HtanError> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Utf8PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let config = if path.is_none() && !config_path.exists() {
            Config::default()
        } else {
            let content = fs::read_to_string(config_path.as_std_path())
                .map_err(|_| HtanError::ConfigRead(config_path.clone()))?;
            serde_json::from_str(&content).map_err(|err| HtanError::ConfigParse(err.to_string()))?
        };

        Ok(Self::resolve_config(config, overrides))
    }

    pub fn resolve_config(config: Config, overrides: ConfigOverrides) -> ResolvedConfig {
        ResolvedConfig {
            schema_version: config.schema_version.unwrap_or(1),
            schema: overrides
                .schema
                .or(config.schema)
                .unwrap_or_else(|| Utf8PathBuf::from("HTAN.model.jsonld")),
            table: overrides
                .table
                .or(config.table)
                .unwrap_or_else(|| Utf8PathBuf::from("table_data.tsv")),
            output_dir: overrides
                .output_dir
                .or(config.output_dir)
                .unwrap_or_else(|| Utf8PathBuf::from("META")),
            study_id: overrides
                .study_id
                .or(config.study_id)
                .unwrap_or_else(|| DEFAULT_STUDY_ID.to_string()),
            skip_empty: !overrides.keep_empty && config.skip_empty.unwrap_or(true),
            sample_assays: overrides.sample_assays || config.sample_assays.unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_htan_layout() {
        let resolved = ConfigLoader::resolve_config(Config::default(), ConfigOverrides::default());
        assert_eq!(resolved.schema_version, 1);
        assert_eq!(resolved.schema, "HTAN.model.jsonld");
        assert_eq!(resolved.table, "table_data.tsv");
        assert_eq!(resolved.output_dir, "META");
        assert_eq!(resolved.study_id, "HTA9");
        assert!(resolved.skip_empty);
        assert!(!resolved.sample_assays);
    }
}
