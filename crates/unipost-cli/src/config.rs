//! Engine configuration loaded from a TOML file.
//!
//! Every value has a default, so a missing key still yields a working
//! configuration. CLI flags override whatever the file says; resolution
//! happens in the command layer.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

/// Schema directory used when neither flag nor config file names one.
pub const DEFAULT_SCHEMA_DIR: &str = "config/schemas";

/// Output directory used when neither flag nor config file names one.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Tunables for a processing run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineConfig {
    /// Directory holding one schema config per platform.
    #[serde(default = "defaults::schema_dir")]
    pub schema_dir: PathBuf,

    /// Directory output and reject files are written under.
    #[serde(default = "defaults::output_dir")]
    pub output_dir: PathBuf,

    /// Maximum posts transformed at once within a batch.
    #[serde(default = "defaults::concurrency")]
    pub concurrency: usize,

    /// Wall-clock budget in seconds for one batch. Unset means no deadline.
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let config: EngineConfig =
            toml::from_str(&raw).with_context(|| format!("parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.concurrency > 0, "concurrency must be at least 1");
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            schema_dir: defaults::schema_dir(),
            output_dir: defaults::output_dir(),
            concurrency: defaults::concurrency(),
            deadline_secs: None,
        }
    }
}

mod defaults {
    use std::path::PathBuf;
    use unipost_pipeline::DEFAULT_CONCURRENCY;

    pub fn schema_dir() -> PathBuf {
        PathBuf::from(super::DEFAULT_SCHEMA_DIR)
    }

    pub fn output_dir() -> PathBuf {
        PathBuf::from(super::DEFAULT_OUTPUT_DIR)
    }

    pub fn concurrency() -> usize {
        DEFAULT_CONCURRENCY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use unipost_pipeline::DEFAULT_CONCURRENCY;

    #[test]
    fn default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.schema_dir, PathBuf::from("config/schemas"));
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(config.deadline_secs, None);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("unipost.toml");
        fs::write(&path, "concurrency = 2\ndeadline_secs = 30\n").unwrap();
        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.deadline_secs, Some(30));
        assert_eq!(config.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn file_paths_override_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("unipost.toml");
        fs::write(
            &path,
            "schema_dir = \"schemas/prod\"\noutput_dir = \"/var/unipost/out\"\n",
        )
        .unwrap();
        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.schema_dir, PathBuf::from("schemas/prod"));
        assert_eq!(config.output_dir, PathBuf::from("/var/unipost/out"));
    }

    #[test]
    fn rejects_zero_concurrency() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("unipost.toml");
        fs::write(&path, "concurrency = 0\n").unwrap();
        assert!(EngineConfig::load(&path).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(EngineConfig::load(Path::new("no-such-config.toml")).is_err());
    }
}
