use hwsel_kernel::{ManifestError, ScoreError, SelectError};
use hwsel_probe::ProbeError;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("{0}")]
    Manifest(#[from] ManifestError),

    #[error("error scoring engines: {0}")]
    Score(#[from] ScoreError),

    #[error("{0}")]
    Select(#[from] SelectError),

    #[error("error reading hardware info: {0}")]
    Probe(#[from] ProbeError),

    #[error("engine \"{0}\" does not exist")]
    EngineNotFound(String),

    #[error("no active engine")]
    NoActiveEngine,

    #[error("not all manifests are valid")]
    InvalidManifests,

    #[error("cannot read {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("State error: failed to persist {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0}")]
    Other(String),
}

impl CliError {
    /// True when scoring worked but nothing on this machine qualifies.
    pub fn is_no_compatible_engine(&self) -> bool {
        matches!(self, CliError::Select(SelectError::NoCompatibleEngine))
    }
}

impl From<&str> for CliError {
    fn from(s: &str) -> Self {
        CliError::Other(s.to_string())
    }
}

impl From<String> for CliError {
    fn from(s: String) -> Self {
        CliError::Other(s)
    }
}
