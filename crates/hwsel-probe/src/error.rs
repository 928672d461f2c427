use std::path::PathBuf;
use thiserror::Error;

/// Failures while producing a hardware snapshot.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProbeError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read snapshot: {0}")]
    Read(#[from] std::io::Error),

    #[error("invalid snapshot document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid snapshot document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{program} failed: {message}")]
    Command { program: String, message: String },

    #[error("cannot parse {what}: {input:?}")]
    Parse { what: &'static str, input: String },

    #[error("failed to persist {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ProbeError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| ProbeError::Io { path, source }
    }
}

pub type ProbeResult<T> = Result<T, ProbeError>;
