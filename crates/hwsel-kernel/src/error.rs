//! Error types for `hwsel-kernel`.
//!
//! Compatibility problems are never errors: they travel as issue strings on a
//! [`ScoredManifest`](crate::selector::ScoredManifest). The types here cover
//! the three failures that stop a caller outright:
//!
//! - [`ManifestError`]: a manifest could not be found, read or validated.
//! - [`ScoreError`]: the snapshot lacks a measurement a manifest depends on.
//! - [`SelectError`]: nothing is eligible for automatic selection.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to load or validate one engine manifest.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ManifestError {
    #[error("engine {name:?} not found: {} does not exist", .path.display())]
    NotFound { name: String, path: PathBuf },

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("manifest file must be called engine.yaml: {}", .path.display())]
    WrongFileName { path: PathBuf },

    /// The document exists but is malformed or violates the schema.
    #[error("invalid manifest for engine {name:?} ({}): {source}", .path.display())]
    Invalid {
        name: String,
        path: PathBuf,
        #[source]
        source: ValidationError,
    },
}

/// Reasons a manifest document is rejected.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("empty yaml data")]
    Empty,

    /// Unknown fields, bad sizes, illegal device fields and non-primitive
    /// configuration values all surface here with their document location.
    #[error("{0}")]
    Decode(#[from] serde_yaml::Error),

    #[error("required field is not set: {0}")]
    MissingField(&'static str),

    #[error("engine directory name should match name in manifest: {dir} != {name}")]
    NameMismatch { dir: String, name: String },
}

/// Scoring could not run because the snapshot is missing a measurement.
///
/// This aborts a whole batch: an unmeasured value is never treated as an
/// insufficient one.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreError {
    #[error("cannot score engine {engine:?}: {reason}")]
    MeasurementMissing { engine: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SelectError {
    #[error("no compatible engine found")]
    NoCompatibleEngine,
}

pub type ManifestResult<T> = Result<T, ManifestError>;
