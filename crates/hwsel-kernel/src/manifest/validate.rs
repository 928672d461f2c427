use super::{EngineManifest, MANIFEST_FILENAME};
use crate::error::{ManifestError, ValidationError};
use std::path::Path;
use tracing::debug;

/// Validate a manifest file on disk without scoring it.
///
/// The file must be called `engine.yaml`, must exist, and must declare the
/// same name as its parent directory.
pub fn validate(path: &Path) -> Result<EngineManifest, ManifestError> {
    if path.file_name().and_then(|n| n.to_str()) != Some(MANIFEST_FILENAME) {
        return Err(ManifestError::WrongFileName {
            path: path.to_path_buf(),
        });
    }

    let engine_name = engine_name_from_path(path);
    let data = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ManifestError::NotFound {
                name: engine_name.clone().unwrap_or_default(),
                path: path.to_path_buf(),
            }
        } else {
            ManifestError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    parse_manifest(engine_name.as_deref(), &data).map_err(|source| ManifestError::Invalid {
        name: engine_name.unwrap_or_default(),
        path: path.to_path_buf(),
        source,
    })
}

/// Decode and validate a manifest document.
///
/// When `expected_name` is given, the manifest's `name` must equal it.
pub fn parse_manifest(
    expected_name: Option<&str>,
    data: &str,
) -> Result<EngineManifest, ValidationError> {
    let data = data.trim();
    if data.is_empty() {
        return Err(ValidationError::Empty);
    }

    let manifest: EngineManifest = serde_yaml::from_str(data)?;
    manifest.validate(expected_name)?;
    debug!(engine = %manifest.name, "manifest validated");
    Ok(manifest)
}

impl EngineManifest {
    /// Checks the decoder cannot express: required strings and the name.
    pub fn validate(&self, expected_name: Option<&str>) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if let Some(expected) = expected_name.filter(|n| !n.is_empty()) {
            if self.name != expected {
                return Err(ValidationError::NameMismatch {
                    dir: expected.to_string(),
                    name: self.name.clone(),
                });
            }
        }
        if self.description.is_empty() {
            return Err(ValidationError::MissingField("description"));
        }
        if self.vendor.is_empty() {
            return Err(ValidationError::MissingField("vendor"));
        }
        if self.grade.is_none() {
            return Err(ValidationError::MissingField("grade"));
        }
        Ok(())
    }
}

fn engine_name_from_path(path: &Path) -> Option<String> {
    path.parent()?
        .file_name()?
        .to_str()
        .map(str::to_string)
}
