use super::{EngineManifest, MANIFEST_FILENAME, parse_manifest};
use crate::error::{ManifestError, ManifestResult};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Load and validate the manifest of one engine.
pub fn load_manifest(manifests_dir: &Path, engine_name: &str) -> ManifestResult<EngineManifest> {
    let path = manifests_dir.join(engine_name).join(MANIFEST_FILENAME);
    let data = std::fs::read_to_string(&path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ManifestError::NotFound {
                name: engine_name.to_string(),
                path: path.clone(),
            }
        } else {
            ManifestError::Io {
                path: path.clone(),
                source,
            }
        }
    })?;

    parse_manifest(Some(engine_name), &data).map_err(|source| ManifestError::Invalid {
        name: engine_name.to_string(),
        path,
        source,
    })
}

/// Load every engine under `manifests_dir`, one sub-directory per engine.
///
/// Plain files are skipped. Engines come back ordered by directory name. A
/// single unreadable or invalid manifest fails the whole call.
pub fn load_manifests(manifests_dir: &Path) -> ManifestResult<Vec<EngineManifest>> {
    let io_err = |source: std::io::Error| ManifestError::Io {
        path: manifests_dir.to_path_buf(),
        source,
    };

    let mut engine_dirs: Vec<(String, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(manifests_dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if !entry.file_type().map_err(io_err)?.is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => engine_dirs.push((name, entry.path())),
            Err(raw) => warn!(name = ?raw, "skipping engine directory with non-UTF-8 name"),
        }
    }
    engine_dirs.sort();

    let manifests = engine_dirs
        .iter()
        .map(|(name, _)| load_manifest(manifests_dir, name))
        .collect::<ManifestResult<Vec<_>>>()?;

    debug!(
        dir = %manifests_dir.display(),
        count = manifests.len(),
        "loaded engine manifests"
    );
    Ok(manifests)
}
