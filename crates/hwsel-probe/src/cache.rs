//! On-disk snapshot cache.
//!
//! Probing the host shells out to `nvidia-smi` and walks sysfs, so the CLI
//! keeps the last snapshot as JSON and reuses it until asked to refresh.

use crate::error::{ProbeError, ProbeResult};
use crate::source::HardwareSource;
use hwsel_kernel::HardwareSnapshot;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Wraps another source and memoizes its snapshot in `dir`.
#[derive(Debug, Clone)]
pub struct CachedSource<S> {
    inner: S,
    path: PathBuf,
}

impl<S: HardwareSource> CachedSource<S> {
    /// Cache `inner` under `dir/snapshot-<key>.json`.
    pub fn new(inner: S, dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            inner,
            path: dir.as_ref().join(format!("snapshot-{key}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drop the cached snapshot so the next call probes again.
    pub fn invalidate(&self) -> ProbeResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ProbeError::io(&self.path)(err)),
        }
    }

    fn load(&self) -> Option<HardwareSnapshot> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "cannot read snapshot cache");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "ignoring corrupt snapshot cache");
                None
            }
        }
    }

    fn store(&self, snapshot: &HardwareSnapshot) -> ProbeResult<()> {
        let dir = self.path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(dir).map_err(ProbeError::io(dir))?;
        let payload = serde_json::to_vec_pretty(snapshot)?;

        // same directory keeps the rename on one filesystem
        let mut tmp = NamedTempFile::new_in(dir).map_err(ProbeError::io(dir))?;
        tmp.write_all(&payload).map_err(ProbeError::io(tmp.path()))?;
        tmp.as_file().sync_all().map_err(ProbeError::io(tmp.path()))?;
        tmp.persist(&self.path).map_err(|e| ProbeError::Persist {
            path: self.path.clone(),
            source: e.error,
        })?;
        Ok(())
    }
}

impl<S: HardwareSource> HardwareSource for CachedSource<S> {
    fn snapshot(&self) -> ProbeResult<HardwareSnapshot> {
        if let Some(snapshot) = self.load() {
            debug!(path = %self.path.display(), "using cached hardware snapshot");
            return Ok(snapshot);
        }
        let snapshot = self.inner.snapshot()?;
        if let Err(err) = self.store(&snapshot) {
            warn!(error = %err, "cannot write snapshot cache");
        }
        Ok(snapshot)
    }
}
