//! Shared state for command execution

use crate::CliError;
use crate::cli::Cli;
use crate::settings::Settings;
use crate::store::ActiveEngineStore;
use hwsel_kernel::manifest::load_manifests;
use hwsel_kernel::selector::{AllConnected, ConnectionGate, EngineScorer};
use hwsel_kernel::{EngineManifest, HardwareSnapshot, ScoredManifest};
use hwsel_probe::{CachedSource, HardwareSource, ReaderSource, SnapctlGate, SystemProbe};
use std::path::{Path, PathBuf};
use tracing::debug;

const SNAPSHOT_CACHE_KEY: &str = "host";

pub struct CliContext {
    pub settings: Settings,
    machine: Option<PathBuf>,
}

impl CliContext {
    pub fn new(cli: &Cli) -> Result<Self, CliError> {
        Ok(Self {
            settings: Settings::load(cli.config.as_deref())?,
            machine: cli.machine.clone(),
        })
    }

    pub fn store(&self) -> ActiveEngineStore {
        ActiveEngineStore::new(&self.settings.state_dir)
    }

    pub fn manifests(&self) -> Result<Vec<EngineManifest>, CliError> {
        Ok(load_manifests(&self.settings.engines_dir)?)
    }

    fn probe_cache(&self) -> CachedSource<SystemProbe> {
        let probe = SystemProbe::new().with_storage_path(&self.settings.storage_path);
        CachedSource::new(probe, &self.settings.cache_dir, SNAPSHOT_CACHE_KEY)
    }

    /// Hardware of the target machine: a `--machine` document when given,
    /// otherwise the cached probe of this host.
    pub fn snapshot(&self, refresh: bool) -> Result<HardwareSnapshot, CliError> {
        if let Some(path) = &self.machine {
            return read_snapshot(path);
        }
        let cache = self.probe_cache();
        if refresh {
            cache.invalidate()?;
        }
        Ok(cache.snapshot()?)
    }

    /// Connection checks only make sense against the live host.
    pub fn gate(&self) -> Box<dyn ConnectionGate> {
        if self.machine.is_some() || !self.settings.check_connections {
            debug!("snap connection checks disabled");
            Box::new(AllConnected)
        } else {
            Box::new(SnapctlGate::new())
        }
    }

    pub fn scorer<'a>(
        &self,
        snapshot: &'a HardwareSnapshot,
        gate: &'a dyn ConnectionGate,
    ) -> EngineScorer<'a> {
        EngineScorer::new(snapshot, gate).with_storage_path(&self.settings.storage_path)
    }

    /// Score every engine in the engines directory against the target machine.
    pub fn score_engines(&self) -> Result<Vec<ScoredManifest>, CliError> {
        let manifests = self.manifests()?;
        let snapshot = self.snapshot(false)?;
        let gate = self.gate();
        Ok(self.scorer(&snapshot, gate.as_ref()).score_all(&manifests)?)
    }
}

pub fn read_snapshot(path: &Path) -> Result<HardwareSnapshot, CliError> {
    let document = std::fs::read_to_string(path).map_err(|source| CliError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ReaderSource::from_document(document).snapshot()?)
}
