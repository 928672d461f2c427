//! Persisted active engine selection

use crate::CliError;
use chrono::{DateTime, Utc};
use hwsel_kernel::manifest::ConfigValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

const ACTIVE_ENGINE_FILE: &str = "active-engine.json";

/// The engine in use together with the configuration it brought along.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ActiveEngine {
    pub name: String,
    #[serde(default)]
    pub configurations: BTreeMap<String, ConfigValue>,
    pub selected_at: DateTime<Utc>,
}

impl ActiveEngine {
    pub fn new(name: impl Into<String>, configurations: BTreeMap<String, ConfigValue>) -> Self {
        Self {
            name: name.into(),
            configurations,
            selected_at: Utc::now(),
        }
    }
}

/// Single JSON document under the state directory.
#[derive(Debug, Clone)]
pub struct ActiveEngineStore {
    dir: PathBuf,
}

impl ActiveEngineStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(ACTIVE_ENGINE_FILE)
    }

    pub fn load(&self) -> Result<Option<ActiveEngine>, CliError> {
        let path = self.path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(CliError::ReadFile { path, source }),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    pub fn active_name(&self) -> Result<Option<String>, CliError> {
        Ok(self.load()?.map(|active| active.name))
    }

    /// Replace the stored selection.
    ///
    /// The previous engine's configuration goes away with it.
    pub fn save(&self, active: &ActiveEngine) -> Result<(), CliError> {
        fs::create_dir_all(&self.dir)?;
        let target = self.path();
        let payload = serde_json::to_vec_pretty(active)?;

        // Temp file in the same directory keeps the rename on one filesystem.
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&payload)?;
        tmp.as_file().sync_all()?;

        tmp.persist(&target).map_err(|e| CliError::Persist {
            path: target,
            source: e.error,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_store_has_no_engine() {
        let tmp = TempDir::new().unwrap();
        let store = ActiveEngineStore::new(tmp.path().join("state"));
        assert!(store.load().unwrap().is_none());
        assert!(store.active_name().unwrap().is_none());
    }

    #[test]
    fn switching_replaces_configuration() {
        let tmp = TempDir::new().unwrap();
        let store = ActiveEngineStore::new(tmp.path());

        let first = ActiveEngine::new(
            "cpu-avx2",
            [
                ("engine.threads".to_string(), ConfigValue::Integer(8)),
                ("engine.mmap".to_string(), ConfigValue::Bool(true)),
            ]
            .into(),
        );
        store.save(&first).unwrap();
        assert_eq!(store.load().unwrap(), Some(first));

        let second = ActiveEngine::new(
            "intel-gpu",
            [("engine.device".to_string(), ConfigValue::String("GPU".into()))].into(),
        );
        store.save(&second).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.name, "intel-gpu");
        assert!(!loaded.configurations.contains_key("engine.threads"));
        assert_eq!(store.active_name().unwrap().as_deref(), Some("intel-gpu"));
    }

    #[test]
    fn corrupt_state_is_reported() {
        let tmp = TempDir::new().unwrap();
        let store = ActiveEngineStore::new(tmp.path());
        fs::write(store.path(), "not json").unwrap();
        assert!(matches!(store.load(), Err(CliError::Serialization(_))));
    }
}
