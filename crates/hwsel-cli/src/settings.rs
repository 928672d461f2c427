//! Layered CLI settings
//!
//! Built-in defaults, then an optional settings file, then `HWSEL_*`
//! environment variables. Later layers win.

use crate::CliError;
use config::{Config, Environment, File};
use hwsel_kernel::selector::DEFAULT_STORAGE_PATH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "HWSEL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory holding one `<engine>/engine.yaml` per engine
    pub engines_dir: PathBuf,
    /// Where the active engine document is kept
    pub state_dir: PathBuf,
    /// Where probed hardware snapshots are cached
    pub cache_dir: PathBuf,
    /// Disk statistics key checked against `disk-space`
    pub storage_path: String,
    /// Ask `snapctl` about snap connections; off means every connection counts
    pub check_connections: bool,
}

impl Settings {
    /// Load settings, reading `file` if given or the default settings file
    /// under the config directory when it exists.
    pub fn load(file: Option<&Path>) -> Result<Self, CliError> {
        let config_dir = hwsel_config_dir()?;
        let data_dir = hwsel_data_dir()?;
        let cache_dir = hwsel_cache_dir()?;

        let mut builder = Config::builder()
            .set_default("engines_dir", path_value(&data_dir.join("engines")))?
            .set_default("state_dir", path_value(&data_dir))?
            .set_default("cache_dir", path_value(&cache_dir))?
            .set_default("storage_path", DEFAULT_STORAGE_PATH)?
            .set_default("check_connections", true)?;

        builder = match file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(
                File::with_name(&path_value(&config_dir.join("settings"))).required(false),
            ),
        };

        let settings: Settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;
        tracing::debug!(?settings, "loaded settings");
        Ok(settings)
    }
}

fn path_value(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Get the hwsel config directory
/// - Linux: ~/.config/hwsel
pub fn hwsel_config_dir() -> Result<PathBuf, CliError> {
    let config_dir = dirs_next::config_dir().ok_or("Failed to determine config directory")?;
    Ok(config_dir.join("hwsel"))
}

/// Get the hwsel data directory
/// - Linux: ~/.local/share/hwsel
pub fn hwsel_data_dir() -> Result<PathBuf, CliError> {
    let data_dir = dirs_next::data_local_dir().ok_or("Failed to determine data directory")?;
    Ok(data_dir.join("hwsel"))
}

/// Get the hwsel cache directory
/// - Linux: ~/.cache/hwsel
pub fn hwsel_cache_dir() -> Result<PathBuf, CliError> {
    let cache_dir = dirs_next::cache_dir().ok_or("Failed to determine cache directory")?;
    Ok(cache_dir.join("hwsel"))
}
