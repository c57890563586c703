//! Cache configuration
//!
//! Defaults are sensible for an interactive process; every knob can be
//! overridden from the environment at bootstrap:
//!
//! - `GOALSIM_CACHE_DISABLED` - disable caching entirely (deterministic
//!   test runs)
//! - `GOALSIM_CACHE_AUTO_INIT` - load the snapshot and register lifecycle
//!   hooks at startup (default on)
//! - `GOALSIM_CACHE_MAX_ENTRIES` / `GOALSIM_CACHE_TTL_SECS` /
//!   `GOALSIM_CACHE_AUTOSAVE_SECS` - capacity, entry lifetime, save
//!   debounce interval
//! - `GOALSIM_CACHE_DIR` - snapshot directory

use std::path::PathBuf;
use std::time::Duration;

const SNAPSHOT_FILE_NAME: &str = "simulation_cache.json";

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Load the snapshot and start the autosave scheduler during
    /// [`crate::service::SimulationService::init`]
    pub auto_init: bool,
    pub max_entries: usize,
    /// Default entry lifetime; `set` can override per entry
    pub ttl: Duration,
    /// Debounce window between a dirty write and the background save
    pub auto_save_interval: Duration,
    pub cache_dir: PathBuf,
    pub file_name: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        let cache_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("goalsim");
        Self {
            enabled: true,
            auto_init: true,
            max_entries: 500,
            ttl: Duration::from_secs(3_600),
            auto_save_interval: Duration::from_secs(300),
            cache_dir,
            file_name: SNAPSHOT_FILE_NAME.to_string(),
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?;
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            tracing::warn!(var = name, value, "unrecognized boolean, ignoring");
            None
        }
    }
}

fn env_u64(name: &str) -> Option<u64> {
    let value = std::env::var(name).ok()?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(var = name, value, "unparseable number, ignoring");
            None
        }
    }
}

impl CacheConfig {
    /// Defaults overridden by whatever environment variables are set
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(disabled) = env_flag("GOALSIM_CACHE_DISABLED") {
            config.enabled = !disabled;
        }
        if let Some(auto_init) = env_flag("GOALSIM_CACHE_AUTO_INIT") {
            config.auto_init = auto_init;
        }
        if let Some(max_entries) = env_u64("GOALSIM_CACHE_MAX_ENTRIES") {
            config.max_entries = max_entries as usize;
        }
        if let Some(ttl_secs) = env_u64("GOALSIM_CACHE_TTL_SECS") {
            config.ttl = Duration::from_secs(ttl_secs);
        }
        if let Some(autosave_secs) = env_u64("GOALSIM_CACHE_AUTOSAVE_SECS") {
            config.auto_save_interval = Duration::from_secs(autosave_secs);
        }
        if let Ok(dir) = std::env::var("GOALSIM_CACHE_DIR") {
            config.cache_dir = PathBuf::from(dir);
        }
        config
    }

    /// Full path of the snapshot file
    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        self.cache_dir.join(&self.file_name)
    }
}
