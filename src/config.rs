//! Tracker configuration and platform paths.

use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
    time::Duration,
};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

static PROJECT_DIR: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("app", "hydratrack", "hydratrack"));

/// Where the persisted record and the logs live.
pub fn data_dir() -> Option<PathBuf> {
    PROJECT_DIR.as_ref().map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn config_path() -> Option<PathBuf> {
    PROJECT_DIR
        .as_ref()
        .map(|dirs| dirs.config_dir().join("config.json"))
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Most drinks kept in today's history
    pub history_cap: usize,

    pub autosave_interval_secs: u64,

    pub reminders_enabled: bool,

    pub reminder_interval_secs: u64,

    /// Key the whole state is stored under
    pub storage_key: String,

    /// Used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            history_cap: 50,
            autosave_interval_secs: 30,
            reminders_enabled: true,
            reminder_interval_secs: 2 * 60 * 60,
            storage_key: "hydraTrackData".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl TrackerConfig {
    /// Reads `path`, falling back to defaults when the file is missing or broken.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No config file, using defaults");
                return Self::default();
            }
        };

        match serde_json::from_str::<Self>(&raw) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Invalid config file, using defaults");
                Self::default()
            }
        }
    }

    pub fn load_default() -> Self {
        config_path().map_or_else(Self::default, |path| Self::load(&path))
    }

    pub fn history_cap(&self) -> usize {
        self.history_cap.max(1)
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs.max(1))
    }

    pub fn reminder_interval(&self) -> Duration {
        Duration::from_secs(self.reminder_interval_secs.max(1))
    }
}
