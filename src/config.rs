use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::catalog::http::DEFAULT_CATALOG_URL;
use crate::errors::ConfigError;
use crate::opponents::DEFAULT_OPPONENT_ATTEMPTS;
use crate::session::FileStorage;

/// Delays between battle steps, for a human watching the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pacing {
    /// Between "X used Y!" and the damage landing
    pub attack_delay_ms: u64,
    /// Before the next side acts
    pub turn_delay_ms: u64,
    /// Before victory or defeat is resolved
    pub end_delay_ms: u64,
}

impl Pacing {
    pub fn instant() -> Self {
        Self {
            attack_delay_ms: 0,
            turn_delay_ms: 0,
            end_delay_ms: 0,
        }
    }

    pub fn attack_delay(&self) -> Duration {
        Duration::from_millis(self.attack_delay_ms)
    }

    pub fn turn_delay(&self) -> Duration {
        Duration::from_millis(self.turn_delay_ms)
    }

    pub fn end_delay(&self) -> Duration {
        Duration::from_millis(self.end_delay_ms)
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            attack_delay_ms: 1000,
            turn_delay_ms: 1500,
            end_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub catalog_url: String,
    pub request_timeout_secs: u64,
    pub opponent_attempts: u32,
    pub pacing: Pacing,
    /// Fixed seed for reproducible runs
    pub seed: Option<u64>,
    pub save_dir: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            request_timeout_secs: 10,
            opponent_attempts: DEFAULT_OPPONENT_ATTEMPTS,
            pacing: Pacing::default(),
            seed: None,
            save_dir: None,
        }
    }
}

impl GameConfig {
    /// Load a RON config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", display);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: display,
                    source,
                })
            }
        };
        Self::from_ron(&content).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    pub fn from_ron(content: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(content)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn resolved_save_dir(&self) -> PathBuf {
        self.save_dir
            .clone()
            .unwrap_or_else(FileStorage::default_dir)
    }
}
