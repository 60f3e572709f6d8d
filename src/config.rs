//! Game configuration loaded from TOML.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Timings, network settings and storage location.
///
/// Every field has a default, so an empty or missing file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// Pause before each computer action, in milliseconds.
    #[serde(default = "default_think_delay_ms")]
    think_delay_ms: u64,

    /// How long a win is celebrated, in milliseconds.
    #[serde(default = "default_celebration_ms")]
    celebration_ms: u64,

    /// Start games in the arrangement variant.
    #[serde(default)]
    arrangement: bool,

    /// Port a host listens on.
    #[serde(default = "default_port")]
    port: u16,

    /// Limit for dialing a host, in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    connect_timeout_secs: u64,

    /// First reconnect delay, in milliseconds; doubles per attempt.
    #[serde(default = "default_reconnect_base_ms")]
    reconnect_base_ms: u64,

    /// Reconnect attempts before the link gives up.
    #[serde(default = "default_max_reconnect_attempts")]
    max_reconnect_attempts: u32,

    /// How long the last room is offered for rejoining, in minutes.
    #[serde(default = "default_room_cache_minutes")]
    room_cache_minutes: i64,

    /// Directory for preferences and logs.
    #[serde(default = "default_data_dir")]
    data_dir: PathBuf,

    /// Fixed seed for reproducible games.
    #[serde(default)]
    seed: Option<u64>,
}

#[instrument]
fn default_think_delay_ms() -> u64 {
    700
}

#[instrument]
fn default_celebration_ms() -> u64 {
    2500
}

#[instrument]
fn default_port() -> u16 {
    7878
}

#[instrument]
fn default_connect_timeout_secs() -> u64 {
    15
}

#[instrument]
fn default_reconnect_base_ms() -> u64 {
    2000
}

#[instrument]
fn default_max_reconnect_attempts() -> u32 {
    3
}

#[instrument]
fn default_room_cache_minutes() -> i64 {
    30
}

#[instrument]
fn default_data_dir() -> PathBuf {
    PathBuf::from(".twist_tac_toe")
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            think_delay_ms: default_think_delay_ms(),
            celebration_ms: default_celebration_ms(),
            arrangement: false,
            port: default_port(),
            connect_timeout_secs: default_connect_timeout_secs(),
            reconnect_base_ms: default_reconnect_base_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            room_cache_minutes: default_room_cache_minutes(),
            data_dir: default_data_dir(),
            seed: None,
        }
    }
}

impl GameConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        info!(data_dir = %config.data_dir.display(), "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise the defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            debug!("No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Pause before each computer action.
    pub fn think_delay(&self) -> Duration {
        Duration::from_millis(self.think_delay_ms)
    }

    /// First reconnect delay.
    pub fn reconnect_base(&self) -> Duration {
        Duration::from_millis(self.reconnect_base_ms)
    }

    /// Limit for dialing a host.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Window in which the last room may be rejoined.
    pub fn room_cache(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.room_cache_minutes)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
