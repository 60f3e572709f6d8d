//! Persisted preferences: whether the rules were shown, and the last room.

use chrono::{DateTime, Duration, Utc};
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// File name inside the data directory.
pub const PREFERENCES_FILE: &str = "preferences.json";

/// A room this player was in, for quick rejoining.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, new)]
pub struct LastRoom {
    /// Room code.
    code: String,
    /// True if this player opened the room.
    is_host: bool,
    /// Host address the guest dialed, or the address the host listened on.
    address: String,
    /// When the room was entered.
    timestamp: DateTime<Utc>,
}

impl LastRoom {
    /// Returns true while the room is younger than `window` at `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now.signed_duration_since(self.timestamp) < window
    }
}

/// Everything remembered between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct Preferences {
    /// The rules were shown once already.
    #[serde(default)]
    rules_shown: bool,
    /// Most recent online room.
    #[serde(default)]
    last_room: Option<LastRoom>,
}

/// JSON-backed preference storage.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    /// Stores preferences in `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(PREFERENCES_FILE),
        }
    }

    /// Location of the preferences file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads preferences; a missing file means defaults.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<Preferences, StoreError> {
        if !self.path.exists() {
            debug!("No preferences yet");
            return Ok(Preferences::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        let preferences = serde_json::from_str(&content)?;
        Ok(preferences)
    }

    /// Writes preferences, creating the data directory if needed.
    #[instrument(skip(self, preferences), fields(path = %self.path.display()))]
    pub fn save(&self, preferences: &Preferences) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(preferences)?;
        std::fs::write(&self.path, content)?;
        debug!("Preferences saved");
        Ok(())
    }

    /// Records that the rules were shown. Returns true the first time.
    #[instrument(skip(self))]
    pub fn mark_rules_shown(&self) -> Result<bool, StoreError> {
        let mut preferences = self.load()?;
        if preferences.rules_shown {
            return Ok(false);
        }
        preferences.rules_shown = true;
        self.save(&preferences)?;
        Ok(true)
    }

    /// Remembers the room just entered.
    #[instrument(skip(self, room), fields(code = %room.code))]
    pub fn remember_room(&self, room: LastRoom) -> Result<(), StoreError> {
        let mut preferences = self.load()?;
        preferences.last_room = Some(room);
        self.save(&preferences)?;
        info!("Room remembered");
        Ok(())
    }

    /// The last room, if still within `window` at `now`.
    #[instrument(skip(self))]
    pub fn recent_room(
        &self,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Result<Option<LastRoom>, StoreError> {
        let room = self
            .load()?
            .last_room
            .filter(|room| room.is_fresh(now, window));
        debug!(found = room.is_some(), "Looked up recent room");
        Ok(room)
    }

    /// Forgets the last room, as on an explicit disconnect.
    #[instrument(skip(self))]
    pub fn clear_room(&self) -> Result<(), StoreError> {
        let mut preferences = self.load()?;
        if preferences.last_room.take().is_some() {
            self.save(&preferences)?;
            info!("Room forgotten");
        }
        Ok(())
    }
}

/// Preference storage error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Store error: {} at {}:{}", message, file, line)]
pub struct StoreError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StoreError {
    /// Creates a new store error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for StoreError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for StoreError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(minutes_ago: i64) -> LastRoom {
        LastRoom::new(
            "K7PQX".to_string(),
            false,
            "127.0.0.1:7878".to_string(),
            Utc::now() - Duration::minutes(minutes_ago),
        )
    }

    #[test]
    fn test_freshness_window() {
        let now = Utc::now();
        assert!(room(5).is_fresh(now, Duration::minutes(30)));
        assert!(!room(45).is_fresh(now, Duration::minutes(30)));
    }

    #[test]
    fn test_missing_fields_default() {
        let preferences: Preferences = serde_json::from_str("{}").expect("parse");
        assert_eq!(preferences, Preferences::default());
    }
}
