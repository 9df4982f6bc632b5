//! Game settings and preferences
//!
//! Persisted separately from high scores, as a JSON file or store entry.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StorageError, load_json, save_json};
use crate::tuning::Tuning;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Play sound cues at all
    pub audio_enabled: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,

    // === Simulation ===
    /// Fixed RNG seed; a fresh one per process when unset
    pub seed: Option<u64>,
    /// Game balance
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            audio_enabled: true,
            master_volume: 0.8,
            seed: None,
            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    const STORAGE_KEY: &'static str = "dino_settings";

    /// Volume the audio sink should use (0 when muted)
    pub fn effective_volume(&self) -> f32 {
        if self.audio_enabled {
            crate::clamp(self.master_volume, 0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Load settings from a store, falling back to defaults
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        match load_json::<Self, _>(store, Self::STORAGE_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring unreadable settings: {e}");
                Self::default()
            }
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StorageError> {
        save_json(store, Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Read a plain (unwrapped) settings JSON file, as passed on the CLI
    pub fn from_file(path: &Path) -> Result<Self, StorageError> {
        let key = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| StorageError::Io {
            key: key.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| StorageError::Json { key, source })
    }
}
