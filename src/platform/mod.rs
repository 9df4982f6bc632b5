//! Platform abstraction layer
//!
//! The collaborators the session drives each frame:
//! - `Renderer`: draws a read-only frame snapshot
//! - `AudioSink`: fire-and-forget sound cues
//! - `Telemetry`: named analytics events with JSON properties
//! - `HighScoreStore`: the persisted best score
//!
//! Implementations must not panic; failures are reported as errors (or
//! dropped) and never abort a frame.

use serde_json::Value;

use crate::persistence::{KeyValueStore, StorageError, load_json, save_json};
use crate::sim::FrameSnapshot;

pub trait Renderer {
    fn render(&mut self, frame: &FrameSnapshot<'_>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Jump,
    Coin,
    Crash,
}

impl SoundCue {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundCue::Jump => "jump",
            SoundCue::Coin => "coin",
            SoundCue::Crash => "crash",
        }
    }
}

pub trait AudioSink {
    fn play(&mut self, cue: SoundCue, volume: f32);
}

pub trait Telemetry {
    fn record_event(&mut self, name: &str, properties: Value);
}

pub trait HighScoreStore {
    fn load_high_score(&mut self) -> Result<f64, StorageError>;
    fn save_high_score(&mut self, score: f64) -> Result<(), StorageError>;
}

/// Does nothing; stands in for any collaborator that is not wired up
#[derive(Debug, Clone, Copy, Default)]
pub struct Null;

impl Renderer for Null {
    fn render(&mut self, _frame: &FrameSnapshot<'_>) {}
}

impl AudioSink for Null {
    fn play(&mut self, _cue: SoundCue, _volume: f32) {}
}

impl Telemetry for Null {
    fn record_event(&mut self, _name: &str, _properties: Value) {}
}

impl HighScoreStore for Null {
    fn load_high_score(&mut self) -> Result<f64, StorageError> {
        Ok(0.0)
    }

    fn save_high_score(&mut self, _score: f64) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Writes audio cues and telemetry to the log (headless runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play(&mut self, cue: SoundCue, volume: f32) {
        log::debug!("sound {} @ {:.2}", cue.as_str(), volume);
    }
}

impl Telemetry for LogSink {
    fn record_event(&mut self, name: &str, properties: Value) {
        log::info!("event {name} {properties}");
    }
}

/// Keeps everything it is handed, for inspection in tests
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    pub sounds: Vec<SoundCue>,
    pub events: Vec<(String, Value)>,
    pub frames: usize,
    pub last_score: f64,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_names(&self) -> Vec<&str> {
        self.events.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn events_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.events
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, props)| props)
    }
}

impl Renderer for Recorder {
    fn render(&mut self, frame: &FrameSnapshot<'_>) {
        self.frames += 1;
        self.last_score = frame.score;
    }
}

impl AudioSink for Recorder {
    fn play(&mut self, cue: SoundCue, _volume: f32) {
        self.sounds.push(cue);
    }
}

impl Telemetry for Recorder {
    fn record_event(&mut self, name: &str, properties: Value) {
        self.events.push((name.to_string(), properties));
    }
}

/// Storage key for the best score
pub const HIGH_SCORE_KEY: &str = "dino_high_score";

/// Best score kept in any key/value store
#[derive(Debug, Clone, Default)]
pub struct StoredHighScore<S> {
    store: S,
}

impl<S: KeyValueStore> StoredHighScore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S: KeyValueStore> HighScoreStore for StoredHighScore<S> {
    fn load_high_score(&mut self) -> Result<f64, StorageError> {
        let stored: Option<f64> = load_json(&self.store, HIGH_SCORE_KEY)?;
        Ok(stored
            .filter(|s| s.is_finite() && *s >= 0.0)
            .unwrap_or(0.0))
    }

    fn save_high_score(&mut self, score: f64) -> Result<(), StorageError> {
        // Whole points only, like the on-screen score
        let whole = crate::finite_or_zero(score).max(0.0).floor();
        save_json(&mut self.store, HIGH_SCORE_KEY, &whole)
    }
}
