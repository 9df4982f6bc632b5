//! Dino Runner - a side-scrolling endless runner
//!
//! Core modules:
//! - `sim`: Simulation core (player physics, spawners, collisions, scoring)
//! - `session`: Frame driver wiring the simulation to its collaborators
//! - `platform`: Collaborator interfaces (render, audio, telemetry, storage)
//! - `persistence`: JSON storage with a versioned envelope
//! - `analytics`: Per-session counters and milestone tracking
//! - `tuning`: Data-driven game balance

pub mod analytics;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use session::Session;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// World dimensions
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 300.0;
    /// Baseline the player stands on
    pub const GROUND_Y: f32 = 260.0;

    /// Largest delta a single frame may integrate (seconds)
    pub const MAX_FRAME_DT: f32 = 0.05;

    /// Player body
    pub const PLAYER_START_X: f32 = 60.0;
    pub const PLAYER_WIDTH: f32 = 44.0;
    pub const PLAYER_HEIGHT: f32 = 46.0;
    pub const DUCK_HEIGHT: f32 = 30.0;
    /// Horizontal margin the player is kept inside
    pub const PLAYER_EDGE_MARGIN: f32 = 10.0;
    pub const HORIZONTAL_MOVE_SPEED: f32 = 380.0;

    /// Vertical physics (px/s, px/s²)
    pub const GRAVITY: f32 = 1600.0;
    pub const JUMP_VELOCITY: f32 = 750.0;
    pub const MAX_FALL_SPEED: f32 = 1600.0;

    /// Jump feel
    pub const COYOTE_TIME_S: f32 = 0.1;
    pub const JUMP_BUFFER_S: f32 = 0.12;
    pub const JUMP_CUT_MULTIPLIER: f32 = 2.2;
    pub const AIR_FAST_FALL_MULTIPLIER: f32 = 1.6;
    pub const FAST_FALL_MIN_DOWNWARD_VELOCITY: f32 = 700.0;

    /// World speed
    pub const INITIAL_SPEED: f32 = 320.0;
    pub const SPEED_INCREASE_PER_SECOND: f32 = 12.0;
    /// Score gained per pixel travelled
    pub const SCORE_PER_PIXEL: f64 = 0.1;

    /// Obstacle spawning
    pub const MIN_SPAWN_INTERVAL_S: f32 = 0.9;
    pub const MAX_SPAWN_INTERVAL_S: f32 = 1.6;
    /// Difficulty boost grows one step per this many points
    pub const DIFFICULTY_SCORE_STEP: f64 = 300.0;
    pub const DIFFICULTY_BOOST_PER_STEP: f32 = 0.06;
    pub const MAX_DIFFICULTY_BOOST: f32 = 0.6;
    pub const SPAWN_MIN_FLOOR_S: f32 = 0.55;
    pub const SPAWN_MAX_FLOOR_S: f32 = 0.85;
    /// Spawned entities appear this far past the right edge
    pub const SPAWN_X_OFFSET: f32 = 20.0;
    /// Entities are recycled once their right edge passes this x
    pub const DESPAWN_X: f32 = -50.0;

    /// Birds
    pub const BIRD_UNLOCK_SCORE: f64 = 400.0;
    pub const BIRD_SPAWN_CHANCE: f64 = 0.3;
    pub const BIRD_WIDTH: f32 = 34.0;
    pub const BIRD_HEIGHT: f32 = 24.0;
    pub const BIRD_SPEED_BONUS: f32 = 40.0;
    pub const BIRD_LOW_CLEARANCE: f32 = 60.0;
    pub const BIRD_HIGH_CLEARANCE: f32 = 110.0;
    pub const BIRD_SINK_PER_STEP: f32 = 7.0;
    pub const BIRD_MAX_SINK: f32 = 35.0;

    /// Cacti: width tiers and the cumulative roll thresholds that pick them
    pub const CACTUS_WIDTHS: [f32; 3] = [20.0, 30.0, 45.0];
    pub const CACTUS_TIER_ROLLS: [f64; 2] = [0.5, 0.85];
    pub const CACTUS_HEIGHT_RATIO: f32 = 1.6;

    /// Coins
    pub const COIN_RADIUS: f32 = 6.0;
    pub const COIN_VALUE: f64 = 100.0;
    pub const COIN_LOW_CLEARANCE: f32 = 90.0;
    pub const COIN_HIGH_CLEARANCE: f32 = 140.0;
    pub const COIN_FIRST_SPAWN_S: (f32, f32) = (1.2, 2.6);
    pub const COIN_SPAWN_S: (f32, f32) = (1.0, 2.8);

    /// Hitbox insets (x, y) shaved off each side before obstacle tests
    pub const PLAYER_HITBOX_INSET: (f32, f32) = (6.0, 4.0);
    pub const OBSTACLE_HITBOX_INSET: (f32, f32) = (4.0, 2.0);
}

/// Clamp `value` into `[min, max]`
#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Replace a non-finite reading with zero
#[inline]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
