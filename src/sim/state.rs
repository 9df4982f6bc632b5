//! Run state and frame-level types
//!
//! Everything the renderer and the session layer read back from a frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::coins::Coin;
use super::obstacles::{Obstacle, ObstacleKind};
use super::player::PlayerState;
use crate::tuning::Tuning;

/// Current phase of the game; exactly one holds at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Not started yet, or paused mid-run
    #[default]
    Idle,
    /// Simulation advancing
    Running,
    /// Run ended by a crash
    GameOver,
}

/// Monotonic entity ID source, unique within a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityIds {
    next: u32,
}

impl EntityIds {
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// Score, speed and per-run counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub phase: GamePhase,
    pub score: f64,
    /// World scroll speed (px/s)
    pub speed: f32,
    pub top_speed: f32,
    pub coins_collected: u32,
    pub obstacles_avoided: u32,
    /// Simulated seconds spent running this run
    pub elapsed_s: f64,
    /// Best score across runs
    pub high_score: f64,
}

impl RunState {
    pub fn new(tuning: &Tuning, high_score: f64) -> Self {
        Self {
            phase: GamePhase::Idle,
            score: 0.0,
            speed: tuning.initial_speed,
            top_speed: tuning.initial_speed,
            coins_collected: 0,
            obstacles_avoided: 0,
            elapsed_s: 0.0,
            high_score: crate::finite_or_zero(high_score).max(0.0),
        }
    }

    /// Back to the initial constants; the high score survives
    pub fn reset(&mut self, tuning: &Tuning) {
        *self = Self::new(tuning, self.high_score);
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndCause {
    ObstacleCollision,
    ManualRestart,
}

impl EndCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndCause::ObstacleCollision => "obstacle_collision",
            EndCause::ManualRestart => "manual_restart",
        }
    }
}

/// Something that happened during a frame, in the order it happened
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    RunStarted,
    Paused,
    Resumed,
    Jumped {
        pos: Vec2,
    },
    DuckStarted {
        pos: Vec2,
    },
    ObstacleAvoided {
        kind: ObstacleKind,
    },
    Crashed {
        kind: ObstacleKind,
        player: Vec2,
        obstacle: Vec2,
    },
    CoinCollected {
        id: u32,
        pos: Vec2,
        value: f64,
        total: u32,
    },
    RunEnded {
        cause: EndCause,
        score: f64,
        coins: u32,
        top_speed: f32,
        avoided: u32,
        elapsed_s: f64,
    },
    NewHighScore {
        previous: f64,
        new: f64,
    },
}

/// Read-only view handed to the renderer
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot<'a> {
    pub player: &'a PlayerState,
    pub obstacles: &'a [Obstacle],
    pub coins: &'a [Coin],
    pub score: f64,
    pub speed: f32,
    pub high_score: f64,
    pub phase: GamePhase,
    pub game_over: bool,
}
