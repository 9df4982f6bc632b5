//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Time only arrives as a frame delta
//! - Seeded RNG only (one stream per manager)
//! - Stable iteration order (spawn order, by entity ID)
//! - No rendering, audio, storage or analytics dependencies; those are
//!   driven from the `GameEvent`s a frame returns

pub mod autopilot;
pub mod clock;
pub mod coins;
pub mod collision;
pub mod input;
pub mod obstacles;
pub mod player;
pub mod state;
pub mod tick;

pub use clock::{FrameClock, clamp_dt};
pub use coins::{Coin, CoinManager};
pub use collision::{Rect, aabb_intersects, hitboxes_overlap};
pub use input::{Control, InputAggregator, InputEvent, InputState, Key};
pub use obstacles::{Obstacle, ObstacleKind, ObstacleManager};
pub use player::{Facing, PlayerController, PlayerState};
pub use state::{EndCause, FrameSnapshot, GameEvent, GamePhase, RunState};
pub use tick::Game;
