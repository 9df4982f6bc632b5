//! Data-driven game balance
//!
//! Every number that shapes how a run feels lives here so it can be loaded
//! from the settings file. The defaults are the shipped balance.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// World, physics, spawn and scoring parameters for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === World ===
    pub canvas_width: f32,
    pub ground_y: f32,
    /// Largest delta a single frame may integrate (seconds)
    pub max_frame_dt: f32,

    // === Player ===
    pub player_start_x: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub duck_height: f32,
    pub edge_margin: f32,
    pub horizontal_speed: f32,
    pub gravity: f32,
    pub jump_velocity: f32,
    pub max_fall_speed: f32,
    pub coyote_time_s: f32,
    pub jump_buffer_s: f32,
    /// Gravity multiplier while rising with jump released
    pub jump_cut_multiplier: f32,
    /// Gravity multiplier while falling with down held
    pub fast_fall_multiplier: f32,
    pub fast_fall_min_velocity: f32,

    // === Speed & score ===
    pub initial_speed: f32,
    pub speed_increase_per_second: f32,
    pub score_per_pixel: f64,
    pub coin_value: f64,

    // === Obstacles ===
    pub min_spawn_interval_s: f32,
    pub max_spawn_interval_s: f32,
    pub difficulty_score_step: f64,
    pub difficulty_boost_per_step: f32,
    pub max_difficulty_boost: f32,
    pub spawn_min_floor_s: f32,
    pub spawn_max_floor_s: f32,
    pub spawn_x_offset: f32,
    pub despawn_x: f32,
    pub bird_unlock_score: f64,
    pub bird_spawn_chance: f64,
    pub bird_width: f32,
    pub bird_height: f32,
    pub bird_speed_bonus: f32,
    pub bird_low_clearance: f32,
    pub bird_high_clearance: f32,
    pub bird_sink_per_step: f32,
    pub bird_max_sink: f32,
    pub cactus_widths: [f32; 3],
    pub cactus_tier_rolls: [f64; 2],
    pub cactus_height_ratio: f32,

    // === Coins ===
    pub coin_radius: f32,
    pub coin_low_clearance: f32,
    pub coin_high_clearance: f32,
    pub coin_first_spawn_s: (f32, f32),
    pub coin_spawn_s: (f32, f32),

    // === Hitboxes ===
    pub player_hitbox_inset: (f32, f32),
    pub obstacle_hitbox_inset: (f32, f32),

    // === Analytics ===
    pub score_milestones: Vec<u32>,
    /// World speed thresholds (px/s)
    pub speed_milestones: Vec<u32>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            canvas_width: CANVAS_WIDTH,
            ground_y: GROUND_Y,
            max_frame_dt: MAX_FRAME_DT,

            player_start_x: PLAYER_START_X,
            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            duck_height: DUCK_HEIGHT,
            edge_margin: PLAYER_EDGE_MARGIN,
            horizontal_speed: HORIZONTAL_MOVE_SPEED,
            gravity: GRAVITY,
            jump_velocity: JUMP_VELOCITY,
            max_fall_speed: MAX_FALL_SPEED,
            coyote_time_s: COYOTE_TIME_S,
            jump_buffer_s: JUMP_BUFFER_S,
            jump_cut_multiplier: JUMP_CUT_MULTIPLIER,
            fast_fall_multiplier: AIR_FAST_FALL_MULTIPLIER,
            fast_fall_min_velocity: FAST_FALL_MIN_DOWNWARD_VELOCITY,

            initial_speed: INITIAL_SPEED,
            speed_increase_per_second: SPEED_INCREASE_PER_SECOND,
            score_per_pixel: SCORE_PER_PIXEL,
            coin_value: COIN_VALUE,

            min_spawn_interval_s: MIN_SPAWN_INTERVAL_S,
            max_spawn_interval_s: MAX_SPAWN_INTERVAL_S,
            difficulty_score_step: DIFFICULTY_SCORE_STEP,
            difficulty_boost_per_step: DIFFICULTY_BOOST_PER_STEP,
            max_difficulty_boost: MAX_DIFFICULTY_BOOST,
            spawn_min_floor_s: SPAWN_MIN_FLOOR_S,
            spawn_max_floor_s: SPAWN_MAX_FLOOR_S,
            spawn_x_offset: SPAWN_X_OFFSET,
            despawn_x: DESPAWN_X,
            bird_unlock_score: BIRD_UNLOCK_SCORE,
            bird_spawn_chance: BIRD_SPAWN_CHANCE,
            bird_width: BIRD_WIDTH,
            bird_height: BIRD_HEIGHT,
            bird_speed_bonus: BIRD_SPEED_BONUS,
            bird_low_clearance: BIRD_LOW_CLEARANCE,
            bird_high_clearance: BIRD_HIGH_CLEARANCE,
            bird_sink_per_step: BIRD_SINK_PER_STEP,
            bird_max_sink: BIRD_MAX_SINK,
            cactus_widths: CACTUS_WIDTHS,
            cactus_tier_rolls: CACTUS_TIER_ROLLS,
            cactus_height_ratio: CACTUS_HEIGHT_RATIO,

            coin_radius: COIN_RADIUS,
            coin_low_clearance: COIN_LOW_CLEARANCE,
            coin_high_clearance: COIN_HIGH_CLEARANCE,
            coin_first_spawn_s: COIN_FIRST_SPAWN_S,
            coin_spawn_s: COIN_SPAWN_S,

            player_hitbox_inset: PLAYER_HITBOX_INSET,
            obstacle_hitbox_inset: OBSTACLE_HITBOX_INSET,

            score_milestones: vec![100, 500, 1000, 2500, 5000, 10000, 25000, 50000],
            speed_milestones: vec![400, 500, 600, 800, 1000],
        }
    }
}

impl Tuning {
    /// Number of whole difficulty steps reached at `score`
    pub fn difficulty_steps(&self, score: f64) -> f32 {
        if self.difficulty_score_step <= 0.0 || !score.is_finite() || score <= 0.0 {
            return 0.0;
        }
        (score / self.difficulty_score_step).floor() as f32
    }

    /// Spawn-rate boost at `score`, capped at `max_difficulty_boost`
    pub fn difficulty_boost(&self, score: f64) -> f32 {
        (self.difficulty_steps(score) * self.difficulty_boost_per_step)
            .min(self.max_difficulty_boost)
    }

    /// How far birds have sunk toward the ground at `score`
    pub fn bird_sink(&self, score: f64) -> f32 {
        (self.difficulty_steps(score) * self.bird_sink_per_step).min(self.bird_max_sink)
    }

    /// Copy with nonsensical values pulled back to something playable
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let positive = |v: f32, d: f32| if v.is_finite() && v > 0.0 { v } else { d };
        self.canvas_width = positive(self.canvas_width, defaults.canvas_width);
        self.ground_y = positive(self.ground_y, defaults.ground_y);
        self.max_frame_dt = positive(self.max_frame_dt, defaults.max_frame_dt);
        self.player_width = positive(self.player_width, defaults.player_width);
        self.player_height = positive(self.player_height, defaults.player_height);
        self.duck_height = positive(self.duck_height, defaults.duck_height).min(self.player_height);
        self.min_spawn_interval_s =
            positive(self.min_spawn_interval_s, defaults.min_spawn_interval_s);
        self.max_spawn_interval_s =
            positive(self.max_spawn_interval_s, defaults.max_spawn_interval_s)
                .max(self.min_spawn_interval_s);
        self.coin_radius = positive(self.coin_radius, defaults.coin_radius);
        if self.coin_spawn_s.1 < self.coin_spawn_s.0 {
            self.coin_spawn_s = defaults.coin_spawn_s;
        }
        if self.coin_first_spawn_s.1 < self.coin_first_spawn_s.0 {
            self.coin_first_spawn_s = defaults.coin_first_spawn_s;
        }
        self
    }
}
