//! Obstacle spawning and recycling
//!
//! Obstacles appear just past the right edge on a randomized timer that
//! tightens with score, scroll left at their own speed, and are dropped
//! once fully off-screen.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::state::EntityIds;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Cactus,
    Bird,
}

impl ObstacleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::Cactus => "cactus",
            ObstacleKind::Bird => "bird",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Leftward scroll speed (px/s), fixed at spawn
    pub speed: f32,
    /// Already counted as cleared by the player
    #[serde(default)]
    pub passed: bool,
}

impl Obstacle {
    pub fn bounds(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }
}

/// Draw a spawn interval uniformly from `[min, max]`
fn draw_interval(rng: &mut Pcg32, min: f32, max: f32) -> f32 {
    min + rng.random::<f32>() * (max - min).max(0.0)
}

/// Owns every live obstacle plus the spawn timer
#[derive(Debug, Clone)]
pub struct ObstacleManager {
    obstacles: Vec<Obstacle>,
    rng: Pcg32,
    spawn_timer_s: f32,
    next_spawn_s: f32,
}

impl ObstacleManager {
    pub fn new(seed: u64, tuning: &Tuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let next_spawn_s = draw_interval(
            &mut rng,
            tuning.min_spawn_interval_s,
            tuning.max_spawn_interval_s,
        );
        Self {
            obstacles: Vec::new(),
            rng,
            spawn_timer_s: 0.0,
            next_spawn_s,
        }
    }

    /// Clear the field and draw a fresh first interval
    pub fn reset(&mut self, tuning: &Tuning) {
        self.obstacles.clear();
        self.spawn_timer_s = 0.0;
        self.next_spawn_s = draw_interval(
            &mut self.rng,
            tuning.min_spawn_interval_s,
            tuning.max_spawn_interval_s,
        );
    }

    /// Live obstacles in spawn order
    pub fn get(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub(crate) fn get_mut(&mut self) -> &mut [Obstacle] {
        &mut self.obstacles
    }

    /// Base interval drawn for the next spawn (before the difficulty scale)
    pub fn next_spawn_s(&self) -> f32 {
        self.next_spawn_s
    }

    pub fn spawn_timer_s(&self) -> f32 {
        self.spawn_timer_s
    }

    /// Advance the spawn timer, maybe spawn, then scroll and recycle
    pub fn update(
        &mut self,
        dt: f32,
        speed: f32,
        score: f64,
        tuning: &Tuning,
        ids: &mut EntityIds,
    ) -> Option<u32> {
        self.spawn_timer_s += dt;
        let boost = tuning.difficulty_boost(score);

        let mut spawned = None;
        if self.spawn_timer_s >= self.next_spawn_s * (1.0 - boost) {
            self.spawn_timer_s = 0.0;
            let min = tuning
                .spawn_min_floor_s
                .max(tuning.min_spawn_interval_s - boost * 0.5);
            let max = tuning
                .spawn_max_floor_s
                .max(tuning.max_spawn_interval_s - boost * 0.6);
            self.next_spawn_s = draw_interval(&mut self.rng, min, max.max(min));

            let bird = score >= tuning.bird_unlock_score
                && self.rng.random_bool(tuning.bird_spawn_chance.clamp(0.0, 1.0));
            let obstacle = if bird {
                self.create_bird(ids.next_id(), speed, score, tuning)
            } else {
                self.create_cactus(ids.next_id(), speed, tuning)
            };
            log::debug!(
                "spawn {} #{} at y={:.0} speed={:.0}",
                obstacle.kind.as_str(),
                obstacle.id,
                obstacle.pos.y,
                obstacle.speed
            );
            spawned = Some(obstacle.id);
            self.obstacles.push(obstacle);
        }

        for obstacle in &mut self.obstacles {
            obstacle.pos.x -= obstacle.speed * dt;
        }
        self.obstacles.retain(|o| o.right() >= tuning.despawn_x);

        spawned
    }

    fn create_cactus(&mut self, id: u32, speed: f32, tuning: &Tuning) -> Obstacle {
        let roll: f64 = self.rng.random();
        let [small, medium, large] = tuning.cactus_widths;
        let width = if roll < tuning.cactus_tier_rolls[0] {
            small
        } else if roll < tuning.cactus_tier_rolls[1] {
            medium
        } else {
            large
        };
        let height = (width * tuning.cactus_height_ratio).round();
        Obstacle {
            id,
            kind: ObstacleKind::Cactus,
            pos: Vec2::new(
                tuning.canvas_width + tuning.spawn_x_offset,
                tuning.ground_y - height,
            ),
            size: Vec2::new(width, height),
            speed,
            passed: false,
        }
    }

    fn create_bird(&mut self, id: u32, speed: f32, score: f64, tuning: &Tuning) -> Obstacle {
        let height = tuning.bird_height;
        let clearance = if self.rng.random_bool(0.5) {
            tuning.bird_low_clearance
        } else {
            tuning.bird_high_clearance
        };
        // Birds fly lower as the run goes on so ducking matters more
        let y = tuning.ground_y - height - clearance + tuning.bird_sink(score);
        Obstacle {
            id,
            kind: ObstacleKind::Bird,
            pos: Vec2::new(tuning.canvas_width + tuning.spawn_x_offset, y),
            size: Vec2::new(tuning.bird_width, height),
            speed: speed + tuning.bird_speed_bonus,
            passed: false,
        }
    }
}
