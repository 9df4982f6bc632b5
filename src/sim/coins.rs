//! Collectible coins
//!
//! Same spawn/scroll/recycle cycle as obstacles, minus the difficulty curve:
//! coins always ride at world speed in one of two altitude bands.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::state::EntityIds;
use crate::tuning::Tuning;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: u32,
    /// Circle center
    pub pos: Vec2,
    pub radius: f32,
    pub speed: f32,
}

impl Coin {
    pub fn bounds(&self) -> Rect {
        Rect::around_circle(self.pos, self.radius)
    }
}

fn draw_interval(rng: &mut Pcg32, (min, max): (f32, f32)) -> f32 {
    min + rng.random::<f32>() * (max - min).max(0.0)
}

#[derive(Debug, Clone)]
pub struct CoinManager {
    coins: Vec<Coin>,
    rng: Pcg32,
    spawn_timer_s: f32,
    next_spawn_s: f32,
    collected_this_run: u32,
}

impl CoinManager {
    pub fn new(seed: u64, tuning: &Tuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let next_spawn_s = draw_interval(&mut rng, tuning.coin_first_spawn_s);
        Self {
            coins: Vec::new(),
            rng,
            spawn_timer_s: 0.0,
            next_spawn_s,
            collected_this_run: 0,
        }
    }

    pub fn reset(&mut self, tuning: &Tuning) {
        self.coins.clear();
        self.spawn_timer_s = 0.0;
        self.next_spawn_s = draw_interval(&mut self.rng, tuning.coin_first_spawn_s);
        self.collected_this_run = 0;
    }

    pub fn get(&self) -> &[Coin] {
        &self.coins
    }

    pub fn next_spawn_s(&self) -> f32 {
        self.next_spawn_s
    }

    pub fn update(
        &mut self,
        dt: f32,
        speed: f32,
        tuning: &Tuning,
        ids: &mut EntityIds,
    ) -> Option<u32> {
        self.spawn_timer_s += dt;

        let mut spawned = None;
        if self.spawn_timer_s >= self.next_spawn_s {
            self.spawn_timer_s = 0.0;
            self.next_spawn_s = draw_interval(&mut self.rng, tuning.coin_spawn_s);
            let clearance = if self.rng.random_bool(0.5) {
                tuning.coin_low_clearance
            } else {
                tuning.coin_high_clearance
            };
            let coin = Coin {
                id: ids.next_id(),
                pos: Vec2::new(
                    tuning.canvas_width + tuning.spawn_x_offset,
                    tuning.ground_y - clearance,
                ),
                radius: tuning.coin_radius,
                speed,
            };
            log::debug!("spawn coin #{} at y={:.0}", coin.id, coin.pos.y);
            spawned = Some(coin.id);
            self.coins.push(coin);
        }

        for coin in &mut self.coins {
            coin.speed = speed;
            coin.pos.x -= speed * dt;
        }
        self.coins.retain(|c| c.pos.x + c.radius >= tuning.despawn_x);

        spawned
    }

    /// Drop a collected coin. Returns false if it was already gone.
    pub fn remove(&mut self, id: u32) -> bool {
        match self.coins.iter().position(|c| c.id == id) {
            Some(idx) => {
                self.coins.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn mark_collected(&mut self) {
        self.collected_this_run += 1;
    }

    pub fn collected_this_run(&self) -> u32 {
        self.collected_this_run
    }
}
