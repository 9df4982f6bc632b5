//! Per-frame simulation step
//!
//! `Game::frame` is the only place run state changes while playing. It runs
//! one ordered pass per frame: phase toggles, speed and score, player, the
//! two managers, then collisions and scoring. Each stage sees the values the
//! previous stage produced in the same frame.

use glam::Vec2;

use super::clock::clamp_dt;
use super::coins::{Coin, CoinManager};
use super::collision::hitboxes_overlap;
use super::input::InputState;
use super::obstacles::{Obstacle, ObstacleManager};
use super::player::{PlayerController, PlayerState};
use super::state::{EndCause, EntityIds, FrameSnapshot, GameEvent, GamePhase, RunState};
use crate::tuning::Tuning;

/// Coins draw from their own stream so obstacle timing does not shift them
const COIN_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// A whole game: one run at a time plus the best score so far
#[derive(Debug, Clone)]
pub struct Game {
    tuning: Tuning,
    seed: u64,
    run: RunState,
    controller: PlayerController,
    obstacles: ObstacleManager,
    coins: CoinManager,
    ids: EntityIds,
    /// A run has begun since the last reset (Idle then means paused)
    started: bool,
    last_pause_token: u32,
    last_start_token: u32,
}

impl Game {
    pub fn new(tuning: Tuning, seed: u64, high_score: f64) -> Self {
        let tuning = tuning.sanitized();
        Self {
            run: RunState::new(&tuning, high_score),
            controller: PlayerController::new(&tuning),
            obstacles: ObstacleManager::new(seed, &tuning),
            coins: CoinManager::new(seed ^ COIN_STREAM, &tuning),
            ids: EntityIds::default(),
            started: false,
            last_pause_token: 0,
            last_start_token: 0,
            tuning,
            seed,
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn phase(&self) -> GamePhase {
        self.run.phase
    }

    /// Paused mid-run (as opposed to not started)
    pub fn is_paused(&self) -> bool {
        self.started && self.run.phase == GamePhase::Idle
    }

    pub fn player(&self) -> &PlayerState {
        self.controller.player()
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        self.obstacles.get()
    }

    pub fn coins(&self) -> &[Coin] {
        self.coins.get()
    }

    pub fn obstacle_manager(&self) -> &ObstacleManager {
        &self.obstacles
    }

    pub fn coin_manager(&self) -> &CoinManager {
        &self.coins
    }

    pub fn snapshot(&self) -> FrameSnapshot<'_> {
        FrameSnapshot {
            player: self.controller.player(),
            obstacles: self.obstacles.get(),
            coins: self.coins.get(),
            score: self.run.score,
            speed: self.run.speed,
            high_score: self.run.high_score,
            phase: self.run.phase,
            game_over: self.run.is_game_over(),
        }
    }

    /// Replace the best score (e.g. once storage has been read)
    pub fn set_high_score(&mut self, high_score: f64) {
        self.run.high_score = crate::finite_or_zero(high_score).max(0.0);
    }

    /// Restore every per-run value to its initial constant
    pub fn reset(&mut self) {
        self.controller.reset(&self.tuning);
        self.obstacles.reset(&self.tuning);
        self.coins.reset(&self.tuning);
        self.run.reset(&self.tuning);
        self.started = false;
    }

    /// Start a fresh run, resume a paused one, or retry after a crash
    pub fn start(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.start_into(&mut events);
        events
    }

    /// Abandon the current run (if any) and start over
    pub fn restart(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.started && !self.run.is_game_over() {
            self.end_run(EndCause::ManualRestart, &mut events);
        }
        self.reset();
        self.start_into(&mut events);
        events
    }

    /// Running and paused swap; a crashed or unstarted game is left alone
    pub fn toggle_pause(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.toggle_pause_into(&mut events);
        events
    }

    fn start_into(&mut self, events: &mut Vec<GameEvent>) {
        match self.run.phase {
            GamePhase::Running => {}
            GamePhase::Idle if self.started => {
                self.run.phase = GamePhase::Running;
                log::info!("resumed at score {:.0}", self.run.score);
                events.push(GameEvent::Resumed);
            }
            GamePhase::Idle | GamePhase::GameOver => {
                if self.run.is_game_over() {
                    self.reset();
                }
                self.started = true;
                self.run.phase = GamePhase::Running;
                log::info!("run started (seed {})", self.seed);
                events.push(GameEvent::RunStarted);
            }
        }
    }

    fn toggle_pause_into(&mut self, events: &mut Vec<GameEvent>) {
        match self.run.phase {
            GamePhase::Running => {
                self.run.phase = GamePhase::Idle;
                log::info!("paused at score {:.0}", self.run.score);
                events.push(GameEvent::Paused);
            }
            GamePhase::Idle if self.started => self.start_into(events),
            _ => {}
        }
    }

    /// Advance one display frame
    pub fn frame(&mut self, dt: f32, input: &InputState) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let dt = clamp_dt(dt, self.tuning.max_frame_dt);

        if input.pause_token != self.last_pause_token {
            self.last_pause_token = input.pause_token;
            self.toggle_pause_into(&mut events);
        }
        if input.start_token != self.last_start_token {
            self.last_start_token = input.start_token;
            if !self.run.is_running() {
                self.start_into(&mut events);
            }
        }

        if self.run.is_running() {
            self.step(dt, input, &mut events);
        }
        events
    }

    fn step(&mut self, dt: f32, input: &InputState, events: &mut Vec<GameEvent>) {
        // Speed first; score and both managers use this frame's speed
        let speed = self.run.speed + self.tuning.speed_increase_per_second * dt;
        self.run.speed = speed;
        self.run.score += speed as f64 * dt as f64 * self.tuning.score_per_pixel;
        self.run.top_speed = self.run.top_speed.max(speed);
        self.run.elapsed_s += dt as f64;

        let effects = self.controller.update(dt, input, &self.tuning);
        let player_pos = self.controller.player().pos;
        if effects.jumped {
            events.push(GameEvent::Jumped { pos: player_pos });
        }
        if effects.duck_started {
            events.push(GameEvent::DuckStarted { pos: player_pos });
        }

        self.obstacles.update(dt, speed, self.run.score, &self.tuning, &mut self.ids);
        self.coins.update(dt, speed, &self.tuning, &mut self.ids);

        let player_left = player_pos.x;
        for obstacle in self.obstacles.get_mut() {
            if !obstacle.passed && obstacle.right() < player_left {
                obstacle.passed = true;
                self.run.obstacles_avoided += 1;
                events.push(GameEvent::ObstacleAvoided {
                    kind: obstacle.kind,
                });
            }
        }

        let player_box = self.controller.player().bounds();
        let player_inset = Vec2::from(self.tuning.player_hitbox_inset);
        let obstacle_inset = Vec2::from(self.tuning.obstacle_hitbox_inset);
        let crash = self
            .obstacles
            .get()
            .iter()
            .find(|o| hitboxes_overlap(&player_box, player_inset, &o.bounds(), obstacle_inset))
            .map(|o| (o.kind, o.pos));
        if let Some((kind, obstacle_pos)) = crash {
            events.push(GameEvent::Crashed {
                kind,
                player: player_pos,
                obstacle: obstacle_pos,
            });
            self.end_run(EndCause::ObstacleCollision, events);
            return;
        }

        let touched: Vec<u32> = self
            .coins
            .get()
            .iter()
            .filter(|c| player_box.intersects(&c.bounds()))
            .map(|c| c.id)
            .collect();
        for id in touched {
            if let Some(event) = self.collect_coin(id) {
                events.push(event);
            }
        }

        log::trace!(
            "frame dt={:.4} score={:.1} speed={:.1} obstacles={} coins={}",
            dt,
            self.run.score,
            self.run.speed,
            self.obstacles.get().len(),
            self.coins.get().len()
        );
    }

    /// Award a coin. A coin that is already gone awards nothing.
    pub fn collect_coin(&mut self, id: u32) -> Option<GameEvent> {
        let pos = self.coins.get().iter().find(|c| c.id == id)?.pos;
        if !self.coins.remove(id) {
            return None;
        }
        self.coins.mark_collected();
        self.run.coins_collected += 1;
        self.run.score += self.tuning.coin_value;
        log::debug!(
            "coin #{} collected ({} this run)",
            id,
            self.coins.collected_this_run()
        );
        Some(GameEvent::CoinCollected {
            id,
            pos,
            value: self.tuning.coin_value,
            total: self.run.coins_collected,
        })
    }

    fn end_run(&mut self, cause: EndCause, events: &mut Vec<GameEvent>) {
        self.run.phase = GamePhase::GameOver;
        log::info!(
            "run ended ({}): score {:.0}, {} coins, top speed {:.0}",
            cause.as_str(),
            self.run.score,
            self.run.coins_collected,
            self.run.top_speed
        );
        events.push(GameEvent::RunEnded {
            cause,
            score: self.run.score,
            coins: self.run.coins_collected,
            top_speed: self.run.top_speed,
            avoided: self.run.obstacles_avoided,
            elapsed_s: self.run.elapsed_s,
        });

        // An abandoned run never counts toward the best score
        if cause == EndCause::ManualRestart {
            return;
        }
        let previous = self.run.high_score;
        if self.run.score > previous {
            self.run.high_score = self.run.score;
            log::info!("new high score {:.0} (was {:.0})", self.run.score, previous);
            events.push(GameEvent::NewHighScore {
                previous,
                new: self.run.score,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::obstacles::ObstacleKind;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn running_game(seed: u64) -> Game {
        let mut game = Game::new(Tuning::default(), seed, 0.0);
        assert_eq!(game.start(), vec![GameEvent::RunStarted]);
        game
    }

    /// Obstacles can never reach a standing player's hitbox
    fn harmless_tuning() -> Tuning {
        Tuning {
            obstacle_hitbox_inset: (30.0, 200.0),
            ..Tuning::default()
        }
    }

    #[test]
    fn test_starts_idle_and_does_not_advance() {
        let mut game = Game::new(Tuning::default(), 1, 0.0);
        assert_eq!(game.phase(), GamePhase::Idle);
        let events = game.frame(DT, &InputState::default());
        assert!(events.is_empty());
        assert_eq!(game.run().score, 0.0);
    }

    #[test]
    fn test_start_token_starts_the_run() {
        let mut game = Game::new(Tuning::default(), 1, 0.0);
        let input = InputState {
            start_token: 1,
            ..Default::default()
        };
        let events = game.frame(DT, &input);
        assert_eq!(events.first(), Some(&GameEvent::RunStarted));
        assert!(game.run().is_running());
        assert!(game.run().score > 0.0);
    }

    #[test]
    fn test_pause_token_toggles_once_per_press() {
        let mut game = running_game(1);
        let mut input = InputState::default();
        input.pause_token = 1;
        assert_eq!(game.frame(DT, &input), vec![GameEvent::Paused]);
        let score = game.run().score;
        // Same token on following frames: still paused, time frozen
        for _ in 0..10 {
            assert!(game.frame(DT, &input).is_empty());
        }
        assert_eq!(game.run().score, score);
        assert!(game.is_paused());

        input.pause_token = 2;
        let events = game.frame(DT, &input);
        assert_eq!(events[0], GameEvent::Resumed);
        assert!(game.run().is_running());
    }

    #[test]
    fn test_speed_and_score_use_this_frames_speed() {
        let mut game = running_game(1);
        let t = game.tuning().clone();
        game.frame(0.05, &InputState::default());
        let speed = t.initial_speed + t.speed_increase_per_second * 0.05;
        assert!((game.run().speed - speed).abs() < 1e-4);
        let score = speed as f64 * 0.05 * t.score_per_pixel;
        assert!((game.run().score - score).abs() < 1e-6);
        assert_eq!(game.run().top_speed, game.run().speed);
    }

    #[test]
    fn test_oversized_frame_is_clamped() {
        let mut a = running_game(1);
        let mut b = running_game(1);
        a.frame(10.0, &InputState::default());
        b.frame(0.05, &InputState::default());
        assert_eq!(a.run().score, b.run().score);
    }

    #[test]
    fn test_first_obstacle_arrives_after_next_spawn() {
        let mut game = running_game(42);
        let wait = game.obstacle_manager().next_spawn_s();
        let mut elapsed = 0.0f32;
        while game.obstacles().is_empty() {
            assert!(elapsed <= wait + DT, "no obstacle after {elapsed}s");
            game.frame(DT, &InputState::default());
            elapsed += DT;
        }
        assert!(elapsed >= wait - DT);
        assert_eq!(game.obstacles().len(), 1);
    }

    #[test]
    fn test_spawned_obstacle_is_recycled_off_screen() {
        let mut game = Game::new(harmless_tuning(), 42, 0.0);
        game.start();
        while game.obstacles().is_empty() {
            game.frame(DT, &InputState::default());
        }
        let first = game.obstacles()[0].id;
        let mut frames = 0;
        while game.obstacles().iter().any(|o| o.id == first) {
            game.frame(DT, &InputState::default());
            assert!(game.run().is_running());
            assert!(game.obstacles().iter().all(|o| o.right() >= -50.0));
            frames += 1;
            assert!(frames < 10_000);
        }
        assert!(game.run().obstacles_avoided >= 1);
    }

    #[test]
    fn test_standing_still_crashes_into_first_cactus() {
        let mut game = running_game(3);
        let mut all = Vec::new();
        for _ in 0..2_000 {
            all.extend(game.frame(DT, &InputState::default()));
            if game.run().is_game_over() {
                break;
            }
        }
        assert!(game.run().is_game_over());
        assert!(all.iter().any(|e| matches!(
            e,
            GameEvent::Crashed {
                kind: ObstacleKind::Cactus,
                ..
            }
        )));
        assert!(all.iter().any(|e| matches!(
            e,
            GameEvent::RunEnded {
                cause: EndCause::ObstacleCollision,
                ..
            }
        )));
        // First run always beats a zero high score
        assert!(all.iter().any(|e| matches!(e, GameEvent::NewHighScore { .. })));
        assert_eq!(game.run().high_score, game.run().score);

        // Frozen after game over
        let score = game.run().score;
        assert!(game.frame(DT, &InputState::default()).is_empty());
        assert_eq!(game.run().score, score);
    }

    #[test]
    fn test_retry_resets_run_but_keeps_high_score() {
        let mut game = running_game(3);
        while !game.run().is_game_over() {
            game.frame(DT, &InputState::default());
        }
        let best = game.run().high_score;
        assert_eq!(game.start(), vec![GameEvent::RunStarted]);
        let t = game.tuning().clone();
        let run = game.run();
        assert_eq!(run.score, 0.0);
        assert_eq!(run.speed, t.initial_speed);
        assert_eq!(run.top_speed, t.initial_speed);
        assert_eq!(run.coins_collected, 0);
        assert_eq!(run.high_score, best);
        assert!(game.obstacles().is_empty());
        assert!(game.coins().is_empty());
        assert_eq!(game.coin_manager().collected_this_run(), 0);
        assert_eq!(game.player(), &PlayerState::new(&t));
    }

    #[test]
    fn test_manual_restart_reports_the_abandoned_run() {
        let mut game = running_game(3);
        for _ in 0..30 {
            game.frame(DT, &InputState::default());
        }
        let events = game.restart();
        assert!(matches!(
            events[0],
            GameEvent::RunEnded {
                cause: EndCause::ManualRestart,
                ..
            }
        ));
        assert_eq!(events.last(), Some(&GameEvent::RunStarted));
        assert_eq!(game.run().score, 0.0);
    }

    #[test]
    fn test_manual_restart_keeps_the_old_high_score() {
        let mut game = Game::new(Tuning::default(), 3, 2.0);
        game.start();
        for _ in 0..30 {
            game.frame(DT, &InputState::default());
        }
        assert!(game.run().score > 2.0);
        let events = game.restart();
        assert_eq!(events.len(), 2);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::NewHighScore { .. })));
        assert_eq!(game.run().high_score, 2.0);
    }

    #[test]
    fn test_coins_award_once() {
        let mut game = running_game(8);
        while game.coins().is_empty() {
            game.frame(DT, &InputState::default());
            assert!(game.run().is_running());
        }
        let id = game.coins()[0].id;
        let before = game.run().score;
        assert!(game.collect_coin(id).is_some());
        assert!(game.collect_coin(id).is_none());
        assert_eq!(game.run().score, before + game.tuning().coin_value);
        assert_eq!(game.run().coins_collected, 1);
        assert_eq!(game.coin_manager().collected_this_run(), 1);
    }

    #[test]
    fn test_touching_a_coin_collects_it() {
        let mut game = Game::new(harmless_tuning(), 8, 0.0);
        game.start();
        // Jump into the low coin band as coins arrive
        let mut collected = Vec::new();
        for frame in 0..6_000 {
            let input = InputState {
                jump_pressed: frame % 40 < 20,
                ..Default::default()
            };
            for event in game.frame(DT, &input) {
                if let GameEvent::CoinCollected { total, .. } = event {
                    collected.push(total);
                }
            }
        }
        assert!(!collected.is_empty());
        assert_eq!(
            collected,
            (1..=collected.len() as u32).collect::<Vec<_>>()
        );
        assert_eq!(game.run().coins_collected as usize, collected.len());
    }

    #[test]
    fn test_jump_and_duck_events_are_reported() {
        let mut game = running_game(1);
        let duck = InputState {
            duck_held: true,
            ..Default::default()
        };
        assert!(matches!(
            game.frame(DT, &duck).as_slice(),
            [GameEvent::DuckStarted { .. }]
        ));
        let jump = InputState {
            jump_pressed: true,
            ..Default::default()
        };
        assert!(matches!(
            game.frame(DT, &jump).as_slice(),
            [GameEvent::Jumped { .. }]
        ));
    }

    #[test]
    fn test_non_finite_high_score_falls_back_to_zero() {
        let game = Game::new(Tuning::default(), 1, f64::NAN);
        assert_eq!(game.run().high_score, 0.0);
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = running_game(99);
        let mut b = running_game(99);
        for frame in 0..600 {
            let input = InputState {
                jump_pressed: frame % 50 < 10,
                ..Default::default()
            };
            a.frame(DT, &input);
            b.frame(DT, &input);
        }
        assert_eq!(a.run(), b.run());
        assert_eq!(a.obstacles(), b.obstacles());
        assert_eq!(a.coins(), b.coins());
    }

    proptest! {
        #[test]
        fn test_score_and_speed_never_decrease_within_a_run(
            frames in proptest::collection::vec(
                (0.0f32..0.1, any::<bool>(), any::<bool>()),
                1..300,
            ),
            seed in any::<u64>(),
        ) {
            let mut game = running_game(seed);
            let mut score = game.run().score;
            let mut speed = game.run().speed;
            for (dt, jump_pressed, duck_held) in frames {
                let input = InputState { jump_pressed, duck_held, ..Default::default() };
                game.frame(dt, &input);
                prop_assert!(game.run().score >= score);
                prop_assert!(game.run().speed >= speed);
                score = game.run().score;
                speed = game.run().speed;
                if game.run().is_game_over() {
                    break;
                }
            }
        }
    }
}
