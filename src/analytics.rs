//! Gameplay analytics
//!
//! `SessionContext` turns the events of each frame into named telemetry
//! records. It owns the per-session counters (jumps, ducks, obstacles
//! avoided) and detects score and speed milestones as they are crossed.

use serde_json::{Value, json};

use crate::sim::{GameEvent, RunState};
use crate::tuning::Tuning;

/// A telemetry record ready for a `Telemetry` collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsEvent {
    pub name: &'static str,
    pub properties: Value,
}

impl AnalyticsEvent {
    fn new(name: &'static str, properties: Value) -> Self {
        Self { name, properties }
    }
}

/// Thresholds in `milestones` with `prev < m <= now`, ascending
pub fn milestones_crossed(milestones: &[u32], prev: f64, now: f64) -> Vec<u32> {
    let mut crossed: Vec<u32> = milestones
        .iter()
        .copied()
        .filter(|&m| prev < m as f64 && m as f64 <= now)
        .collect();
    crossed.sort_unstable();
    crossed.dedup();
    crossed
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionCounts {
    pub jumps: u32,
    pub ducks: u32,
    pub obstacles_avoided: u32,
}

/// Analytics state for one play session (one run)
#[derive(Debug, Clone)]
pub struct SessionContext {
    prefix: String,
    sequence: u64,
    session_id: String,
    counts: ActionCounts,
    score_milestones: Vec<u32>,
    speed_milestones: Vec<u32>,
    last_score: f64,
    last_speed: f64,
}

impl SessionContext {
    /// `prefix` distinguishes contexts (e.g. one per process); sessions
    /// within a context are numbered from 1
    pub fn new(prefix: impl Into<String>, tuning: &Tuning) -> Self {
        let prefix = prefix.into();
        Self {
            session_id: format!("{prefix}-0"),
            prefix,
            sequence: 0,
            counts: ActionCounts::default(),
            score_milestones: tuning.score_milestones.clone(),
            speed_milestones: tuning.speed_milestones.clone(),
            last_score: 0.0,
            last_speed: tuning.initial_speed as f64,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn counts(&self) -> &ActionCounts {
        &self.counts
    }

    /// Start a new session: fresh id, counters and milestone tracking
    pub fn begin(&mut self, run: &RunState) {
        self.sequence += 1;
        self.session_id = format!("{}-{}", self.prefix, self.sequence);
        self.counts = ActionCounts::default();
        self.last_score = run.score;
        self.last_speed = run.speed as f64;
        log::debug!("analytics session {}", self.session_id);
    }

    /// Translate one frame's events, in the order they happened. `run` is
    /// the state after the frame.
    pub fn process(
        &mut self,
        events: &[GameEvent],
        run: &RunState,
        timestamp_ms: f64,
    ) -> Vec<AnalyticsEvent> {
        let mut out = Vec::new();

        for event in events {
            // Anything before this belongs to the previous session
            if *event == GameEvent::RunStarted {
                self.begin(run);
                out.push(AnalyticsEvent::new(
                    "game_started",
                    json!({
                        "session_id": self.session_id,
                        "timestamp": timestamp_ms,
                    }),
                ));
            } else if let Some(record) = self.translate(event, run) {
                out.push(record);
            }
        }

        self.milestones(run, &mut out);
        out
    }

    fn milestones(&mut self, run: &RunState, out: &mut Vec<AnalyticsEvent>) {
        let speed = run.speed as f64;
        for level in milestones_crossed(&self.speed_milestones, self.last_speed, speed) {
            out.push(AnalyticsEvent::new(
                "speed_milestone_reached",
                json!({
                    "session_id": self.session_id,
                    "speed_level": level,
                    "score_at_milestone": run.score.floor(),
                    "time_to_reach_seconds": run.elapsed_s,
                }),
            ));
        }
        for milestone in milestones_crossed(&self.score_milestones, self.last_score, run.score) {
            out.push(AnalyticsEvent::new(
                "score_milestone_reached",
                json!({
                    "session_id": self.session_id,
                    "milestone_score": milestone,
                    "time_to_reach_seconds": run.elapsed_s,
                    "coins_collected": run.coins_collected,
                }),
            ));
        }
        self.last_speed = self.last_speed.max(speed);
        self.last_score = self.last_score.max(run.score);
    }

    fn translate(&mut self, event: &GameEvent, run: &RunState) -> Option<AnalyticsEvent> {
        let sid = self.session_id.clone();
        let record = match event {
            GameEvent::RunStarted | GameEvent::Paused | GameEvent::Resumed => return None,
            GameEvent::Jumped { pos } => {
                self.counts.jumps += 1;
                AnalyticsEvent::new(
                    "player_jumped",
                    json!({
                        "session_id": sid,
                        "current_score": run.score.floor(),
                        "current_speed": run.speed,
                        "player_x": pos.x,
                        "player_y": pos.y,
                    }),
                )
            }
            GameEvent::DuckStarted { pos } => {
                self.counts.ducks += 1;
                AnalyticsEvent::new(
                    "player_ducked",
                    json!({
                        "session_id": sid,
                        "current_score": run.score.floor(),
                        "current_speed": run.speed,
                        "player_x": pos.x,
                    }),
                )
            }
            GameEvent::ObstacleAvoided { kind } => {
                self.counts.obstacles_avoided += 1;
                AnalyticsEvent::new(
                    "obstacle_avoided",
                    json!({
                        "session_id": sid,
                        "obstacle_type": kind.as_str(),
                        "current_score": run.score.floor(),
                        "current_speed": run.speed,
                    }),
                )
            }
            GameEvent::Crashed {
                kind,
                player,
                obstacle,
            } => AnalyticsEvent::new(
                "obstacle_collision",
                json!({
                    "session_id": sid,
                    "obstacle_type": kind.as_str(),
                    "collision_score": run.score.floor(),
                    "collision_speed": run.speed,
                    "player_x": player.x,
                    "player_y": player.y,
                    "obstacle_x": obstacle.x,
                    "obstacle_y": obstacle.y,
                }),
            ),
            GameEvent::CoinCollected {
                pos, value, total, ..
            } => AnalyticsEvent::new(
                "coin_collected",
                json!({
                    "session_id": sid,
                    "coin_value": value,
                    "total_coins": total,
                    "current_score": run.score.floor(),
                    "coin_x": pos.x,
                    "coin_y": pos.y,
                }),
            ),
            GameEvent::RunEnded {
                cause,
                score,
                coins,
                top_speed,
                avoided,
                elapsed_s,
            } => AnalyticsEvent::new(
                "game_ended",
                json!({
                    "session_id": sid,
                    "final_score": score.floor(),
                    "time_played_seconds": elapsed_s,
                    "coins_collected": coins,
                    "top_speed_reached": top_speed,
                    "obstacles_avoided": avoided,
                    "jumps_made": self.counts.jumps,
                    "ducks_made": self.counts.ducks,
                    "cause_of_death": cause.as_str(),
                }),
            ),
            GameEvent::NewHighScore { previous, new } => AnalyticsEvent::new(
                "high_score_achieved",
                json!({
                    "session_id": sid,
                    "new_high_score": new.floor(),
                    "previous_high_score": previous.floor(),
                    "improvement": (new - previous).max(0.0),
                }),
            ),
        };
        Some(record)
    }
}
