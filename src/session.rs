//! Frame driver
//!
//! `Session` is the loop the host calls once per display refresh. It feeds
//! the clock and input into the `Game`, then fans the frame's events out to
//! audio, analytics, high-score storage and the renderer. Collaborator
//! failures are logged and dropped here so a frame always completes.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::analytics::SessionContext;
use crate::highscores::HighScores;
use crate::platform::{AudioSink, HighScoreStore, Renderer, SoundCue, Telemetry};
use crate::settings::Settings;
use crate::sim::{
    EndCause, FrameClock, Game, GameEvent, InputAggregator, InputEvent, autopilot,
};

/// Wall-clock Unix time in ms, for timestamps that leave the process
fn unix_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

pub struct Session<R, A, T, H> {
    settings: Settings,
    clock: FrameClock,
    input: InputAggregator,
    game: Game,
    analytics: SessionContext,
    leaderboard: HighScores,
    autopilot: bool,
    renderer: R,
    audio: A,
    telemetry: T,
    scores: H,
}

impl<R, A, T, H> Session<R, A, T, H>
where
    R: Renderer,
    A: AudioSink,
    T: Telemetry,
    H: HighScoreStore,
{
    pub fn new(
        settings: Settings,
        seed: u64,
        renderer: R,
        audio: A,
        telemetry: T,
        mut scores: H,
    ) -> Self {
        let high_score = match scores.load_high_score() {
            Ok(score) => {
                log::info!("high score {score:.0}");
                score
            }
            Err(e) => {
                log::warn!("high score unavailable, starting from 0: {e}");
                0.0
            }
        };
        let tuning = settings.tuning.clone();
        Self {
            clock: FrameClock::new(tuning.max_frame_dt),
            input: InputAggregator::new(),
            game: Game::new(tuning.clone(), seed, high_score),
            analytics: SessionContext::new(format!("{seed:016x}"), &tuning),
            leaderboard: HighScores::new(),
            autopilot: false,
            settings,
            renderer,
            audio,
            telemetry,
            scores,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn analytics(&self) -> &SessionContext {
        &self.analytics
    }

    pub fn leaderboard(&self) -> &HighScores {
        &self.leaderboard
    }

    /// Seed the in-memory leaderboard (e.g. from storage)
    pub fn set_leaderboard(&mut self, leaderboard: HighScores) {
        self.leaderboard = leaderboard;
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn telemetry(&self) -> &T {
        &self.telemetry
    }

    pub fn scores(&self) -> &H {
        &self.scores
    }

    pub fn scores_mut(&mut self) -> &mut H {
        &mut self.scores
    }

    /// Let the demo AI steer instead of held keys
    pub fn set_autopilot(&mut self, enabled: bool) {
        self.autopilot = enabled;
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        self.input.handle(event);
    }

    /// Start, resume or retry (the overlay's start button)
    pub fn start(&mut self) {
        let events = self.game.start();
        self.dispatch(&events);
    }

    pub fn toggle_pause(&mut self) {
        let events = self.game.toggle_pause();
        self.dispatch(&events);
    }

    /// Abandon the current run and begin a new one
    pub fn restart(&mut self) {
        let events = self.game.restart();
        self.dispatch(&events);
    }

    /// One display refresh. Returns the simulated delta, or `None` when
    /// the frame was skipped because the page is hidden.
    pub fn on_animation_frame(&mut self, now_ms: f64, visible: bool) -> Option<f32> {
        let running = self.game.run().is_running();
        let dt = self.clock.advance(now_ms, visible, running);
        if !visible {
            return None;
        }
        // Not running: no time passes, but start/pause presses still count
        let dt = dt.unwrap_or(0.0);

        self.input.advance(dt);
        let mut state = self.input.state();
        if self.autopilot {
            state = autopilot::drive(&self.game, state);
        }

        let events = self.game.frame(dt, &state);
        self.dispatch(&events);
        self.renderer.render(&self.game.snapshot());
        Some(dt)
    }

    fn dispatch(&mut self, events: &[GameEvent]) {
        let now = unix_ms();

        if self.settings.audio_enabled {
            let volume = self.settings.effective_volume();
            for event in events {
                let cue = match event {
                    GameEvent::Jumped { .. } => SoundCue::Jump,
                    GameEvent::CoinCollected { .. } => SoundCue::Coin,
                    GameEvent::Crashed { .. } => SoundCue::Crash,
                    _ => continue,
                };
                self.audio.play(cue, volume);
            }
        }

        for record in self.analytics.process(events, self.game.run(), now) {
            self.telemetry.record_event(record.name, record.properties);
        }

        for event in events {
            match event {
                GameEvent::NewHighScore { new, .. } => {
                    if let Err(e) = self.scores.save_high_score(*new) {
                        log::warn!("could not save high score: {e}");
                    }
                }
                GameEvent::RunEnded {
                    cause: EndCause::ObstacleCollision,
                    score,
                    coins,
                    top_speed,
                    ..
                } => {
                    let whole = crate::finite_or_zero(*score).max(0.0).floor() as u64;
                    if let Some(rank) = self.leaderboard.add_run(whole, *coins, *top_speed, now) {
                        log::info!("run placed #{rank} on the leaderboard");
                    }
                }
                _ => {}
            }
        }
    }
}
