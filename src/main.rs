//! Dino Runner entry point
//!
//! Headless runner: plays one or more runs at a fixed display rate (the
//! demo AI steers unless disabled), then prints each run and the
//! leaderboard.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use dino_runner::highscores::{HighScores, format_age};
use dino_runner::persistence::{JsonFileStore, KeyValueStore, MemoryStore};
use dino_runner::platform::{LogSink, Null, StoredHighScore};
use dino_runner::sim::GamePhase;
use dino_runner::{Session, Settings};

#[derive(Parser)]
#[command(name = "dino-runner")]
#[command(about = "Play the endless runner headlessly and report the results")]
struct Args {
    /// Simulated seconds per run before giving up on it
    #[arg(long, default_value_t = 120.0)]
    seconds: f64,

    /// Display refresh rate to simulate
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=1000))]
    fps: u32,

    /// RNG seed (overrides the settings file)
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for high scores and settings; in-memory when omitted
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Settings JSON file (plain, not enveloped)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Stand still instead of letting the demo AI play
    #[arg(long)]
    no_autopilot: bool,

    /// Number of runs to play back to back
    #[arg(long, default_value_t = 1)]
    runs: u32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let store: Box<dyn KeyValueStore> = match &args.data_dir {
        Some(dir) => Box::new(JsonFileStore::new(dir)),
        None => Box::new(MemoryStore::new()),
    };

    let settings = match &args.settings {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::load(&store),
    };
    let seed = args
        .seed
        .or(settings.seed)
        .unwrap_or_else(rand::random::<u64>);
    log::info!("Dino Runner starting (seed {seed})");

    let leaderboard = HighScores::load(&store).unwrap_or_else(|e| {
        log::warn!("Ignoring unreadable leaderboard: {e}");
        HighScores::new()
    });

    let mut session = Session::new(
        settings,
        seed,
        Null,
        LogSink,
        LogSink,
        StoredHighScore::new(store),
    );
    session.set_leaderboard(leaderboard);
    session.set_autopilot(!args.no_autopilot);

    let frame_ms = 1000.0 / args.fps as f64;
    let max_frames = (args.seconds.max(0.0) * args.fps as f64).ceil() as u64;
    let mut now_ms = 0.0;

    for run in 1..=args.runs {
        session.start();
        for _ in 0..max_frames {
            now_ms += frame_ms;
            session.on_animation_frame(now_ms, true);
            if session.game().phase() == GamePhase::GameOver {
                break;
            }
        }

        let state = session.game().run();
        let outcome = if state.is_game_over() {
            "crashed"
        } else {
            "time limit"
        };
        println!(
            "Run {run}: {outcome} after {:.1}s | score {:.0} | coins {} | top speed {:.0} px/s | avoided {}",
            state.elapsed_s,
            state.score.floor(),
            state.coins_collected,
            state.top_speed,
            state.obstacles_avoided
        );

        // Abandon a run that hit the time limit so the next one starts fresh
        if !state.is_game_over() && run < args.runs {
            session.restart();
        }
    }

    let leaderboard = session.leaderboard().clone();
    if let Err(e) = leaderboard.save(session.scores_mut().store_mut()) {
        log::warn!("Could not save leaderboard: {e}");
    }

    println!();
    println!("High score: {:.0}", session.game().run().high_score.floor());
    match leaderboard.top_score() {
        Some(best) => println!("Leaderboard ({} runs, best {best}):", leaderboard.entries.len()),
        None => println!("Leaderboard is empty"),
    }
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0);
    for (i, entry) in leaderboard.entries.iter().enumerate() {
        println!(
            "{:>2}. {:>7}  coins {:>3}  top {:>5.0} px/s  {}",
            i + 1,
            entry.score,
            entry.coins,
            entry.top_speed,
            format_age(now, entry.timestamp)
        );
    }
    Ok(())
}
