//! Demo-mode AI
//!
//! Reads the live game and produces the held controls a player would,
//! jumping cacti and ducking under low birds. Used by the headless runner
//! and by attract mode; it never touches game state directly.

use super::input::InputState;
use super::obstacles::{Obstacle, ObstacleKind};
use super::tick::Game;

/// How far ahead (in seconds of travel) to react to a cactus
const JUMP_LEAD_S: f32 = 0.2;
/// How far ahead to start ducking under a bird
const DUCK_LEAD_S: f32 = 0.3;

/// Nearest obstacle that has not fully passed the player
fn next_threat<'a>(game: &'a Game) -> Option<&'a Obstacle> {
    let player_left = game.player().pos.x;
    game.obstacles()
        .iter()
        .filter(|o| o.right() >= player_left)
        .min_by(|a, b| a.pos.x.partial_cmp(&b.pos.x).unwrap_or(std::cmp::Ordering::Equal))
}

/// Controls for this frame. Tokens are carried over from `base` so pause
/// and start still work while the AI is steering.
pub fn drive(game: &Game, base: InputState) -> InputState {
    let mut input = InputState {
        jump_pressed: false,
        duck_held: false,
        left_held: false,
        right_held: false,
        ..base
    };
    if !game.run().is_running() {
        return input;
    }

    let tuning = game.tuning();
    let player = game.player();

    // Keep holding while rising for full height, let go once falling so the
    // next press is a fresh edge
    if !player.on_ground {
        input.jump_pressed = player.velocity_y < 0.0;
    }

    let Some(obstacle) = next_threat(game) else {
        return input;
    };
    let gap = obstacle.pos.x - player.bounds().right();
    let closing = obstacle.speed.max(1.0);

    match obstacle.kind {
        ObstacleKind::Bird => {
            let standing_top =
                tuning.ground_y - tuning.player_height + tuning.player_hitbox_inset.1;
            let bird_bottom = obstacle.pos.y + obstacle.size.y - tuning.obstacle_hitbox_inset.1;
            if bird_bottom > standing_top && gap <= closing * DUCK_LEAD_S {
                // Drop out of the air early if a low bird is coming
                input.jump_pressed = false;
                input.duck_held = true;
            }
        }
        ObstacleKind::Cactus => {
            if player.on_ground && gap > 0.0 && gap <= closing * JUMP_LEAD_S {
                input.jump_pressed = true;
            }
        }
    }

    log::trace!(
        "autopilot: {} #{} gap={:.0} jump={} duck={}",
        obstacle.kind.as_str(),
        obstacle.id,
        gap,
        input.jump_pressed,
        input.duck_held
    );
    input
}
