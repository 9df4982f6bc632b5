//! Player kinematics and jump feel
//!
//! One update per frame, in a fixed order:
//! 1. jump edge arms the jump buffer; releasing jump drops the held latch
//! 2. coyote timer refills on the ground and drains in the air
//! 3. buffered jump fires if grounded or within coyote time
//! 4. ducking (ground only) swaps height around a fixed foot line
//! 5. vertical integration with jump-cut and fast-fall
//! 6. horizontal movement and clamping

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::input::InputState;
use crate::clamp;
use crate::tuning::Tuning;

/// Which way the character is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// Player body state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Top-left corner (y grows downward)
    pub pos: Vec2,
    /// Width and current height (height shrinks while ducking)
    pub size: Vec2,
    /// Vertical velocity, negative is up
    pub velocity_y: f32,
    pub is_jumping: bool,
    pub is_ducking: bool,
    pub on_ground: bool,
    pub facing: Facing,
}

impl PlayerState {
    /// Standing on the ground at the start position
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(
                tuning.player_start_x,
                tuning.ground_y - tuning.player_height,
            ),
            size: Vec2::new(tuning.player_width, tuning.player_height),
            velocity_y: 0.0,
            is_jumping: false,
            is_ducking: false,
            on_ground: true,
            facing: Facing::Right,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    /// y of the feet
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Change height keeping the feet where they are
    fn set_height(&mut self, height: f32) {
        let bottom = self.bottom();
        self.size.y = height;
        self.pos.y = bottom - height;
    }
}

/// Side effects of one controller update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerEffects {
    pub jumped: bool,
    pub duck_started: bool,
}

/// Owns the player body plus the jump-feel timers
#[derive(Debug, Clone)]
pub struct PlayerController {
    pub(crate) player: PlayerState,
    coyote_timer: f32,
    jump_buffer_timer: f32,
    jump_held: bool,
}

impl PlayerController {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            player: PlayerState::new(tuning),
            coyote_timer: 0.0,
            jump_buffer_timer: 0.0,
            jump_held: false,
        }
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn coyote_timer(&self) -> f32 {
        self.coyote_timer
    }

    pub fn jump_buffer_timer(&self) -> f32 {
        self.jump_buffer_timer
    }

    /// Back to the start position with all timers cleared
    pub fn reset(&mut self, tuning: &Tuning) {
        *self = Self::new(tuning);
    }

    pub fn update(&mut self, dt: f32, input: &InputState, tuning: &Tuning) -> PlayerEffects {
        let mut effects = PlayerEffects::default();
        let player = &mut self.player;

        // Jump edge arms the buffer, release clears the latch used by jump-cut
        if input.jump_pressed && !self.jump_held {
            self.jump_held = true;
            self.jump_buffer_timer = tuning.jump_buffer_s;
        } else if !input.jump_pressed {
            self.jump_held = false;
        }

        if player.on_ground {
            self.coyote_timer = tuning.coyote_time_s;
        } else if self.coyote_timer > 0.0 {
            self.coyote_timer -= dt;
        }

        if self.jump_buffer_timer > 0.0 {
            self.jump_buffer_timer -= dt;
        }

        let can_jump =
            (player.on_ground || self.coyote_timer > 0.0) && self.jump_buffer_timer > 0.0;
        if can_jump {
            player.velocity_y = -tuning.jump_velocity;
            player.on_ground = false;
            player.is_jumping = true;
            self.jump_buffer_timer = 0.0;
            self.coyote_timer = 0.0;
            effects.jumped = true;
        }

        let was_ducking = player.is_ducking;
        player.is_ducking = input.duck_held && player.on_ground;
        effects.duck_started = player.is_ducking && !was_ducking;
        let height = if player.is_ducking {
            tuning.duck_height
        } else {
            tuning.player_height
        };
        player.set_height(height);

        if !player.on_ground {
            let gravity_step = tuning.gravity * dt;
            player.velocity_y = (player.velocity_y + gravity_step).min(tuning.max_fall_speed);

            // Jump-cut: released early while still rising
            if !self.jump_held && player.velocity_y < 0.0 {
                player.velocity_y += gravity_step * (tuning.jump_cut_multiplier - 1.0);
            }

            // Fast-fall: down held in the air
            if input.duck_held {
                if player.velocity_y < tuning.fast_fall_min_velocity {
                    player.velocity_y = tuning.fast_fall_min_velocity;
                }
                if player.velocity_y > 0.0 {
                    player.velocity_y += gravity_step * (tuning.fast_fall_multiplier - 1.0);
                }
            }

            player.pos.y += player.velocity_y * dt;
            if player.bottom() >= tuning.ground_y {
                player.pos.y = tuning.ground_y - player.size.y;
                player.velocity_y = 0.0;
                player.on_ground = true;
                player.is_jumping = false;
            }
        }

        // Left wins when both are held
        if input.left_held {
            player.pos.x -= tuning.horizontal_speed * dt;
        } else if input.right_held {
            player.pos.x += tuning.horizontal_speed * dt;
        }
        player.facing = if input.left_held {
            Facing::Left
        } else {
            Facing::Right
        };
        let max_x = tuning.canvas_width - player.size.x - tuning.edge_margin;
        player.pos.x = clamp(player.pos.x, tuning.edge_margin, max_x.max(tuning.edge_margin));

        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DT: f32 = 0.01;

    fn idle() -> InputState {
        InputState::default()
    }

    fn jump() -> InputState {
        InputState {
            jump_pressed: true,
            ..Default::default()
        }
    }

    /// Frames until a falling player lands with no input
    fn frames_to_land(ctl: &PlayerController, tuning: &Tuning) -> usize {
        let mut probe = ctl.clone();
        for frame in 1..10_000 {
            probe.update(DT, &idle(), tuning);
            if probe.player.on_ground {
                return frame;
            }
        }
        panic!("player never landed");
    }

    /// Jump, release, and run until the player is on the way down
    fn falling_controller(tuning: &Tuning) -> PlayerController {
        let mut ctl = PlayerController::new(tuning);
        assert!(ctl.update(DT, &jump(), tuning).jumped);
        while ctl.player.velocity_y <= 0.0 {
            ctl.update(DT, &idle(), tuning);
        }
        ctl
    }

    #[test]
    fn test_grounded_jump_fires_immediately() {
        let tuning = Tuning::default();
        let mut ctl = PlayerController::new(&tuning);
        let fx = ctl.update(DT, &jump(), &tuning);
        assert!(fx.jumped);
        assert!(!ctl.player.on_ground);
        assert!(ctl.player.is_jumping);
        assert!(ctl.player.velocity_y < 0.0);
        assert_eq!(ctl.coyote_timer(), 0.0);
        assert_eq!(ctl.jump_buffer_timer(), 0.0);
    }

    #[test]
    fn test_holding_jump_does_not_rejump_on_landing() {
        let tuning = Tuning::default();
        let mut ctl = PlayerController::new(&tuning);
        let mut jumps = 0;
        for _ in 0..300 {
            if ctl.update(DT, &jump(), &tuning).jumped {
                jumps += 1;
            }
        }
        assert_eq!(jumps, 1);
        assert!(ctl.player.on_ground);
    }

    #[test]
    fn test_buffered_press_shortly_before_landing_fires() {
        let tuning = Tuning::default();
        let mut ctl = falling_controller(&tuning);
        let land = frames_to_land(&ctl, &tuning);

        // Press 0.05s before touching down
        for _ in 0..land - 5 {
            ctl.update(DT, &idle(), &tuning);
        }
        let mut jumped = false;
        for _ in 0..8 {
            jumped |= ctl.update(DT, &jump(), &tuning).jumped;
        }
        assert!(jumped, "press within the buffer window should jump on landing");
    }

    #[test]
    fn test_stale_press_before_landing_is_dropped() {
        let tuning = Tuning::default();
        let mut ctl = falling_controller(&tuning);
        let land = frames_to_land(&ctl, &tuning);

        // Press 0.15s before touching down, then keep holding
        for _ in 0..land - 15 {
            ctl.update(DT, &idle(), &tuning);
        }
        let mut jumped = false;
        for _ in 0..30 {
            jumped |= ctl.update(DT, &jump(), &tuning).jumped;
        }
        assert!(!jumped, "buffer should have expired before landing");
        assert!(ctl.player.on_ground);
    }

    /// Grounded controller that has just left a ledge
    fn walked_off_ledge(tuning: &Tuning) -> PlayerController {
        let mut ctl = PlayerController::new(tuning);
        ctl.update(DT, &idle(), tuning);
        assert_eq!(ctl.coyote_timer(), tuning.coyote_time_s);
        ctl.player.on_ground = false;
        ctl.player.pos.y -= 100.0;
        ctl
    }

    #[test]
    fn test_coyote_jump_inside_window() {
        let tuning = Tuning::default();
        let mut ctl = walked_off_ledge(&tuning);
        for _ in 0..7 {
            ctl.update(DT, &idle(), &tuning);
        }
        // 0.08s after leaving the ground
        assert!(ctl.update(DT, &jump(), &tuning).jumped);
    }

    #[test]
    fn test_coyote_jump_after_window_fails() {
        let tuning = Tuning::default();
        let mut ctl = walked_off_ledge(&tuning);
        for _ in 0..11 {
            ctl.update(DT, &idle(), &tuning);
        }
        // 0.12s after leaving the ground
        assert!(!ctl.update(DT, &jump(), &tuning).jumped);
        assert!(!ctl.player.on_ground);
    }

    #[test]
    fn test_released_jump_is_lower_than_held_jump() {
        let tuning = Tuning::default();
        let apex = |hold_frames: usize| {
            let mut ctl = PlayerController::new(&tuning);
            let mut top = ctl.player.pos.y;
            for frame in 0..200 {
                let input = if frame < hold_frames { jump() } else { idle() };
                ctl.update(DT, &input, &tuning);
                top = top.min(ctl.player.pos.y);
            }
            top
        };
        // Smaller y is higher
        assert!(apex(200) < apex(3));
    }

    #[test]
    fn test_fast_fall_shortens_airtime() {
        let tuning = Tuning::default();
        let airtime = |fast_fall: bool| {
            let mut ctl = PlayerController::new(&tuning);
            ctl.update(DT, &jump(), &tuning);
            let mut frames = 1;
            while !ctl.player.on_ground {
                let input = InputState {
                    jump_pressed: true,
                    duck_held: fast_fall && frames > 5,
                    ..Default::default()
                };
                ctl.update(DT, &input, &tuning);
                frames += 1;
            }
            frames
        };
        assert!(airtime(true) < airtime(false));
    }

    #[test]
    fn test_fall_speed_is_clamped() {
        let tuning = Tuning::default();
        let mut ctl = PlayerController::new(&tuning);
        ctl.player.on_ground = false;
        ctl.player.pos.y = -100_000.0;
        for _ in 0..200 {
            ctl.update(DT, &idle(), &tuning);
        }
        assert!(ctl.player.velocity_y <= tuning.max_fall_speed);
    }

    #[test]
    fn test_cannot_duck_in_the_air() {
        let tuning = Tuning::default();
        let mut ctl = PlayerController::new(&tuning);
        ctl.update(DT, &jump(), &tuning);
        let fx = ctl.update(
            DT,
            &InputState {
                duck_held: true,
                ..Default::default()
            },
            &tuning,
        );
        assert!(!fx.duck_started);
        assert!(!ctl.player.is_ducking);
        assert_eq!(ctl.player.size.y, tuning.player_height);
    }

    #[test]
    fn test_duck_reports_start_once() {
        let tuning = Tuning::default();
        let mut ctl = PlayerController::new(&tuning);
        let duck = InputState {
            duck_held: true,
            ..Default::default()
        };
        assert!(ctl.update(DT, &duck, &tuning).duck_started);
        assert!(!ctl.update(DT, &duck, &tuning).duck_started);
        assert_eq!(ctl.player.size.y, tuning.duck_height);
    }

    #[test]
    fn test_horizontal_movement_left_wins_and_is_clamped() {
        let tuning = Tuning::default();
        let mut ctl = PlayerController::new(&tuning);
        let both = InputState {
            left_held: true,
            right_held: true,
            ..Default::default()
        };
        let x0 = ctl.player.pos.x;
        ctl.update(DT, &both, &tuning);
        assert!(ctl.player.pos.x < x0);
        assert_eq!(ctl.player.facing, Facing::Left);

        for _ in 0..500 {
            ctl.update(DT, &both, &tuning);
        }
        assert_eq!(ctl.player.pos.x, tuning.edge_margin);

        let right = InputState {
            right_held: true,
            ..Default::default()
        };
        for _ in 0..500 {
            ctl.update(DT, &right, &tuning);
        }
        assert_eq!(
            ctl.player.pos.x,
            tuning.canvas_width - tuning.player_width - tuning.edge_margin
        );
        assert_eq!(ctl.player.facing, Facing::Right);
    }

    #[test]
    fn test_facing_defaults_right_without_left() {
        let tuning = Tuning::default();
        let mut ctl = PlayerController::new(&tuning);
        ctl.update(DT, &jump(), &tuning);
        assert_eq!(ctl.player.facing, Facing::Right);
    }

    proptest! {
        #[test]
        fn test_ducking_keeps_feet_planted(
            toggles in proptest::collection::vec(any::<bool>(), 1..40),
        ) {
            let tuning = Tuning::default();
            let mut ctl = PlayerController::new(&tuning);
            let feet = ctl.player.bottom();
            for duck in toggles {
                let input = InputState { duck_held: duck, ..Default::default() };
                ctl.update(1.0 / 60.0, &input, &tuning);
                prop_assert!((ctl.player.bottom() - feet).abs() < 1e-3);
            }
        }

        #[test]
        fn test_player_stays_inside_world(
            frames in proptest::collection::vec(
                (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()),
                1..200,
            ),
            dt in 0.0f32..0.05,
        ) {
            let tuning = Tuning::default();
            let mut ctl = PlayerController::new(&tuning);
            for (jump_pressed, duck_held, left_held, right_held) in frames {
                let input = InputState {
                    jump_pressed,
                    duck_held,
                    left_held,
                    right_held,
                    ..Default::default()
                };
                ctl.update(dt, &input, &tuning);
                let p = &ctl.player;
                prop_assert!(p.bottom() <= tuning.ground_y + 1e-3);
                prop_assert!(p.pos.x >= tuning.edge_margin);
                prop_assert!(p.pos.x + p.size.x <= tuning.canvas_width - tuning.edge_margin + 1e-3);
            }
        }
    }
}
