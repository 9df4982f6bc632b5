//! Input aggregation
//!
//! Raw device events (keyboard, touch buttons, taps, swipes) are folded into
//! a small levelled state the simulation reads once per frame.

use serde::{Deserialize, Serialize};

/// Keys the game listens to; everything else maps to `Other`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Space,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    W,
    A,
    S,
    D,
    P,
    Other,
}

/// Logical controls a key or touch button can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Control {
    Jump,
    Duck,
    Left,
    Right,
    Pause,
}

impl Key {
    /// The control this key drives, if any
    pub fn control(self) -> Option<Control> {
        match self {
            Key::Space | Key::ArrowUp | Key::W => Some(Control::Jump),
            Key::ArrowDown | Key::S => Some(Control::Duck),
            Key::ArrowLeft | Key::A => Some(Control::Left),
            Key::ArrowRight | Key::D => Some(Control::Right),
            Key::P => Some(Control::Pause),
            Key::Other => None,
        }
    }
}

/// A raw event from the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    KeyDown { key: Key, repeat: bool },
    KeyUp { key: Key },
    /// Tap on the play field
    Tap,
    /// On-screen button pressed or released
    TouchHold { control: Control, held: bool },
    /// Swipe gesture finished (screen coordinates, y grows downward)
    Swipe { dx: f32, dy: f32, duration_s: f32 },
    /// Window lost focus: release everything
    Blur,
}

/// Tap/swipe-up jump pulse length
pub const JUMP_PULSE_S: f32 = 0.1;
/// Swipe-down duck pulse length
pub const DUCK_PULSE_S: f32 = 0.15;
/// Swipe-left/right move pulse length
pub const MOVE_PULSE_S: f32 = 0.2;
/// Swipes slower than this are ignored
pub const SWIPE_MAX_DURATION_S: f32 = 0.3;
/// Swipes shorter than this along their dominant axis are ignored
pub const SWIPE_MIN_DISTANCE: f32 = 50.0;

/// Snapshot read by the simulation each frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    /// Jump input currently down (edge detection happens in the player)
    pub jump_pressed: bool,
    pub duck_held: bool,
    pub left_held: bool,
    pub right_held: bool,
    /// Bumped once per physical pause press
    pub pause_token: u32,
    /// Bumped once per physical start/retry press
    pub start_token: u32,
}

#[derive(Debug, Clone, Copy, Default)]
struct ControlLevel {
    keys: bool,
    touch: bool,
    pulse_s: f32,
}

impl ControlLevel {
    fn active(&self) -> bool {
        self.keys || self.touch || self.pulse_s > 0.0
    }

    fn pulse(&mut self, secs: f32) {
        self.pulse_s = self.pulse_s.max(secs);
    }
}

/// Folds events into an [`InputState`]
#[derive(Debug, Clone, Default)]
pub struct InputAggregator {
    jump: ControlLevel,
    duck: ControlLevel,
    left: ControlLevel,
    right: ControlLevel,
    pause_down: bool,
    start_down: bool,
    pause_token: u32,
    start_token: u32,
}

impl InputAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown { key, repeat } => {
                if key == Key::Space && !repeat && !self.start_down {
                    self.start_token = self.start_token.wrapping_add(1);
                }
                if key == Key::Space {
                    self.start_down = true;
                }
                match key.control() {
                    Some(Control::Pause) => {
                        if !repeat && !self.pause_down {
                            self.pause_token = self.pause_token.wrapping_add(1);
                        }
                        self.pause_down = true;
                    }
                    Some(control) => {
                        if let Some(level) = self.level_mut(control) {
                            level.keys = true;
                        }
                    }
                    None => {}
                }
            }
            InputEvent::KeyUp { key } => {
                if key == Key::Space {
                    self.start_down = false;
                }
                match key.control() {
                    Some(Control::Pause) => self.pause_down = false,
                    Some(control) => {
                        if let Some(level) = self.level_mut(control) {
                            level.keys = false;
                        }
                    }
                    None => {}
                }
            }
            InputEvent::Tap => {
                self.jump.pulse(JUMP_PULSE_S);
                self.start_token = self.start_token.wrapping_add(1);
            }
            InputEvent::TouchHold { control, held } => {
                if control == Control::Pause {
                    if held {
                        self.pause_token = self.pause_token.wrapping_add(1);
                    }
                } else if let Some(level) = self.level_mut(control) {
                    level.touch = held;
                }
            }
            InputEvent::Swipe { dx, dy, duration_s } => self.swipe(dx, dy, duration_s),
            InputEvent::Blur => {
                for level in [
                    &mut self.jump,
                    &mut self.duck,
                    &mut self.left,
                    &mut self.right,
                ] {
                    *level = ControlLevel::default();
                }
                self.pause_down = false;
                self.start_down = false;
            }
        }
    }

    fn swipe(&mut self, dx: f32, dy: f32, duration_s: f32) {
        if duration_s.is_nan() || duration_s >= SWIPE_MAX_DURATION_S {
            return;
        }
        let (abs_x, abs_y) = (dx.abs(), dy.abs());
        if abs_y > abs_x && abs_y > SWIPE_MIN_DISTANCE {
            if dy < 0.0 {
                self.jump.pulse(JUMP_PULSE_S);
            } else {
                self.duck.pulse(DUCK_PULSE_S);
            }
        } else if abs_x > abs_y && abs_x > SWIPE_MIN_DISTANCE {
            if dx < 0.0 {
                self.left.pulse(MOVE_PULSE_S);
            } else {
                self.right.pulse(MOVE_PULSE_S);
            }
        }
    }

    fn level_mut(&mut self, control: Control) -> Option<&mut ControlLevel> {
        match control {
            Control::Jump => Some(&mut self.jump),
            Control::Duck => Some(&mut self.duck),
            Control::Left => Some(&mut self.left),
            Control::Right => Some(&mut self.right),
            Control::Pause => None,
        }
    }

    /// Run pulse timers down by `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        for level in [
            &mut self.jump,
            &mut self.duck,
            &mut self.left,
            &mut self.right,
        ] {
            level.pulse_s = (level.pulse_s - dt).max(0.0);
        }
    }

    pub fn state(&self) -> InputState {
        InputState {
            jump_pressed: self.jump.active(),
            duck_held: self.duck.active(),
            left_held: self.left.active(),
            right_held: self.right.active(),
            pause_token: self.pause_token,
            start_token: self.start_token,
        }
    }
}
