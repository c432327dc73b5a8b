//! Input aggregation
//!
//! Raw keyboard and pointer events are recorded as they arrive; `poll` turns
//! them into one `TickInput` per simulation tick. Keyboard state is ORed with
//! touch-zone state whenever touch controls are active.

use glam::Vec2;

use crate::consts::{DOUBLE_TAP_MS, SWIPE_THRESHOLD};
use crate::settings::TouchControls;
use crate::sim::TickInput;

/// Keys the game listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Dash,
    Pause,
    Confirm,
}

impl Key {
    /// Map a DOM `KeyboardEvent.code`
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "KeyA" | "ArrowLeft" => Some(Key::Left),
            "KeyD" | "ArrowRight" => Some(Key::Right),
            "KeyW" | "ArrowUp" => Some(Key::Up),
            "KeyS" | "ArrowDown" => Some(Key::Down),
            "ShiftLeft" | "ShiftRight" => Some(Key::Dash),
            "KeyP" => Some(Key::Pause),
            "Enter" | "NumpadEnter" => Some(Key::Confirm),
            _ => None,
        }
    }
}

/// On-screen touch regions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchZone {
    Left,
    Right,
    Jump,
    Crouch,
}

impl TouchZone {
    /// Left third, right third, middle split into jump (top) and crouch (bottom)
    pub fn at(pos: Vec2, screen: Vec2) -> Self {
        if pos.x < screen.x * 0.33 {
            TouchZone::Left
        } else if pos.x > screen.x * 0.67 {
            TouchZone::Right
        } else if pos.y < screen.y * 0.5 {
            TouchZone::Jump
        } else {
            TouchZone::Crouch
        }
    }
}

/// Directional flags shared by the keyboard and touch sources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Held {
    left: bool,
    right: bool,
    up: bool,
    down: bool,
}

/// Collects raw device events between ticks
#[derive(Debug, Clone)]
pub struct InputAggregator {
    keys: Held,
    dash_key: bool,
    pause_key: bool,
    pause_pending: bool,
    touch: Held,
    /// Last pointer position of the active touch (swipe origin)
    touch_origin: Option<Vec2>,
    last_tap_ms: Option<f64>,
    /// Double tap: dash for exactly one poll
    dash_pulse: bool,
    screen: Vec2,
    is_mobile: bool,
    touch_seen: bool,
    policy: TouchControls,
}

impl InputAggregator {
    pub fn new(screen_width: f32, screen_height: f32, is_mobile: bool) -> Self {
        Self {
            keys: Held::default(),
            dash_key: false,
            pause_key: false,
            pause_pending: false,
            touch: Held::default(),
            touch_origin: None,
            last_tap_ms: None,
            dash_pulse: false,
            screen: Vec2::new(screen_width, screen_height),
            is_mobile,
            touch_seen: false,
            policy: TouchControls::Auto,
        }
    }

    pub fn set_touch_policy(&mut self, policy: TouchControls) {
        self.policy = policy;
        if !self.touch_enabled() {
            self.release_touch();
        }
    }

    pub fn key_down(&mut self, key: Key) {
        match key {
            Key::Left => self.keys.left = true,
            Key::Right => self.keys.right = true,
            Key::Up => self.keys.up = true,
            Key::Down => self.keys.down = true,
            Key::Dash => self.dash_key = true,
            Key::Pause => {
                // Auto-repeat does not re-toggle
                if !self.pause_key {
                    self.pause_pending = true;
                }
                self.pause_key = true;
            }
            Key::Confirm => {}
        }
    }

    pub fn key_up(&mut self, key: Key) {
        match key {
            Key::Left => self.keys.left = false,
            Key::Right => self.keys.right = false,
            Key::Up => self.keys.up = false,
            Key::Down => self.keys.down = false,
            Key::Dash => self.dash_key = false,
            Key::Pause => self.pause_key = false,
            Key::Confirm => {}
        }
    }

    /// Request a pause toggle on the next poll (auto-pause, menu buttons)
    pub fn request_pause(&mut self) {
        self.pause_pending = true;
    }

    /// Release everything (focus lost)
    pub fn clear(&mut self) {
        self.keys = Held::default();
        self.dash_key = false;
        self.pause_key = false;
        self.release_touch();
    }

    pub fn pointer_down(&mut self, x: f32, y: f32, time_ms: f64) {
        if !self.touch_seen {
            log::info!("Touch input detected");
            self.touch_seen = true;
        }
        if !self.touch_active() {
            return;
        }

        let pos = Vec2::new(x, y);
        self.touch_origin = Some(pos);
        match TouchZone::at(pos, self.screen) {
            TouchZone::Left => {
                self.touch.left = true;
                self.touch.right = false;
            }
            TouchZone::Right => {
                self.touch.right = true;
                self.touch.left = false;
            }
            TouchZone::Jump => self.touch.up = true,
            TouchZone::Crouch => self.touch.down = true,
        }

        // A double tap consumes both taps; a third starts a new pair
        if let Some(last) = self.last_tap_ms
            && time_ms - last < DOUBLE_TAP_MS
        {
            self.dash_pulse = true;
            self.last_tap_ms = None;
        } else {
            self.last_tap_ms = Some(time_ms);
        }
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if !self.touch_active() {
            return;
        }
        let Some(origin) = self.touch_origin else {
            return;
        };

        let pos = Vec2::new(x, y);
        let swipe = pos - origin;
        self.touch_origin = Some(pos);

        if swipe.x.abs() > SWIPE_THRESHOLD {
            self.touch.left = swipe.x < 0.0;
            self.touch.right = swipe.x > 0.0;
        }
        if swipe.y.abs() > SWIPE_THRESHOLD {
            self.touch.up = swipe.y < 0.0;
            self.touch.down = swipe.y > 0.0;
        }
    }

    pub fn pointer_up(&mut self) {
        self.release_touch();
    }

    fn release_touch(&mut self) {
        self.touch = Held::default();
        self.touch_origin = None;
        self.dash_pulse = false;
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.screen = Vec2::new(width, height);
        if !self.touch_active() {
            self.release_touch();
        }
    }

    pub fn is_landscape(&self) -> bool {
        self.screen.x > self.screen.y
    }

    fn touch_enabled(&self) -> bool {
        match self.policy {
            TouchControls::Auto => self.touch_seen,
            TouchControls::Always => true,
            TouchControls::Never => false,
        }
    }

    /// Touch events are interpreted (landscape only)
    pub fn touch_active(&self) -> bool {
        self.touch_enabled() && self.is_landscape()
    }

    pub fn touch_zones_visible(&self) -> bool {
        self.touch_active()
    }

    /// Mobile devices held in portrait cannot play
    pub fn orientation_blocks_play(&self) -> bool {
        self.is_mobile && !self.is_landscape()
    }

    /// Derive this tick's input. All flags start false.
    pub fn poll(&mut self) -> TickInput {
        let mut input = TickInput {
            pause: std::mem::take(&mut self.pause_pending),
            ..Default::default()
        };
        let dash_pulse = std::mem::take(&mut self.dash_pulse);

        if self.orientation_blocks_play() {
            return input;
        }

        input.left = self.keys.left;
        input.right = self.keys.right;
        input.up = self.keys.up;
        input.down = self.keys.down;
        input.dash = self.dash_key;

        if self.touch_active() {
            input.left |= self.touch.left;
            input.right |= self.touch.right;
            input.up |= self.touch.up;
            input.down |= self.touch.down;
            input.dash |= dash_pulse;
        }

        input
    }
}

/// User-agent sniffing for phones and tablets
pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    const MOBILE_MARKERS: [&str; 8] = [
        "android",
        "webos",
        "iphone",
        "ipad",
        "ipod",
        "blackberry",
        "iemobile",
        "opera mini",
    ];
    let ua = user_agent.to_lowercase();
    MOBILE_MARKERS.iter().any(|m| ua.contains(m))
}
