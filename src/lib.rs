//! Island Crisis - a side-scrolling endless runner
//!
//! Core modules:
//! - `sim`: Fixed-step simulation (terrain streaming, player motion, progression)
//! - `platform`: Browser/native platform abstraction (input, key-value storage)
//! - `persistence`: Single flat save slot for Continue
//! - `renderer`: Scene description consumed by the presentation layer
//! - `settings`: Player preferences
//! - `ui`: Title/pause menus, HUD text and overlays

pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod ui;

pub use settings::{QualityPreset, Settings, TouchControls};

/// Game configuration constants
pub mod consts {
    /// Simulation rate (movement tuning is per 60 fps frame)
    pub const TICK_RATE: u32 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / TICK_RATE as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Terrain
    pub const GROUND_HEIGHT: f32 = 100.0;
    pub const GAP_WIDTH: f32 = 200.0;
    pub const GAP_SPACING: f32 = 500.0;
    pub const SEGMENT_WIDTH: f32 = GAP_SPACING - GAP_WIDTH;

    /// Lava
    pub const LAVA_FLOAT_SPEED: f32 = 1.5;
    pub const LAVA_FLOAT_AMPLITUDE: f32 = 10.0;
    /// Phase advance per tick (drives both float and color cycle)
    pub const LAVA_PHASE_PER_TICK: f32 = 0.05;
    pub const LAVA_GLOW_LAYERS: u32 = 5;
    /// Collider is 90% of the visible lava pool
    pub const LAVA_COLLIDER_SCALE: f32 = 0.9;

    /// Trees
    pub const MIN_TREE_HEIGHT: u32 = 100;
    pub const MAX_TREE_HEIGHT: u32 = 400;
    pub const TREE_WIDTH: f32 = 20.0;
    pub const TREE_SLOT_WIDTH: f32 = 100.0;
    pub const TREE_CHANCE: f64 = 0.7;
    pub const BRANCH_LENGTH: f32 = 80.0;
    pub const BRANCH_HEIGHT: f32 = 10.0;
    pub const MIN_BRANCHES: u32 = 1;
    pub const MAX_BRANCHES: u32 = 3;

    /// Player
    pub const PLAYER_WIDTH: f32 = 30.0;
    pub const PLAYER_HEIGHT: f32 = 60.0;
    pub const PLAYER_CROUCH_HEIGHT: f32 = 30.0;
    pub const PLAYER_START_X: f32 = 100.0;
    pub const PLAYER_SPEED: f32 = 200.0;
    /// Negative is up (screen coordinates)
    pub const PLAYER_JUMP_SPEED: f32 = -400.0;
    pub const PLAYER_DASH_SPEED: f32 = 400.0;
    pub const PLAYER_DASH_MS: u32 = 200;
    pub const PLAYER_DASH_COOLDOWN_MS: u32 = 1000;
    pub const PLAYER_SLIDE_SPEED: f32 = 500.0;
    pub const PLAYER_SLIDE_MS: u32 = 500;
    /// Slide speed multiplier applied every tick
    pub const PLAYER_SLIDE_FRICTION: f32 = 0.95;
    pub const GRAVITY: f32 = 300.0;

    /// Checkpoint / distance
    pub const BASE_CHECKPOINT_DISTANCE: f32 = 100.0;
    /// World pixels per meter
    pub const DISTANCE_SCALE: f32 = 50.0;
    pub const CHECKPOINT_RADIUS: f32 = 30.0;
    /// Height of the checkpoint centre above the ground surface
    pub const CHECKPOINT_HEIGHT: f32 = 150.0;
    pub const CHECKPOINT_GLOW_LAYERS: u32 = 5;

    /// Lives
    pub const MAX_LIVES: u8 = 3;
    pub const LIFE_CIRCLE_RADIUS: f32 = 10.0;
    pub const LIFE_CIRCLE_SPACING: f32 = 25.0;

    /// Death sequence
    pub const DEATH_TEXT_MS: u32 = 2000;
    pub const BLINK_TIMES: u32 = 3;
    pub const BLINK_INTERVAL_MS: u32 = 200;
    pub const DEATH_LINE_Y_OFFSET: f32 = 50.0;
    /// How far the death line extends past either side of the view
    pub const DEATH_LINE_OVERHANG: f32 = 1000.0;
    pub const DEATH_LINE_ALPHA: f32 = 0.8;
    /// Death line alpha oscillation (radians per second / alpha swing)
    pub const SIGNAL_WAVE_SPEED: f32 = 2.0;
    pub const SIGNAL_WAVE_AMPLITUDE: f32 = 0.2;

    /// Victory sequence
    pub const VICTORY_FADE_IN_MS: u32 = 1000;
    pub const VICTORY_PULSE_MS: u32 = 1000;
    pub const VICTORY_PULSES: u32 = 3;
    pub const FADE_MS: u32 = 2000;
    pub const VICTORY_GLOW_LAYERS: u32 = 5;

    /// Camera
    pub const CAMERA_LERP: f32 = 0.08;
    pub const CAMERA_DEADZONE: f32 = 100.0;
    /// Camera offset behind the player when continuing a saved run
    pub const CONTINUE_CAMERA_LEAD: f32 = 200.0;

    /// Persistence
    pub const AUTOSAVE_MS: u32 = 5000;
    pub const AUTOSAVE_DISTANCE: f32 = 100.0;

    /// Touch controls
    pub const SWIPE_THRESHOLD: f32 = 50.0;
    pub const DOUBLE_TAP_MS: f64 = 300.0;
}

/// Convert a millisecond duration to whole simulation ticks (rounded up)
#[inline]
pub const fn ms_to_ticks(ms: u32) -> u32 {
    (ms * consts::TICK_RATE).div_ceil(1000)
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
