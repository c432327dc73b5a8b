//! Game state and core simulation types
//!
//! Everything the simulation mutates lives in `GameState`; the adapter only
//! reads it between ticks.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::collision::{Rect, circle_intersects_rect};
use super::player::Player;
use super::progression::{self, ResetReason, SaveClock, SaveSnapshot};
use super::terrain::TerrainStream;
use crate::consts::*;
use crate::ms_to_ticks;

/// Death text shown before the blink starts
pub const DEATH_TEXT_TICKS: u32 = ms_to_ticks(DEATH_TEXT_MS);
/// Ticks between player visibility toggles
pub const BLINK_INTERVAL_TICKS: u32 = ms_to_ticks(BLINK_INTERVAL_MS);
/// Whole death sequence (text + blinks)
pub const DEATH_SEQUENCE_TICKS: u32 = DEATH_TEXT_TICKS + BLINK_TIMES * 2 * BLINK_INTERVAL_TICKS;

pub const VICTORY_FADE_IN_TICKS: u32 = ms_to_ticks(VICTORY_FADE_IN_MS);
pub const VICTORY_PULSE_TICKS: u32 = ms_to_ticks(VICTORY_PULSE_MS);
pub const FADE_TICKS: u32 = ms_to_ticks(FADE_MS);
/// Screen is fully black: level advances and the world resets
pub const VICTORY_MIDPOINT_TICKS: u32 =
    VICTORY_FADE_IN_TICKS + VICTORY_PULSES * VICTORY_PULSE_TICKS + FADE_TICKS;
pub const VICTORY_SEQUENCE_TICKS: u32 = VICTORY_MIDPOINT_TICKS + FADE_TICKS;

/// Logical screen size in world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Y of the ground surface (y grows downward)
    #[inline]
    pub fn ground_top(&self) -> f32 {
        self.height - GROUND_HEIGHT
    }
}

/// Level goal marker. Purely geometric, it has no physics body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Checkpoint {
    pub pos: Vec2,
    pub radius: f32,
}

impl Checkpoint {
    /// World x of the checkpoint for `level`
    pub fn x_for_level(level: u32) -> f32 {
        BASE_CHECKPOINT_DISTANCE * level as f32 * DISTANCE_SCALE + PLAYER_START_X
    }

    pub fn for_level(level: u32, viewport: &Viewport) -> Self {
        Self {
            pos: Vec2::new(
                Self::x_for_level(level),
                viewport.ground_top() - CHECKPOINT_HEIGHT,
            ),
            radius: CHECKPOINT_RADIUS,
        }
    }

    pub fn touches(&self, body: &Rect) -> bool {
        circle_intersects_rect(self.pos, self.radius, body)
    }
}

/// Progression state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Alive,
    /// Death text then blink; `final_life` when this death used the last life
    Dying { elapsed_ticks: u32, final_life: bool },
    /// Victory sequence after touching the checkpoint
    LevelTransitioning { elapsed_ticks: u32 },
}

/// Where the victory sequence is, with 0..1 progress through the stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VictoryStage {
    FadeIn(f32),
    Pulse { index: u32, progress: f32 },
    FadeToBlack(f32),
    FadeFromBlack(f32),
}

impl VictoryStage {
    pub fn at(elapsed_ticks: u32) -> Self {
        let pulses_end = VICTORY_FADE_IN_TICKS + VICTORY_PULSES * VICTORY_PULSE_TICKS;
        let progress = |t: u32, len: u32| (t as f32 / len as f32).min(1.0);

        if elapsed_ticks < VICTORY_FADE_IN_TICKS {
            VictoryStage::FadeIn(progress(elapsed_ticks, VICTORY_FADE_IN_TICKS))
        } else if elapsed_ticks < pulses_end {
            let t = elapsed_ticks - VICTORY_FADE_IN_TICKS;
            VictoryStage::Pulse {
                index: t / VICTORY_PULSE_TICKS,
                progress: progress(t % VICTORY_PULSE_TICKS, VICTORY_PULSE_TICKS),
            }
        } else if elapsed_ticks < VICTORY_MIDPOINT_TICKS {
            VictoryStage::FadeToBlack(progress(elapsed_ticks - pulses_end, FADE_TICKS))
        } else {
            VictoryStage::FadeFromBlack(progress(
                elapsed_ticks - VICTORY_MIDPOINT_TICKS,
                FADE_TICKS,
            ))
        }
    }
}

/// Distance / level / lives counters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progression {
    /// Meters travelled this life
    pub current_distance: f32,
    /// Best distance this session
    pub record_distance: f32,
    pub current_level: u32,
    pub current_lives: u8,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            current_distance: 0.0,
            record_distance: 0.0,
            current_level: 1,
            current_lives: MAX_LIVES,
        }
    }
}

impl Progression {
    /// Meters the current level requires
    pub fn checkpoint_distance(&self) -> f32 {
        BASE_CHECKPOINT_DISTANCE * self.current_level as f32
    }
}

/// Events emitted by the simulation for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Died { lives_left: u8, final_life: bool },
    /// Lives ran out; level stepped down to `level`
    LevelDown { level: u32 },
    Respawned,
    CheckpointReached { level: u32 },
    /// Midpoint of the victory sequence; now playing `level`
    LevelAdvanced { level: u32 },
    TransitionFinished,
    /// Adapter should persist a `SaveSnapshot`
    SaveRequested,
    Paused,
    Resumed,
}

/// Fall-out line below the lowest point lava can reach
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeathLine {
    pub y: f32,
    pub left: f32,
    pub right: f32,
    /// Alpha oscillation phase
    pub wave_time: f32,
}

impl DeathLine {
    pub fn new(viewport: &Viewport, camera_x: f32) -> Self {
        let lowest_lava = viewport.ground_top() + GROUND_HEIGHT / 2.0 + LAVA_FLOAT_AMPLITUDE;
        let mut line = Self {
            y: lowest_lava + DEATH_LINE_Y_OFFSET,
            left: 0.0,
            right: 0.0,
            wave_time: 0.0,
        };
        line.follow(camera_x, viewport.width);
        line
    }

    /// Span the visible region plus overhang
    pub fn follow(&mut self, camera_x: f32, viewport_width: f32) {
        self.left = camera_x - DEATH_LINE_OVERHANG;
        self.right = camera_x + viewport_width + DEATH_LINE_OVERHANG;
    }

    pub fn animate(&mut self, dt: f32) {
        self.wave_time += SIGNAL_WAVE_SPEED * dt;
    }

    pub fn alpha(&self) -> f32 {
        (DEATH_LINE_ALPHA + self.wave_time.sin() * SIGNAL_WAVE_AMPLITUDE).clamp(0.0, 1.0)
    }

    /// Whether a point at `y` has fallen past the line
    pub fn is_crossed_by(&self, y: f32) -> bool {
        y > self.y
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed (terrain generation)
    pub seed: u64,
    pub rng: Pcg32,
    pub viewport: Viewport,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub paused: bool,
    pub phase: Phase,
    pub progression: Progression,
    pub player: Player,
    pub terrain: TerrainStream,
    pub camera: Camera,
    pub checkpoint: Checkpoint,
    pub death_line: DeathLine,
    pub save_clock: SaveClock,
}

impl GameState {
    /// Fresh run at level 1 with full lives
    pub fn new(seed: u64, viewport: Viewport) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let terrain = TerrainStream::new(&viewport, &mut rng);
        let progression = Progression::default();

        log::info!("New run (seed {})", seed);

        Self {
            seed,
            rng,
            viewport,
            time_ticks: 0,
            paused: false,
            phase: Phase::Alive,
            player: Player::spawn(PLAYER_START_X, &viewport),
            terrain,
            camera: Camera::default(),
            checkpoint: Checkpoint::for_level(progression.current_level, &viewport),
            death_line: DeathLine::new(&viewport, 0.0),
            save_clock: SaveClock::default(),
            progression,
        }
    }

    /// Resume a saved run
    pub fn continue_from(seed: u64, viewport: Viewport, snapshot: &SaveSnapshot) -> Self {
        let mut state = Self::new(seed, viewport);
        progression::full_reset(&mut state, ResetReason::Continue(snapshot));
        state
    }

    pub fn is_dead(&self) -> bool {
        matches!(self.phase, Phase::Dying { .. })
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.phase, Phase::LevelTransitioning { .. })
    }

    /// Player visibility (blinks after the death text)
    pub fn player_visible(&self) -> bool {
        match self.phase {
            Phase::Dying { elapsed_ticks, .. } if elapsed_ticks >= DEATH_TEXT_TICKS => {
                let toggles = (elapsed_ticks - DEATH_TEXT_TICKS) / BLINK_INTERVAL_TICKS;
                toggles % 2 == 0
            }
            _ => true,
        }
    }

    pub fn victory_stage(&self) -> Option<VictoryStage> {
        match self.phase {
            Phase::LevelTransitioning { elapsed_ticks } => Some(VictoryStage::at(elapsed_ticks)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_lengths() {
        assert_eq!(DEATH_TEXT_TICKS, 120);
        assert_eq!(DEATH_SEQUENCE_TICKS, 192);
        assert_eq!(VICTORY_MIDPOINT_TICKS, 360);
        assert_eq!(VICTORY_SEQUENCE_TICKS, 480);
    }

    #[test]
    fn test_new_state() {
        let state = GameState::new(1, Viewport::default());
        assert_eq!(state.phase, Phase::Alive);
        assert_eq!(state.progression.current_level, 1);
        assert_eq!(state.progression.current_lives, MAX_LIVES);
        assert_eq!(state.player.pos.x, PLAYER_START_X);
        assert_eq!(state.camera.scroll_x, 0.0);
        assert_eq!(state.checkpoint.pos.x, 100.0 * DISTANCE_SCALE + PLAYER_START_X);
    }

    #[test]
    fn test_checkpoint_position_scales_with_level() {
        let viewport = Viewport::default();
        let cp = Checkpoint::for_level(3, &viewport);
        assert_eq!(cp.pos.x, 300.0 * DISTANCE_SCALE + PLAYER_START_X);
        assert_eq!(cp.pos.y, viewport.ground_top() - CHECKPOINT_HEIGHT);
        assert_eq!(cp.radius, CHECKPOINT_RADIUS);
    }

    #[test]
    fn test_death_line_below_lava() {
        let viewport = Viewport::default();
        let mut line = DeathLine::new(&viewport, 0.0);
        let lowest = viewport.ground_top() + GROUND_HEIGHT / 2.0 + LAVA_FLOAT_AMPLITUDE;
        assert_eq!(line.y, lowest + DEATH_LINE_Y_OFFSET);
        assert!(!line.is_crossed_by(line.y));
        assert!(line.is_crossed_by(line.y + 0.1));

        line.follow(2000.0, viewport.width);
        assert_eq!(line.left, 2000.0 - DEATH_LINE_OVERHANG);
        assert_eq!(line.right, 2000.0 + viewport.width + DEATH_LINE_OVERHANG);
    }

    #[test]
    fn test_player_blinks_after_death_text() {
        let mut state = GameState::new(1, Viewport::default());
        state.phase = Phase::Dying {
            elapsed_ticks: DEATH_TEXT_TICKS - 1,
            final_life: false,
        };
        assert!(state.player_visible());
        state.phase = Phase::Dying {
            elapsed_ticks: DEATH_TEXT_TICKS + BLINK_INTERVAL_TICKS,
            final_life: false,
        };
        assert!(!state.player_visible());
        state.phase = Phase::Dying {
            elapsed_ticks: DEATH_TEXT_TICKS + 2 * BLINK_INTERVAL_TICKS,
            final_life: false,
        };
        assert!(state.player_visible());
    }

    #[test]
    fn test_victory_stages() {
        assert_eq!(VictoryStage::at(0), VictoryStage::FadeIn(0.0));
        assert_eq!(
            VictoryStage::at(VICTORY_FADE_IN_TICKS + VICTORY_PULSE_TICKS),
            VictoryStage::Pulse {
                index: 1,
                progress: 0.0
            }
        );
        assert!(matches!(
            VictoryStage::at(VICTORY_MIDPOINT_TICKS - 1),
            VictoryStage::FadeToBlack(_)
        ));
        assert_eq!(
            VictoryStage::at(VICTORY_MIDPOINT_TICKS),
            VictoryStage::FadeFromBlack(0.0)
        );
    }
}
