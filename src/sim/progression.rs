//! Progression controller
//!
//! Distance tracking, the Alive / Dying / LevelTransitioning state machine,
//! the shared full-reset procedure and the save snapshot.
//!
//! Every entry point checks the current `Phase` first. A trigger that fires
//! while a sequence is already running is ignored, so overlapping lava for
//! many ticks still produces exactly one death.

use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::player::Player;
use super::state::{
    Checkpoint, DEATH_SEQUENCE_TICKS, DeathLine, GameEvent, GameState, Phase,
    VICTORY_MIDPOINT_TICKS, VICTORY_SEQUENCE_TICKS,
};
use crate::consts::*;
use crate::ms_to_ticks;

/// Periodic autosave interval
pub const AUTOSAVE_TICKS: u32 = ms_to_ticks(AUTOSAVE_MS);

/// Flat save-slot payload (camelCase keys on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSnapshot {
    pub current_level: u32,
    pub current_distance: f32,
    pub record_distance: f32,
    pub current_lives: u8,
    pub last_checkpoint_x: f32,
}

impl SaveSnapshot {
    /// Snapshot of the run as it will be once any running sequence resolves.
    ///
    /// A death in progress is saved with its outcome applied (lives spent,
    /// level stepped down when out of lives, back at the start), and a victory
    /// before its midpoint is saved at the next level. Quitting mid-sequence
    /// therefore cannot skip the result.
    pub fn capture(state: &GameState) -> Self {
        let p = &state.progression;
        let mut snapshot = Self {
            current_level: p.current_level,
            current_distance: p.current_distance,
            record_distance: p.record_distance,
            current_lives: p.current_lives,
            last_checkpoint_x: state.player.pos.x,
        };

        let reset = |s: &mut Self| {
            s.record_distance = p.record_distance.max(p.current_distance);
            s.current_distance = 0.0;
            s.last_checkpoint_x = PLAYER_START_X;
        };
        match state.phase {
            Phase::Alive => {}
            Phase::Dying { .. } => {
                reset(&mut snapshot);
                if p.current_lives == 0 {
                    snapshot.current_level = p.current_level.saturating_sub(1).max(1);
                    snapshot.current_lives = MAX_LIVES;
                }
            }
            Phase::LevelTransitioning { elapsed_ticks } => {
                if elapsed_ticks < VICTORY_MIDPOINT_TICKS {
                    reset(&mut snapshot);
                    snapshot.current_level = p.current_level + 1;
                    snapshot.current_lives = MAX_LIVES;
                } else {
                    snapshot.last_checkpoint_x = PLAYER_START_X;
                }
            }
        }
        snapshot
    }

    /// Like `capture`, but only while the player stands on something.
    /// Mid-air positions may be over a lava gap.
    pub fn settled(state: &GameState) -> Option<Self> {
        let airborne = state.phase == Phase::Alive && !state.player.on_ground;
        (!airborne).then(|| Self::capture(state))
    }

    /// Reject values a running game could never have produced
    pub fn validate(self) -> Option<Self> {
        let finite_non_negative = |v: f32| v.is_finite() && v >= 0.0;
        let valid = self.current_level >= 1
            && (1..=MAX_LIVES).contains(&self.current_lives)
            && finite_non_negative(self.current_distance)
            && finite_non_negative(self.record_distance)
            && self.last_checkpoint_x.is_finite();
        valid.then_some(self)
    }
}

/// Decides when the adapter should write a save
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveClock {
    ticks_since_save: u32,
    /// Highest `floor(distance / AUTOSAVE_DISTANCE)` seen this life
    milestone: u32,
}

impl SaveClock {
    /// Advance one tick; true when a save is due
    pub fn tick(&mut self, distance: f32) -> bool {
        let mut due = false;

        self.ticks_since_save += 1;
        if self.ticks_since_save >= AUTOSAVE_TICKS {
            self.ticks_since_save = 0;
            due = true;
        }

        let milestone = Self::milestone_for(distance);
        if milestone > self.milestone {
            self.milestone = milestone;
            due = true;
        }

        due
    }

    /// Re-base the distance milestone (after a reset)
    pub fn rebase(&mut self, distance: f32) {
        self.milestone = Self::milestone_for(distance);
    }

    fn milestone_for(distance: f32) -> u32 {
        (distance.max(0.0) / AUTOSAVE_DISTANCE).floor() as u32
    }
}

/// Why the world is being reset
#[derive(Debug, Clone, Copy)]
pub enum ResetReason<'a> {
    Death,
    LevelComplete,
    Continue(&'a SaveSnapshot),
}

/// Recompute the derived distance from the player's x
pub fn update_distance(state: &mut GameState) {
    state.progression.current_distance =
        (state.player.pos.x - PLAYER_START_X).max(0.0) / DISTANCE_SCALE;
}

/// Enter Dying if the player touches lava or falls past the death line
pub fn check_death(state: &mut GameState, events: &mut Vec<GameEvent>) -> bool {
    if state.phase != Phase::Alive {
        return false;
    }

    let body = state.player.bounds();
    let in_lava = state.terrain.hazard_colliders().any(|c| c.overlaps(&body));
    let fell = state.death_line.is_crossed_by(state.player.pos.y);
    if in_lava || fell {
        begin_dying(state, events);
        return true;
    }
    false
}

/// Alive -> Dying. Ignored in any other phase.
pub fn begin_dying(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if state.phase != Phase::Alive {
        return;
    }

    state.player.freeze();
    let p = &mut state.progression;
    p.current_lives = p.current_lives.saturating_sub(1);
    let final_life = p.current_lives == 0;
    state.phase = Phase::Dying {
        elapsed_ticks: 0,
        final_life,
    };

    log::info!(
        "Player died at {:.1}m ({} lives left)",
        p.current_distance,
        p.current_lives
    );
    events.push(GameEvent::Died {
        lives_left: p.current_lives,
        final_life,
    });
}

/// Alive -> LevelTransitioning when the player touches the checkpoint
pub fn check_checkpoint(state: &mut GameState, events: &mut Vec<GameEvent>) -> bool {
    if state.phase != Phase::Alive || !state.checkpoint.touches(&state.player.bounds()) {
        return false;
    }

    state.player.freeze();
    state.phase = Phase::LevelTransitioning { elapsed_ticks: 0 };
    log::info!("Checkpoint reached on level {}", state.progression.current_level);
    events.push(GameEvent::CheckpointReached {
        level: state.progression.current_level,
    });
    true
}

/// Advance a running death or victory sequence by one tick
pub fn advance_sequence(state: &mut GameState, events: &mut Vec<GameEvent>) {
    match state.phase {
        Phase::Alive => {}
        Phase::Dying {
            elapsed_ticks,
            final_life,
        } => {
            let elapsed_ticks = elapsed_ticks + 1;
            if elapsed_ticks < DEATH_SEQUENCE_TICKS {
                state.phase = Phase::Dying {
                    elapsed_ticks,
                    final_life,
                };
                return;
            }

            let p = &mut state.progression;
            if p.current_lives == 0 {
                p.current_level = p.current_level.saturating_sub(1).max(1);
                p.current_lives = MAX_LIVES;
                log::info!("Out of lives, back to level {}", p.current_level);
                events.push(GameEvent::LevelDown {
                    level: p.current_level,
                });
            }
            full_reset(state, ResetReason::Death);
            state.phase = Phase::Alive;
            events.push(GameEvent::Respawned);
        }
        Phase::LevelTransitioning { elapsed_ticks } => {
            let elapsed_ticks = elapsed_ticks + 1;

            if elapsed_ticks == VICTORY_MIDPOINT_TICKS {
                let p = &mut state.progression;
                p.current_level += 1;
                p.current_lives = MAX_LIVES;
                let level = p.current_level;
                full_reset(state, ResetReason::LevelComplete);
                // Stay frozen behind the fade until the sequence ends
                state.player.freeze();
                log::info!("Advanced to level {}", level);
                events.push(GameEvent::LevelAdvanced { level });
            }

            if elapsed_ticks >= VICTORY_SEQUENCE_TICKS {
                state.player.gravity_enabled = true;
                state.phase = Phase::Alive;
                events.push(GameEvent::TransitionFinished);
            } else {
                state.phase = Phase::LevelTransitioning { elapsed_ticks };
            }
        }
    }
}

/// Rebuild the world around the current progression counters.
///
/// Records the distance, regenerates terrain, respawns the player and moves
/// the camera and checkpoint. `Continue` additionally loads the snapshot's
/// counters and places the player at its saved x.
pub fn full_reset(state: &mut GameState, reason: ResetReason<'_>) {
    let p = &mut state.progression;
    p.record_distance = p.record_distance.max(p.current_distance);
    p.current_distance = 0.0;

    let (start_x, camera) = match reason {
        ResetReason::Death | ResetReason::LevelComplete => {
            (PLAYER_START_X, Camera::default())
        }
        ResetReason::Continue(snapshot) => {
            p.current_level = snapshot.current_level.max(1);
            p.current_distance = snapshot.current_distance;
            p.record_distance = snapshot.record_distance;
            p.current_lives = snapshot.current_lives.clamp(1, MAX_LIVES);
            let x = snapshot.last_checkpoint_x;
            (x, Camera::at(x - CONTINUE_CAMERA_LEAD))
        }
    };

    // Slot-aligned window starting one slot behind the camera
    let window_start =
        ((camera.scroll_x / GAP_SPACING).floor() * GAP_SPACING - GAP_SPACING).max(0.0);
    state.terrain.regenerate(window_start, &mut state.rng);

    state.player = Player::spawn(start_x, &state.viewport);
    state.camera = camera;
    state.checkpoint = Checkpoint::for_level(state.progression.current_level, &state.viewport);
    state.death_line = DeathLine::new(&state.viewport, camera.scroll_x);
    state.save_clock.rebase(state.progression.current_distance);

    log::info!(
        "World reset ({:?}): level {}, {} lives, record {:.1}m",
        reason,
        state.progression.current_level,
        state.progression.current_lives,
        state.progression.record_distance
    );
}
