//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use super::collision::step_player;
use super::progression;
use super::state::{GameEvent, GameState, Phase};

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Dash modifier
    pub dash: bool,
    /// Pause toggle (edge, not level)
    pub pause: bool,
}

impl TickInput {
    /// -1.0 / 0.0 / 1.0; left wins when both are held
    pub fn horizontal(&self) -> f32 {
        if self.left {
            -1.0
        } else if self.right {
            1.0
        } else {
            0.0
        }
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();

    // Handle pause toggle
    if input.pause {
        state.paused = !state.paused;
        events.push(if state.paused {
            GameEvent::Paused
        } else {
            GameEvent::Resumed
        });
        log::debug!("Paused: {}", state.paused);
    }
    if state.paused {
        return events;
    }

    state.time_ticks += 1;

    match state.phase {
        Phase::Alive => {
            // Input -> motion
            state.player.advance_timers(input);
            state.player.apply_input(input);
            let min_x = state.camera.scroll_x;
            let grounded = step_player(&mut state.player, &state.terrain, dt, min_x);
            state.player.on_ground = grounded;

            // Camera, terrain and hazards
            state
                .camera
                .follow(state.player.pos.x, state.viewport.width);
            state.terrain.advance(state.camera.scroll_x, &mut state.rng);
            state.terrain.animate();
            state
                .death_line
                .follow(state.camera.scroll_x, state.viewport.width);
            state.death_line.animate(dt);

            // Progression checks see this tick's post-motion position
            progression::update_distance(state);
            if !progression::check_death(state, &mut events) {
                progression::check_checkpoint(state, &mut events);
            }

            if state.phase == Phase::Alive
                && state.save_clock.tick(state.progression.current_distance)
            {
                events.push(GameEvent::SaveRequested);
            }
        }
        Phase::Dying { .. } | Phase::LevelTransitioning { .. } => {
            state.terrain.animate();
            state.death_line.animate(dt);
            progression::advance_sequence(state, &mut events);
        }
    }

    events
}
