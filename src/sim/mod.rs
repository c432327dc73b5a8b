//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod camera;
pub mod collision;
pub mod player;
pub mod progression;
pub mod state;
pub mod terrain;
pub mod tick;

pub use camera::Camera;
pub use collision::{Rect, circle_intersects_rect, step_player};
pub use player::{Burst, MovementMode, Player};
pub use progression::{ResetReason, SaveClock, SaveSnapshot};
pub use state::{Checkpoint, DeathLine, GameEvent, GameState, Phase, Progression, VictoryStage, Viewport};
pub use terrain::{Branch, Hazard, TerrainSegment, TerrainStream, Tree};
pub use tick::{TickInput, tick};
