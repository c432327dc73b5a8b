//! Player motion state machine
//!
//! Converts the per-tick input snapshot plus last step's ground contact into
//! velocity and size changes. Dash and slide are timed bursts held in a single
//! `Burst` slot, so they can never overlap; the dash cooldown runs separately
//! and only starts once a dash has ended.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::state::Viewport;
use super::tick::TickInput;
use crate::consts::*;
use crate::ms_to_ticks;

/// Dash duration in ticks
pub const DASH_DURATION_TICKS: u32 = ms_to_ticks(PLAYER_DASH_MS);
/// Dash cooldown in ticks (starts when the dash ends)
pub const DASH_COOLDOWN_TICKS: u32 = ms_to_ticks(PLAYER_DASH_COOLDOWN_MS);
/// Slide duration in ticks
pub const SLIDE_DURATION_TICKS: u32 = ms_to_ticks(PLAYER_SLIDE_MS);

/// The movement mode currently governing the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementMode {
    Run,
    Jump,
    Crouch,
    Dash,
    Slide,
}

/// Timed horizontal burst owning `vel.x` while active
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Burst {
    Idle,
    Dash { remaining_ticks: u32, direction: f32 },
    Slide { remaining_ticks: u32, speed: f32 },
}

/// The player body
#[derive(Debug, Clone)]
pub struct Player {
    /// Centre of the collision box
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    /// Resting on ground or a branch after the last physics step
    pub on_ground: bool,
    /// Last horizontal direction moved (-1.0 / 1.0)
    pub facing: f32,
    pub burst: Burst,
    pub dash_cooldown_ticks: u32,
    pub gravity_enabled: bool,
}

impl Player {
    /// Spawn at `x`, standing height, dropped from just above the ground
    pub fn spawn(x: f32, viewport: &Viewport) -> Self {
        Self {
            pos: Vec2::new(x, viewport.ground_top() - PLAYER_HEIGHT),
            vel: Vec2::ZERO,
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            on_ground: false,
            facing: 1.0,
            burst: Burst::Idle,
            dash_cooldown_ticks: 0,
            gravity_enabled: true,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.pos, self.size)
    }

    pub fn is_dashing(&self) -> bool {
        matches!(self.burst, Burst::Dash { .. })
    }

    pub fn is_sliding(&self) -> bool {
        matches!(self.burst, Burst::Slide { .. })
    }

    pub fn is_crouched(&self) -> bool {
        self.size.y == PLAYER_CROUCH_HEIGHT
    }

    /// Dash is off cooldown and not already running
    pub fn can_dash(&self) -> bool {
        self.dash_cooldown_ticks == 0 && !self.is_dashing()
    }

    pub fn mode(&self) -> MovementMode {
        match self.burst {
            Burst::Dash { .. } => MovementMode::Dash,
            Burst::Slide { .. } => MovementMode::Slide,
            Burst::Idle if !self.on_ground => MovementMode::Jump,
            Burst::Idle if self.is_crouched() => MovementMode::Crouch,
            Burst::Idle => MovementMode::Run,
        }
    }

    /// Stop in place and drop any running burst (death / victory)
    pub fn freeze(&mut self) {
        self.vel = Vec2::ZERO;
        self.gravity_enabled = false;
        self.burst = Burst::Idle;
    }

    /// Resize the collision box keeping the feet in place
    fn set_height(&mut self, height: f32) {
        if self.size.y == height {
            return;
        }
        let feet = self.pos.y + self.size.y / 2.0;
        self.size.y = height;
        self.pos.y = feet - height / 2.0;
    }

    /// Count down burst and cooldown timers. Runs before input each tick.
    pub fn advance_timers(&mut self, input: &TickInput) {
        if !self.is_dashing() {
            self.dash_cooldown_ticks = self.dash_cooldown_ticks.saturating_sub(1);
        }

        match self.burst {
            Burst::Dash {
                remaining_ticks,
                direction,
            } => {
                if remaining_ticks <= 1 {
                    self.burst = Burst::Idle;
                    self.vel.x = 0.0;
                    self.dash_cooldown_ticks = DASH_COOLDOWN_TICKS;
                    log::debug!("Dash ended, cooldown {} ticks", DASH_COOLDOWN_TICKS);
                } else {
                    self.burst = Burst::Dash {
                        remaining_ticks: remaining_ticks - 1,
                        direction,
                    };
                }
            }
            Burst::Slide {
                remaining_ticks,
                speed,
            } => {
                if remaining_ticks <= 1 {
                    self.burst = Burst::Idle;
                    // Still holding down: the crouch rule keeps the low profile
                    if !input.down {
                        self.set_height(PLAYER_HEIGHT);
                    }
                    log::debug!("Slide ended");
                } else {
                    self.burst = Burst::Slide {
                        remaining_ticks: remaining_ticks - 1,
                        speed,
                    };
                }
            }
            Burst::Idle => {}
        }
    }

    /// Apply the input snapshot. Rules are checked in priority order.
    pub fn apply_input(&mut self, input: &TickInput) {
        let grounded = self.on_ground;

        // Slide: grounded + down + dash
        if grounded && input.down && input.dash && self.burst == Burst::Idle {
            let direction = match input.horizontal() {
                0.0 if self.vel.x != 0.0 => self.vel.x.signum(),
                0.0 => self.facing,
                d => d,
            };
            self.start_slide(direction);
        }

        // Horizontal movement (bursts own vel.x)
        if self.burst == Burst::Idle {
            let direction = input.horizontal();
            if direction != 0.0 {
                self.facing = direction;
                if input.dash && self.can_dash() {
                    self.start_dash(direction);
                } else {
                    self.vel.x = direction * PLAYER_SPEED;
                }
            } else {
                self.vel.x = 0.0;
            }
        }

        match &mut self.burst {
            Burst::Dash { direction, .. } => self.vel.x = *direction * PLAYER_DASH_SPEED,
            Burst::Slide { speed, .. } => {
                *speed *= PLAYER_SLIDE_FRICTION;
                self.vel.x = *speed;
            }
            Burst::Idle => {}
        }

        // Jump impulse
        if grounded && input.up && !self.is_sliding() {
            self.vel.y = PLAYER_JUMP_SPEED;
        }

        // Crouch
        if !self.is_sliding() {
            if grounded && input.down {
                self.set_height(PLAYER_CROUCH_HEIGHT);
            } else {
                self.set_height(PLAYER_HEIGHT);
            }
        }
    }

    fn start_dash(&mut self, direction: f32) {
        self.burst = Burst::Dash {
            remaining_ticks: DASH_DURATION_TICKS,
            direction,
        };
        log::debug!("Dash started (direction {})", direction);
    }

    fn start_slide(&mut self, direction: f32) {
        self.burst = Burst::Slide {
            remaining_ticks: SLIDE_DURATION_TICKS,
            speed: direction * PLAYER_SLIDE_SPEED,
        };
        self.set_height(PLAYER_CROUCH_HEIGHT);
        log::debug!("Slide started (direction {})", direction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grounded_player() -> Player {
        let viewport = Viewport::default();
        let mut player = Player::spawn(PLAYER_START_X, &viewport);
        player.pos.y = viewport.ground_top() - PLAYER_HEIGHT / 2.0;
        player.on_ground = true;
        player
    }

    fn step(player: &mut Player, input: &TickInput) {
        player.advance_timers(input);
        player.apply_input(input);
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    fn right() -> TickInput {
        TickInput {
            right: true,
            ..Default::default()
        }
    }

    fn dash_right() -> TickInput {
        TickInput {
            right: true,
            dash: true,
            ..Default::default()
        }
    }

    fn slide() -> TickInput {
        TickInput {
            down: true,
            dash: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_run_and_stop() {
        let mut p = grounded_player();
        step(&mut p, &right());
        assert_eq!(p.vel.x, PLAYER_SPEED);
        assert_eq!(p.mode(), MovementMode::Run);

        step(&mut p, &TickInput { left: true, ..Default::default() });
        assert_eq!(p.vel.x, -PLAYER_SPEED);
        assert_eq!(p.facing, -1.0);

        step(&mut p, &idle());
        assert_eq!(p.vel.x, 0.0);
    }

    #[test]
    fn test_dash_cooldown() {
        let mut p = grounded_player();
        step(&mut p, &dash_right());
        assert!(p.is_dashing());
        assert_eq!(p.vel.x, PLAYER_DASH_SPEED);
        assert_eq!(p.mode(), MovementMode::Dash);

        // Tick 1 .. duration + cooldown - 2: idle
        for _ in 1..(DASH_DURATION_TICKS + DASH_COOLDOWN_TICKS - 1) {
            step(&mut p, &idle());
        }
        assert!(!p.is_dashing());

        // One tick short of duration + cooldown: dash refused, plain run
        step(&mut p, &dash_right());
        assert!(!p.is_dashing());
        assert_eq!(p.vel.x, PLAYER_SPEED);

        // Full duration + cooldown elapsed
        step(&mut p, &dash_right());
        assert!(p.is_dashing());
        assert_eq!(p.vel.x, PLAYER_DASH_SPEED);
    }

    #[test]
    fn test_dash_ends_and_zeroes_velocity() {
        let mut p = grounded_player();
        step(&mut p, &dash_right());
        for _ in 1..DASH_DURATION_TICKS {
            step(&mut p, &dash_right());
            assert!(p.is_dashing());
        }
        // Dash expires; still holding the keys only gets a run while cooling down
        step(&mut p, &dash_right());
        assert!(!p.is_dashing());
        assert_eq!(p.dash_cooldown_ticks, DASH_COOLDOWN_TICKS);
        assert_eq!(p.vel.x, PLAYER_SPEED);
    }

    #[test]
    fn test_dash_ignores_direction_changes() {
        let mut p = grounded_player();
        step(&mut p, &dash_right());
        step(&mut p, &TickInput { left: true, ..Default::default() });
        assert!(p.is_dashing());
        assert_eq!(p.vel.x, PLAYER_DASH_SPEED);
    }

    #[test]
    fn test_slide_decays_and_crouches() {
        let mut p = grounded_player();
        p.vel.x = PLAYER_SPEED;
        step(&mut p, &slide());
        assert!(p.is_sliding());
        assert_eq!(p.mode(), MovementMode::Slide);
        assert_eq!(p.size.y, PLAYER_CROUCH_HEIGHT);
        let first = p.vel.x;
        assert!((first - PLAYER_SLIDE_SPEED * PLAYER_SLIDE_FRICTION).abs() < 0.001);

        step(&mut p, &slide());
        assert!(p.vel.x < first);
        assert!(p.vel.x > 0.0);
    }

    #[test]
    fn test_slide_direction_fallbacks() {
        // Input direction wins
        let mut p = grounded_player();
        p.vel.x = PLAYER_SPEED;
        step(&mut p, &TickInput { left: true, down: true, dash: true, ..Default::default() });
        assert!(p.vel.x < 0.0);

        // No input, no velocity: facing
        let mut p = grounded_player();
        p.facing = -1.0;
        step(&mut p, &slide());
        assert!(p.vel.x < 0.0);
    }

    #[test]
    fn test_slide_ignores_horizontal_and_jump() {
        let mut p = grounded_player();
        step(&mut p, &slide());
        let input = TickInput {
            left: true,
            up: true,
            down: true,
            ..Default::default()
        };
        step(&mut p, &input);
        assert!(p.is_sliding());
        assert!(p.vel.x > 0.0);
        assert_eq!(p.vel.y, 0.0);
    }

    #[test]
    fn test_slide_end_restores_height_when_released() {
        let mut p = grounded_player();
        step(&mut p, &slide());
        for _ in 1..SLIDE_DURATION_TICKS {
            step(&mut p, &slide());
        }
        assert!(p.is_sliding());
        step(&mut p, &idle());
        assert!(!p.is_sliding());
        assert_eq!(p.size.y, PLAYER_HEIGHT);
        // Feet stay on the ground
        assert!((p.bounds().bottom() - Viewport::default().ground_top()).abs() < 0.001);
    }

    #[test]
    fn test_slide_end_keeps_crouch_while_down_held() {
        let mut p = grounded_player();
        step(&mut p, &slide());
        for _ in 1..SLIDE_DURATION_TICKS {
            step(&mut p, &slide());
        }
        let down = TickInput {
            down: true,
            ..Default::default()
        };
        step(&mut p, &down);
        assert!(!p.is_sliding());
        assert_eq!(p.size.y, PLAYER_CROUCH_HEIGHT);
        assert_eq!(p.mode(), MovementMode::Crouch);
    }

    #[test]
    fn test_no_slide_while_dashing() {
        let mut p = grounded_player();
        step(&mut p, &dash_right());
        step(&mut p, &slide());
        assert!(p.is_dashing());
        assert!(!p.is_sliding());
    }

    #[test]
    fn test_jump_only_when_grounded() {
        let mut p = grounded_player();
        let up = TickInput {
            up: true,
            ..Default::default()
        };
        step(&mut p, &up);
        assert_eq!(p.vel.y, PLAYER_JUMP_SPEED);

        let mut p = grounded_player();
        p.on_ground = false;
        step(&mut p, &up);
        assert_eq!(p.vel.y, 0.0);
        assert_eq!(p.mode(), MovementMode::Jump);
    }

    #[test]
    fn test_crouch_and_stand() {
        let mut p = grounded_player();
        let down = TickInput {
            down: true,
            ..Default::default()
        };
        step(&mut p, &down);
        assert_eq!(p.size.y, PLAYER_CROUCH_HEIGHT);
        assert_eq!(p.mode(), MovementMode::Crouch);
        step(&mut p, &idle());
        assert_eq!(p.size.y, PLAYER_HEIGHT);
        assert_eq!(p.mode(), MovementMode::Run);
    }

    #[test]
    fn test_dash_allowed_in_air() {
        let mut p = grounded_player();
        p.on_ground = false;
        step(&mut p, &dash_right());
        assert!(p.is_dashing());
    }
}
