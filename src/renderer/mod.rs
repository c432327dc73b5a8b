//! Scene description for the presentation layer
//!
//! The simulation is drawn as a flat list of primitives in screen space
//! (world coordinates minus the camera scroll). Backends only need to fill
//! rectangles and circles and stroke lines.

pub mod shapes;

use glam::Vec2;

use crate::sim::Rect;

pub use shapes::build_scene;

/// Linear RGBA color (0..1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
            a: 1.0,
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: crate::lerp(self.r, other.r, t),
            g: crate::lerp(self.g, other.g, t),
            b: crate::lerp(self.b, other.b, t),
            a: crate::lerp(self.a, other.a, t),
        }
    }

    /// CSS `rgba()` string for canvas fill/stroke styles
    pub fn to_css(&self) -> String {
        format!(
            "rgba({},{},{},{:.3})",
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            self.a
        )
    }
}

/// Palette
pub mod palette {
    use super::Color;

    pub const SKY: Color = Color::rgb(0x87ceeb);
    pub const GROUND: Color = Color::rgb(0x808080);
    pub const GROUND_STRIPE: Color = Color::rgb(0x006400);
    pub const TRUNK: Color = Color::rgb(0x4a2800);
    pub const BRANCH: Color = Color::rgb(0x355e3b);
    pub const LAVA_COOL: Color = Color::rgb(0xff0000);
    pub const LAVA_HOT: Color = Color::rgb(0xffff00);
    pub const CHECKPOINT: Color = Color::rgb(0x00ff00);
    pub const PLAYER: Color = Color::rgb(0x00ff00);
    pub const DEATH_LINE: Color = Color::rgb(0xff0000);
    pub const VICTORY: Color = Color::rgb(0xffd700);
    pub const DEATH_TEXT: Color = Color::rgb(0xff0000);
    pub const GAME_OVER_TEXT: Color = Color::rgb(0x808080);
    pub const LIFE_FULL: Color = Color::rgb(0x00ff00);
    pub const LIFE_EMPTY: Color = Color::rgb(0x333333);
}

/// One drawing primitive in screen space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Rect { rect: Rect, color: Color },
    Circle { center: Vec2, radius: f32, color: Color },
    Line { from: Vec2, to: Vec2, width: f32, color: Color },
}
