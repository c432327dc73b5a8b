//! Shape generation for the world

use glam::Vec2;

use super::{Color, Shape, palette};
use crate::consts::*;
use crate::settings::Settings;
use crate::sim::{GameState, Hazard, Rect, Tree};

/// Extra world distance drawn past each side of the view
const CULL_MARGIN: f32 = 100.0;
const GROUND_STRIPE_SPACING: f32 = 10.0;
const GROUND_STRIPE_WIDTH: f32 = 3.0;
const DEATH_LINE_WIDTH: f32 = 2.0;

/// World -> screen translation
#[derive(Debug, Clone, Copy)]
struct View {
    scroll_x: f32,
    width: f32,
}

impl View {
    fn rect(&self, rect: Rect) -> Rect {
        let offset = Vec2::new(self.scroll_x, 0.0);
        Rect {
            min: rect.min - offset,
            max: rect.max - offset,
        }
    }

    fn point(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x - self.scroll_x, p.y)
    }

    fn visible(&self, left: f32, right: f32) -> bool {
        right >= self.scroll_x - CULL_MARGIN && left <= self.scroll_x + self.width + CULL_MARGIN
    }
}

/// Build the draw list for the current frame, back to front
pub fn build_scene(state: &GameState, settings: &Settings) -> Vec<Shape> {
    let view = View {
        scroll_x: state.camera.scroll_x,
        width: state.viewport.width,
    };
    let mut shapes = Vec::with_capacity(256);

    shapes.push(Shape::Rect {
        rect: Rect::from_min_size(Vec2::ZERO, Vec2::new(state.viewport.width, state.viewport.height)),
        color: palette::SKY,
    });

    for hazard in state.terrain.hazards() {
        if view.visible(hazard.left(), hazard.right()) {
            lava(&mut shapes, &view, hazard, settings.quality.lava_glow_layers());
        }
    }

    let ground_top = state.terrain.ground_top();
    for segment in state.terrain.segments() {
        if view.visible(segment.origin_x, segment.right_edge()) {
            ground(&mut shapes, view.rect(segment.bounds(ground_top)));
        }
    }

    for tree in state.terrain.trees() {
        let reach = TREE_WIDTH / 2.0 + BRANCH_LENGTH;
        if view.visible(tree.trunk_x - reach, tree.trunk_x + reach) {
            self::tree(&mut shapes, &view, tree);
        }
    }

    checkpoint(&mut shapes, &view, state, settings);

    let blink_hidden = settings.effective_death_blink() && !state.player_visible();
    if !blink_hidden {
        shapes.push(Shape::Rect {
            rect: view.rect(state.player.bounds()),
            color: palette::PLAYER,
        });
    }

    if settings.show_death_line {
        let line = &state.death_line;
        shapes.push(Shape::Line {
            from: view.point(Vec2::new(line.left, line.y)),
            to: view.point(Vec2::new(line.right, line.y)),
            width: DEATH_LINE_WIDTH,
            color: palette::DEATH_LINE.with_alpha(line.alpha()),
        });
    }

    shapes
}

/// Gray block with dark green horizontal stripes
fn ground(shapes: &mut Vec<Shape>, rect: Rect) {
    shapes.push(Shape::Rect {
        rect,
        color: palette::GROUND,
    });
    let mut y = rect.top();
    while y < rect.bottom() {
        shapes.push(Shape::Line {
            from: Vec2::new(rect.left(), y),
            to: Vec2::new(rect.right(), y),
            width: GROUND_STRIPE_WIDTH,
            color: palette::GROUND_STRIPE,
        });
        y += GROUND_STRIPE_SPACING;
    }
}

/// Lava color for the current heat (red -> yellow)
pub fn lava_color(hazard: &Hazard) -> Color {
    palette::LAVA_COOL.lerp(palette::LAVA_HOT, hazard.heat())
}

fn lava(shapes: &mut Vec<Shape>, view: &View, hazard: &Hazard, glow_layers: u32) {
    let color = lava_color(hazard);
    let center = view.point(hazard.center());

    // Outermost layer first
    for i in (1..=glow_layers).rev() {
        let size = Vec2::new(
            hazard.width + i as f32 * 20.0,
            hazard.height + i as f32 * 10.0,
        );
        shapes.push(Shape::Rect {
            rect: Rect::from_center_size(center, size),
            color: color.with_alpha(0.2 - i as f32 * 0.03),
        });
    }
    shapes.push(Shape::Rect {
        rect: view.rect(hazard.visual_bounds()),
        color,
    });
}

fn tree(shapes: &mut Vec<Shape>, view: &View, tree: &Tree) {
    shapes.push(Shape::Rect {
        rect: view.rect(tree.trunk_bounds()),
        color: palette::TRUNK,
    });
    for branch in &tree.branches {
        shapes.push(Shape::Rect {
            rect: view.rect(tree.branch_bounds(branch)),
            color: palette::BRANCH,
        });
    }
}

/// Pulse scale of the checkpoint glow at `time_secs`
pub fn checkpoint_pulse(time_secs: f32) -> f32 {
    1.0 + (time_secs * 2.0).sin() * 0.1
}

fn checkpoint(shapes: &mut Vec<Shape>, view: &View, state: &GameState, settings: &Settings) {
    let cp = &state.checkpoint;
    if !view.visible(cp.pos.x - cp.radius * 2.0, cp.pos.x + cp.radius * 2.0) {
        return;
    }

    let scale = if settings.effective_checkpoint_pulse() {
        checkpoint_pulse(state.time_ticks as f32 * SIM_DT)
    } else {
        1.0
    };
    let center = view.point(cp.pos);

    for i in (1..=settings.quality.checkpoint_glow_layers()).rev() {
        let radius = (cp.radius * 2.0 + i as f32 * 10.0) / 2.0;
        shapes.push(Shape::Circle {
            center,
            radius: radius * scale,
            color: palette::CHECKPOINT.with_alpha(0.2 - i as f32 * 0.03),
        });
    }
    shapes.push(Shape::Circle {
        center,
        radius: cp.radius * scale,
        color: palette::CHECKPOINT,
    });
}
