//! Collision detection and response for axis-aligned terrain
//!
//! Everything in the world is a rectangle except the checkpoint, which is a
//! circle tested geometrically (it has no physics body). Ground segments are
//! solid on every face; branches are one-way platforms that only block from
//! above.

use glam::Vec2;

use super::player::Player;
use super::terrain::TerrainStream;
use crate::consts::GRAVITY;

/// Tolerance when deciding whether the body was above a surface last step
const CONTACT_EPSILON: f32 = 0.5;

/// Axis-aligned rectangle in world space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn from_min_size(min: Vec2, size: Vec2) -> Self {
        Self { min, max: min + size }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.max.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.max.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Strict overlap (touching edges do not count)
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Horizontal extents overlap
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.min.x < other.max.x && self.max.x > other.min.x
    }
}

/// Circle-to-rectangle intersection (closest point test)
pub fn circle_intersects_rect(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let closest = center.clamp(rect.min, rect.max);
    (center - closest).length_squared() <= radius * radius
}

/// Advance the player body one step through the terrain.
///
/// Integrates gravity, moves on X then Y and resolves against solid ground
/// and one-way branches. `min_x` is the left edge the body may not cross
/// (the camera's left edge). Returns whether the body ended the step resting
/// on something; the caller stores that as the next tick's ground signal.
pub fn step_player(player: &mut Player, terrain: &TerrainStream, dt: f32, min_x: f32) -> bool {
    if player.gravity_enabled {
        player.vel.y += GRAVITY * dt;
    }

    let prev = player.bounds();
    let half = player.size * 0.5;

    // --- X axis ---
    player.pos.x += player.vel.x * dt;
    if player.pos.x - half.x < min_x {
        player.pos.x = min_x + half.x;
        if player.vel.x < 0.0 {
            player.vel.x = 0.0;
        }
    }
    for solid in terrain.solids() {
        let body = player.bounds();
        if !body.overlaps(&solid) {
            continue;
        }
        // Bodies that were resting on top are resolved on the Y pass
        if prev.bottom() <= solid.top() + CONTACT_EPSILON {
            continue;
        }
        if prev.center().x < solid.center().x {
            player.pos.x = solid.left() - half.x;
        } else {
            player.pos.x = solid.right() + half.x;
        }
        player.vel.x = 0.0;
    }

    // --- Y axis ---
    player.pos.y += player.vel.y * dt;
    let mut grounded = false;
    for solid in terrain.solids() {
        let body = player.bounds();
        if !body.overlaps(&solid) {
            continue;
        }
        if player.vel.y >= 0.0 && prev.bottom() <= solid.top() + CONTACT_EPSILON {
            player.pos.y = solid.top() - half.y;
            player.vel.y = 0.0;
            grounded = true;
        } else if player.vel.y < 0.0 && prev.top() >= solid.bottom() - CONTACT_EPSILON {
            player.pos.y = solid.bottom() + half.y;
            player.vel.y = 0.0;
        }
    }

    // Branches: top face only
    if player.vel.y >= 0.0 {
        for platform in terrain.platforms() {
            let body = player.bounds();
            if body.overlaps_x(&platform)
                && prev.bottom() <= platform.top() + CONTACT_EPSILON
                && body.bottom() >= platform.top()
            {
                player.pos.y = platform.top() - half.y;
                player.vel.y = 0.0;
                grounded = true;
            }
        }
    }

    grounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::state::Viewport;
    use crate::sim::terrain::{Branch, Tree};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn flat_terrain() -> (TerrainStream, Viewport) {
        let viewport = Viewport::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut terrain = TerrainStream::new(&viewport, &mut rng);
        terrain.clear_trees();
        (terrain, viewport)
    }

    #[test]
    fn test_rect_overlap_is_strict() {
        let a = Rect::from_min_size(Vec2::ZERO, Vec2::splat(10.0));
        let b = Rect::from_min_size(Vec2::new(10.0, 0.0), Vec2::splat(10.0));
        let c = Rect::from_min_size(Vec2::new(5.0, 5.0), Vec2::splat(10.0));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert_eq!(c.center(), Vec2::splat(10.0));
    }

    #[test]
    fn test_circle_rect_intersection() {
        let rect = Rect::from_center_size(Vec2::new(100.0, 100.0), Vec2::new(30.0, 60.0));
        // Circle touching the right face
        assert!(circle_intersects_rect(Vec2::new(140.0, 100.0), 30.0, &rect));
        // Circle near the corner but outside
        assert!(!circle_intersects_rect(Vec2::new(140.0, 160.0), 30.0, &rect));
        // Centre inside the rect
        assert!(circle_intersects_rect(Vec2::new(100.0, 100.0), 1.0, &rect));
    }

    #[test]
    fn test_player_lands_on_ground() {
        let (terrain, viewport) = flat_terrain();
        let mut player = Player::spawn(PLAYER_START_X, &viewport);

        let mut grounded = false;
        for _ in 0..240 {
            grounded = step_player(&mut player, &terrain, SIM_DT, 0.0);
        }
        assert!(grounded);
        let feet = player.bounds().bottom();
        assert!((feet - viewport.ground_top()).abs() < 0.01);
        assert_eq!(player.vel.y, 0.0);
    }

    #[test]
    fn test_ground_contact_persists_while_standing() {
        let (terrain, viewport) = flat_terrain();
        let mut player = Player::spawn(PLAYER_START_X, &viewport);
        for _ in 0..240 {
            step_player(&mut player, &terrain, SIM_DT, 0.0);
        }
        for _ in 0..10 {
            assert!(step_player(&mut player, &terrain, SIM_DT, 0.0));
        }
    }

    #[test]
    fn test_branch_blocks_only_from_above() {
        let (mut terrain, viewport) = flat_terrain();
        let ground = viewport.ground_top();
        terrain.push_tree(Tree {
            trunk_x: 150.0,
            base_y: ground,
            trunk_height: 200.0,
            branches: vec![Branch {
                side: 1.0,
                offset_y: 100.0,
                collidable: true,
            }],
        });
        let branch_top = ground - 100.0 - BRANCH_HEIGHT / 2.0;

        // Jumping up through the branch from below is allowed
        let mut player = Player::spawn(190.0, &viewport);
        player.pos.y = ground - PLAYER_HEIGHT / 2.0;
        player.vel.y = PLAYER_JUMP_SPEED;
        let mut passed_through = false;
        for _ in 0..30 {
            step_player(&mut player, &terrain, SIM_DT, 0.0);
            if player.bounds().bottom() < branch_top {
                passed_through = true;
                break;
            }
        }
        assert!(passed_through);

        // Falling back down lands on top of it
        let mut grounded = false;
        for _ in 0..240 {
            grounded = step_player(&mut player, &terrain, SIM_DT, 0.0);
            if grounded {
                break;
            }
        }
        assert!(grounded);
        assert!((player.bounds().bottom() - branch_top).abs() < 0.01);
    }

    #[test]
    fn test_left_edge_clamp() {
        let (terrain, viewport) = flat_terrain();
        let mut player = Player::spawn(PLAYER_START_X, &viewport);
        player.vel.x = -PLAYER_SPEED;
        for _ in 0..120 {
            step_player(&mut player, &terrain, SIM_DT, 50.0);
        }
        assert!((player.bounds().left() - 50.0).abs() < 0.01);
    }
}
