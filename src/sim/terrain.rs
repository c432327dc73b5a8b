//! Procedural terrain stream
//!
//! The world is tiled by fixed-width *slots*: a ground segment followed by a
//! lava-filled gap. The stream owns a fixed pool of slots; when a slot scrolls
//! more than one spacing behind the camera it is regenerated at the far end of
//! the window, so the world is endless but the pool never grows.
//!
//! Trees are scenery with one-way branch platforms. They are not owned by a
//! slot and are swept by position every tick.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::Rect;
use super::state::Viewport;
use crate::consts::*;

/// One ground tile
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainSegment {
    pub id: u32,
    pub origin_x: f32,
    pub width: f32,
    pub ground_height: f32,
    pub has_collision: bool,
}

impl TerrainSegment {
    #[inline]
    pub fn right_edge(&self) -> f32 {
        self.origin_x + self.width
    }

    /// End of the gap that follows this segment
    #[inline]
    pub fn slot_end(&self) -> f32 {
        self.origin_x + GAP_SPACING
    }

    /// Solid body (visual ground block)
    pub fn bounds(&self, ground_top: f32) -> Rect {
        Rect::from_min_size(
            Vec2::new(self.origin_x, ground_top),
            Vec2::new(self.width, self.ground_height),
        )
    }
}

/// Floating lava pool filling the gap after a segment
#[derive(Debug, Clone, PartialEq)]
pub struct Hazard {
    /// Segment whose gap this lava fills
    pub segment_id: u32,
    pub center_x: f32,
    pub width: f32,
    pub height: f32,
    pub base_y: f32,
    pub anim_phase: f32,
}

impl Hazard {
    fn for_segment(segment: &TerrainSegment, ground_top: f32) -> Self {
        Self {
            segment_id: segment.id,
            center_x: segment.right_edge() + GAP_WIDTH / 2.0,
            width: GAP_WIDTH,
            height: GROUND_HEIGHT,
            base_y: ground_top + GROUND_HEIGHT / 2.0,
            anim_phase: 0.0,
        }
    }

    /// Advance the float/color cycle by one tick
    pub fn animate(&mut self) {
        self.anim_phase += LAVA_PHASE_PER_TICK;
    }

    /// Vertical float offset (sine of the animation phase)
    pub fn float_offset(&self) -> f32 {
        (self.anim_phase * LAVA_FLOAT_SPEED).sin() * LAVA_FLOAT_AMPLITUDE
    }

    /// 0.0 = red, 1.0 = yellow
    pub fn heat(&self) -> f32 {
        self.anim_phase.sin().abs()
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.center_x, self.base_y + self.float_offset())
    }

    /// Visible pool
    pub fn visual_bounds(&self) -> Rect {
        Rect::from_center_size(self.center(), Vec2::new(self.width, self.height))
    }

    /// Invisible collision body: fixed size, follows the float offset
    pub fn collider_bounds(&self) -> Rect {
        Rect::from_center_size(
            self.center(),
            Vec2::new(self.width, self.height) * LAVA_COLLIDER_SCALE,
        )
    }

    pub fn left(&self) -> f32 {
        self.center_x - self.width / 2.0
    }

    pub fn right(&self) -> f32 {
        self.center_x + self.width / 2.0
    }
}

/// A branch sticking out of a tree trunk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Branch {
    /// -1.0 = left of the trunk, 1.0 = right
    pub side: f32,
    /// Height of the branch centre above the tree base
    pub offset_y: f32,
    /// Collidable branches are one-way platforms (top face only)
    pub collidable: bool,
}

/// Decorative tree
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    pub trunk_x: f32,
    /// Ground surface the trunk stands on
    pub base_y: f32,
    pub trunk_height: f32,
    pub branches: Vec<Branch>,
}

impl Tree {
    pub fn trunk_bounds(&self) -> Rect {
        Rect::from_min_size(
            Vec2::new(self.trunk_x - TREE_WIDTH / 2.0, self.base_y - self.trunk_height),
            Vec2::new(TREE_WIDTH, self.trunk_height),
        )
    }

    pub fn branch_bounds(&self, branch: &Branch) -> Rect {
        Rect::from_center_size(
            Vec2::new(
                self.trunk_x + branch.side * BRANCH_LENGTH / 2.0,
                self.base_y - branch.offset_y,
            ),
            Vec2::new(BRANCH_LENGTH, BRANCH_HEIGHT),
        )
    }
}

/// Fixed pool of terrain slots plus loose scenery
#[derive(Debug, Clone)]
pub struct TerrainStream {
    segments: Vec<TerrainSegment>,
    hazards: Vec<Hazard>,
    trees: Vec<Tree>,
    ground_top: f32,
    pool_size: usize,
    next_id: u32,
}

impl TerrainStream {
    /// Create the initial window starting at the world origin
    pub fn new(viewport: &Viewport, rng: &mut Pcg32) -> Self {
        let mut stream = Self {
            segments: Vec::new(),
            hazards: Vec::new(),
            trees: Vec::new(),
            ground_top: viewport.ground_top(),
            pool_size: Self::pool_size_for(viewport.width),
            next_id: 1,
        };
        stream.regenerate(0.0, rng);
        stream
    }

    /// Number of slots needed to keep `[camera - spacing, camera + width + spacing]` covered
    pub fn pool_size_for(viewport_width: f32) -> usize {
        ((viewport_width.max(0.0) + 3.0 * GAP_SPACING) / GAP_SPACING).ceil() as usize
    }

    /// Destroy everything and lay out a fresh window beginning at `start_x`
    pub fn regenerate(&mut self, start_x: f32, rng: &mut Pcg32) {
        self.segments.clear();
        self.hazards.clear();
        self.trees.clear();
        for i in 0..self.pool_size {
            self.spawn_slot(start_x + i as f32 * GAP_SPACING, rng);
        }
        log::debug!(
            "Terrain window regenerated at x={} ({} slots)",
            start_x,
            self.pool_size
        );
    }

    /// Recycle slots that fell behind the camera and sweep stale scenery.
    ///
    /// Returns the number of slots recycled.
    pub fn advance(&mut self, camera_x: f32, rng: &mut Pcg32) -> usize {
        let threshold = camera_x - GAP_SPACING;
        let mut recycled = 0;

        while let Some(idx) = self.segments.iter().position(|s| s.slot_end() < threshold) {
            let old = self.segments.swap_remove(idx);
            self.hazards.retain(|h| h.segment_id != old.id);
            let new_x = self.far_origin() + GAP_SPACING;
            self.spawn_slot(new_x, rng);
            recycled += 1;
        }

        if recycled > 0 {
            log::debug!("Recycled {} terrain slot(s), window ends at {}", recycled, self.window_end());
        }

        self.sweep_trees(threshold);
        recycled
    }

    /// Advance the lava float/color animation
    pub fn animate(&mut self) {
        for hazard in &mut self.hazards {
            hazard.animate();
        }
    }

    fn far_origin(&self) -> f32 {
        self.segments
            .iter()
            .map(|s| s.origin_x)
            .fold(f32::NEG_INFINITY, f32::max)
    }

    fn spawn_slot(&mut self, origin_x: f32, rng: &mut Pcg32) {
        let segment = TerrainSegment {
            id: self.next_id,
            origin_x,
            width: SEGMENT_WIDTH,
            ground_height: GROUND_HEIGHT,
            has_collision: true,
        };
        self.next_id += 1;

        self.hazards.push(Hazard::for_segment(&segment, self.ground_top));

        let tree_slots = (SEGMENT_WIDTH / TREE_SLOT_WIDTH).floor() as u32;
        for i in 0..tree_slots {
            if rng.random_bool(TREE_CHANCE) {
                let trunk_x = origin_x + i as f32 * TREE_SLOT_WIDTH + rng.random_range(50..=80) as f32;
                let tree = generate_tree(trunk_x, self.ground_top, rng);
                self.trees.push(tree);
            }
        }

        self.segments.push(segment);
    }

    fn sweep_trees(&mut self, threshold: f32) {
        for tree in &mut self.trees {
            let trunk_x = tree.trunk_x;
            tree.branches
                .retain(|b| trunk_x + b.side * BRANCH_LENGTH / 2.0 >= threshold);
        }
        self.trees
            .retain(|t| !t.branches.is_empty() || t.trunk_bounds().right() >= threshold);
    }

    pub fn segments(&self) -> &[TerrainSegment] {
        &self.segments
    }

    pub fn hazards(&self) -> &[Hazard] {
        &self.hazards
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn ground_top(&self) -> f32 {
        self.ground_top
    }

    /// Solid ground bodies
    pub fn solids(&self) -> impl Iterator<Item = Rect> + '_ {
        let top = self.ground_top;
        self.segments
            .iter()
            .filter(|s| s.has_collision)
            .map(move |s| s.bounds(top))
    }

    /// One-way branch platforms
    pub fn platforms(&self) -> impl Iterator<Item = Rect> + '_ {
        self.trees.iter().flat_map(|tree| {
            tree.branches
                .iter()
                .filter(|b| b.collidable)
                .map(move |b| tree.branch_bounds(b))
        })
    }

    /// Lava collision bodies at their current float offset
    pub fn hazard_colliders(&self) -> impl Iterator<Item = Rect> + '_ {
        self.hazards.iter().map(Hazard::collider_bounds)
    }

    /// Leftmost covered x
    pub fn window_start(&self) -> f32 {
        self.segments
            .iter()
            .map(|s| s.origin_x)
            .fold(f32::INFINITY, f32::min)
    }

    /// Rightmost covered x (end of the last gap)
    pub fn window_end(&self) -> f32 {
        self.far_origin() + GAP_SPACING
    }

    /// Whether `x` lies on a segment or over a lava gap
    pub fn covers(&self, x: f32) -> bool {
        self.segments
            .iter()
            .any(|s| x >= s.origin_x && x <= s.right_edge())
            || self.hazards.iter().any(|h| x >= h.left() && x <= h.right())
    }

    #[cfg(test)]
    pub(crate) fn clear_trees(&mut self) {
        self.trees.clear();
    }

    #[cfg(test)]
    pub(crate) fn push_tree(&mut self, tree: Tree) {
        self.trees.push(tree);
    }
}

fn generate_tree(trunk_x: f32, base_y: f32, rng: &mut Pcg32) -> Tree {
    let trunk_height = rng.random_range(MIN_TREE_HEIGHT..=MAX_TREE_HEIGHT) as f32;
    let count = rng.random_range(MIN_BRANCHES..=MAX_BRANCHES);
    let branches = (0..count)
        .map(|_| Branch {
            side: if rng.random_bool(0.5) { -1.0 } else { 1.0 },
            offset_y: rng.random_range(trunk_height * 0.3..=trunk_height * 0.9),
            collidable: true,
        })
        .collect();

    Tree {
        trunk_x,
        base_y,
        trunk_height,
        branches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn stream(seed: u64) -> (TerrainStream, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let stream = TerrainStream::new(&Viewport::default(), &mut rng);
        (stream, rng)
    }

    #[test]
    fn test_initial_window_is_contiguous() {
        let (terrain, _) = stream(1);
        let viewport = Viewport::default();
        assert_eq!(terrain.segments().len(), terrain.pool_size());
        assert_eq!(terrain.hazards().len(), terrain.pool_size());
        assert_eq!(terrain.window_start(), 0.0);
        assert!(terrain.window_end() >= viewport.width + 2.0 * GAP_SPACING);

        let mut x = 0.0;
        while x <= terrain.window_end() {
            assert!(terrain.covers(x), "gap in initial terrain at x={}", x);
            x += 10.0;
        }
    }

    #[test]
    fn test_hazard_fills_gap_after_segment() {
        let (terrain, _) = stream(2);
        for segment in terrain.segments() {
            let hazard = terrain
                .hazards()
                .iter()
                .find(|h| h.segment_id == segment.id)
                .expect("every segment has a hazard");
            assert_eq!(hazard.left(), segment.right_edge());
            assert_eq!(hazard.right(), segment.slot_end());
            let collider = hazard.collider_bounds();
            assert!((collider.size().x - GAP_WIDTH * 0.9).abs() < 0.001);
            assert!((collider.size().y - GROUND_HEIGHT * 0.9).abs() < 0.001);
        }
    }

    #[test]
    fn test_recycle_moves_slot_to_far_end() {
        let (mut terrain, mut rng) = stream(3);
        let end_before = terrain.window_end();
        // First slot ends at 500, so it qualifies once camera passes 1000
        let recycled = terrain.advance(1000.5, &mut rng);
        assert_eq!(recycled, 1);
        assert_eq!(terrain.segments().len(), terrain.pool_size());
        assert_eq!(terrain.hazards().len(), terrain.pool_size());
        assert_eq!(terrain.window_start(), GAP_SPACING);
        assert_eq!(terrain.window_end(), end_before + GAP_SPACING);
    }

    #[test]
    fn test_slot_kept_until_fully_behind() {
        let (mut terrain, mut rng) = stream(4);
        assert_eq!(terrain.advance(1000.0, &mut rng), 0);
        assert_eq!(terrain.window_start(), 0.0);
    }

    #[test]
    fn test_trees_are_swept_by_position() {
        let (mut terrain, mut rng) = stream(5);
        terrain.advance(5000.0, &mut rng);
        let threshold = 5000.0 - GAP_SPACING;
        for tree in terrain.trees() {
            for branch in &tree.branches {
                assert!(tree.branch_bounds(branch).center().x >= threshold);
            }
            assert!(!tree.branches.is_empty() || tree.trunk_bounds().right() >= threshold);
        }
    }

    #[test]
    fn test_tree_generation_ranges() {
        let (terrain, _) = stream(6);
        assert!(!terrain.trees().is_empty());
        for tree in terrain.trees() {
            assert!(tree.trunk_height >= MIN_TREE_HEIGHT as f32);
            assert!(tree.trunk_height <= MAX_TREE_HEIGHT as f32);
            let count = tree.branches.len() as u32;
            assert!((MIN_BRANCHES..=MAX_BRANCHES).contains(&count));
            for branch in &tree.branches {
                assert!(branch.side == 1.0 || branch.side == -1.0);
                assert!(branch.offset_y >= tree.trunk_height * 0.3 - 0.001);
                assert!(branch.offset_y <= tree.trunk_height * 0.9 + 0.001);
            }
            // Trunk stands on a segment
            assert!(terrain
                .segments()
                .iter()
                .any(|s| tree.trunk_x > s.origin_x && tree.trunk_x < s.right_edge()));
        }
    }

    #[test]
    fn test_lava_float_is_bounded() {
        let (mut terrain, _) = stream(7);
        let base = terrain.hazards()[0].base_y;
        for _ in 0..1000 {
            terrain.animate();
            let hazard = &terrain.hazards()[0];
            assert!((hazard.center().y - base).abs() <= LAVA_FLOAT_AMPLITUDE + 0.001);
            assert!((0.0..=1.0).contains(&hazard.heat()));
        }
    }

    #[test]
    fn test_same_seed_same_terrain() {
        let (a, _) = stream(99);
        let (b, _) = stream(99);
        assert_eq!(a.trees(), b.trees());
        assert_eq!(a.segments(), b.segments());
    }

    proptest! {
        #[test]
        fn prop_pool_bounded_and_view_covered(
            seed in any::<u64>(),
            steps in proptest::collection::vec(0.0f32..800.0, 1..60),
        ) {
            let viewport = Viewport::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut terrain = TerrainStream::new(&viewport, &mut rng);
            let pool = terrain.pool_size();
            let mut camera = 0.0;

            for step in steps {
                camera += step;
                terrain.advance(camera, &mut rng);

                prop_assert_eq!(terrain.segments().len(), pool);
                prop_assert_eq!(terrain.hazards().len(), pool);

                let from = (camera - GAP_SPACING).max(0.0);
                let to = camera + viewport.width + GAP_SPACING;
                let mut x = from;
                while x <= to {
                    prop_assert!(terrain.covers(x), "uncovered x={} camera={}", x, camera);
                    x += 25.0;
                }
            }
        }
    }
}
