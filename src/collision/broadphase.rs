use glam::Vec2;

use crate::{
    collision::bitmask::Bitmask,
    config::WORLD_GRID_CELLS,
    core::{aabb::Aabb, body::Body},
    utils::allocator::{Arena, BodyId},
};

/// Pair-culling counters for one tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadPhaseStats {
    pub pairs_tested: usize,
    pub static_rejections: usize,
    pub bitmask_rejections: usize,
    pub aabb_rejections: usize,
}

/// Fixed world grid used to stamp per-axis bitmasks, plus the pair culling
/// that runs ahead of the narrow phase.
#[derive(Debug, Clone)]
pub struct BroadPhase {
    bounds: Aabb,
    size: Vec2,
    cell_size: Vec2,
    explicit_limits: bool,
}

impl Default for BroadPhase {
    fn default() -> Self {
        Self::new()
    }
}

impl BroadPhase {
    pub fn new() -> Self {
        Self {
            bounds: Aabb::empty(),
            size: Vec2::ZERO,
            cell_size: Vec2::ZERO,
            explicit_limits: false,
        }
    }

    /// Sets the world extents and the derived cell size.
    pub fn set_world_limits(&mut self, min: Vec2, max: Vec2) {
        self.apply_limits(min, max);
        self.explicit_limits = true;
    }

    /// Bounds covering the origin and every given box.
    pub fn fit_limits<'a, I>(&mut self, boxes: I)
    where
        I: IntoIterator<Item = &'a Aabb>,
    {
        let mut bounds = Aabb::new(Vec2::ZERO, Vec2::ZERO);
        for aabb in boxes {
            bounds.merge(aabb);
        }
        self.apply_limits(bounds.min, bounds.max);
    }

    fn apply_limits(&mut self, min: Vec2, max: Vec2) {
        self.bounds = Aabb::new(min, max);
        self.size = self.bounds.size();
        self.cell_size = self.size / WORLD_GRID_CELLS as f32;
    }

    pub fn has_explicit_limits(&self) -> bool {
        self.explicit_limits
    }

    pub fn world_bounds(&self) -> &Aabb {
        &self.bounds
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn cell_size(&self) -> Vec2 {
        self.cell_size
    }

    /// Inclusive cell range covered by `[min, max]` on one axis, clamped to the grid.
    fn cell_range(&self, min: f32, max: f32, origin: f32, cell: f32) -> (i32, i32) {
        let to_cell = |value: f32| (((value - origin) / cell).floor() as i32).clamp(0, WORLD_GRID_CELLS);
        (to_cell(min), to_cell(max))
    }

    /// Marks the grid cells the body's bounds overlap on each axis.
    ///
    /// A degenerate grid (zero-sized world) marks every cell so that the
    /// bitmask test never rejects a pair.
    pub fn update_bitmasks(&self, body: &mut Body) {
        body.bitmask_x.clear();
        body.bitmask_y.clear();

        let aabb = *body.aabb();
        let origin = self.bounds.min;

        if self.cell_size.x > 0.0 && aabb.is_valid() {
            let (from, to) = self.cell_range(aabb.min.x, aabb.max.x, origin.x, self.cell_size.x);
            body.bitmask_x.set_range(from, to);
        } else {
            body.bitmask_x = Bitmask::FULL;
        }

        if self.cell_size.y > 0.0 && aabb.is_valid() {
            let (from, to) = self.cell_range(aabb.min.y, aabb.max.y, origin.y, self.cell_size.y);
            body.bitmask_y.set_range(from, to);
        } else {
            body.bitmask_y = Bitmask::FULL;
        }
    }

    /// Checks whether a pair can possibly touch, recording why it was culled.
    pub fn test_pair(&self, a: &Body, b: &Body, stats: &mut BroadPhaseStats) -> bool {
        stats.pairs_tested += 1;

        if a.is_static && b.is_static {
            stats.static_rejections += 1;
            return false;
        }

        if !a.bitmask_x.overlaps(&b.bitmask_x) && !a.bitmask_y.overlaps(&b.bitmask_y) {
            stats.bitmask_rejections += 1;
            return false;
        }

        if !a.aabb().intersects(b.aabb()) {
            stats.aabb_rejections += 1;
            return false;
        }

        true
    }

    /// Every unordered pair (in insertion order) that survives culling.
    pub fn find_pairs(&self, bodies: &Arena<Body>, stats: &mut BroadPhaseStats) -> Vec<(BodyId, BodyId)> {
        let entries: Vec<(BodyId, &Body)> = bodies.iter().collect();
        let mut pairs = Vec::new();

        for (i, &(id_a, a)) in entries.iter().enumerate() {
            for &(id_b, b) in &entries[i + 1..] {
                if self.test_pair(a, b, stats) {
                    pairs.push((id_a, id_b));
                }
            }
        }

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shape::Shape;

    fn body_at(x: f32, y: f32) -> Body {
        Body::builder(Shape::rectangle(1.0, 1.0))
            .position(Vec2::new(x, y))
            .build()
    }

    #[test]
    fn bitmasks_follow_grid_cells() {
        let mut broad_phase = BroadPhase::new();
        broad_phase.set_world_limits(Vec2::ZERO, Vec2::splat(32.0));
        assert_eq!(broad_phase.cell_size(), Vec2::ONE);

        let mut body = body_at(10.0, 20.0);
        broad_phase.update_bitmasks(&mut body);

        // x spans [9.5, 10.5] -> cells 9..=10 -> bits 8 and 9.
        assert_eq!(body.bitmask_x.bits(), (1 << 8) | (1 << 9));
        assert_eq!(body.bitmask_y.bits(), (1 << 18) | (1 << 19));
    }

    #[test]
    fn out_of_world_bodies_clamp_to_edge_cells() {
        let mut broad_phase = BroadPhase::new();
        broad_phase.set_world_limits(Vec2::ZERO, Vec2::splat(32.0));

        let mut body = body_at(-50.0, 100.0);
        broad_phase.update_bitmasks(&mut body);
        assert_eq!(body.bitmask_x.bits(), 1);
        assert_eq!(body.bitmask_y.bits(), 1 << 31);
    }

    #[test]
    fn fit_limits_includes_origin() {
        let mut broad_phase = BroadPhase::new();
        let boxes = [Aabb::new(Vec2::new(5.0, 5.0), Vec2::new(10.0, 8.0))];
        broad_phase.fit_limits(&boxes);

        assert_eq!(broad_phase.world_bounds().min, Vec2::ZERO);
        assert_eq!(broad_phase.world_bounds().max, Vec2::new(10.0, 8.0));
        assert!(!broad_phase.has_explicit_limits());
    }

    #[test]
    fn distant_pairs_are_culled_by_bitmask() {
        let mut broad_phase = BroadPhase::new();
        broad_phase.set_world_limits(Vec2::ZERO, Vec2::splat(32.0));

        let mut bodies = Arena::new();
        for (x, y) in [(2.0, 2.0), (30.0, 30.0), (2.5, 2.5)] {
            let mut body = body_at(x, y);
            broad_phase.update_bitmasks(&mut body);
            bodies.insert(body);
        }

        let mut stats = BroadPhaseStats::default();
        let pairs = broad_phase.find_pairs(&bodies, &mut stats);

        assert_eq!(pairs.len(), 1);
        assert_eq!(stats.pairs_tested, 3);
        assert_eq!(stats.bitmask_rejections, 2);
    }
}
