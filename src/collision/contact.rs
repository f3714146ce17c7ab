use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::utils::allocator::BodyId;

/// A point of body A embedded in body B, with the edge of B it should leave through.
///
/// The edge runs from `point_mass_b` to `point_mass_c` of body B; `edge_distance`
/// is where along that edge (`0..=1`) the closest point `point` lies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionInfo {
    pub body_a: BodyId,
    pub body_b: BodyId,
    pub point_mass_a: usize,
    pub point_mass_b: usize,
    pub point_mass_c: usize,
    pub edge_distance: f32,
    /// Outward normal of B's edge.
    pub normal: Vec2,
    pub point: Vec2,
    pub penetration: f32,
}

impl CollisionInfo {
    /// Interpolation weights of the edge endpoints at the contact point.
    pub fn edge_weights(&self) -> (f32, f32) {
        (1.0 - self.edge_distance, self.edge_distance)
    }
}

/// Every collision found during one tick.
pub type CollisionList = Vec<CollisionInfo>;
