use glam::Vec2;

use crate::{
    core::body::{Body, ClosestEdge},
    utils::allocator::{Arena, BodyId},
};

/// Nearest body edge to a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointHit {
    pub body: BodyId,
    pub edge: ClosestEdge,
}

/// Point queries against every body of a world.
pub struct PointQuery;

impl PointQuery {
    /// First body (in insertion order) whose polygon contains `point`.
    pub fn containing_body(bodies: &Arena<Body>, point: Vec2) -> Option<BodyId> {
        bodies
            .iter()
            .find(|(_, body)| body.aabb().contains(point) && body.contains(point))
            .map(|(id, _)| id)
    }

    pub fn is_inside_any(bodies: &Arena<Body>, point: Vec2) -> bool {
        Self::containing_body(bodies, point).is_some()
    }

    /// Closest edge over all bodies.
    pub fn closest_edge(bodies: &Arena<Body>, point: Vec2) -> Option<PointHit> {
        bodies
            .iter()
            .filter_map(|(id, body)| body.closest_point(point).map(|edge| PointHit { body: id, edge }))
            .min_by(|a, b| a.edge.projection.distance.total_cmp(&b.edge.projection.distance))
    }
}
