use crate::{
    config::DEFAULT_SAME_SIDE_THRESHOLD,
    core::body::{Body, EdgeProjection},
};

use super::contact::CollisionInfo;

/// Starting value for the running edge distances; any real edge is closer.
const FAR_AWAY: f32 = 100_000.0;

#[derive(Debug, Clone, Copy)]
struct Candidate {
    edge: usize,
    projection: EdgeProjection,
}

/// Polygon-versus-polygon penetration test between two bodies.
#[derive(Debug, Clone, Copy)]
pub struct NarrowPhase {
    /// An edge facing the same way as the penetrating point is preferred
    /// only when the best opposite-facing edge is farther than this.
    pub same_side_threshold: f32,
}

impl Default for NarrowPhase {
    fn default() -> Self {
        Self::new(DEFAULT_SAME_SIDE_THRESHOLD)
    }
}

impl NarrowPhase {
    pub fn new(same_side_threshold: f32) -> Self {
        Self { same_side_threshold }
    }

    /// Appends one [`CollisionInfo`] per point of `body_a` lying inside
    /// `body_b`. Returns how many were found.
    pub fn intersects(&self, body_a: &Body, body_b: &Body, out: &mut Vec<CollisionInfo>) -> usize {
        let before = out.len();
        let points_a = body_a.point_masses();
        let count_a = points_a.len();
        let points_b = body_b.point_masses();
        let count_b = points_b.len();
        let threshold = self.same_side_threshold * self.same_side_threshold;

        for i in 0..count_a {
            let point = points_a[i].position;
            if !body_b.aabb().contains(point) || !body_b.contains(point) {
                continue;
            }

            let prev = if i > 0 { i - 1 } else { count_a - 1 };
            let next = if i + 1 < count_a { i + 1 } else { 0 };
            let from_prev = point - points_a[prev].position;
            let to_next = points_a[next].position - point;
            let point_normal = (from_prev + to_next).perp();

            let mut closest_away = FAR_AWAY;
            let mut closest_same = FAR_AWAY;
            let mut away = None;
            let mut same = None;

            for j in 0..count_b {
                let b1 = points_b[j].position;
                let b2 = points_b[(j + 1) % count_b].position;

                let to_b1 = b1.distance_squared(point);
                let to_b2 = b2.distance_squared(point);
                if to_b1 > closest_away && to_b1 > closest_same && to_b2 > closest_away && to_b2 > closest_same {
                    continue;
                }

                let projection = body_b.closest_point_on_edge_squared(point, j);
                let candidate = Candidate { edge: j, projection };

                if point_normal.dot(projection.normal) <= 0.0 {
                    if projection.distance < closest_away {
                        closest_away = projection.distance;
                        away = Some(candidate);
                    }
                } else if projection.distance < closest_same {
                    closest_same = projection.distance;
                    same = Some(candidate);
                }
            }

            let chosen = match (away, same) {
                (Some(_), Some(same)) if closest_away > threshold && closest_same < closest_away => same,
                (Some(away), _) => away,
                (None, Some(same)) => same,
                (None, None) => continue,
            };

            out.push(CollisionInfo {
                body_a: body_a.id,
                body_b: body_b.id,
                point_mass_a: i,
                point_mass_b: chosen.edge,
                point_mass_c: (chosen.edge + 1) % count_b,
                edge_distance: chosen.projection.edge_distance,
                normal: chosen.projection.normal,
                point: chosen.projection.point,
                penetration: chosen.projection.distance.sqrt(),
            });
        }

        out.len() - before
    }
}

/// Convenience wrapper that runs the default narrow phase into a new list.
pub fn collide(body_a: &Body, body_b: &Body) -> Vec<CollisionInfo> {
    let mut out = Vec::new();
    NarrowPhase::default().intersects(body_a, body_b, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shape::Shape;
    use glam::Vec2;

    #[test]
    fn disjoint_bodies_do_not_collide() {
        let a = Body::builder(Shape::rectangle(1.0, 1.0)).build();
        let b = Body::builder(Shape::rectangle(1.0, 1.0))
            .position(Vec2::new(3.0, 0.0))
            .build();
        assert!(collide(&a, &b).is_empty());
        assert!(collide(&b, &a).is_empty());
    }

    #[test]
    fn corner_inside_reports_shallow_edge() {
        let wall = Body::builder(Shape::rectangle(2.0, 2.0)).static_body().build();
        let probe = Body::builder(Shape::rectangle(1.0, 1.0))
            .position(Vec2::new(1.4, 0.0))
            .build();

        let hits = collide(&probe, &wall);
        assert_eq!(hits.len(), 2);
        for hit in &hits {
            assert_eq!(hit.point_mass_b, 1);
            assert!((hit.penetration - 0.1).abs() < 1e-4, "{hit:?}");
            assert!((hit.normal - Vec2::X).length() < 1e-5);
        }
    }
}
