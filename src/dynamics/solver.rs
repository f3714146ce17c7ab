use crate::{
    collision::contact::CollisionInfo,
    config::{
        WorldSettings, APPROACH_EPSILON, DEFAULT_ELASTICITY, DEFAULT_FRICTION, DEFAULT_MAX_PENETRATION,
        DEFAULT_PENETRATION_THRESHOLD, POSITION_SLOP,
    },
    core::body::Body,
    utils::{allocator::Arena, math::inverse_mass},
};

use super::friction::tangential_impulse;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SolverStepMetrics {
    pub contacts_solved: usize,
    /// Contacts skipped because they were deeper than the correction cap.
    pub unresolved_penetrations: usize,
    /// Contacts deeper than the penetration threshold.
    pub deep_contacts: usize,
    pub normal_impulse_sum: f32,
    pub tangent_impulse_sum: f32,
}

impl SolverStepMetrics {
    pub fn merge(&mut self, other: &Self) {
        self.contacts_solved += other.contacts_solved;
        self.unresolved_penetrations += other.unresolved_penetrations;
        self.deep_contacts += other.deep_contacts;
        self.normal_impulse_sum += other.normal_impulse_sum;
        self.tangent_impulse_sum += other.tangent_impulse_sum;
    }
}

/// Pushes penetrating points out along the collision normal and exchanges
/// impulses between the point and the edge it hit.
#[derive(Debug, Clone, Copy)]
pub struct CollisionSolver {
    pub friction: f32,
    pub elasticity: f32,
    pub penetration_threshold: f32,
    pub max_penetration: f32,
}

impl Default for CollisionSolver {
    fn default() -> Self {
        Self {
            friction: DEFAULT_FRICTION,
            elasticity: DEFAULT_ELASTICITY,
            penetration_threshold: DEFAULT_PENETRATION_THRESHOLD,
            max_penetration: DEFAULT_MAX_PENETRATION,
        }
    }
}

impl CollisionSolver {
    pub fn from_settings(settings: &WorldSettings) -> Self {
        Self {
            friction: settings.friction,
            elasticity: settings.elasticity,
            penetration_threshold: settings.penetration_threshold,
            max_penetration: settings.max_penetration,
        }
    }

    pub fn resolve(&self, bodies: &mut Arena<Body>, collisions: &[CollisionInfo]) -> SolverStepMetrics {
        let mut metrics = SolverStepMetrics::default();
        for info in collisions {
            self.resolve_contact(bodies, info, &mut metrics);
        }
        metrics
    }

    pub fn resolve_contact(&self, bodies: &mut Arena<Body>, info: &CollisionInfo, metrics: &mut SolverStepMetrics) {
        let Some((body_a, body_b)) = bodies.get2_mut(info.body_a, info.body_b) else {
            return;
        };
        let (Some(&a), Some(&b1), Some(&b2)) = (
            body_a.point_mass(info.point_mass_a),
            body_b.point_mass(info.point_mass_b),
            body_b.point_mass(info.point_mass_c),
        ) else {
            return;
        };

        if info.penetration > self.penetration_threshold {
            metrics.deep_contacts += 1;
        }
        if info.penetration > self.max_penetration {
            metrics.unresolved_penetrations += 1;
            return;
        }

        let (w1, w2) = info.edge_weights();
        let normal = info.normal;
        let edge_velocity = b1.velocity * w1 + b2.velocity * w2;
        let relative_velocity = a.velocity - edge_velocity;
        let relative_dot = relative_velocity.dot(normal);

        let edge_immovable = b1.is_immovable() || b2.is_immovable();
        let (move_a, move_b) = if a.is_immovable() {
            (0.0, info.penetration + POSITION_SLOP)
        } else if edge_immovable {
            (info.penetration + POSITION_SLOP, 0.0)
        } else {
            let edge_mass = b1.mass + b2.mass;
            let total = a.mass + edge_mass;
            (
                info.penetration * edge_mass / total,
                info.penetration * a.mass / total,
            )
        };

        let mut a = a;
        let mut b1 = b1;
        let mut b2 = b2;

        if !a.is_immovable() {
            a.position += normal * move_a;
        }
        if !b1.is_immovable() {
            b1.position -= normal * (move_b * w1);
        }
        if !b2.is_immovable() {
            b2.position -= normal * (move_b * w2);
        }

        let inverse_a = inverse_mass(a.mass);
        let (inverse_b1, inverse_b2) = if edge_immovable {
            (0.0, 0.0)
        } else {
            (inverse_mass(b1.mass), inverse_mass(b2.mass))
        };
        let inverse_sum = inverse_a + w1 * w1 * inverse_b1 + w2 * w2 * inverse_b2;

        if relative_dot <= APPROACH_EPSILON && inverse_sum > 0.0 {
            let normal_impulse = -(relative_dot * self.elasticity) / inverse_sum;
            let friction = tangential_impulse(relative_velocity, normal, self.friction, inverse_sum);
            let impulse = normal * normal_impulse + friction;

            a.velocity += impulse * inverse_a;
            b1.velocity -= impulse * (w1 * inverse_b1);
            b2.velocity -= impulse * (w2 * inverse_b2);

            metrics.normal_impulse_sum += normal_impulse.abs();
            metrics.tangent_impulse_sum += friction.length();
        }

        metrics.contacts_solved += 1;

        if let Some(slot) = body_a.point_mass_mut(info.point_mass_a) {
            *slot = a;
        }
        if let Some(slot) = body_b.point_mass_mut(info.point_mass_b) {
            *slot = b1;
        }
        if let Some(slot) = body_b.point_mass_mut(info.point_mass_c) {
            *slot = b2;
        }
    }
}
