use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::SPRING_EPSILON;

use super::types::PointMass;

/// Damped spring between two point masses of the same owner.
///
/// The endpoints are indices into the owner's point-mass list (a body or a
/// chain), so several springs can share one mass without aliasing references.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spring {
    pub point_mass_a: usize,
    pub point_mass_b: usize,
    pub rest_length: f32,
    pub stiffness: f32,
    pub damping: f32,
}

impl Spring {
    /// Creates a spring whose rest length is the current separation of its endpoints.
    pub fn new(point_masses: &[PointMass], a: usize, b: usize, stiffness: f32, damping: f32) -> Self {
        let mut spring = Self::with_rest_length(a, b, stiffness, damping, 0.0);
        spring.reset(point_masses);
        spring
    }

    pub fn with_rest_length(a: usize, b: usize, stiffness: f32, damping: f32, rest_length: f32) -> Self {
        Self {
            point_mass_a: a,
            point_mass_b: b,
            rest_length,
            stiffness,
            damping,
        }
    }

    /// Sets the rest length to the endpoints' current separation.
    pub fn reset(&mut self, point_masses: &[PointMass]) {
        let a = point_masses[self.point_mass_a].position;
        let b = point_masses[self.point_mass_b].position;
        self.rest_length = a.distance(b);
    }

    /// Force acting on endpoint A; endpoint B receives its negation.
    pub fn force(&self, point_masses: &[PointMass]) -> Vec2 {
        let a = &point_masses[self.point_mass_a];
        let b = &point_masses[self.point_mass_b];
        spring_force(
            a.position,
            a.velocity,
            b.position,
            b.velocity,
            self.rest_length,
            self.stiffness,
            self.damping,
        )
    }

    /// Accumulates the spring force into both endpoints.
    pub fn apply(&self, point_masses: &mut [PointMass]) {
        let force = self.force(point_masses);
        point_masses[self.point_mass_a].force += force;
        point_masses[self.point_mass_b].force -= force;
    }
}

/// Hookean spring with damping along the spring axis.
///
/// Coincident endpoints produce no force.
pub fn spring_force(
    pos_a: Vec2,
    vel_a: Vec2,
    pos_b: Vec2,
    vel_b: Vec2,
    rest_length: f32,
    stiffness: f32,
    damping: f32,
) -> Vec2 {
    let b_to_a = pos_a - pos_b;
    let distance = b_to_a.length();
    if distance <= SPRING_EPSILON {
        return Vec2::ZERO;
    }

    let direction = b_to_a / distance;
    let stretch = rest_length - distance;
    let relative_velocity = (vel_a - vel_b).dot(direction);

    direction * (stretch * stiffness - relative_velocity * damping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn pair(distance: f32) -> Vec<PointMass> {
        vec![
            PointMass::new(Vec2::ZERO, 1.0),
            PointMass::new(Vec2::new(distance, 0.0), 1.0),
        ]
    }

    #[test]
    fn reset_spring_is_at_rest() {
        let masses = pair(3.0);
        let spring = Spring::new(&masses, 0, 1, 50.0, 2.0);

        assert_abs_diff_eq!(spring.rest_length, 3.0);
        assert_eq!(spring.force(&masses), Vec2::ZERO);
    }

    #[test]
    fn stretched_spring_pulls_endpoints_together() {
        let mut masses = pair(2.0);
        let spring = Spring::with_rest_length(0, 1, 10.0, 0.0, 1.0);
        spring.apply(&mut masses);

        // A sits left of B, so A is pulled towards +x and B towards -x.
        assert_abs_diff_eq!(masses[0].force.x, 10.0);
        assert_abs_diff_eq!(masses[1].force.x, -10.0);
    }

    #[test]
    fn coincident_points_produce_no_force() {
        let force = spring_force(Vec2::ONE, Vec2::X, Vec2::ONE, Vec2::ZERO, 1.0, 100.0, 1.0);
        assert_eq!(force, Vec2::ZERO);
    }

    #[test]
    fn damping_opposes_separation_speed() {
        let force = spring_force(
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::ZERO,
            Vec2::ZERO,
            1.0,
            0.0,
            4.0,
        );
        assert_abs_diff_eq!(force.x, -4.0);
    }
}
