use crate::core::types::PointMass;

/// Damped semi-implicit Euler stepping shared by bodies and chains.
#[derive(Debug, Clone, Copy)]
pub struct Integrator {
    /// Velocity multiplier applied before each step.
    pub damping: f32,
}

impl Integrator {
    pub fn new(damping: f32) -> Self {
        Self { damping }
    }

    pub fn step(&self, point_mass: &mut PointMass, dt: f32) {
        point_mass.velocity *= self.damping;
        point_mass.update(dt);
    }

    pub fn step_all(&self, point_masses: &mut [PointMass], dt: f32) {
        for point_mass in point_masses {
            self.step(point_mass, dt);
        }
    }
}
