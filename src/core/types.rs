use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A zero-size particle integrated every tick.
///
/// `mass` may be `f32::INFINITY`, which turns the point mass into an anchor that
/// ignores forces but can still be moved by writing its position directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointMass {
    pub mass: f32,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Accumulated force, consumed and cleared by [`PointMass::update`].
    pub force: Vec2,
}

impl Default for PointMass {
    fn default() -> Self {
        Self {
            mass: 1.0,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
        }
    }
}

impl PointMass {
    pub fn new(position: Vec2, mass: f32) -> Self {
        Self {
            mass,
            position,
            ..Self::default()
        }
    }

    /// An immovable anchor at `position`.
    pub fn anchor(position: Vec2) -> Self {
        Self::new(position, f32::INFINITY)
    }

    pub fn is_immovable(&self) -> bool {
        self.mass.is_infinite()
    }

    pub fn momentum(&self) -> Vec2 {
        if self.is_immovable() {
            Vec2::ZERO
        } else {
            self.velocity * self.mass
        }
    }

    pub fn apply_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// Semi-implicit Euler step: velocity first, then position from the new velocity.
    pub fn update(&mut self, dt: f32) {
        let k = dt / self.mass;

        self.velocity += self.force * k;
        self.position += self.velocity * k;

        self.force = Vec2::ZERO;
    }
}
