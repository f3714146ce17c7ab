//! Global configuration constants and world settings for the Kinematics engine.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Default integration timestep (in seconds) used by [`crate::PhysicsEngine`].
pub const DEFAULT_TIME_STEP: f32 = 1.0 / 60.0;

/// Velocity multiplier applied to every body point mass before integration.
pub const DEFAULT_BODY_DAMPING: f32 = 0.999;

/// Velocity multiplier applied to interior chain point masses.
pub const DEFAULT_CHAIN_DAMPING: f32 = 0.99;

/// Tangential friction coefficient used by the collision resolver.
pub const DEFAULT_FRICTION: f32 = 1.9;

/// Restitution factor used by the collision resolver.
pub const DEFAULT_ELASTICITY: f32 = 1.5;

/// Penetration depth above which a contact is reported as deep.
pub const DEFAULT_PENETRATION_THRESHOLD: f32 = 0.015;

/// Penetrations deeper than this are left unresolved for the tick.
pub const DEFAULT_MAX_PENETRATION: f32 = 0.3;

/// Distance used by the narrow phase to prefer a same-side edge over an away edge.
pub const DEFAULT_SAME_SIDE_THRESHOLD: f32 = 0.3;

/// Extra distance added to positional correction when one side is immovable.
pub const POSITION_SLOP: f32 = 0.001;

/// Number of broad-phase cells along each world axis.
pub const WORLD_GRID_CELLS: i32 = 32;

/// Below this separation a spring produces no force.
pub const SPRING_EPSILON: f32 = 1e-4;

/// Vertex normals shorter than this are treated as degenerate and skipped.
pub const NORMAL_EPSILON: f32 = 1e-3;

/// Edges shorter than this are not normalized when projecting onto them.
pub const EDGE_EPSILON: f32 = 1e-5;

/// Relative normal velocity under which two contacts are considered approaching.
pub const APPROACH_EPSILON: f32 = 1e-4;

/// Maximum number of random samples tried when respawning a distant body.
pub const MAX_RESPAWN_ATTEMPTS: usize = 64;

/// Default seed for the world's random source.
pub const DEFAULT_SEED: u64 = 0x5EED_B0D1_E5F0_0D15;

/// Tunables of a [`crate::PhysicsWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    pub friction: f32,
    pub elasticity: f32,
    pub penetration_threshold: f32,
    pub max_penetration: f32,
    /// Compared squared against the best away-facing edge distance.
    pub same_side_threshold: f32,
    pub gravity: Vec2,
    pub seed: u64,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            friction: DEFAULT_FRICTION,
            elasticity: DEFAULT_ELASTICITY,
            penetration_threshold: DEFAULT_PENETRATION_THRESHOLD,
            max_penetration: DEFAULT_MAX_PENETRATION,
            same_side_threshold: DEFAULT_SAME_SIDE_THRESHOLD,
            gravity: Vec2::ZERO,
            seed: DEFAULT_SEED,
        }
    }
}

impl WorldSettings {
    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_elasticity(mut self, elasticity: f32) -> Self {
        self.elasticity = elasticity;
        self
    }
}
