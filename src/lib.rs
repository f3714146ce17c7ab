//! Kinematics – 2D soft-body physics for Rust.
//!
//! Bodies are closed polygons whose vertices are individual point masses.
//! Rigid bodies keep their outline through collisions alone, spring bodies
//! add edge and shape-matching springs, and pressure bodies inflate with an
//! internal gas force. Chains string point masses between two anchors.

pub mod collision;
pub mod config;
pub mod core;
pub mod dynamics;
pub mod utils;
pub mod world;

pub use glam::Vec2;

pub use collision::{
    bitmask::Bitmask,
    broadphase::{BroadPhase, BroadPhaseStats},
    contact::{CollisionInfo, CollisionList},
    narrowphase::NarrowPhase,
    queries::{PointHit, PointQuery},
};
pub use config::WorldSettings;
pub use crate::core::{
    aabb::Aabb,
    body::{Body, BodyBuilder, ClosestEdge, EdgeProjection},
    chain::{Chain, ChainAnchor, ChainEnd},
    shape::{Shape, ShapeError},
    spring::Spring,
    types::PointMass,
};
pub use dynamics::{
    forces::{BodyKind, PressureModel, SpringModel},
    integrator::Integrator,
    solver::{CollisionSolver, SolverStepMetrics},
};
pub use utils::allocator::{Arena, BodyId, ChainId, EntityId, PointMassId};
pub use world::{EventHooks, PhysicsWorld, StepStats};

use config::DEFAULT_TIME_STEP;
use utils::logging::check_time_step;

/// High-level convenience wrapper that owns a [`PhysicsWorld`] and advances
/// it at a fixed timestep.
pub struct PhysicsEngine {
    world: PhysicsWorld,
    time_step: f32,
    time_accumulated: f32,
}

impl PhysicsEngine {
    /// Creates a new physics engine with the provided fixed timestep.
    pub fn new(time_step: f32) -> Self {
        Self::with_world(PhysicsWorld::new(), time_step)
    }

    pub fn with_world(world: PhysicsWorld, time_step: f32) -> Self {
        let time_step = if time_step > 0.0 && time_step.is_finite() {
            time_step
        } else {
            DEFAULT_TIME_STEP
        };

        Self {
            world,
            time_step,
            time_accumulated: 0.0,
        }
    }

    pub fn time_step(&self) -> f32 {
        self.time_step
    }

    /// Adds a body to the world and returns its generated [`BodyId`].
    pub fn add_body(&mut self, body: Body) -> BodyId {
        self.world.add_body(body)
    }

    /// Accumulates `dt` seconds and runs as many fixed ticks as fit.
    /// Returns the number of ticks run.
    pub fn step(&mut self, dt: f32) -> usize {
        if !check_time_step(dt as f64) {
            return 0;
        }
        self.time_accumulated += dt;

        let mut ticks = 0;
        while self.time_accumulated >= self.time_step {
            self.time_accumulated -= self.time_step;
            self.world.update(self.time_step as f64);
            ticks += 1;
        }
        ticks
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    /// Immutable access to a body by id.
    pub fn get_body(&self, id: BodyId) -> Option<&Body> {
        self.world.body(id)
    }

    /// Mutable access to a body by id.
    pub fn get_body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.world.body_mut(id)
    }
}
