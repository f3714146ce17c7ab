//! Simulation dynamics: point-mass integration, internal forces and collision response.

pub mod forces;
pub mod friction;
pub mod integrator;
pub mod solver;

pub use forces::{BodyKind, PressureModel, SpringModel};
pub use integrator::Integrator;
pub use solver::{CollisionSolver, SolverStepMetrics};
