//! Core types describing simulated entities: point masses, shapes, bodies and chains.

pub mod aabb;
pub mod body;
pub mod chain;
pub mod shape;
pub mod spring;
pub mod types;

pub use aabb::Aabb;
pub use body::{Body, BodyBuilder, ClosestEdge, EdgeProjection};
pub use chain::{Chain, ChainAnchor, ChainEnd};
pub use shape::{Shape, ShapeError};
pub use spring::Spring;
pub use types::PointMass;
