//! Collision detection: axis bitmasks, broad-phase culling, narrow-phase penetration and point queries.

pub mod bitmask;
pub mod broadphase;
pub mod contact;
pub mod narrowphase;
pub mod queries;

pub use bitmask::Bitmask;
pub use broadphase::{BroadPhase, BroadPhaseStats};
pub use contact::{CollisionInfo, CollisionList};
pub use narrowphase::NarrowPhase;
pub use queries::{PointHit, PointQuery};
