//! Physics integration
//!
//! The runtime drives rigid-body simulation through the narrow
//! [`PhysicsBackend`] trait; the backend owns live bodies keyed by entity
//! id as a shadow index, and the [`PhysicsSystem`] reconciles that index
//! against the world by diffing query results each frame.

pub mod backend;
pub mod impulse;
pub mod layers;
pub mod system;

pub use backend::{BodyDesc, PhysicsBackend, PhysicsError, PhysicsResult, RayHit};
pub use impulse::ImpulseBackend;
pub use system::{PhysicsHandle, PhysicsSystem};
