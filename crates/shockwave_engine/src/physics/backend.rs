//! Backend abstraction trait for the physics system
//!
//! This module defines the trait a physics backend must implement to
//! provide a consistent interface for the physics system and gameplay
//! code. The backend owns body storage keyed by entity id; the world
//! remains the source of truth for which entities exist.

use thiserror::Error;

use crate::ecs::components::{BodyShape, BodyType};
use crate::ecs::Entity;
use crate::foundation::math::{Quat, Vec3};

/// Result type for backend operations
pub type PhysicsResult<T> = Result<T, PhysicsError>;

/// Errors raised by a physics backend
#[derive(Error, Debug)]
pub enum PhysicsError {
    /// The backend cannot construct the requested shape
    ///
    /// Construction fails hard instead of downgrading to a default shape,
    /// so configuration mistakes stay visible.
    #[error("unsupported {shape} body for {entity}")]
    UnsupportedShape {
        /// Entity the body was requested for
        entity: Entity,
        /// Shape kind the backend refused
        shape: &'static str,
    },

    /// A write targeted an entity with no live body
    #[error("no body for {0}")]
    MissingBody(Entity),
}

/// Everything a backend needs to construct a body
#[derive(Debug, Clone)]
pub struct BodyDesc {
    /// Simulation role
    pub body_type: BodyType,

    /// Mass in kilograms; ignored for static bodies
    pub mass: f32,

    /// Collision shape
    pub shape: BodyShape,

    /// Initial world position
    pub position: Vec3,

    /// Initial world orientation
    pub rotation: Quat,

    /// Collision layer this body occupies
    pub layer: u32,

    /// Bitmask of layers this body collides with
    pub mask: u32,
}

/// Result of a ray query
#[derive(Debug, Clone)]
pub struct RayHit {
    /// Entity whose body the ray struck
    pub entity: Entity,

    /// World-space hit point
    pub point: Vec3,

    /// Surface normal at the hit point
    pub normal: Vec3,

    /// Distance from the ray origin
    pub distance: f32,
}

/// Main physics backend trait
///
/// Backends are expected to run their own fixed-substep accumulation
/// inside [`PhysicsBackend::step`]; the outer frame loop only guarantees
/// the call happens before dependent systems run, not how the backend
/// subdivides the elapsed time.
pub trait PhysicsBackend: Send {
    /// Create a body for `entity`, replacing any existing one
    fn add_body(&mut self, entity: Entity, desc: &BodyDesc) -> PhysicsResult<()>;

    /// Destroy `entity`'s body; no-op when absent
    fn remove_body(&mut self, entity: Entity);

    /// Whether a live body exists for `entity`
    fn has_body(&self, entity: Entity) -> bool;

    /// Entities with live bodies, in no particular order
    fn bodies(&self) -> Vec<Entity>;

    /// Simulated pose of `entity`'s body
    fn body_pose(&self, entity: Entity) -> Option<(Vec3, Quat)>;

    /// Linear velocity of `entity`'s body
    fn body_velocity(&self, entity: Entity) -> Option<Vec3>;

    /// Set the linear velocity of `entity`'s body
    fn set_body_velocity(&mut self, entity: Entity, velocity: Vec3) -> PhysicsResult<()>;

    /// Set the orientation of `entity`'s body
    fn set_body_rotation(&mut self, entity: Entity, rotation: Quat) -> PhysicsResult<()>;

    /// Replace the world gravity vector
    fn set_gravity(&mut self, gravity: Vec3);

    /// Advance the simulation by `dt` seconds of frame time
    fn step(&mut self, dt: f32);

    /// Closest body hit by the ray within `max_distance`
    ///
    /// `direction` need not be normalized. Hits that start inside a body
    /// are not reported.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit>;
}
