//! Built-in component types
//!
//! Pure data records describing one aspect of an entity each; all
//! mutation happens through systems. Every component here is serde-derived
//! so scenes can persist it.

pub mod camera;
pub mod physics_body;
pub mod player_controller;
pub mod renderable;
pub mod transform;

pub use camera::CameraComponent;
pub use physics_body::{BodyShape, BodyType, PhysicsBodyComponent};
pub use player_controller::PlayerControllerComponent;
pub use renderable::RenderableComponent;
pub use transform::TransformComponent;
