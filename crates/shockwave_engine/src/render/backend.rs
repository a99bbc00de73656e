//! Backend abstraction traits for the rendering system
//!
//! This module defines the trait a rendering backend must implement to
//! provide a consistent interface for the render system. The backend
//! owns every visual resource; the render system only ever sees opaque
//! handles.

use thiserror::Error;

use crate::ecs::components::RenderableComponent;
use crate::foundation::math::{Quat, Vec3};

/// Result type for backend operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors raised by a render backend
#[derive(Error, Debug)]
pub enum RenderError {
    /// The backend has no object behind the given handle
    #[error("stale object handle {0:?}")]
    StaleHandle(ObjectHandle),

    /// Frame submission failed
    #[error("draw failed: {0}")]
    Draw(String),
}

/// Handle to a visual object stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub u64);

/// Camera pose and projection for one frame
#[derive(Debug, Clone)]
pub struct CameraPose {
    /// World-space eye position
    pub position: Vec3,

    /// World-space view orientation
    pub rotation: Quat,

    /// Vertical field of view in degrees
    pub fov: f32,

    /// Near clip plane distance
    pub near: f32,

    /// Far clip plane distance
    pub far: f32,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Main rendering backend trait
pub trait RenderBackend: Send {
    /// Create a visual object for `renderable` and return its handle
    fn create_object(&mut self, renderable: &RenderableComponent) -> RenderResult<ObjectHandle>;

    /// Destroy the object behind `handle`
    fn destroy_object(&mut self, handle: ObjectHandle) -> RenderResult<()>;

    /// Update an object's world transform
    fn set_object_transform(
        &mut self,
        handle: ObjectHandle,
        position: Vec3,
        rotation: Quat,
        scale: Vec3,
    ) -> RenderResult<()>;

    /// Set the camera used for subsequent frames
    fn set_camera(&mut self, camera: &CameraPose);

    /// Submit one frame
    fn draw_frame(&mut self) -> RenderResult<()>;

    /// Number of live objects
    fn object_count(&self) -> usize;

    /// Downcast to the concrete backend type for diagnostics and tests
    fn as_any(&self) -> &dyn std::any::Any;
}
