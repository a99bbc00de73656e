//! Camera component

use serde::{Deserialize, Serialize};

use crate::ecs::Component;

/// Perspective camera parameters
///
/// The render system draws from the first active camera in
/// entity-creation order; the pose comes from the entity's transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraComponent {
    /// Vertical field of view in degrees
    pub fov: f32,

    /// Near clip plane distance
    pub near: f32,

    /// Far clip plane distance
    pub far: f32,

    /// Whether this camera is the one to draw from
    pub active: bool,
}

impl Component for CameraComponent {
    fn type_name() -> &'static str {
        "Camera"
    }
}

impl Default for CameraComponent {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
            active: true,
        }
    }
}
