//! Transform component
//!
//! Pure data component representing spatial transformation in world
//! space, Y-up right-handed.

use serde::{Deserialize, Serialize};

use crate::ecs::Component;
use crate::foundation::math::{Mat4, Quat, Vec3};

/// Spatial pose of an entity in world space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformComponent {
    /// World space position
    pub position: Vec3,

    /// World space rotation quaternion
    pub rotation: Quat,

    /// World space scale factors
    pub scale: Vec3,
}

impl Component for TransformComponent {
    fn type_name() -> &'static str {
        "Transform"
    }
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl TransformComponent {
    /// Create identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create from position only
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create from position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Convert to a transformation matrix (TRS order)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn default_is_identity() {
        let t = TransformComponent::default();
        assert_eq!(t.position, Vec3::zeros());
        assert_eq!(t.scale, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn to_matrix_applies_translation() {
        let t = TransformComponent::from_position(Vec3::new(1.0, 2.0, 3.0));
        let m = t.to_matrix();
        let p = m.transform_point(&nalgebra::Point3::origin());
        assert_relative_eq!(p.x, 1.0);
        assert_relative_eq!(p.y, 2.0);
        assert_relative_eq!(p.z, 3.0);
    }
}
