//! Physics body component

use serde::{Deserialize, Serialize};

use crate::ecs::Component;
use crate::foundation::math::Vec3;
use crate::physics::layers;

/// Simulation role of a physics body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BodyType {
    /// Immovable; participates in collisions only
    Static,

    /// Fully simulated under gravity and impulses
    #[default]
    Dynamic,

    /// Moved by velocity writes only, ignoring gravity
    Kinematic,
}

/// Collision shape of a body, stored in model space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BodyShape {
    /// Axis-aligned box given by half extents
    Box {
        /// Half extents along each axis
        half_extents: Vec3,
    },

    /// Sphere given by radius
    Sphere {
        /// Sphere radius
        radius: f32,
    },

    /// Capsule; total height is `height + 2 * radius`
    Capsule {
        /// Hemisphere radius
        radius: f32,
        /// Height of the cylindrical section
        height: f32,
    },

    /// Triangle mesh loaded from an asset path
    Mesh {
        /// Asset path of the collision mesh
        mesh_path: String,
    },
}

impl BodyShape {
    /// Distance from the body center to its lowest point
    pub fn half_height(&self) -> f32 {
        match self {
            Self::Box { half_extents } => half_extents.y,
            Self::Sphere { radius } => *radius,
            Self::Capsule { radius, height } => radius + height / 2.0,
            Self::Mesh { .. } => 0.0,
        }
    }

    /// Short name used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Box { .. } => "box",
            Self::Sphere { .. } => "sphere",
            Self::Capsule { .. } => "capsule",
            Self::Mesh { .. } => "mesh",
        }
    }
}

/// Physics body component
///
/// Describes the simulated body a physics backend maintains for this
/// entity. The backend owns the live body; this record owns its shape and
/// filtering. Two bodies interact when each body's layer is present in
/// the other's mask.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsBodyComponent {
    /// Simulation role
    pub body_type: BodyType,

    /// Mass in kilograms; ignored for static bodies
    pub mass: f32,

    /// Collision shape
    pub shape: BodyShape,

    /// Collision layer this body occupies
    pub layer: u32,

    /// Bitmask of layers this body collides with
    pub mask: u32,
}

impl Component for PhysicsBodyComponent {
    fn type_name() -> &'static str {
        "PhysicsBody"
    }
}

impl Default for PhysicsBodyComponent {
    fn default() -> Self {
        Self {
            body_type: BodyType::Dynamic,
            mass: 1.0,
            shape: BodyShape::Box {
                half_extents: Vec3::new(0.5, 0.5, 0.5),
            },
            layer: layers::DEFAULT,
            mask: layers::ALL,
        }
    }
}

impl PhysicsBodyComponent {
    /// Create a body with the given role, mass, and shape
    pub fn new(body_type: BodyType, mass: f32, shape: BodyShape) -> Self {
        Self {
            body_type,
            mass,
            shape,
            ..Default::default()
        }
    }

    /// Create a dynamic body
    pub fn dynamic(mass: f32, shape: BodyShape) -> Self {
        Self::new(BodyType::Dynamic, mass, shape)
    }

    /// Create an immovable body on the environment layer
    pub fn fixed(shape: BodyShape) -> Self {
        Self {
            layer: layers::ENVIRONMENT,
            ..Self::new(BodyType::Static, 0.0, shape)
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn half_height_per_shape() {
        let bx = BodyShape::Box {
            half_extents: Vec3::new(1.0, 2.0, 3.0),
        };
        assert_relative_eq!(bx.half_height(), 2.0);
        assert_relative_eq!(BodyShape::Sphere { radius: 0.5 }.half_height(), 0.5);
        assert_relative_eq!(
            BodyShape::Capsule {
                radius: 0.5,
                height: 1.0
            }
            .half_height(),
            1.0
        );
    }

    #[test]
    fn fixed_bodies_sit_on_environment_layer() {
        let floor = PhysicsBodyComponent::fixed(BodyShape::Box {
            half_extents: Vec3::new(5.0, 0.25, 5.0),
        });
        assert_eq!(floor.body_type, BodyType::Static);
        assert_eq!(floor.layer, layers::ENVIRONMENT);
    }
}
