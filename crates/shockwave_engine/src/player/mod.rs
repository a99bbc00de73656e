//! Player movement system
//!
//! Translates polled input into body velocity and view rotation for
//! every player-controlled entity. It runs after input and physics but
//! before rendering, so its velocity writes are consumed by the *next*
//! frame's physics step while the camera sees this frame's view rotation
//! immediately.
//!
//! Mouse look keeps yaw and pitch separately: yaw steers the physics
//! body, pitch stays on the camera view only, clamped so the view can
//! never flip upside down.

use std::f32::consts::FRAC_PI_2;

use log::debug;

use crate::ecs::components::{
    CameraComponent, PhysicsBodyComponent, PlayerControllerComponent, TransformComponent,
};
use crate::ecs::{QuerySpec, System, SystemError, World};
use crate::foundation::math::{Quat, Vec3};
use crate::input::{InputHandle, Key};
use crate::physics::PhysicsHandle;

/// Radians of rotation per pixel of mouse travel
const LOOK_SENSITIVITY: f32 = 0.002;

/// Extra ray length past the body's lowest point for the ground probe
const GROUND_SLACK: f32 = 0.1;

/// System translating player input into body motion
pub struct PlayerMovementSystem {
    input: InputHandle,
    physics: PhysicsHandle,
    yaw: f32,
    pitch: f32,
    player_query: QuerySpec,
    camera_query: QuerySpec,
}

impl PlayerMovementSystem {
    /// Priority the player pass runs at
    pub const PRIORITY: i32 = 15;

    /// Create the system around the input and physics seams
    pub fn new(input: InputHandle, physics: PhysicsHandle) -> Self {
        Self {
            input,
            physics,
            yaw: 0.0,
            pitch: 0.0,
            player_query: QuerySpec::new()
                .all::<PlayerControllerComponent>()
                .all::<TransformComponent>()
                .all::<PhysicsBodyComponent>(),
            camera_query: QuerySpec::new()
                .all::<CameraComponent>()
                .all::<TransformComponent>(),
        }
    }

    /// Current view yaw in radians
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Current view pitch in radians
    pub fn pitch(&self) -> f32 {
        self.pitch
    }
}

impl System for PlayerMovementSystem {
    fn name(&self) -> &str {
        "player-movement"
    }

    fn priority(&self) -> i32 {
        Self::PRIORITY
    }

    fn init(&mut self, _world: &mut World) -> Result<(), SystemError> {
        log::info!("player movement system ready");
        Ok(())
    }

    fn update(&mut self, world: &mut World, _dt: f32) -> Result<(), SystemError> {
        let (mouse_dx, mouse_dy) = self.input.take_mouse_delta();
        self.yaw -= mouse_dx * LOOK_SENSITIVITY;
        // Clamp the pitch to prevent flipping upside down.
        self.pitch = (self.pitch - mouse_dy * LOOK_SENSITIVITY).clamp(-FRAC_PI_2, FRAC_PI_2);

        let yaw_rotation = Quat::from_axis_angle(&Vec3::y_axis(), self.yaw);
        let view_rotation = yaw_rotation * Quat::from_axis_angle(&Vec3::x_axis(), self.pitch);

        for entity in world.query(&self.player_query) {
            let Some(controller) = world.get_component::<PlayerControllerComponent>(entity) else {
                continue;
            };
            let Some(body) = world.get_component::<PhysicsBodyComponent>(entity) else {
                continue;
            };
            if !self.physics.has_body(entity) {
                // The backend may not have seen this entity yet; skip the frame.
                debug!("player-movement: no body for {entity} yet");
                continue;
            }

            // Yaw steers the body; pitch never reaches the simulation.
            self.physics
                .set_body_rotation(entity, yaw_rotation)
                .map_err(|e| SystemError::Backend(e.to_string()))?;

            let forward = yaw_rotation * Vec3::new(0.0, 0.0, -1.0);
            let right = yaw_rotation * Vec3::new(1.0, 0.0, 0.0);
            let mut direction = Vec3::zeros();
            if self.input.is_key_down(Key::W) {
                direction += forward;
            }
            if self.input.is_key_down(Key::S) {
                direction -= forward;
            }
            if self.input.is_key_down(Key::A) {
                direction -= right;
            }
            if self.input.is_key_down(Key::D) {
                direction += right;
            }

            // Keep movement horizontal.
            direction.y = 0.0;
            if direction.norm() > 0.0 {
                direction = direction.normalize() * controller.move_speed;
            }

            let probe = body.shape.half_height() + GROUND_SLACK;
            let grounded = self.physics.grounded(entity, probe);
            let steer = if grounded {
                1.0
            } else {
                controller.air_control.clamp(0.0, 1.0)
            };

            // Steer the horizontal velocity, preserve the vertical one.
            let current = self.physics.body_velocity(entity).unwrap_or_else(Vec3::zeros);
            let mut velocity = Vec3::new(
                current.x + (direction.x - current.x) * steer,
                current.y,
                current.z + (direction.z - current.z) * steer,
            );
            if grounded && self.input.is_key_down(Key::Space) {
                velocity.y = controller.jump_force;
            }
            self.physics
                .set_body_velocity(entity, velocity)
                .map_err(|e| SystemError::Backend(e.to_string()))?;
        }

        // The full view rotation (yaw + pitch) goes to the active camera.
        for entity in world.query(&self.camera_query) {
            let Some(camera) = world.get_component::<CameraComponent>(entity) else {
                continue;
            };
            if !camera.active {
                continue;
            }
            if let Some(transform) = world.get_component_mut::<TransformComponent>(entity) {
                transform.rotation = view_rotation;
            }
            break;
        }
        Ok(())
    }
}
