//! Render system
//!
//! Runs last in the frame so it observes the frame's final state. The
//! system keeps a parallel entity-to-object map inside the backend:
//! objects are created the first time an entity matches the renderable
//! query and destroyed the frame it stops matching. Entities whose
//! renderable is marked invisible are treated as not matching.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::ecs::components::{
    CameraComponent, PlayerControllerComponent, RenderableComponent, TransformComponent,
};
use crate::ecs::{Entity, QuerySpec, System, SystemError, World};
use crate::foundation::math::Vec3;

use super::backend::{CameraPose, ObjectHandle, RenderBackend, RenderError};

/// Vertical eye offset applied when the camera rides a player entity
const EYE_OFFSET: f32 = 0.5;

fn backend_err(error: RenderError) -> SystemError {
    SystemError::Backend(error.to_string())
}

/// System drawing every visible renderable through the backend
pub struct RenderSystem {
    backend: Box<dyn RenderBackend>,
    objects: HashMap<Entity, ObjectHandle>,
    renderable_query: QuerySpec,
    camera_query: QuerySpec,
}

impl RenderSystem {
    /// Priority the render pass runs at
    pub const PRIORITY: i32 = 20;

    /// Wrap `backend` for scheduling
    pub fn new(backend: Box<dyn RenderBackend>) -> Self {
        Self {
            backend,
            objects: HashMap::new(),
            renderable_query: QuerySpec::new()
                .all::<TransformComponent>()
                .all::<RenderableComponent>(),
            camera_query: QuerySpec::new()
                .all::<CameraComponent>()
                .all::<TransformComponent>(),
        }
    }

    /// The wrapped backend, for diagnostics and tests
    pub fn backend(&self) -> &dyn RenderBackend {
        self.backend.as_ref()
    }

    /// Point the backend camera at the first active camera entity
    fn update_camera(&mut self, world: &World) {
        for entity in world.query(&self.camera_query) {
            let Some(camera) = world.get_component::<CameraComponent>(entity) else {
                continue;
            };
            if !camera.active {
                continue;
            }
            let Some(transform) = world.get_component::<TransformComponent>(entity) else {
                continue;
            };
            let mut position = transform.position;
            if world.has_component::<PlayerControllerComponent>(entity) {
                position += Vec3::new(0.0, EYE_OFFSET, 0.0);
            }
            self.backend.set_camera(&CameraPose {
                position,
                rotation: transform.rotation,
                fov: camera.fov,
                near: camera.near,
                far: camera.far,
            });
            return;
        }
    }
}

impl System for RenderSystem {
    fn name(&self) -> &str {
        "render"
    }

    fn priority(&self) -> i32 {
        Self::PRIORITY
    }

    fn init(&mut self, _world: &mut World) -> Result<(), SystemError> {
        log::info!("render system ready");
        Ok(())
    }

    fn update(&mut self, world: &mut World, _dt: f32) -> Result<(), SystemError> {
        let matched = world.query(&self.renderable_query);
        let keep: HashSet<Entity> = matched
            .iter()
            .copied()
            .filter(|&entity| {
                world
                    .get_component::<RenderableComponent>(entity)
                    .map_or(false, |renderable| renderable.visible)
            })
            .collect();

        // Destroy objects whose entity disappeared, stopped matching, or
        // went invisible.
        let stale: Vec<Entity> = self
            .objects
            .keys()
            .copied()
            .filter(|entity| !keep.contains(entity))
            .collect();
        for entity in stale {
            if let Some(handle) = self.objects.remove(&entity) {
                debug!("render: dropping object for {entity}");
                self.backend.destroy_object(handle).map_err(backend_err)?;
            }
        }

        // Create on first sight, then push this frame's transforms.
        for &entity in &matched {
            if !keep.contains(&entity) {
                continue;
            }
            let Some(renderable) = world.get_component::<RenderableComponent>(entity) else {
                continue;
            };
            let Some(transform) = world.get_component::<TransformComponent>(entity) else {
                continue;
            };
            let handle = match self.objects.get(&entity) {
                Some(&handle) => handle,
                None => {
                    let handle = self.backend.create_object(renderable).map_err(backend_err)?;
                    debug!(
                        "render: created object for {entity} ({})",
                        renderable.model_path
                    );
                    self.objects.insert(entity, handle);
                    handle
                }
            };
            self.backend
                .set_object_transform(handle, transform.position, transform.rotation, transform.scale)
                .map_err(backend_err)?;
        }

        self.update_camera(world);
        self.backend.draw_frame().map_err(backend_err)?;
        Ok(())
    }
}
