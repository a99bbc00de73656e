//! Physics system
//!
//! Steps the wrapped backend once per frame and overwrites transforms
//! from the simulated poses. The backend's body map is a shadow index
//! keyed by entity id; this system reconciles it against the world by
//! diffing the physics-body query each frame, so entity removal needs no
//! cooperation from the caller.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};

use crate::ecs::components::{PhysicsBodyComponent, TransformComponent};
use crate::ecs::{Entity, QuerySpec, System, SystemError, World};
use crate::foundation::math::{Quat, Vec3};

use super::backend::{BodyDesc, PhysicsBackend, PhysicsResult, RayHit};

type SharedBackend = Arc<Mutex<Box<dyn PhysicsBackend>>>;

/// Cloneable handle onto the physics backend
///
/// Gameplay systems use this for ray queries and velocity writes; the
/// world remains the source of truth for which entities exist, so a
/// handle never creates or destroys bodies.
#[derive(Clone)]
pub struct PhysicsHandle {
    backend: SharedBackend,
}

impl PhysicsHandle {
    fn lock(&self) -> MutexGuard<'_, Box<dyn PhysicsBackend>> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether `entity` has a live body
    pub fn has_body(&self, entity: Entity) -> bool {
        self.lock().has_body(entity)
    }

    /// Simulated pose of `entity`'s body
    pub fn body_pose(&self, entity: Entity) -> Option<(Vec3, Quat)> {
        self.lock().body_pose(entity)
    }

    /// Linear velocity of `entity`'s body
    pub fn body_velocity(&self, entity: Entity) -> Option<Vec3> {
        self.lock().body_velocity(entity)
    }

    /// Set the linear velocity of `entity`'s body
    pub fn set_body_velocity(&self, entity: Entity, velocity: Vec3) -> PhysicsResult<()> {
        self.lock().set_body_velocity(entity, velocity)
    }

    /// Set the orientation of `entity`'s body
    pub fn set_body_rotation(&self, entity: Entity, rotation: Quat) -> PhysicsResult<()> {
        self.lock().set_body_rotation(entity, rotation)
    }

    /// Replace the world gravity vector
    pub fn set_gravity(&self, gravity: Vec3) {
        self.lock().set_gravity(gravity);
    }

    /// Closest body hit by the ray within `max_distance`
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        self.lock().raycast(origin, direction, max_distance)
    }

    /// Whether `entity`'s body has support within `probe` distance below
    /// its center
    pub fn grounded(&self, entity: Entity, probe: f32) -> bool {
        let Some((position, _)) = self.body_pose(entity) else {
            return false;
        };
        self.raycast(position, Vec3::new(0.0, -1.0, 0.0), probe)
            .is_some()
    }
}

/// System stepping the physics backend and publishing simulated poses
pub struct PhysicsSystem {
    backend: SharedBackend,
    query: QuerySpec,
}

impl PhysicsSystem {
    /// Priority the physics pass runs at
    pub const PRIORITY: i32 = 10;

    /// Wrap `backend` for scheduling
    pub fn new(backend: Box<dyn PhysicsBackend>) -> Self {
        Self {
            backend: Arc::new(Mutex::new(backend)),
            query: QuerySpec::new()
                .all::<PhysicsBodyComponent>()
                .all::<TransformComponent>(),
        }
    }

    /// Cloneable handle for gameplay raycasts and velocity writes
    pub fn handle(&self) -> PhysicsHandle {
        PhysicsHandle {
            backend: Arc::clone(&self.backend),
        }
    }

    /// Bring the backend's shadow body map in line with the world
    fn reconcile(
        world: &World,
        backend: &mut dyn PhysicsBackend,
        matched: &[Entity],
    ) -> Result<(), SystemError> {
        let keep: HashSet<Entity> = matched.iter().copied().collect();
        for entity in backend.bodies() {
            if !keep.contains(&entity) {
                debug!("physics: dropping body for {entity}");
                backend.remove_body(entity);
            }
        }

        for &entity in matched {
            if backend.has_body(entity) {
                continue;
            }
            let (Some(body), Some(transform)) = (
                world.get_component::<PhysicsBodyComponent>(entity),
                world.get_component::<TransformComponent>(entity),
            ) else {
                continue;
            };
            let desc = BodyDesc {
                body_type: body.body_type,
                mass: body.mass,
                shape: body.shape.clone(),
                position: transform.position,
                rotation: transform.rotation,
                layer: body.layer,
                mask: body.mask,
            };
            // Unsupported shapes abort the frame: a silently missing body
            // would mask a configuration mistake.
            backend
                .add_body(entity, &desc)
                .map_err(|e| SystemError::Backend(e.to_string()))?;
            debug!("physics: created {} body for {entity}", desc.shape.kind());
        }
        Ok(())
    }
}

impl System for PhysicsSystem {
    fn name(&self) -> &str {
        "physics"
    }

    fn priority(&self) -> i32 {
        Self::PRIORITY
    }

    fn init(&mut self, _world: &mut World) -> Result<(), SystemError> {
        log::info!("physics system ready");
        Ok(())
    }

    fn update(&mut self, world: &mut World, dt: f32) -> Result<(), SystemError> {
        let mut backend = self.backend.lock().unwrap_or_else(PoisonError::into_inner);
        let matched = world.query(&self.query);

        Self::reconcile(world, backend.as_mut(), &matched)?;
        backend.step(dt);

        for entity in matched {
            let Some((position, rotation)) = backend.body_pose(entity) else {
                // Recoverable: skip this entity for the frame.
                warn!("physics: no body for {entity}, skipping pose sync");
                continue;
            };
            if let Some(transform) = world.get_component_mut::<TransformComponent>(entity) {
                transform.position = position;
                transform.rotation = rotation;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::ecs::components::{BodyShape, BodyType};
    use crate::physics::ImpulseBackend;

    use super::*;

    fn physics_system() -> PhysicsSystem {
        PhysicsSystem::new(Box::new(ImpulseBackend::new(
            Vec3::new(0.0, -10.0, 0.0),
            1.0 / 60.0,
            3,
        )))
    }

    fn spawn_crate(world: &mut World, y: f32) -> Entity {
        let entity = world.create_entity();
        world
            .add_component(
                entity,
                TransformComponent::from_position(Vec3::new(0.0, y, 0.0)),
            )
            .unwrap();
        world
            .add_component(
                entity,
                PhysicsBodyComponent::dynamic(
                    1.0,
                    BodyShape::Box {
                        half_extents: Vec3::new(0.5, 0.5, 0.5),
                    },
                ),
            )
            .unwrap();
        entity
    }

    #[test]
    fn bodies_are_created_on_first_sight_and_poses_synced() {
        let mut world = World::new();
        let entity = spawn_crate(&mut world, 5.0);
        let mut system = physics_system();
        let handle = system.handle();

        system.update(&mut world, 1.0 / 60.0).unwrap();

        assert!(handle.has_body(entity));
        let transform = world.get_component::<TransformComponent>(entity).unwrap();
        assert!(transform.position.y < 5.0);
    }

    #[test]
    fn bodies_are_dropped_when_entities_disappear() {
        let mut world = World::new();
        let entity = spawn_crate(&mut world, 5.0);
        let mut system = physics_system();
        let handle = system.handle();

        system.update(&mut world, 1.0 / 60.0).unwrap();
        assert!(handle.has_body(entity));

        world.remove_entity(entity);
        system.update(&mut world, 1.0 / 60.0).unwrap();
        assert!(!handle.has_body(entity));
    }

    #[test]
    fn bodies_are_dropped_when_component_is_removed() {
        let mut world = World::new();
        let entity = spawn_crate(&mut world, 5.0);
        let mut system = physics_system();
        let handle = system.handle();

        system.update(&mut world, 1.0 / 60.0).unwrap();
        world.remove_component::<PhysicsBodyComponent>(entity);
        system.update(&mut world, 1.0 / 60.0).unwrap();
        assert!(!handle.has_body(entity));
    }

    #[test]
    fn unsupported_shape_aborts_the_frame() {
        let mut world = World::new();
        let entity = world.create_entity();
        world
            .add_component(entity, TransformComponent::identity())
            .unwrap();
        world
            .add_component(
                entity,
                PhysicsBodyComponent::fixed(BodyShape::Mesh {
                    mesh_path: "terrain.obj".to_string(),
                }),
            )
            .unwrap();
        let mut system = physics_system();

        let err = system.update(&mut world, 1.0 / 60.0).unwrap_err();
        assert!(matches!(err, SystemError::Backend(_)));
    }

    #[test]
    fn static_bodies_keep_their_seeded_pose() {
        let mut world = World::new();
        let entity = world.create_entity();
        world
            .add_component(
                entity,
                TransformComponent::from_position(Vec3::new(0.0, -2.0, 0.0)),
            )
            .unwrap();
        world
            .add_component(
                entity,
                PhysicsBodyComponent::fixed(BodyShape::Box {
                    half_extents: Vec3::new(5.0, 0.25, 5.0),
                }),
            )
            .unwrap();
        let mut system = physics_system();

        for _ in 0..10 {
            system.update(&mut world, 1.0 / 60.0).unwrap();
        }
        let transform = world.get_component::<TransformComponent>(entity).unwrap();
        assert_relative_eq!(transform.position.y, -2.0);
    }

    #[test]
    fn handle_velocity_write_survives_to_the_next_step() {
        let mut world = World::new();
        let entity = spawn_crate(&mut world, 5.0);
        let mut system = physics_system();
        let handle = system.handle();

        system.update(&mut world, 1.0 / 60.0).unwrap();
        handle
            .set_body_velocity(entity, Vec3::new(3.0, 0.0, 0.0))
            .unwrap();
        system.update(&mut world, 1.0 / 60.0).unwrap();

        let transform = world.get_component::<TransformComponent>(entity).unwrap();
        assert!(transform.position.x > 0.0);
    }
}
