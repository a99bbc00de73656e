//! # Shockwave Engine
//!
//! An entity-component-system runtime that drives real-time interactive
//! scenes: tag-keyed component storage, `all`/`any`/`none` entity
//! queries, a named-event bus, and a priority-ordered scheduler running
//! input, physics, gameplay, and rendering once per frame.
//!
//! Rendering, physics simulation, and device input capture live behind
//! narrow seams ([`render::RenderBackend`], [`physics::PhysicsBackend`],
//! [`input::InputHandle`]); the crate ships headless implementations so
//! scenes run and test without a window.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shockwave_engine::prelude::*;
//!
//! fn main() -> Result<(), EngineError> {
//!     let mut world = World::new();
//!     let crate_entity = world.create_entity();
//!     world
//!         .add_component(crate_entity, TransformComponent::default())
//!         .expect("entity was just created");
//!     world
//!         .add_component(crate_entity, RenderableComponent::new("crate"))
//!         .expect("entity was just created");
//!
//!     let config = EngineConfig::default();
//!     let mut engine = Engine::new(world, config);
//!     engine.add_system(Box::new(RenderSystem::new(Box::new(
//!         HeadlessBackend::new(),
//!     ))))?;
//!     engine.init()?;
//!     engine.start()
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;
pub mod ecs;
pub mod foundation;
pub mod input;
pub mod physics;
pub mod player;
pub mod render;
pub mod scene;

mod engine;

pub use engine::{Engine, EngineError, EngineState, ENGINE_STOP};

/// Common imports for engine users
pub mod prelude {
    pub use crate::core::config::{
        Config, ConfigError, EngineConfig, FailurePolicy, PhysicsConfig, TimingConfig,
    };
    pub use crate::ecs::components::{
        BodyShape, BodyType, CameraComponent, PhysicsBodyComponent, PlayerControllerComponent,
        RenderableComponent, TransformComponent,
    };
    pub use crate::ecs::{
        Component, ComponentTag, Entity, EventData, QuerySpec, System, SystemError, World,
        WorldError, ENTITY_REMOVED,
    };
    pub use crate::foundation::{
        logging,
        math::{Mat4, Quat, Vec3},
        time::Timer,
    };
    pub use crate::input::{InputEvent, InputHandle, InputSystem, Key, MouseButton};
    pub use crate::physics::{
        layers, BodyDesc, ImpulseBackend, PhysicsBackend, PhysicsHandle, PhysicsSystem, RayHit,
    };
    pub use crate::player::PlayerMovementSystem;
    pub use crate::render::{
        CameraPose, HeadlessBackend, ObjectHandle, RenderBackend, RenderSystem,
    };
    pub use crate::scene::{self, ComponentData, SceneData, SceneEntity};
    pub use crate::{Engine, EngineError, EngineState, ENGINE_STOP};
}

#[cfg(test)]
mod frame_loop_tests {
    //! Full-pipeline coverage: the four systems wired the way a host
    //! wires them, driven through the engine for several frames.

    use crate::prelude::*;

    fn spawn_floor(world: &mut World) -> Entity {
        let floor = world.create_entity();
        world
            .add_component(
                floor,
                TransformComponent::from_position(Vec3::new(0.0, -2.0, 0.0)),
            )
            .unwrap();
        world
            .add_component(floor, RenderableComponent::new("floor"))
            .unwrap();
        world
            .add_component(
                floor,
                PhysicsBodyComponent::fixed(BodyShape::Box {
                    half_extents: Vec3::new(20.0, 0.25, 20.0),
                }),
            )
            .unwrap();
        floor
    }

    fn spawn_player(world: &mut World) -> Entity {
        let player = world.create_entity();
        world
            .add_component(
                player,
                TransformComponent::from_position(Vec3::new(0.0, -0.75, 0.0)),
            )
            .unwrap();
        world
            .add_component(player, RenderableComponent::new("player"))
            .unwrap();
        world
            .add_component(
                player,
                PhysicsBodyComponent::new(
                    BodyType::Dynamic,
                    70.0,
                    BodyShape::Capsule {
                        radius: 0.5,
                        height: 1.0,
                    },
                ),
            )
            .unwrap();
        world
            .add_component(player, PlayerControllerComponent::default())
            .unwrap();
        world
            .add_component(player, CameraComponent::default())
            .unwrap();
        player
    }

    #[test]
    fn input_drives_the_player_through_physics_to_the_renderer() {
        let mut world = World::new();
        spawn_floor(&mut world);
        let player = spawn_player(&mut world);

        let input = InputSystem::new();
        let input_handle = input.handle();
        let physics = PhysicsSystem::new(Box::new(ImpulseBackend::new(
            Vec3::new(0.0, -9.82, 0.0),
            1.0 / 60.0,
            3,
        )));
        let physics_handle = physics.handle();
        let player_movement = PlayerMovementSystem::new(input.handle(), physics.handle());
        let render = RenderSystem::new(Box::new(HeadlessBackend::new()));

        let mut engine = Engine::new(world, EngineConfig::default());
        // Registration order is deliberately scrambled; priorities fix it.
        engine.add_system(Box::new(render)).unwrap();
        engine.add_system(Box::new(input)).unwrap();
        engine.add_system(Box::new(player_movement)).unwrap();
        engine.add_system(Box::new(physics)).unwrap();
        engine.init().unwrap();

        input_handle.push_event(InputEvent::KeyPressed(Key::W));
        for _ in 0..30 {
            engine.tick(1.0 / 60.0).unwrap();
        }

        // The player walked along -Z...
        let transform = engine
            .world()
            .get_component::<TransformComponent>(player)
            .unwrap();
        assert!(transform.position.z < -0.5);
        // ...the physics backend agrees...
        let (pose, _) = physics_handle.body_pose(player).unwrap();
        assert!((pose.z - transform.position.z).abs() < 1e-5);
        assert_eq!(engine.frame(), 30);
        assert_eq!(engine.state(), EngineState::Initialized);
        // ...and both renderables are still live in the world.
        let renderable_query = QuerySpec::new().all::<RenderableComponent>();
        assert_eq!(engine.world().query(&renderable_query).len(), 2);
    }

    #[test]
    fn removing_an_entity_reaches_every_shadow_index() {
        let mut world = World::new();
        spawn_floor(&mut world);
        let player = spawn_player(&mut world);

        let input = InputSystem::new();
        let physics = PhysicsSystem::new(Box::new(ImpulseBackend::new(
            Vec3::new(0.0, -9.82, 0.0),
            1.0 / 60.0,
            3,
        )));
        let physics_handle = physics.handle();
        let player_movement = PlayerMovementSystem::new(input.handle(), physics.handle());
        let render = RenderSystem::new(Box::new(HeadlessBackend::new()));

        let mut engine = Engine::new(world, EngineConfig::default());
        engine.add_system(Box::new(input)).unwrap();
        engine.add_system(Box::new(physics)).unwrap();
        engine.add_system(Box::new(player_movement)).unwrap();
        engine.add_system(Box::new(render)).unwrap();
        engine.init().unwrap();

        engine.tick(1.0 / 60.0).unwrap();
        assert!(physics_handle.has_body(player));

        engine.world_mut().remove_entity(player);
        engine.tick(1.0 / 60.0).unwrap();

        assert!(!physics_handle.has_body(player));
        assert!(engine
            .world()
            .query(&QuerySpec::new().all::<PlayerControllerComponent>())
            .is_empty());
    }
}
