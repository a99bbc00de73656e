//! Sandbox runtime
//!
//! Headless demo session: a floor, a handful of falling crates, and a
//! player-controlled capsule with a camera, driven through the full
//! input → physics → player → render frame loop for a bounded number of
//! frames. A scripted walk stands in for a real input device.

use rand::Rng;
use shockwave_engine::prelude::*;

/// Frames the demo session runs for
const DEMO_FRAMES: u64 = 300;

fn spawn_floor(world: &mut World) -> Result<Entity, WorldError> {
    let floor = world.create_entity();
    let mut transform = TransformComponent::from_position(Vec3::new(0.0, -2.0, 0.0));
    transform.scale = Vec3::new(10.0, 0.5, 10.0);
    world.add_component(floor, transform)?;
    world.add_component(floor, RenderableComponent::new("floor"))?;
    world.add_component(
        floor,
        PhysicsBodyComponent::fixed(BodyShape::Box {
            half_extents: Vec3::new(5.0, 0.25, 5.0),
        }),
    )?;
    Ok(floor)
}

fn spawn_crates(world: &mut World, count: usize) -> Result<Vec<Entity>, WorldError> {
    let mut rng = rand::thread_rng();
    let mut crates = Vec::with_capacity(count);
    for _ in 0..count {
        let entity = world.create_entity();
        let position = Vec3::new(
            rng.gen_range(-4.0..4.0),
            rng.gen_range(3.0..8.0),
            rng.gen_range(-4.0..4.0),
        );
        world.add_component(entity, TransformComponent::from_position(position))?;
        world.add_component(entity, RenderableComponent::new("crate"))?;
        world.add_component(
            entity,
            PhysicsBodyComponent::dynamic(
                1.0,
                BodyShape::Box {
                    half_extents: Vec3::new(0.5, 0.5, 0.5),
                },
            ),
        )?;
        crates.push(entity);
    }
    Ok(crates)
}

fn spawn_player(world: &mut World) -> Result<Entity, WorldError> {
    let player = world.create_entity();
    world.add_component(
        player,
        TransformComponent::from_position(Vec3::new(0.0, 0.5, 5.0)),
    )?;
    world.add_component(player, RenderableComponent::new("player"))?;
    world.add_component(player, PlayerControllerComponent::default())?;
    world.add_component(player, CameraComponent::default())?;
    world.add_component(
        player,
        PhysicsBodyComponent {
            layer: layers::PLAYER,
            ..PhysicsBodyComponent::new(
                BodyType::Dynamic,
                70.0,
                BodyShape::Capsule {
                    radius: 0.5,
                    height: 1.0,
                },
            )
        },
    )?;
    Ok(player)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let mut world = World::new();
    spawn_floor(&mut world)?;
    let crates = spawn_crates(&mut world, 5)?;
    let player = spawn_player(&mut world)?;
    log::info!(
        "scene ready: {} entities ({} crates)",
        world.entity_count(),
        crates.len()
    );

    let config = EngineConfig {
        timing: TimingConfig {
            max_frames: DEMO_FRAMES,
            ..Default::default()
        },
        ..Default::default()
    };

    let input = InputSystem::new();
    let input_handle = input.handle();
    let physics = PhysicsSystem::new(Box::new(ImpulseBackend::new(
        config.physics.gravity_vec(),
        config.physics.fixed_timestep,
        config.physics.max_substeps,
    )));
    let physics_handle = physics.handle();
    let player_movement = PlayerMovementSystem::new(input.handle(), physics.handle());
    let render = RenderSystem::new(Box::new(HeadlessBackend::new()));

    let mut engine = Engine::new(world, config);
    engine.add_system(Box::new(input))?;
    engine.add_system(Box::new(physics))?;
    engine.add_system(Box::new(player_movement))?;
    engine.add_system(Box::new(render))?;
    engine.init()?;

    // Scripted input: capture the pointer, glance left, walk forward.
    input_handle.push_event(InputEvent::PointerLock(true));
    input_handle.push_event(InputEvent::MouseMoved { dx: -120.0, dy: 0.0 });
    input_handle.push_event(InputEvent::KeyPressed(Key::W));

    engine.start()?;

    let transform = engine
        .world()
        .get_component::<TransformComponent>(player)
        .ok_or("player transform missing after run")?;
    log::info!(
        "session done after {} frames; player at ({:.2}, {:.2}, {:.2}), grounded: {}",
        engine.frame(),
        transform.position.x,
        transform.position.y,
        transform.position.z,
        physics_handle.grounded(player, 1.2),
    );

    let scene = scene::snapshot(engine.world());
    log::info!(
        "scene snapshot: {} entities, {} bytes of RON",
        scene.entities.len(),
        scene.to_ron_string()?.len()
    );
    Ok(())
}
