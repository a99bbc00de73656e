//! Scene persistence
//!
//! A scene is a flat list of entities, each a bag of serialized built-in
//! components. Loading allocates fresh entity ids and issues ordinary
//! `create_entity`/`add_component` calls; files never carry ids, since
//! ids are world-local and never reused. Names and tags ride along for
//! editors but attach nothing to the world.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ecs::components::{
    CameraComponent, PhysicsBodyComponent, PlayerControllerComponent, RenderableComponent,
    TransformComponent,
};
use crate::ecs::{Entity, QuerySpec, World, WorldError};

/// Errors raised while loading or saving scenes
#[derive(Error, Debug)]
pub enum SceneError {
    /// A world write failed during load
    #[error(transparent)]
    World(#[from] WorldError),

    /// The scene text could not be parsed
    #[error("scene parse error: {0}")]
    Parse(String),

    /// The scene could not be serialized
    #[error("scene serialize error: {0}")]
    Serialize(String),
}

/// One serialized component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComponentData {
    /// Spatial pose
    Transform(TransformComponent),

    /// Drawable description
    Renderable(RenderableComponent),

    /// Simulated body description
    PhysicsBody(PhysicsBodyComponent),

    /// Player tuning
    PlayerController(PlayerControllerComponent),

    /// Camera parameters
    Camera(CameraComponent),
}

/// One entity's serialized component bag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SceneEntity {
    /// Display name, editor-facing only
    pub name: String,

    /// Free-form grouping tags, editor-facing only
    pub tags: Vec<String>,

    /// Components to attach on load
    pub components: Vec<ComponentData>,
}

/// A flat, serializable scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SceneData {
    /// Entities in spawn order
    pub entities: Vec<SceneEntity>,
}

impl SceneData {
    /// Parse a scene from RON text
    pub fn from_ron_str(text: &str) -> Result<Self, SceneError> {
        ron::from_str(text).map_err(|e| SceneError::Parse(e.to_string()))
    }

    /// Serialize to pretty RON text
    pub fn to_ron_string(&self) -> Result<String, SceneError> {
        ron::ser::to_string_pretty(self, Default::default())
            .map_err(|e| SceneError::Serialize(e.to_string()))
    }
}

/// Instantiate `scene` into `world`, returning the new entities in spawn order
pub fn load(world: &mut World, scene: &SceneData) -> Result<Vec<Entity>, SceneError> {
    let mut spawned = Vec::with_capacity(scene.entities.len());
    for record in &scene.entities {
        let entity = world.create_entity();
        for component in &record.components {
            match component.clone() {
                ComponentData::Transform(c) => world.add_component(entity, c)?,
                ComponentData::Renderable(c) => world.add_component(entity, c)?,
                ComponentData::PhysicsBody(c) => world.add_component(entity, c)?,
                ComponentData::PlayerController(c) => world.add_component(entity, c)?,
                ComponentData::Camera(c) => world.add_component(entity, c)?,
            }
        }
        spawned.push(entity);
    }
    log::info!("scene loaded: {} entities", spawned.len());
    Ok(spawned)
}

/// Capture every entity's built-in components as a scene, in creation order
pub fn snapshot(world: &World) -> SceneData {
    let mut entities = Vec::new();
    for entity in world.query(&QuerySpec::new()) {
        let mut components = Vec::new();
        if let Some(c) = world.get_component::<TransformComponent>(entity) {
            components.push(ComponentData::Transform(c.clone()));
        }
        if let Some(c) = world.get_component::<RenderableComponent>(entity) {
            components.push(ComponentData::Renderable(c.clone()));
        }
        if let Some(c) = world.get_component::<PhysicsBodyComponent>(entity) {
            components.push(ComponentData::PhysicsBody(c.clone()));
        }
        if let Some(c) = world.get_component::<PlayerControllerComponent>(entity) {
            components.push(ComponentData::PlayerController(c.clone()));
        }
        if let Some(c) = world.get_component::<CameraComponent>(entity) {
            components.push(ComponentData::Camera(c.clone()));
        }
        entities.push(SceneEntity {
            name: format!("entity-{}", entity.id()),
            tags: Vec::new(),
            components,
        });
    }
    SceneData { entities }
}
