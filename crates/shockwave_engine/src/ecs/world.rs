//! ECS World implementation
//!
//! The world is the authoritative store of entities and their components,
//! plus a lightweight named-event bus. Systems read and write entity
//! state exclusively through this API; there is no other channel between
//! them except the events emitted here.
//!
//! All world mutation happens on the frame thread. The store provides no
//! synchronization of its own and must not be shared across threads.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use super::component::{Component, ComponentTag};
use super::entity::{Entity, EntityAllocator};
use super::query::QuerySpec;

/// Event name emitted when an entity and its components are removed
///
/// Collaborators that keep shadow state keyed by entity id (physics
/// bodies, render objects) can subscribe instead of diffing queries.
pub const ENTITY_REMOVED: &str = "entity-removed";

/// Payload handed to event handlers
#[derive(Debug, Clone, PartialEq)]
pub enum EventData {
    /// No payload
    None,
    /// An entity id
    Entity(Entity),
    /// A text payload
    Text(String),
    /// A numeric payload
    Float(f64),
}

/// Errors raised by world mutations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// A write targeted an entity the world has never issued or has
    /// already removed
    #[error("unknown {0}")]
    UnknownEntity(Entity),
}

type ComponentBox = Box<dyn Any + Send + Sync>;
type EventHandler = Box<dyn FnMut(&EventData) + Send>;

/// ECS World containing all entities and components
///
/// Component writes against an unknown entity fail loudly with
/// [`WorldError::UnknownEntity`]; reads treat absence as the ordinary
/// case and return `None`. Query results are point-in-time snapshots in
/// entity-creation order.
pub struct World {
    allocator: EntityAllocator,
    entities: BTreeMap<Entity, HashMap<ComponentTag, ComponentBox>>,
    handlers: HashMap<String, Vec<EventHandler>>,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::default(),
            entities: BTreeMap::new(),
            handlers: HashMap::new(),
        }
    }

    /// Allocate a fresh entity with an empty component set
    ///
    /// Ids are never reused, even after the entity is removed.
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        self.entities.insert(entity, HashMap::new());
        entity
    }

    /// Returns `true` while `entity` is alive
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains_key(&entity)
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Attach `component` to `entity`, overwriting any existing component
    /// of the same kind
    pub fn add_component<T: Component>(
        &mut self,
        entity: Entity,
        component: T,
    ) -> Result<(), WorldError> {
        let components = self
            .entities
            .get_mut(&entity)
            .ok_or(WorldError::UnknownEntity(entity))?;
        components.insert(ComponentTag::of::<T>(), Box::new(component));
        Ok(())
    }

    /// The component of kind `T` attached to `entity`, if any
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.entities
            .get(&entity)?
            .get(&ComponentTag::of::<T>())?
            .downcast_ref::<T>()
    }

    /// Mutable access to the component of kind `T` attached to `entity`
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.entities
            .get_mut(&entity)?
            .get_mut(&ComponentTag::of::<T>())?
            .downcast_mut::<T>()
    }

    /// Detach the component of kind `T` from `entity`; no-op when absent
    pub fn remove_component<T: Component>(&mut self, entity: Entity) {
        if let Some(components) = self.entities.get_mut(&entity) {
            components.remove(&ComponentTag::of::<T>());
        }
    }

    /// Whether `entity` currently has a component of kind `T`
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.has_tag(entity, ComponentTag::of::<T>())
    }

    /// Whether `entity` currently has a component with `tag`
    pub fn has_tag(&self, entity: Entity, tag: ComponentTag) -> bool {
        self.entities
            .get(&entity)
            .is_some_and(|components| components.contains_key(&tag))
    }

    /// Tags of every component attached to `entity`, order unspecified
    pub fn component_tags(&self, entity: Entity) -> Vec<ComponentTag> {
        self.entities
            .get(&entity)
            .map(|components| components.keys().copied().collect())
            .unwrap_or_default()
    }

    /// All components attached to `entity`, order unspecified
    pub fn components(&self, entity: Entity) -> impl Iterator<Item = &(dyn Any + Send + Sync)> {
        self.entities
            .get(&entity)
            .into_iter()
            .flat_map(|components| components.values())
            .map(|component| component.as_ref())
    }

    /// Entities matching `spec`, in entity-creation order
    ///
    /// The result is a snapshot taken at the instant of the call: it is
    /// safe to mutate the world while iterating it, and later queries
    /// will reflect those mutations.
    pub fn query(&self, spec: &QuerySpec) -> Vec<Entity> {
        self.entities
            .iter()
            .filter(|(_, components)| spec.matches(|tag| components.contains_key(&tag)))
            .map(|(&entity, _)| entity)
            .collect()
    }

    /// Remove `entity` and every component attached to it
    ///
    /// Emits [`ENTITY_REMOVED`] with the entity id so collaborators can
    /// release shadow state. No-op for unknown entities.
    pub fn remove_entity(&mut self, entity: Entity) {
        if self.entities.remove(&entity).is_some() {
            self.emit(ENTITY_REMOVED, &EventData::Entity(entity));
        }
    }

    /// Register `handler` for every future emit of `name`
    ///
    /// Handlers for the same name run in registration order.
    pub fn on(&mut self, name: &str, handler: impl FnMut(&EventData) + Send + 'static) {
        self.handlers
            .entry(name.to_string())
            .or_default()
            .push(Box::new(handler));
    }

    /// Synchronously invoke every handler registered for `name`, in
    /// registration order, passing `data`
    ///
    /// Handlers are not isolated from one another: a panicking handler
    /// aborts the rest of the dispatch.
    pub fn emit(&mut self, name: &str, data: &EventData) {
        if let Some(handlers) = self.handlers.get_mut(name) {
            for handler in handlers.iter_mut() {
                handler(data);
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
