//! Entity storage.
//!
//! [`EntityStore`] is the seam between replication and whatever engine owns
//! the entities. [`World`] is the in-memory implementation used by the demo
//! peer and by tests: one component per kind per entity, attaching a second
//! component of the same kind replaces the first.

use std::collections::{BTreeMap, HashMap};

use crate::component::{Component, ComponentData, ComponentKind};
use crate::entity::{Entity, EntityAllocator};

/// Errors raised by an [`EntityStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The entity was never created or has been despawned.
    #[error("no such entity: {0}")]
    NoSuchEntity(Entity),
}

/// The operations replication needs from an entity store.
pub trait EntityStore {
    /// Allocate a new entity with no components.
    fn create_entity(&mut self) -> Entity;

    /// Attach `component` to `entity`, taking ownership of it. Returns the
    /// component of the same kind it replaced, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoSuchEntity`] if `entity` does not exist.
    fn attach(
        &mut self,
        entity: Entity,
        component: Component,
    ) -> Result<Option<Component>, StoreError>;

    /// A snapshot of every component currently attached to `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoSuchEntity`] if `entity` does not exist.
    fn components(&self, entity: Entity) -> Result<Vec<Component>, StoreError>;
}

/// In-memory entity store.
#[derive(Debug, Default)]
pub struct World {
    allocator: EntityAllocator,
    entities: HashMap<Entity, BTreeMap<ComponentKind, Component>>,
}

impl World {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an entity and attach all of `components` to it.
    pub fn spawn<I>(&mut self, components: I) -> Entity
    where
        I: IntoIterator<Item = Component>,
    {
        let entity = self.create_entity();
        let slots = self.entities.entry(entity).or_default();
        for component in components {
            slots.insert(component.kind(), component);
        }
        entity
    }

    /// Remove an entity and all its components.
    ///
    /// Returns `true` if the entity existed.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        self.entities.remove(&entity).is_some()
    }

    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains_key(&entity)
    }

    /// Borrow a component of type `T` on `entity`.
    #[must_use]
    pub fn get<T: ComponentData>(&self, entity: Entity) -> Option<&T> {
        self.entities
            .get(&entity)?
            .get(&T::KIND)
            .and_then(T::from_component)
    }

    /// Mutably borrow a component of type `T` on `entity`.
    #[must_use]
    pub fn get_mut<T: ComponentData>(&mut self, entity: Entity) -> Option<&mut T> {
        self.entities
            .get_mut(&entity)?
            .get_mut(&T::KIND)
            .and_then(T::from_component_mut)
    }

    /// Returns `true` if `entity` has a component of `kind`.
    #[must_use]
    pub fn has(&self, entity: Entity, kind: ComponentKind) -> bool {
        self.entities
            .get(&entity)
            .is_some_and(|slots| slots.contains_key(&kind))
    }

    /// Detach the component of `kind` from `entity`.
    pub fn detach(&mut self, entity: Entity, kind: ComponentKind) -> Option<Component> {
        self.entities.get_mut(&entity)?.remove(&kind)
    }

    /// All live entities, in ascending id order.
    #[must_use]
    pub fn entities(&self) -> Vec<Entity> {
        let mut all: Vec<Entity> = self.entities.keys().copied().collect();
        all.sort_unstable();
        all
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

impl EntityStore for World {
    fn create_entity(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        self.entities.insert(entity, BTreeMap::new());
        entity
    }

    fn attach(
        &mut self,
        entity: Entity,
        component: Component,
    ) -> Result<Option<Component>, StoreError> {
        let slots = self
            .entities
            .get_mut(&entity)
            .ok_or(StoreError::NoSuchEntity(entity))?;
        Ok(slots.insert(component.kind(), component))
    }

    fn components(&self, entity: Entity) -> Result<Vec<Component>, StoreError> {
        self.entities
            .get(&entity)
            .map(|slots| slots.values().cloned().collect())
            .ok_or(StoreError::NoSuchEntity(entity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{Position, Renderable, Size, Speed};

    #[test]
    fn test_create_entity_is_empty() {
        let mut world = World::new();
        let e = world.create_entity();
        assert_eq!(e.id(), 1);
        assert_eq!(world.entity_count(), 1);
        assert!(world.components(e).unwrap().is_empty());
    }

    #[test]
    fn test_attach_replaces_same_kind() {
        let mut world = World::new();
        let e = world.create_entity();
        let first = world.attach(e, Position::new(1.0, 1.0).into()).unwrap();
        assert!(first.is_none());
        let replaced = world.attach(e, Position::new(2.0, 2.0).into()).unwrap();
        assert_eq!(replaced, Some(Component::from(Position::new(1.0, 1.0))));
        assert_eq!(world.get::<Position>(e).unwrap().x, 2.0);
        assert_eq!(world.components(e).unwrap().len(), 1);
    }

    #[test]
    fn test_attach_to_missing_entity() {
        let mut world = World::new();
        let err = world
            .attach(Entity::from_raw(99).unwrap(), Renderable.into())
            .unwrap_err();
        assert!(matches!(err, StoreError::NoSuchEntity(e) if e.id() == 99));
    }

    #[test]
    fn test_spawn_and_despawn() {
        let mut world = World::new();
        let size = Size {
            width: 4.0,
            height: 2.0,
        };
        let e = world.spawn([Component::from(size), Component::from(Speed::new(1.0, 0.0))]);
        assert!(world.has(e, ComponentKind::Size));
        assert!(!world.has(e, ComponentKind::Body));
        assert!(world.despawn(e));
        assert!(!world.contains(e));
        assert!(world.components(e).is_err());
    }

    #[test]
    fn test_get_mut_and_detach() {
        let mut world = World::new();
        let e = world.spawn([Component::from(Speed::new(1.0, 2.0))]);
        world.get_mut::<Speed>(e).unwrap().active = false;
        assert!(!world.get::<Speed>(e).unwrap().active);
        assert!(world.detach(e, ComponentKind::Speed).is_some());
        assert!(world.get::<Speed>(e).is_none());
    }

    #[test]
    fn test_entities_sorted() {
        let mut world = World::new();
        let a = world.create_entity();
        let b = world.create_entity();
        assert_eq!(world.entities(), vec![a, b]);
    }
}
