//! # Entity Registry
//!
//! Binds the entity pool, the component factory, and the stable-ID lookup
//! table into one surface. Everything that creates or destroys simulation
//! state goes through here, so the three structures can never disagree:
//!
//! - spawn inserts the ID mapping before the new handle is returned
//! - despawn removes the ID mapping before the slot is recycled
//! - despawn releases every component the entity still owns
//!
//! Handles are positional and die with the slot; [`EntityId`]s are serial
//! and never reused, which is what the network layer keys on.

use std::collections::HashMap;

use crate::component::{Component, ComponentKind};
use crate::entity::{Entity, EntityHandle, EntityId};
use crate::error::CoreResult;
use crate::factory::{ComponentFactory, ComponentHandle};
use crate::pool::EntityPool;

/// Central entity and component store.
pub struct Registry {
    pool: EntityPool,
    factory: ComponentFactory,
    ids: HashMap<EntityId, EntityHandle>,
    next_serial: u64,
}

impl Registry {
    /// Creates a registry with fixed entity and per-kind component
    /// capacities. All memory is allocated here.
    ///
    /// # Panics
    ///
    /// Panics if either capacity is zero or exceeds `u32::MAX`.
    #[must_use]
    pub fn new(entity_capacity: usize, component_capacity: usize) -> Self {
        Self {
            pool: EntityPool::new(entity_capacity),
            factory: ComponentFactory::new(component_capacity),
            ids: HashMap::with_capacity(entity_capacity),
            // Serial 0 is reserved for EntityId::NONE.
            next_serial: 1,
        }
    }

    /// Spawns an empty entity with a fresh stable ID.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PoolExhausted`](crate::CoreError::PoolExhausted)
    /// when the entity pool is full; the ID counter is not advanced in that
    /// case.
    pub fn spawn(&mut self) -> CoreResult<EntityHandle> {
        let id = EntityId(self.next_serial);
        let handle = self.pool.spawn(id)?;
        self.next_serial += 1;
        // Mapping is visible before the handle escapes.
        self.ids.insert(id, handle);
        Ok(handle)
    }

    /// Despawns an entity, releasing its slot, its ID mapping, and every
    /// component it still owns.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidHandle`](crate::CoreError::InvalidHandle)
    /// if the handle is stale.
    pub fn despawn(&mut self, handle: EntityHandle) -> CoreResult<()> {
        let id = self.pool.get(handle)?.id();
        // Lookups stop resolving before the slot can be reused.
        self.ids.remove(&id);
        let snapshot = self.pool.despawn(handle)?;
        for component in snapshot.component_handles().into_iter().flatten() {
            self.factory.free_kind(component)?;
        }
        Ok(())
    }

    /// Current handle of the entity with stable ID `id`, if it is alive.
    #[inline]
    #[must_use]
    pub fn handle_of(&self, id: EntityId) -> Option<EntityHandle> {
        self.ids.get(&id).copied()
    }

    /// Resolves a handle to its entity.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidHandle`](crate::CoreError::InvalidHandle)
    /// if the handle is stale.
    #[inline]
    pub fn entity(&self, handle: EntityHandle) -> CoreResult<&Entity> {
        self.pool.get(handle)
    }

    /// Looks up an entity by stable ID.
    #[inline]
    #[must_use]
    pub fn entity_by_id(&self, id: EntityId) -> Option<&Entity> {
        let handle = self.handle_of(id)?;
        self.pool.get(handle).ok()
    }

    /// Attaches `component` to the entity, claiming a factory slot, binding
    /// the owner, and flipping the entity's kind bit as the final step.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidHandle`](crate::CoreError::InvalidHandle)
    /// if the entity handle is stale, or
    /// [`CoreError::PoolExhausted`](crate::CoreError::PoolExhausted) if the
    /// kind's pool is full. Neither case modifies the entity.
    ///
    /// # Panics
    ///
    /// Panics if the entity already has a component of this kind. One
    /// component per kind is a structural invariant, not a runtime
    /// condition.
    pub fn attach<C: Component>(
        &mut self,
        handle: EntityHandle,
        component: C,
    ) -> CoreResult<ComponentHandle> {
        let entity = self.pool.get(handle)?;
        assert!(
            !entity.has_kind(C::KIND),
            "entity {} already has a {} component",
            entity.id(),
            C::KIND.name()
        );
        let id = entity.id();

        let slot = self.factory.create::<C>()?;
        let stored = self.factory.get_mut::<C>(slot)?;
        *stored = component;
        stored.bind_owner(id);

        self.pool.get_mut(handle)?.set_component(C::KIND, slot);
        Ok(slot)
    }

    /// Detaches and returns the entity's component of `C`'s kind, or
    /// `None` if no such component is attached.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidHandle`](crate::CoreError::InvalidHandle)
    /// if the entity handle is stale.
    pub fn detach<C: Component>(&mut self, handle: EntityHandle) -> CoreResult<Option<C>> {
        let entity = self.pool.get_mut(handle)?;
        let Some(slot) = entity.clear_component(C::KIND) else {
            return Ok(None);
        };
        self.factory.free::<C>(slot).map(Some)
    }

    /// The entity's component of `C`'s kind, or `None` if the handle is
    /// stale or no such component is attached.
    #[inline]
    #[must_use]
    pub fn component<C: Component>(&self, handle: EntityHandle) -> Option<&C> {
        let entity = self.pool.get(handle).ok()?;
        let slot = entity.component_handle(C::KIND)?;
        self.factory.get::<C>(slot).ok()
    }

    /// Mutable access to the entity's component of `C`'s kind.
    #[inline]
    pub fn component_mut<C: Component>(&mut self, handle: EntityHandle) -> Option<&mut C> {
        let entity = self.pool.get(handle).ok()?;
        let slot = entity.component_handle(C::KIND)?;
        self.factory.get_mut::<C>(slot).ok()
    }

    /// The entity's component of `C`'s kind, which must be attached.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the component is missing. Callers
    /// use this only where membership was already established.
    #[must_use]
    pub fn expect_component<C: Component>(&self, handle: EntityHandle) -> &C {
        match self.component::<C>(handle) {
            Some(component) => component,
            None => panic!("live entity is missing a required {} component", C::KIND),
        }
    }

    /// Mutable variant of [`expect_component`](Self::expect_component).
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the component is missing.
    pub fn expect_component_mut<C: Component>(&mut self, handle: EntityHandle) -> &mut C {
        match self.component_mut::<C>(handle) {
            Some(component) => component,
            None => panic!("live entity is missing a required {} component", C::KIND),
        }
    }

    /// Whether the entity behind `handle` is alive and has a component of
    /// `kind`.
    #[inline]
    #[must_use]
    pub fn has_kind(&self, handle: EntityHandle, kind: ComponentKind) -> bool {
        self.pool
            .get(handle)
            .is_ok_and(|entity| entity.has_kind(kind))
    }

    /// The entity pool, for iteration.
    #[inline]
    #[must_use]
    pub const fn pool(&self) -> &EntityPool {
        &self.pool
    }

    /// The component factory, for pool statistics.
    #[inline]
    #[must_use]
    pub const fn factory(&self) -> &ComponentFactory {
        &self.factory
    }

    /// Number of live entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.pool.alive_count()
    }

    /// Entity capacity.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.pool.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ActorComponent, ModelComponent, SceneComponent};
    use argos_shared::math::Vec3;

    #[test]
    fn test_spawn_assigns_serial_ids() {
        let mut registry = Registry::new(8, 8);

        let a = registry.spawn().unwrap();
        let b = registry.spawn().unwrap();

        let id_a = registry.entity(a).unwrap().id();
        let id_b = registry.entity(b).unwrap().id();
        assert_eq!(id_a, EntityId(1));
        assert_eq!(id_b, EntityId(2));
        assert_eq!(registry.handle_of(id_a), Some(a));
        assert_eq!(registry.handle_of(id_b), Some(b));
    }

    #[test]
    fn test_id_map_agrees_with_pool() {
        let mut registry = Registry::new(4, 4);

        let a = registry.spawn().unwrap();
        let id_a = registry.entity(a).unwrap().id();
        registry.despawn(a).unwrap();
        assert_eq!(registry.handle_of(id_a), None);
        assert!(registry.entity_by_id(id_a).is_none());

        // Slot reuse must not resurrect the old ID.
        let b = registry.spawn().unwrap();
        let id_b = registry.entity(b).unwrap().id();
        assert_eq!(b.index(), a.index());
        assert_ne!(id_b, id_a);
        assert_eq!(registry.entity_by_id(id_b).unwrap().id(), id_b);
    }

    #[test]
    fn test_attach_roundtrip() {
        let mut registry = Registry::new(4, 4);
        let entity = registry.spawn().unwrap();
        let id = registry.entity(entity).unwrap().id();

        let scene = SceneComponent::at(Vec3::new(5.0, 0.0, -3.0));
        let _ = registry.attach(entity, scene).unwrap();

        assert!(registry.has_kind(entity, ComponentKind::Scene));
        let stored = registry.component::<SceneComponent>(entity).unwrap();
        assert_eq!(stored.transform.position, Vec3::new(5.0, 0.0, -3.0));
        assert_eq!(stored.owner(), id);
        assert!(registry.component::<ActorComponent>(entity).is_none());
    }

    #[test]
    #[should_panic(expected = "already has a scene component")]
    fn test_attach_duplicate_kind_panics() {
        let mut registry = Registry::new(4, 4);
        let entity = registry.spawn().unwrap();
        let _ = registry.attach(entity, SceneComponent::default()).unwrap();
        let _ = registry.attach(entity, SceneComponent::default());
    }

    #[test]
    #[should_panic(expected = "missing a required actor component")]
    fn test_expect_missing_component_panics() {
        let mut registry = Registry::new(4, 4);
        let entity = registry.spawn().unwrap();
        let _ = registry.expect_component::<ActorComponent>(entity);
    }

    #[test]
    fn test_despawn_releases_components() {
        let mut registry = Registry::new(4, 4);
        let entity = registry.spawn().unwrap();
        let _ = registry.attach(entity, SceneComponent::default()).unwrap();
        let _ = registry
            .attach(entity, ModelComponent::named("cube", "default"))
            .unwrap();
        assert_eq!(registry.factory().total_alive(), 2);

        registry.despawn(entity).unwrap();
        assert_eq!(registry.factory().total_alive(), 0);
        assert_eq!(registry.alive_count(), 0);
        assert!(registry.component::<SceneComponent>(entity).is_none());
    }

    #[test]
    fn test_detach_returns_component() {
        let mut registry = Registry::new(4, 4);
        let entity = registry.spawn().unwrap();
        let _ = registry
            .attach(entity, ModelComponent::named("lamp", "emissive"))
            .unwrap();

        let taken = registry.detach::<ModelComponent>(entity).unwrap().unwrap();
        assert_eq!(taken.mesh, "lamp");
        assert!(!registry.has_kind(entity, ComponentKind::Model));
        assert!(registry.detach::<ModelComponent>(entity).unwrap().is_none());
    }

    #[test]
    fn test_stale_handle_rejected_after_despawn() {
        let mut registry = Registry::new(4, 4);
        let entity = registry.spawn().unwrap();
        registry.despawn(entity).unwrap();

        assert!(registry.entity(entity).is_err());
        assert!(registry.despawn(entity).is_err());
        assert!(registry.attach(entity, SceneComponent::default()).is_err());
    }

    #[test]
    fn test_failed_spawn_preserves_id_sequence() {
        let mut registry = Registry::new(1, 1);
        let a = registry.spawn().unwrap();
        assert!(registry.spawn().is_err());
        registry.despawn(a).unwrap();

        let b = registry.spawn().unwrap();
        assert_eq!(registry.entity(b).unwrap().id(), EntityId(2));
    }
}
