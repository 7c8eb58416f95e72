//! # Component Factory
//!
//! One fixed-capacity pool per component kind, behind a generic
//! create/free surface dispatched on the kind tag.
//!
//! Creation is two-step: [`ComponentFactory::create`] claims a slot holding
//! the component's default value, then the caller initializes the slot in
//! place through [`ComponentFactory::get_mut`]. Attachment to an entity is
//! the registry's job and happens after initialization.
//!
//! The kind-to-pool mapping lives in this file, in the [`Component`] impl
//! blocks at the bottom. Adding a component kind means one pool field, one
//! impl block, and one arm in [`ComponentFactory::free_kind`].

use std::fmt;

use crate::component::{
    ActorComponent, CameraComponent, Component, ComponentKind, LightComponent, ModelComponent,
    PhysicsComponent, SceneComponent,
};
use crate::entity::EntityId;
use crate::error::{CoreError, CoreResult};

/// Location of a component inside its kind's pool.
///
/// Generation-scoped: handles into recycled slots stop resolving once the
/// slot is reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub struct ComponentHandle {
    kind: ComponentKind,
    index: u32,
    generation: u32,
}

impl ComponentHandle {
    /// Creates a handle from its parts.
    pub const fn new(kind: ComponentKind, index: u32, generation: u32) -> Self {
        Self {
            kind,
            index,
            generation,
        }
    }

    /// Kind of the component this handle refers to.
    #[must_use]
    pub const fn kind(self) -> ComponentKind {
        self.kind
    }

    /// Slot index inside the kind's pool.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Pool generation when the slot was claimed.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ComponentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}(gen={})", self.kind, self.index, self.generation)
    }
}

/// Fixed-capacity storage for one component kind.
///
/// All slots are allocated at construction; create and free recycle them
/// through a free list and never allocate.
pub struct ComponentPool<C: Component> {
    slots: Box<[Option<C>]>,
    generations: Box<[u32]>,
    free: Vec<u32>,
    alive_count: usize,
}

impl<C: Component> ComponentPool<C> {
    /// Creates a pool with `capacity` pre-allocated slots.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or exceeds `u32::MAX`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "component capacity must be greater than zero");
        assert!(
            capacity <= u32::MAX as usize,
            "component capacity cannot exceed u32::MAX"
        );

        let slots = (0..capacity)
            .map(|_| None)
            .collect::<Vec<_>>()
            .into_boxed_slice();
        let generations = vec![0; capacity].into_boxed_slice();
        let free: Vec<u32> = (0..capacity as u32).rev().collect();

        Self {
            slots,
            generations,
            free,
            alive_count: 0,
        }
    }

    /// Maximum number of simultaneously live components of this kind.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of currently live components of this kind.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Claims a slot holding `C::default()`, ready for in-place
    /// initialization.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PoolExhausted`] when every slot is live.
    pub fn create(&mut self) -> CoreResult<ComponentHandle> {
        let Some(index) = self.free.pop() else {
            return Err(CoreError::PoolExhausted {
                pool: C::KIND.name(),
                capacity: self.capacity(),
            });
        };

        let idx = index as usize;
        let generation = self.generations[idx].wrapping_add(1);
        self.generations[idx] = generation;
        self.slots[idx] = Some(C::default());
        self.alive_count += 1;

        Ok(ComponentHandle::new(C::KIND, index, generation))
    }

    /// Releases the slot behind `handle`, returning the component value.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidHandle`] if the handle is stale, out of
    /// range, or of the wrong kind.
    pub fn free(&mut self, handle: ComponentHandle) -> CoreResult<C> {
        let idx = self.resolve(handle)?;
        let stale = self.stale(handle);
        let component = self.slots[idx].take().ok_or(stale)?;
        self.alive_count -= 1;
        self.free.push(handle.index());
        Ok(component)
    }

    /// Resolves `handle` to the live component behind it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidHandle`] if the handle is stale, out of
    /// range, or of the wrong kind.
    #[inline]
    pub fn get(&self, handle: ComponentHandle) -> CoreResult<&C> {
        let idx = self.resolve(handle)?;
        self.slots[idx].as_ref().ok_or_else(|| self.stale(handle))
    }

    /// Resolves `handle` to the live component behind it, mutably.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidHandle`] if the handle is stale, out of
    /// range, or of the wrong kind.
    #[inline]
    pub fn get_mut(&mut self, handle: ComponentHandle) -> CoreResult<&mut C> {
        let idx = self.resolve(handle)?;
        let stale = self.stale(handle);
        self.slots[idx].as_mut().ok_or(stale)
    }

    fn resolve(&self, handle: ComponentHandle) -> Result<usize, CoreError> {
        let idx = handle.index() as usize;
        if handle.kind() != C::KIND
            || idx >= self.capacity()
            || self.generations[idx] != handle.generation()
            || self.slots[idx].is_none()
        {
            return Err(self.stale(handle));
        }
        Ok(idx)
    }

    fn stale(&self, handle: ComponentHandle) -> CoreError {
        CoreError::InvalidHandle {
            pool: C::KIND.name(),
            index: handle.index(),
            generation: handle.generation(),
        }
    }
}

/// The six kind pools behind one generic surface.
pub struct ComponentFactory {
    actors: ComponentPool<ActorComponent>,
    cameras: ComponentPool<CameraComponent>,
    lights: ComponentPool<LightComponent>,
    models: ComponentPool<ModelComponent>,
    physics: ComponentPool<PhysicsComponent>,
    scenes: ComponentPool<SceneComponent>,
}

impl ComponentFactory {
    /// Creates a factory whose every kind pool holds `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or exceeds `u32::MAX`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            actors: ComponentPool::new(capacity),
            cameras: ComponentPool::new(capacity),
            lights: ComponentPool::new(capacity),
            models: ComponentPool::new(capacity),
            physics: ComponentPool::new(capacity),
            scenes: ComponentPool::new(capacity),
        }
    }

    /// Claims a slot of `C`'s kind holding the default value.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PoolExhausted`] when the kind's pool is full.
    pub fn create<C: Component>(&mut self) -> CoreResult<ComponentHandle> {
        C::pool_mut(self).create()
    }

    /// Releases a typed slot, returning the component value.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidHandle`] if the handle is stale.
    pub fn free<C: Component>(&mut self, handle: ComponentHandle) -> CoreResult<C> {
        C::pool_mut(self).free(handle)
    }

    /// Releases a slot of any kind, dispatching on the handle's kind tag.
    ///
    /// Used by the despawn path, which walks an entity's mixed-kind handle
    /// set.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidHandle`] if the handle is stale.
    pub fn free_kind(&mut self, handle: ComponentHandle) -> CoreResult<()> {
        match handle.kind() {
            ComponentKind::Actor => self.actors.free(handle).map(drop),
            ComponentKind::Camera => self.cameras.free(handle).map(drop),
            ComponentKind::Light => self.lights.free(handle).map(drop),
            ComponentKind::Model => self.models.free(handle).map(drop),
            ComponentKind::Physics => self.physics.free(handle).map(drop),
            ComponentKind::Scene => self.scenes.free(handle).map(drop),
        }
    }

    /// Resolves a typed handle.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidHandle`] if the handle is stale.
    #[inline]
    pub fn get<C: Component>(&self, handle: ComponentHandle) -> CoreResult<&C> {
        C::pool(self).get(handle)
    }

    /// Resolves a typed handle, mutably.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidHandle`] if the handle is stale.
    #[inline]
    pub fn get_mut<C: Component>(&mut self, handle: ComponentHandle) -> CoreResult<&mut C> {
        C::pool_mut(self).get_mut(handle)
    }

    /// Number of live components of `C`'s kind.
    #[must_use]
    pub fn alive_count<C: Component>(&self) -> usize {
        C::pool(self).alive_count()
    }

    /// Total live components across every kind pool.
    #[must_use]
    pub fn total_alive(&self) -> usize {
        self.actors.alive_count()
            + self.cameras.alive_count()
            + self.lights.alive_count()
            + self.models.alive_count()
            + self.physics.alive_count()
            + self.scenes.alive_count()
    }
}

// =============================================================================
// Kind-to-pool mapping - one impl block per component kind
// =============================================================================

impl Component for ActorComponent {
    const KIND: ComponentKind = ComponentKind::Actor;
    fn owner(&self) -> EntityId {
        self.owner
    }
    fn bind_owner(&mut self, owner: EntityId) {
        self.owner = owner;
    }
    fn pool(factory: &ComponentFactory) -> &ComponentPool<Self> {
        &factory.actors
    }
    fn pool_mut(factory: &mut ComponentFactory) -> &mut ComponentPool<Self> {
        &mut factory.actors
    }
}

impl Component for CameraComponent {
    const KIND: ComponentKind = ComponentKind::Camera;
    fn owner(&self) -> EntityId {
        self.owner
    }
    fn bind_owner(&mut self, owner: EntityId) {
        self.owner = owner;
    }
    fn pool(factory: &ComponentFactory) -> &ComponentPool<Self> {
        &factory.cameras
    }
    fn pool_mut(factory: &mut ComponentFactory) -> &mut ComponentPool<Self> {
        &mut factory.cameras
    }
}

impl Component for LightComponent {
    const KIND: ComponentKind = ComponentKind::Light;
    fn owner(&self) -> EntityId {
        self.owner
    }
    fn bind_owner(&mut self, owner: EntityId) {
        self.owner = owner;
    }
    fn pool(factory: &ComponentFactory) -> &ComponentPool<Self> {
        &factory.lights
    }
    fn pool_mut(factory: &mut ComponentFactory) -> &mut ComponentPool<Self> {
        &mut factory.lights
    }
}

impl Component for ModelComponent {
    const KIND: ComponentKind = ComponentKind::Model;
    fn owner(&self) -> EntityId {
        self.owner
    }
    fn bind_owner(&mut self, owner: EntityId) {
        self.owner = owner;
    }
    fn pool(factory: &ComponentFactory) -> &ComponentPool<Self> {
        &factory.models
    }
    fn pool_mut(factory: &mut ComponentFactory) -> &mut ComponentPool<Self> {
        &mut factory.models
    }
}

impl Component for PhysicsComponent {
    const KIND: ComponentKind = ComponentKind::Physics;
    fn owner(&self) -> EntityId {
        self.owner
    }
    fn bind_owner(&mut self, owner: EntityId) {
        self.owner = owner;
    }
    fn pool(factory: &ComponentFactory) -> &ComponentPool<Self> {
        &factory.physics
    }
    fn pool_mut(factory: &mut ComponentFactory) -> &mut ComponentPool<Self> {
        &mut factory.physics
    }
}

impl Component for SceneComponent {
    const KIND: ComponentKind = ComponentKind::Scene;
    fn owner(&self) -> EntityId {
        self.owner
    }
    fn bind_owner(&mut self, owner: EntityId) {
        self.owner = owner;
    }
    fn pool(factory: &ComponentFactory) -> &ComponentPool<Self> {
        &factory.scenes
    }
    fn pool_mut(factory: &mut ComponentFactory) -> &mut ComponentPool<Self> {
        &mut factory.scenes
    }
}
