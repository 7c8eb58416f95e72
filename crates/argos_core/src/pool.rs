//! # Entity Pool
//!
//! Fixed-capacity slot allocator for entities. All memory is allocated at
//! construction; spawn and despawn recycle slots through a free list and
//! never allocate.
//!
//! Each slot carries a generation counter that is bumped on every reuse,
//! so handles into recycled slots are detected and rejected instead of
//! silently aliasing the new occupant.

use crate::entity::{Entity, EntityHandle, EntityId};
use crate::error::{CoreError, CoreResult};

/// Fixed-capacity entity storage.
///
/// # Capacity
///
/// The capacity is set at creation and never changes; once every slot is
/// live, further spawns fail with [`CoreError::PoolExhausted`] until a
/// slot is released.
pub struct EntityPool {
    /// All entity slots (pre-allocated).
    slots: Box<[Entity]>,
    /// Current generation of each slot.
    generations: Box<[u32]>,
    /// Free list of slot indices for reuse.
    free: Vec<u32>,
    /// Number of currently alive entities.
    alive_count: usize,
}

impl EntityPool {
    /// Creates a pool with `capacity` pre-allocated slots.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or exceeds `u32::MAX`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "entity capacity must be greater than zero");
        assert!(
            capacity <= u32::MAX as usize,
            "entity capacity cannot exceed u32::MAX"
        );

        let slots = (0..capacity)
            .map(|_| Entity::dead())
            .collect::<Vec<_>>()
            .into_boxed_slice();
        let generations = vec![0; capacity].into_boxed_slice();
        // Reversed so the first spawn takes slot 0.
        let free: Vec<u32> = (0..capacity as u32).rev().collect();

        Self {
            slots,
            generations,
            free,
            alive_count: 0,
        }
    }

    /// Maximum number of simultaneously live entities.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of currently live entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Claims a free slot for an entity with stable identity `id`.
    ///
    /// The slot's generation is bumped first, so handles from any earlier
    /// occupant of the slot stop resolving.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PoolExhausted`] when every slot is live.
    pub fn spawn(&mut self, id: EntityId) -> CoreResult<EntityHandle> {
        let Some(index) = self.free.pop() else {
            return Err(CoreError::PoolExhausted {
                pool: "entity",
                capacity: self.capacity(),
            });
        };

        let idx = index as usize;
        let generation = self.generations[idx].wrapping_add(1);
        self.generations[idx] = generation;
        self.slots[idx].revive(id);
        self.alive_count += 1;

        Ok(EntityHandle::new(index, generation))
    }

    /// Releases the slot behind `handle`, returning a snapshot of the
    /// entity as it was at death (the registry frees its components from
    /// this snapshot).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidHandle`] if the handle is null, stale,
    /// or out of range.
    pub fn despawn(&mut self, handle: EntityHandle) -> CoreResult<Entity> {
        let idx = self.resolve(handle)?;
        let snapshot = self.slots[idx].clone();
        self.slots[idx].kill();
        self.alive_count -= 1;
        // No allocation: the free list never outgrows its initial capacity.
        self.free.push(handle.index());
        Ok(snapshot)
    }

    /// Whether `handle` still refers to a live entity.
    #[inline]
    #[must_use]
    pub fn contains(&self, handle: EntityHandle) -> bool {
        self.resolve(handle).is_ok()
    }

    /// Resolves `handle` to the live entity behind it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidHandle`] if the handle is null, stale,
    /// or out of range.
    #[inline]
    pub fn get(&self, handle: EntityHandle) -> CoreResult<&Entity> {
        let idx = self.resolve(handle)?;
        Ok(&self.slots[idx])
    }

    /// Resolves `handle` to the live entity behind it, mutably.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidHandle`] if the handle is null, stale,
    /// or out of range.
    #[inline]
    pub fn get_mut(&mut self, handle: EntityHandle) -> CoreResult<&mut Entity> {
        let idx = self.resolve(handle)?;
        Ok(&mut self.slots[idx])
    }

    /// Current handle of the live entity in slot `index`, if any.
    ///
    /// Together with [`capacity`](Self::capacity) this supports snapshot
    /// iteration: walk indices taken before the loop and re-check each
    /// slot, so entities spawned or despawned mid-walk are handled safely.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn handle_at(&self, index: usize) -> Option<EntityHandle> {
        if index < self.capacity() && self.slots[index].is_alive() {
            Some(EntityHandle::new(index as u32, self.generations[index]))
        } else {
            None
        }
    }

    /// Iterates over all live entities with their current handles.
    #[allow(clippy::cast_possible_truncation)]
    pub fn iter_alive(&self) -> impl Iterator<Item = (EntityHandle, &Entity)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, entity)| entity.is_alive())
            .map(|(idx, entity)| (EntityHandle::new(idx as u32, self.generations[idx]), entity))
    }

    /// Checks a handle against the slot's liveness and generation.
    fn resolve(&self, handle: EntityHandle) -> Result<usize, CoreError> {
        let stale = || CoreError::InvalidHandle {
            pool: "entity",
            index: handle.index(),
            generation: handle.generation(),
        };

        if handle.is_null() {
            return Err(stale());
        }
        let idx = handle.index() as usize;
        if idx >= self.capacity() {
            return Err(stale());
        }
        if !self.slots[idx].is_alive() || self.generations[idx] != handle.generation() {
            return Err(stale());
        }
        Ok(idx)
    }
}
