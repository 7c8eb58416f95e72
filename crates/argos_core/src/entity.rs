//! Entity identity and slot data.
//!
//! Two identities exist on purpose:
//!
//! - [`EntityHandle`] locates a pool slot. It packs the slot index and a
//!   generation counter into a single `u64`, so a recycled slot invalidates
//!   every handle minted before the recycle in O(1).
//! - [`EntityId`] is the stable identity: a monotonically assigned serial
//!   that is never reused for the lifetime of the pool. It is the key of
//!   the registry's ID map and the only identity that crosses the wire.

use crate::component::{ComponentKind, KindMask};
use crate::factory::ComponentHandle;

/// Non-owning reference to an entity pool slot.
///
/// Layout: upper 32 bits generation, lower 32 bits slot index.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityHandle(u64);

impl EntityHandle {
    /// Sentinel for "no entity".
    pub const NULL: Self = Self(u64::MAX);

    /// Creates a handle from slot index and generation.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Slot index into the pool.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn index(self) -> u32 {
        (self.0 & 0xFFFF_FFFF) as u32
    }

    /// Generation the slot had when this handle was minted.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Whether this is the null sentinel.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

/// Stable entity identity, unique for the lifetime of the owning pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Sentinel for "no entity"; serials start at 1.
    pub const NONE: Self = Self(0);

    /// Raw serial value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Whether this is the none sentinel.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// One entity pool slot: stable ID, liveness, and the attached component
/// set (at most one component per kind).
#[derive(Clone, Debug)]
pub struct Entity {
    id: EntityId,
    alive: bool,
    mask: KindMask,
    components: [Option<ComponentHandle>; ComponentKind::COUNT],
}

impl Entity {
    /// A dead slot, used to fill the pool at construction.
    #[must_use]
    pub const fn dead() -> Self {
        Self {
            id: EntityId::NONE,
            alive: false,
            mask: 0,
            components: [None; ComponentKind::COUNT],
        }
    }

    /// Resets the slot to live with a fresh identity and no components.
    pub(crate) fn revive(&mut self, id: EntityId) {
        self.id = id;
        self.alive = true;
        self.mask = 0;
        self.components = [None; ComponentKind::COUNT];
    }

    /// Marks the slot dead and clears its component set.
    pub(crate) fn kill(&mut self) {
        self.alive = false;
        self.mask = 0;
        self.components = [None; ComponentKind::COUNT];
    }

    /// Stable identity of the entity occupying this slot.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Whether the slot currently holds a live entity.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Bitmask of attached component kinds.
    #[must_use]
    pub const fn mask(&self) -> KindMask {
        self.mask
    }

    /// Whether a component of `kind` is attached.
    #[must_use]
    pub const fn has_kind(&self, kind: ComponentKind) -> bool {
        self.mask & kind.bit() != 0
    }

    /// Handle of the attached component of `kind`, if any.
    #[must_use]
    pub fn component_handle(&self, kind: ComponentKind) -> Option<ComponentHandle> {
        self.components[kind.index()]
    }

    /// Records an attached component. The factory slot must already be
    /// initialized; this is the final step of the attach sequence.
    pub(crate) fn set_component(&mut self, kind: ComponentKind, handle: ComponentHandle) {
        self.components[kind.index()] = Some(handle);
        self.mask |= kind.bit();
    }

    /// Clears the attached component of `kind`, returning its handle.
    pub(crate) fn clear_component(&mut self, kind: ComponentKind) -> Option<ComponentHandle> {
        let taken = self.components[kind.index()].take();
        if taken.is_some() {
            self.mask &= !kind.bit();
        }
        taken
    }

    /// All attached component handles, kind-indexed.
    pub(crate) fn component_handles(&self) -> [Option<ComponentHandle>; ComponentKind::COUNT] {
        self.components
    }
}
