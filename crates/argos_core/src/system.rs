//! # Systems
//!
//! A system owns per-tick behavior over the entities it tracks. The world
//! offers every fully set-up entity to every system; each system inspects
//! the component mask and decides membership for itself. Dispatch order is
//! registration order, every tick, no exceptions.
//!
//! Systems receive the whole registry during update, so they may spawn or
//! despawn entities. Tracked handle lists are walked by index and each
//! handle is re-validated on use, which makes mid-update mutation safe at
//! the cost of one staleness check per entity.

use argos_shared::math::Vec3;
use argos_shared::protocol::{
    ActorIntent, INTENT_BACKWARD, INTENT_FORWARD, INTENT_JUMP, INTENT_LEFT, INTENT_RIGHT,
};

use crate::component::{
    kind_mask, ActorComponent, ComponentKind, KindMask, PhysicsComponent, SceneComponent,
};
use crate::entity::EntityHandle;
use crate::registry::Registry;

/// Per-tick behavior over a tracked entity set.
pub trait System {
    /// Diagnostic name of the system.
    fn name(&self) -> &'static str;

    /// Offers an entity with its current component mask. The system
    /// decides membership from the mask: it tracks a qualifying handle
    /// and drops one that no longer qualifies, so re-offering after an
    /// attach or detach keeps the tracked set exact.
    fn offer(&mut self, handle: EntityHandle, mask: KindMask);

    /// Tells the system the entity is gone. A no-op if it was not tracked.
    fn forget(&mut self, handle: EntityHandle);

    /// Runs one tick over the tracked set.
    fn update(&mut self, registry: &mut Registry, dt: f32);
}

/// Handle list a system tracks its members in.
///
/// Iteration is by index with revalidation, so member systems survive
/// entities despawned under them mid-update; handles that went stale are
/// dropped by [`prune`](Self::prune) at the start of the next update.
#[derive(Default)]
pub struct TrackedEntities {
    handles: Vec<EntityHandle>,
}

impl TrackedEntities {
    /// Empty tracked set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    /// Tracks `handle` unless it already is tracked.
    pub fn insert(&mut self, handle: EntityHandle) {
        if !self.handles.contains(&handle) {
            self.handles.push(handle);
        }
    }

    /// Stops tracking `handle`.
    pub fn remove(&mut self, handle: EntityHandle) {
        self.handles.retain(|tracked| *tracked != handle);
    }

    /// Whether `handle` is tracked.
    #[must_use]
    pub fn contains(&self, handle: EntityHandle) -> bool {
        self.handles.contains(&handle)
    }

    /// Number of tracked handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether no handles are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Tracked handle at `index`, if still in range.
    #[must_use]
    pub fn handle(&self, index: usize) -> Option<EntityHandle> {
        self.handles.get(index).copied()
    }

    /// Drops handles whose entities no longer resolve.
    pub fn prune(&mut self, registry: &Registry) {
        self.handles
            .retain(|handle| registry.pool().contains(*handle));
    }
}

/// Runs registered systems in registration order.
#[derive(Default)]
pub struct SystemManager {
    systems: Vec<Box<dyn System>>,
}

impl SystemManager {
    /// Empty manager.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            systems: Vec::new(),
        }
    }

    /// Registers a system. Registration order is dispatch order for the
    /// lifetime of the manager.
    pub fn register(&mut self, system: Box<dyn System>) {
        self.systems.push(system);
    }

    /// Number of registered systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Whether no systems are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Offers a fully set-up entity to every system, in registration
    /// order.
    pub fn offer_all(&mut self, handle: EntityHandle, mask: KindMask) {
        for system in &mut self.systems {
            system.offer(handle, mask);
        }
    }

    /// Removes a despawned entity from every system.
    pub fn forget_all(&mut self, handle: EntityHandle) {
        for system in &mut self.systems {
            system.forget(handle);
        }
    }

    /// Runs one tick of every system, in registration order.
    pub fn update_all(&mut self, registry: &mut Registry, dt: f32) {
        for system in &mut self.systems {
            system.update(registry, dt);
        }
    }
}

/// Component set the locomotion system requires.
const LOCOMOTION_MASK: KindMask = kind_mask(&[ComponentKind::Actor, ComponentKind::Scene]);

/// Turns actor intent into motion.
///
/// Entities with a physics component get a velocity request for the
/// physics phase to consume; everything else is integrated directly into
/// the scene transform.
#[derive(Default)]
pub struct LocomotionSystem {
    tracked: TrackedEntities,
}

impl LocomotionSystem {
    /// Locomotion system with an empty tracked set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tracked: TrackedEntities::new(),
        }
    }

    /// Horizontal wish direction for `intent`, unit length or zero.
    #[must_use]
    pub fn wish_direction(intent: &ActorIntent) -> Vec3 {
        let yaw = intent.yaw;
        let forward = Vec3::new(yaw.sin(), 0.0, -yaw.cos());
        let right = Vec3::new(yaw.cos(), 0.0, yaw.sin());

        let mut wish = Vec3::ZERO;
        if intent.contains(INTENT_FORWARD) {
            wish += forward;
        }
        if intent.contains(INTENT_BACKWARD) {
            wish += -forward;
        }
        if intent.contains(INTENT_RIGHT) {
            wish += right;
        }
        if intent.contains(INTENT_LEFT) {
            wish += -right;
        }
        wish.normalized()
    }
}

impl System for LocomotionSystem {
    fn name(&self) -> &'static str {
        "locomotion"
    }

    fn offer(&mut self, handle: EntityHandle, mask: KindMask) {
        if mask & LOCOMOTION_MASK == LOCOMOTION_MASK {
            self.tracked.insert(handle);
        } else {
            self.tracked.remove(handle);
        }
    }

    fn forget(&mut self, handle: EntityHandle) {
        self.tracked.remove(handle);
    }

    fn update(&mut self, registry: &mut Registry, dt: f32) {
        self.tracked.prune(registry);

        for index in 0..self.tracked.len() {
            let Some(handle) = self.tracked.handle(index) else {
                break;
            };
            let Some(actor) = registry.component::<ActorComponent>(handle) else {
                continue;
            };
            let intent = actor.intent;
            let move_speed = actor.move_speed;
            let jump_speed = actor.jump_speed;
            let wish = Self::wish_direction(&intent) * move_speed;

            if registry.has_kind(handle, ComponentKind::Physics) {
                if let Some(physics) = registry.component_mut::<PhysicsComponent>(handle) {
                    physics.velocity_request = Some(wish);
                    if intent.contains(INTENT_JUMP) {
                        physics.jump_request = Some(jump_speed);
                    }
                }
            } else if let Some(scene) = registry.component_mut::<SceneComponent>(handle) {
                scene.transform.position += wish * dt;
            }
        }
    }
}
