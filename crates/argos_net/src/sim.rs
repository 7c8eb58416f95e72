//! # Simulation Seam
//!
//! Network roles never touch entity pools directly. The world implements
//! [`NetworkSim`] and roles drive every simulation change through it, so
//! the simulation keeps sole ownership of its memory and the roles stay
//! testable against a recording double.
//!
//! The surface is deliberately narrow: spawn a pawn, spawn a replica,
//! despawn, write intent, read and write poses. Everything else the
//! simulation does is none of the network's business.

use argos_core::EntityId;
use argos_shared::protocol::{ActorIntent, EntityPose};

/// Interface the network roles drive the simulation through.
pub trait NetworkSim {
    /// Spawns a full pawn entity for a named participant. Returns `None`
    /// when the pool has no room; the caller refuses the participant.
    fn spawn_participant(&mut self, name: &str) -> Option<EntityId>;

    /// Spawns a pose-only replica of a remote entity. Returns `None` when
    /// the pool has no room.
    fn spawn_replica(&mut self) -> Option<EntityId>;

    /// Despawns an entity previously created through this interface.
    fn despawn(&mut self, id: EntityId);

    /// Writes movement intent onto the entity's actor.
    fn apply_intent(&mut self, id: EntityId, intent: ActorIntent);

    /// Writes an authoritative pose onto the entity.
    fn apply_pose(&mut self, id: EntityId, pose: &EntityPose);

    /// Reads the entity's current pose, stamped with the current tick.
    fn pose_of(&self, id: EntityId) -> Option<EntityPose>;

    /// Visits the pose of every live entity that has one, stamped with
    /// the current tick. The server broadcasts exactly this set.
    fn visit_poses(&self, visit: &mut dyn FnMut(EntityPose));

    /// The local player's entity, if one exists. A client binds its
    /// welcome to this instead of spawning a replica of itself.
    fn player_id(&self) -> Option<EntityId>;

    /// The local player's current movement intent.
    fn player_intent(&self) -> Option<ActorIntent>;

    /// Current simulation tick.
    fn tick(&self) -> u32;
}

/// Recording double of [`NetworkSim`] for exercising roles without a
/// world.
///
/// Every mutation is logged and every entity is a bare pose entry, so
/// tests can assert exactly what a role did and in which order.
#[derive(Debug, Default)]
pub struct RecordingSim {
    next_id: u64,
    capacity: Option<usize>,
    /// Live entities with their latest pose.
    pub poses: indexmap::IndexMap<EntityId, EntityPose>,
    /// Participant spawns, in order.
    pub participants: Vec<(EntityId, String)>,
    /// Replica spawns, in order.
    pub replicas: Vec<EntityId>,
    /// Despawns, in order.
    pub despawned: Vec<EntityId>,
    /// Intent writes, in order.
    pub intents: Vec<(EntityId, ActorIntent)>,
    /// Local player entity reported to roles.
    pub player: Option<EntityId>,
    /// Local player intent reported to roles.
    pub player_intent: Option<ActorIntent>,
    /// Tick reported to roles.
    pub current_tick: u32,
}

impl RecordingSim {
    /// Empty recording sim with unlimited capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recording sim that refuses spawns beyond `capacity` live entities.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Registers a local player entity, as a world with a player would.
    pub fn add_player(&mut self, intent: ActorIntent) -> EntityId {
        let id = self.fresh_id();
        self.poses.insert(id, Self::rest_pose(id, 0));
        self.player = Some(id);
        self.player_intent = Some(intent);
        id
    }

    fn fresh_id(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId(self.next_id)
    }

    fn rest_pose(id: EntityId, tick: u32) -> EntityPose {
        EntityPose::new(
            id.raw(),
            argos_shared::math::Vec3::ZERO,
            argos_shared::math::Quaternion::IDENTITY,
            tick,
        )
    }

    fn at_capacity(&self) -> bool {
        self.capacity
            .is_some_and(|capacity| self.poses.len() >= capacity)
    }
}

impl NetworkSim for RecordingSim {
    fn spawn_participant(&mut self, name: &str) -> Option<EntityId> {
        if self.at_capacity() {
            return None;
        }
        let id = self.fresh_id();
        self.poses.insert(id, Self::rest_pose(id, self.current_tick));
        self.participants.push((id, name.to_owned()));
        Some(id)
    }

    fn spawn_replica(&mut self) -> Option<EntityId> {
        if self.at_capacity() {
            return None;
        }
        let id = self.fresh_id();
        self.poses.insert(id, Self::rest_pose(id, self.current_tick));
        self.replicas.push(id);
        Some(id)
    }

    fn despawn(&mut self, id: EntityId) {
        self.poses.shift_remove(&id);
        self.despawned.push(id);
    }

    fn apply_intent(&mut self, id: EntityId, intent: ActorIntent) {
        self.intents.push((id, intent));
    }

    fn apply_pose(&mut self, id: EntityId, pose: &EntityPose) {
        if let Some(stored) = self.poses.get_mut(&id) {
            *stored = *pose;
        }
    }

    fn pose_of(&self, id: EntityId) -> Option<EntityPose> {
        self.poses.get(&id).map(|pose| {
            let mut stamped = *pose;
            stamped.tick = self.current_tick;
            stamped
        })
    }

    fn visit_poses(&self, visit: &mut dyn FnMut(EntityPose)) {
        for pose in self.poses.values() {
            let mut stamped = *pose;
            stamped.tick = self.current_tick;
            visit(stamped);
        }
    }

    fn player_id(&self) -> Option<EntityId> {
        self.player
    }

    fn player_intent(&self) -> Option<ActorIntent> {
        self.player_intent
    }

    fn tick(&self) -> u32 {
        self.current_tick
    }
}
