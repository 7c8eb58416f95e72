//! Participant bookkeeping for the server role.
//!
//! One record per player in the session, including the player running the
//! server process. The host's record has no reply channel; frames
//! addressed to everyone simply skip it.

use crossbeam_channel::Sender;

use argos_core::EntityId;

use crate::protocol::ServerFrame;

/// One player in a hosted session.
#[derive(Debug)]
pub struct Participant {
    name: String,
    entity: EntityId,
    reply: Option<Sender<ServerFrame>>,
}

impl Participant {
    /// Record for a remote player reachable over `reply`.
    #[must_use]
    pub fn remote(name: String, entity: EntityId, reply: Sender<ServerFrame>) -> Self {
        Self {
            name,
            entity,
            reply: Some(reply),
        }
    }

    /// Record for the hosting player. No reply channel; the host reads
    /// the simulation directly.
    #[must_use]
    pub fn host(name: String, entity: EntityId) -> Self {
        Self {
            name,
            entity,
            reply: None,
        }
    }

    /// Player name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The participant's pawn entity in the server simulation.
    #[must_use]
    pub const fn entity(&self) -> EntityId {
        self.entity
    }

    /// Whether this is the hosting player's record.
    #[must_use]
    pub const fn is_host(&self) -> bool {
        self.reply.is_none()
    }

    /// Sends a frame to this participant. Returns `false` when the frame
    /// was not delivered (host record, full channel, or departed peer);
    /// the server treats all three the same and moves on.
    pub fn send(&self, frame: ServerFrame) -> bool {
        match &self.reply {
            Some(reply) => reply.try_send(frame).is_ok(),
            None => false,
        }
    }
}
