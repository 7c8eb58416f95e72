//! # Frame Protocol
//!
//! Typed frames exchanged between a server and its clients. Frames cross
//! channel transports by value; pose payloads are the `Pod` wire structs
//! from `argos_shared`, so a byte-level transport can carry the same data
//! without a second encoding.
//!
//! Entity references on the wire are always the **server's** stable
//! entity IDs. Clients translate them to local entities through their
//! replica table.

use argos_core::EntityId;
use argos_shared::protocol::{ActorIntent, EntityPose};
use crossbeam_channel::Sender;

/// Identity of one connected peer, assigned at connection time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PeerId(pub u32);

impl PeerId {
    /// The participant running the server process itself.
    pub const HOST: Self = Self(0);

    /// Whether this is the host's reserved ID.
    #[inline]
    #[must_use]
    pub const fn is_host(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "peer{}", self.0)
    }
}

/// Frames a client sends to the server.
#[derive(Clone, Debug, PartialEq)]
pub enum ClientFrame {
    /// Handshake: announces the player name and asks for a pawn.
    Hello {
        /// Player name shown to other participants.
        name: String,
    },
    /// Movement intent for the client's pawn, sent every tick.
    Input(ActorIntent),
    /// Orderly departure; the server releases the pawn.
    Goodbye,
}

/// Frames the server sends to one client.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ServerFrame {
    /// Handshake reply: the server-side entity the client now owns.
    Welcome {
        /// Server-side ID of the client's pawn.
        entity: EntityId,
    },
    /// One entity's authoritative pose for a tick. A full tick's state is
    /// a burst of these, one per live entity.
    State(EntityPose),
    /// An entity left the world; clients drop their replica.
    Despawn(EntityId),
}

/// Connection-level events a server endpoint receives.
///
/// Mirrors the transport seam: an I/O layer (or the in-process loopback)
/// produces these, the server role consumes them in its tick.
#[derive(Debug)]
pub enum ServerEvent {
    /// A peer connected; `reply` is the channel back to it.
    Connected {
        /// The new peer.
        peer: PeerId,
        /// Channel for frames addressed to this peer.
        reply: Sender<ServerFrame>,
    },
    /// A frame arrived from a connected peer.
    Frame {
        /// Sending peer.
        peer: PeerId,
        /// The frame.
        frame: ClientFrame,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use argos_shared::math::{Quaternion, Vec3};

    #[test]
    fn test_host_peer_reserved() {
        assert!(PeerId::HOST.is_host());
        assert!(!PeerId(1).is_host());
        assert_eq!(PeerId(3).to_string(), "peer3");
    }

    #[test]
    fn test_server_frames_are_copy() {
        let pose = EntityPose::new(EntityId(7).raw(), Vec3::ZERO, Quaternion::IDENTITY, 1);
        let frame = ServerFrame::State(pose);
        let copy = frame;
        assert_eq!(frame, copy);
    }
}
