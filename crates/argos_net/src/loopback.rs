//! # Loopback Transport
//!
//! In-process channel transport wiring clients to a server without
//! sockets. The same frame flow a socket transport would carry runs over
//! bounded crossbeam channels, so server and client roles are exercised
//! end to end inside one process.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::error::{NetError, NetResult};
use crate::protocol::{ClientFrame, PeerId, ServerEvent, ServerFrame};
use argos_shared::constants::NET_CHANNEL_CAPACITY;

fn map_send<T>(err: &TrySendError<T>) -> NetError {
    match err {
        TrySendError::Full(_) => NetError::ChannelFull,
        TrySendError::Disconnected(_) => NetError::ChannelClosed,
    }
}

/// Server end of a loopback transport: the event stream a server role
/// drains every tick.
#[derive(Debug)]
pub struct ServerLink {
    events: Receiver<ServerEvent>,
}

impl ServerLink {
    /// Next pending event, if any. Never blocks.
    #[must_use]
    pub fn try_recv(&self) -> Option<ServerEvent> {
        self.events.try_recv().ok()
    }
}

/// Hands out client connections to a loopback server.
///
/// Cloneable so any number of clients can join the same server. Peer IDs
/// start at 1; 0 stays reserved for the host.
#[derive(Clone, Debug)]
pub struct LoopbackConnector {
    events_tx: Sender<ServerEvent>,
    next_peer: Arc<AtomicU32>,
}

impl LoopbackConnector {
    /// Opens a connection: announces the new peer to the server and
    /// returns the client's end of the wire.
    pub fn connect(&self) -> NetResult<ClientLink> {
        let peer = PeerId(self.next_peer.fetch_add(1, Ordering::Relaxed));
        let (reply_tx, reply_rx) = bounded(NET_CHANNEL_CAPACITY);
        self.events_tx
            .try_send(ServerEvent::Connected {
                peer,
                reply: reply_tx,
            })
            .map_err(|err| map_send(&err))?;
        Ok(ClientLink {
            peer,
            to_server: self.events_tx.clone(),
            from_server: reply_rx,
        })
    }
}

/// Client end of a loopback connection.
#[derive(Debug)]
pub struct ClientLink {
    peer: PeerId,
    to_server: Sender<ServerEvent>,
    from_server: Receiver<ServerFrame>,
}

impl ClientLink {
    /// The peer ID the server knows this connection by.
    #[must_use]
    pub const fn peer(&self) -> PeerId {
        self.peer
    }

    /// Sends one frame to the server. Never blocks; a full or closed
    /// channel is reported as an error.
    pub fn send(&self, frame: ClientFrame) -> NetResult<()> {
        self.to_server
            .try_send(ServerEvent::Frame {
                peer: self.peer,
                frame,
            })
            .map_err(|err| map_send(&err))
    }

    /// Next frame from the server, if any. Never blocks.
    #[must_use]
    pub fn try_recv(&self) -> Option<ServerFrame> {
        self.from_server.try_recv().ok()
    }
}

/// Creates a loopback transport: the server's event stream plus a
/// connector clients join through.
#[must_use]
pub fn loopback() -> (ServerLink, LoopbackConnector) {
    let (events_tx, events_rx) = bounded(NET_CHANNEL_CAPACITY);
    let link = ServerLink { events: events_rx };
    let connector = LoopbackConnector {
        events_tx,
        next_peer: Arc::new(AtomicU32::new(1)),
    };
    (link, connector)
}
