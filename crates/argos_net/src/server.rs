//! # Server Role
//!
//! The authoritative end of a session. The server owns every
//! participant's pawn, applies the intents clients send, and broadcasts
//! each pawn's pose every tick. Clients never simulate authoritatively;
//! whatever the server publishes is the truth.
//!
//! The hosting player is a participant like any other, minus the reply
//! channel: their pawn is spawned when the role starts and their input
//! reaches the simulation locally instead of over the wire.

use indexmap::IndexMap;

use argos_core::EntityId;

use crate::loopback::ServerLink;
use crate::participant::Participant;
use crate::protocol::{ClientFrame, PeerId, ServerEvent, ServerFrame};
use crate::role::{NetworkMode, NetworkRole};
use crate::sim::NetworkSim;

use crossbeam_channel::Sender;

/// Authoritative session host.
pub struct ServerRole {
    port: u16,
    max_participants: usize,
    link: ServerLink,
    /// Connected peers that have not introduced themselves yet.
    pending: IndexMap<PeerId, Sender<ServerFrame>>,
    /// Everyone in the session, the host at [`PeerId::HOST`].
    participants: IndexMap<PeerId, Participant>,
}

impl ServerRole {
    /// Starts hosting: spawns the hosting player's pawn and begins
    /// accepting connections from `link`. At most `max_participants`
    /// players are admitted, the host counted.
    pub fn start(
        port: u16,
        host_name: &str,
        max_participants: usize,
        link: ServerLink,
        sim: &mut dyn NetworkSim,
    ) -> Self {
        let mut participants = IndexMap::new();
        match sim.spawn_participant(host_name) {
            Some(entity) => {
                tracing::info!("Server started on port {} hosted by {}", port, host_name);
                participants.insert(PeerId::HOST, Participant::host(host_name.to_owned(), entity));
            }
            None => {
                tracing::error!("Entity pool exhausted, server on port {} has no host pawn", port);
            }
        }
        Self {
            port,
            max_participants,
            link,
            pending: IndexMap::new(),
            participants,
        }
    }

    /// The port this server was asked to listen on.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Number of players in the session, the host included.
    #[must_use]
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// The hosting player's pawn entity.
    #[must_use]
    pub fn host_entity(&self) -> Option<EntityId> {
        self.participants
            .get(&PeerId::HOST)
            .map(Participant::entity)
    }

    fn handle_event(&mut self, event: ServerEvent, sim: &mut dyn NetworkSim) {
        match event {
            ServerEvent::Connected { peer, reply } => {
                tracing::info!("Peer connected: {}", peer);
                self.pending.insert(peer, reply);
            }
            ServerEvent::Frame { peer, frame } => self.handle_frame(peer, frame, sim),
        }
    }

    fn handle_frame(&mut self, peer: PeerId, frame: ClientFrame, sim: &mut dyn NetworkSim) {
        match frame {
            ClientFrame::Hello { name } => {
                let Some(reply) = self.pending.shift_remove(&peer) else {
                    tracing::warn!("Hello from {} which never connected", peer);
                    return;
                };
                if self.participants.len() >= self.max_participants {
                    tracing::warn!("Session full, refusing {} ({})", name, peer);
                    return;
                }
                match sim.spawn_participant(&name) {
                    Some(entity) => {
                        tracing::info!("Participant joined: {} as {} ({})", name, entity, peer);
                        let participant = Participant::remote(name, entity, reply);
                        participant.send(ServerFrame::Welcome { entity });
                        self.participants.insert(peer, participant);
                    }
                    None => {
                        // Dropping the reply channel closes the link and the
                        // peer sees the session refuse them.
                        tracing::warn!("Entity pool exhausted, refusing {} ({})", name, peer);
                    }
                }
            }
            ClientFrame::Input(intent) => {
                // Intent frames can trail a departure; unknown peers are
                // simply dropped.
                if let Some(participant) = self.participants.get(&peer) {
                    sim.apply_intent(participant.entity(), intent);
                }
            }
            ClientFrame::Goodbye => {
                self.pending.shift_remove(&peer);
                if let Some(participant) = self.participants.shift_remove(&peer) {
                    tracing::info!("Participant left: {} ({})", participant.name(), peer);
                    sim.despawn(participant.entity());
                    for remaining in self.participants.values() {
                        remaining.send(ServerFrame::Despawn(participant.entity()));
                    }
                }
            }
        }
    }

    /// Sends every pose the simulation reports to every participant.
    ///
    /// Each receiver gets its own pawn's pose too; clients correct
    /// themselves from it rather than trusting their local guess.
    fn broadcast_state(&self, sim: &dyn NetworkSim) {
        sim.visit_poses(&mut |pose| {
            let frame = ServerFrame::State(pose);
            for target in self.participants.values() {
                target.send(frame);
            }
        });
    }
}

impl NetworkRole for ServerRole {
    fn mode(&self) -> NetworkMode {
        NetworkMode::Server
    }

    fn initialized(&self) -> bool {
        true
    }

    fn update(&mut self, sim: &mut dyn NetworkSim) {
        while let Some(event) = self.link.try_recv() {
            self.handle_event(event, sim);
        }
        self.broadcast_state(sim);
    }

    fn shutdown(&mut self, sim: &mut dyn NetworkSim) {
        for (peer, participant) in self.participants.drain(..) {
            tracing::info!("Releasing participant {} ({})", participant.name(), peer);
            sim.despawn(participant.entity());
        }
        self.pending.clear();
        tracing::info!("Server on port {} stopped", self.port);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loopback::{loopback, ClientLink};
    use crate::sim::RecordingSim;
    use argos_core::EntityId;
    use argos_shared::constants::MAX_PARTICIPANTS;
    use argos_shared::protocol::{ActorIntent, INTENT_FORWARD};

    fn join(connector: &crate::loopback::LoopbackConnector, name: &str) -> ClientLink {
        let client = connector.connect().unwrap();
        client
            .send(ClientFrame::Hello {
                name: name.to_owned(),
            })
            .unwrap();
        client
    }

    fn drain(client: &ClientLink) -> Vec<ServerFrame> {
        let mut frames = Vec::new();
        while let Some(frame) = client.try_recv() {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn test_start_spawns_host_pawn() {
        let mut sim = RecordingSim::new();
        let (link, _connector) = loopback();
        let role = ServerRole::start(7777, "argos", MAX_PARTICIPANTS, link, &mut sim);

        assert_eq!(role.port(), 7777);
        assert_eq!(role.participant_count(), 1);
        assert_eq!(role.host_entity(), Some(EntityId(1)));
        assert!(role.initialized());
        assert_eq!(role.mode(), NetworkMode::Server);
        assert_eq!(sim.participants, vec![(EntityId(1), "argos".to_owned())]);
    }

    #[test]
    fn test_hello_welcomes_and_spawns_pawn() {
        let mut sim = RecordingSim::new();
        let (link, connector) = loopback();
        let mut role = ServerRole::start(7777, "argos", MAX_PARTICIPANTS, link, &mut sim);

        let client = join(&connector, "visitor");
        role.update(&mut sim);

        assert_eq!(role.participant_count(), 2);
        assert_eq!(sim.participants[1].1, "visitor");
        let pawn = sim.participants[1].0;

        let frames = drain(&client);
        assert_eq!(frames[0], ServerFrame::Welcome { entity: pawn });
        // The same tick's broadcast already covers both pawns.
        let state_ids: Vec<u64> = frames[1..]
            .iter()
            .filter_map(|frame| match frame {
                ServerFrame::State(pose) => Some(pose.entity_id),
                _ => None,
            })
            .collect();
        assert!(state_ids.contains(&EntityId(1).raw()));
        assert!(state_ids.contains(&pawn.raw()));
    }

    #[test]
    fn test_input_routes_to_participant_pawn() {
        let mut sim = RecordingSim::new();
        let (link, connector) = loopback();
        let mut role = ServerRole::start(7777, "argos", MAX_PARTICIPANTS, link, &mut sim);

        let client = join(&connector, "visitor");
        role.update(&mut sim);
        let pawn = sim.participants[1].0;

        let mut intent = ActorIntent::IDLE;
        intent.set(INTENT_FORWARD);
        client.send(ClientFrame::Input(intent)).unwrap();
        role.update(&mut sim);

        assert_eq!(sim.intents, vec![(pawn, intent)]);
    }

    #[test]
    fn test_goodbye_releases_pawn_and_notifies() {
        let mut sim = RecordingSim::new();
        let (link, connector) = loopback();
        let mut role = ServerRole::start(7777, "argos", MAX_PARTICIPANTS, link, &mut sim);

        let leaver = join(&connector, "leaver");
        let stayer = join(&connector, "stayer");
        role.update(&mut sim);
        let leaver_pawn = sim.participants[1].0;

        leaver.send(ClientFrame::Goodbye).unwrap();
        role.update(&mut sim);

        assert_eq!(role.participant_count(), 2);
        assert_eq!(sim.despawned, vec![leaver_pawn]);
        assert!(drain(&stayer).contains(&ServerFrame::Despawn(leaver_pawn)));
    }

    #[test]
    fn test_exhausted_pool_refuses_participant() {
        let mut sim = RecordingSim::with_capacity(1);
        let (link, connector) = loopback();
        let mut role = ServerRole::start(7777, "argos", MAX_PARTICIPANTS, link, &mut sim);

        let client = join(&connector, "late");
        role.update(&mut sim);

        assert_eq!(role.participant_count(), 1);
        assert!(drain(&client).is_empty());
    }

    #[test]
    fn test_full_session_refuses_participant() {
        let mut sim = RecordingSim::new();
        let (link, connector) = loopback();
        let mut role = ServerRole::start(7777, "argos", 2, link, &mut sim);

        let _second = join(&connector, "second");
        let third = join(&connector, "third");
        role.update(&mut sim);

        assert_eq!(role.participant_count(), 2);
        assert!(drain(&third).is_empty());
        assert_eq!(sim.participants.len(), 2);
    }

    #[test]
    fn test_shutdown_releases_every_pawn() {
        let mut sim = RecordingSim::new();
        let (link, connector) = loopback();
        let mut role = ServerRole::start(7777, "argos", MAX_PARTICIPANTS, link, &mut sim);

        let _client = join(&connector, "visitor");
        role.update(&mut sim);
        role.shutdown(&mut sim);

        assert_eq!(role.participant_count(), 0);
        assert_eq!(sim.despawned.len(), 2);
        assert!(sim.poses.is_empty());
    }
}
