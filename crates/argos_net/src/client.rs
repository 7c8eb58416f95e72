//! # Client Role
//!
//! The mirroring end of a session. A client introduces itself, forwards
//! the local player's intent every tick, and rebuilds the server's world
//! from the pose frames it receives. Entities it learns about are
//! spawned as local replicas; the client's own pawn is corrected from
//! the server's frames like everyone else's.

use indexmap::IndexMap;

use argos_core::EntityId;
use argos_shared::protocol::EntityPose;

use crate::loopback::ClientLink;
use crate::protocol::{ClientFrame, ServerFrame};
use crate::role::{NetworkMode, NetworkRole};
use crate::sim::NetworkSim;

/// Remote participant mirroring a hosted session.
pub struct ClientRole {
    name: String,
    link: ClientLink,
    hello_sent: bool,
    /// Our pawn's ID in the server's world, once welcomed.
    server_self: Option<EntityId>,
    /// The local entity our welcome was bound to, exempt from replica
    /// teardown because the world owns it.
    player_local: Option<EntityId>,
    /// Server entity ID to local replica entity.
    replicas: IndexMap<EntityId, EntityId>,
}

impl ClientRole {
    /// Client role over an open connection. The handshake is sent on the
    /// first update.
    #[must_use]
    pub fn new(name: &str, link: ClientLink) -> Self {
        Self {
            name: name.to_owned(),
            link,
            hello_sent: false,
            server_self: None,
            player_local: None,
            replicas: IndexMap::new(),
        }
    }

    /// Our entity in the server's world, once the welcome arrived.
    #[must_use]
    pub const fn server_entity(&self) -> Option<EntityId> {
        self.server_self
    }

    /// Number of remote entities mirrored locally, our own pawn included.
    #[must_use]
    pub fn replica_count(&self) -> usize {
        self.replicas.len()
    }

    fn handle_frame(&mut self, frame: ServerFrame, sim: &mut dyn NetworkSim) {
        match frame {
            ServerFrame::Welcome { entity } => {
                tracing::info!("Welcomed by server as {}", entity);
                self.server_self = Some(entity);
                // Steer the server's frames for our pawn onto the local
                // player when one exists; a bare mirror spawns a replica
                // for itself like for anyone else.
                let local = match sim.player_id() {
                    Some(player) => {
                        self.player_local = Some(player);
                        Some(player)
                    }
                    None => sim.spawn_replica(),
                };
                if let Some(local) = local {
                    self.replicas.insert(entity, local);
                }
            }
            ServerFrame::State(pose) => self.apply_state(&pose, sim),
            ServerFrame::Despawn(entity) => {
                let Some(local) = self.replicas.shift_remove(&entity) else {
                    return;
                };
                if self.player_local == Some(local) {
                    // The server dropped our pawn; stop forwarding input
                    // but leave the world's own entity alone.
                    tracing::warn!("Server despawned our pawn {}", entity);
                    self.server_self = None;
                } else {
                    tracing::debug!("Replica for {} despawned", entity);
                    sim.despawn(local);
                }
            }
        }
    }

    fn apply_state(&mut self, pose: &EntityPose, sim: &mut dyn NetworkSim) {
        let server_id = EntityId(pose.entity_id);
        let local = if let Some(local) = self.replicas.get(&server_id) {
            *local
        } else {
            // First sighting of a remote entity.
            let Some(local) = sim.spawn_replica() else {
                tracing::warn!("Entity pool exhausted, cannot mirror {}", server_id);
                return;
            };
            tracing::debug!("Replica spawned for {}", server_id);
            self.replicas.insert(server_id, local);
            local
        };
        sim.apply_pose(local, pose);
    }
}

impl NetworkRole for ClientRole {
    fn mode(&self) -> NetworkMode {
        NetworkMode::Client
    }

    fn initialized(&self) -> bool {
        true
    }

    fn update(&mut self, sim: &mut dyn NetworkSim) {
        if !self.hello_sent {
            match self.link.send(ClientFrame::Hello {
                name: self.name.clone(),
            }) {
                Ok(()) => self.hello_sent = true,
                Err(err) => tracing::warn!("Could not reach server: {}", err),
            }
        }

        while let Some(frame) = self.link.try_recv() {
            self.handle_frame(frame, sim);
        }

        if self.hello_sent {
            if let Some(intent) = sim.player_intent() {
                let _ = self.link.send(ClientFrame::Input(intent));
            }
        }
    }

    fn shutdown(&mut self, sim: &mut dyn NetworkSim) {
        let _ = self.link.send(ClientFrame::Goodbye);
        for (_, local) in self.replicas.drain(..) {
            if self.player_local != Some(local) {
                sim.despawn(local);
            }
        }
        self.server_self = None;
        tracing::info!("Client {} left the session", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loopback::{loopback, ServerLink};
    use crate::protocol::ServerEvent;
    use crate::sim::RecordingSim;
    use argos_shared::math::{Quaternion, Vec3};
    use argos_shared::protocol::{ActorIntent, INTENT_JUMP};
    use crossbeam_channel::Sender;

    fn accept(server: &ServerLink) -> Sender<ServerFrame> {
        match server.try_recv() {
            Some(ServerEvent::Connected { reply, .. }) => reply,
            other => panic!("expected Connected, got {other:?}"),
        }
    }

    fn pose_for(id: EntityId, x: f32) -> EntityPose {
        EntityPose::new(id.raw(), Vec3::new(x, 0.0, 0.0), Quaternion::IDENTITY, 3)
    }

    #[test]
    fn test_hello_sent_once() {
        let (server, connector) = loopback();
        let mut sim = RecordingSim::new();
        let mut role = ClientRole::new("visitor", connector.connect().unwrap());
        let _reply = accept(&server);

        role.update(&mut sim);
        role.update(&mut sim);

        let mut hellos = 0;
        while let Some(event) = server.try_recv() {
            if let ServerEvent::Frame {
                frame: ClientFrame::Hello { name },
                ..
            } = event
            {
                assert_eq!(name, "visitor");
                hellos += 1;
            }
        }
        assert_eq!(hellos, 1);
    }

    #[test]
    fn test_welcome_binds_local_player() {
        let (server, connector) = loopback();
        let mut sim = RecordingSim::new();
        let player = sim.add_player(ActorIntent::IDLE);
        let mut role = ClientRole::new("visitor", connector.connect().unwrap());
        let reply = accept(&server);

        reply
            .try_send(ServerFrame::Welcome {
                entity: EntityId(77),
            })
            .unwrap();
        reply
            .try_send(ServerFrame::State(pose_for(EntityId(77), 4.0)))
            .unwrap();
        role.update(&mut sim);

        assert_eq!(role.server_entity(), Some(EntityId(77)));
        assert!(sim.replicas.is_empty());
        assert_eq!(sim.poses[&player].position, Vec3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn test_unknown_entity_becomes_replica() {
        let (server, connector) = loopback();
        let mut sim = RecordingSim::new();
        let _player = sim.add_player(ActorIntent::IDLE);
        let mut role = ClientRole::new("visitor", connector.connect().unwrap());
        let reply = accept(&server);

        reply
            .try_send(ServerFrame::State(pose_for(EntityId(200), 2.0)))
            .unwrap();
        role.update(&mut sim);

        assert_eq!(sim.replicas.len(), 1);
        let local = sim.replicas[0];
        assert_eq!(sim.poses[&local].position, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(role.replica_count(), 1);
    }

    #[test]
    fn test_despawn_removes_replica_but_not_player() {
        let (server, connector) = loopback();
        let mut sim = RecordingSim::new();
        let player = sim.add_player(ActorIntent::IDLE);
        let mut role = ClientRole::new("visitor", connector.connect().unwrap());
        let reply = accept(&server);

        reply
            .try_send(ServerFrame::Welcome {
                entity: EntityId(77),
            })
            .unwrap();
        reply
            .try_send(ServerFrame::State(pose_for(EntityId(200), 2.0)))
            .unwrap();
        role.update(&mut sim);
        let local = sim.replicas[0];

        reply.try_send(ServerFrame::Despawn(EntityId(200))).unwrap();
        reply.try_send(ServerFrame::Despawn(EntityId(77))).unwrap();
        role.update(&mut sim);

        assert_eq!(sim.despawned, vec![local]);
        assert!(sim.poses.contains_key(&player));
        assert_eq!(role.server_entity(), None);
    }

    #[test]
    fn test_player_intent_forwarded() {
        let (server, connector) = loopback();
        let mut sim = RecordingSim::new();
        let mut intent = ActorIntent::IDLE;
        intent.set(INTENT_JUMP);
        let _player = sim.add_player(intent);
        let mut role = ClientRole::new("visitor", connector.connect().unwrap());
        let _reply = accept(&server);

        role.update(&mut sim);

        let mut inputs = Vec::new();
        while let Some(event) = server.try_recv() {
            if let ServerEvent::Frame {
                frame: ClientFrame::Input(sent),
                ..
            } = event
            {
                inputs.push(sent);
            }
        }
        assert_eq!(inputs, vec![intent]);
    }

    #[test]
    fn test_shutdown_says_goodbye_and_clears_replicas() {
        let (server, connector) = loopback();
        let mut sim = RecordingSim::new();
        let player = sim.add_player(ActorIntent::IDLE);
        let mut role = ClientRole::new("visitor", connector.connect().unwrap());
        let reply = accept(&server);

        reply
            .try_send(ServerFrame::Welcome {
                entity: EntityId(77),
            })
            .unwrap();
        reply
            .try_send(ServerFrame::State(pose_for(EntityId(200), 2.0)))
            .unwrap();
        role.update(&mut sim);
        let replica = sim.replicas[0];

        role.shutdown(&mut sim);

        assert_eq!(sim.despawned, vec![replica]);
        assert!(sim.poses.contains_key(&player));
        let mut goodbyes = 0;
        while let Some(event) = server.try_recv() {
            if let ServerEvent::Frame {
                frame: ClientFrame::Goodbye,
                ..
            } = event
            {
                goodbyes += 1;
            }
        }
        assert_eq!(goodbyes, 1);
    }
}
