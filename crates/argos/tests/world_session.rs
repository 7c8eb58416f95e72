//! Session-level behavior of whole worlds: hosting, joining, pose
//! replication, intent routing, departures, and the role lifecycle,
//! all over the in-process loopback transport.

use argos::config::WorldConfig;
use argos::input::{InputEvent, Key};
use argos::world::World;
use argos_core::{
    ActorComponent, CameraComponent, ComponentKind, CoreError, EntityHandle, LightComponent,
    ModelComponent, PhysicsComponent, SceneComponent,
};
use argos_net::{loopback, LoopbackConnector, NetworkMode, NetworkSim};
use argos_shared::constants::{DEFAULT_PORT, TICK_SECONDS};
use argos_shared::math::Vec3;

/// Client-side world with a hand-built player pawn, ready to join.
fn visitor_world() -> (World, EntityHandle) {
    let config = WorldConfig {
        physics_enabled: false,
        ..WorldConfig::default()
    };
    let mut world = World::new(config);
    let pawn = world.create_entity().unwrap();
    let _ = world
        .attach_component(pawn, ActorComponent::default())
        .unwrap();
    let _ = world
        .attach_component(pawn, CameraComponent::default())
        .unwrap();
    let _ = world
        .attach_component(pawn, SceneComponent::at(Vec3::new(0.0, 0.9, 0.0)))
        .unwrap();
    let _ = world
        .attach_component(pawn, ModelComponent::named("pawn", "default"))
        .unwrap();
    world.set_player(pawn);
    world.setup_entities();
    (world, pawn)
}

fn join(world: &mut World, name: &str, connector: &LoopbackConnector) {
    let link = connector.connect().unwrap();
    world.init_client(name, link);
}

/// Ticks the host first, then every visitor, `ticks` times over.
fn run_ticks(host: &mut World, visitors: &mut [&mut World], ticks: u32) {
    for _ in 0..ticks {
        host.update(TICK_SECONDS);
        for visitor in &mut *visitors {
            visitor.update(TICK_SECONDS);
        }
    }
}

fn press(world: &mut World, key: Key) {
    let player = world.player().unwrap();
    let command = world.handle_input(InputEvent::Pressed(key)).unwrap();
    command.apply(world.registry_mut(), player);
}

fn release(world: &mut World, key: Key) {
    let player = world.player().unwrap();
    let command = world.handle_input(InputEvent::Released(key)).unwrap();
    command.revert(world.registry_mut(), player);
}

/// Position of the world's own player pawn.
fn player_position(world: &World) -> Vec3 {
    let id = world.player_id().unwrap();
    world.pose_of(id).unwrap().position
}

/// Positions of everything that is not the player pawn.
fn other_positions(world: &World) -> Vec<Vec3> {
    let player = world.player_id();
    let mut positions = Vec::new();
    world.visit_poses(&mut |pose| {
        if player.map(argos_core::EntityId::raw) != Some(pose.entity_id) {
            positions.push(pose.position);
        }
    });
    positions
}

#[test]
fn test_hosting_spawns_full_host_loadout() {
    let (link, _connector) = loopback();
    let mut world = World::new(WorldConfig::default());

    let host = world
        .init_server(DEFAULT_PORT, "host", link)
        .expect("host pawn should fit an empty world");

    assert_eq!(world.network_mode(), NetworkMode::Server);
    assert!(world.network_initialized());

    let handle = world.registry().handle_of(host).unwrap();
    for kind in [
        ComponentKind::Actor,
        ComponentKind::Camera,
        ComponentKind::Scene,
        ComponentKind::Model,
        ComponentKind::Physics,
    ] {
        assert!(world.registry().has_kind(handle, kind), "missing {kind}");
    }
    assert_eq!(world.player(), Some(handle));
}

#[test]
fn test_roles_change_only_through_disabled() {
    let (server_link, connector) = loopback();
    let mut world = World::new(WorldConfig::default());
    assert_eq!(world.network_mode(), NetworkMode::Disabled);

    world.init_server(DEFAULT_PORT, "host", server_link);
    assert_eq!(world.network_mode(), NetworkMode::Server);

    world.shutdown_network();
    assert_eq!(world.network_mode(), NetworkMode::Disabled);
    assert!(!world.network_initialized());

    // The old connector still reaches the dead server's channel, but a
    // fresh disabled world may join anything.
    let (_dead_link, fresh_connector) = loopback();
    let link = fresh_connector.connect().unwrap();
    world.init_client("wanderer", link);
    assert_eq!(world.network_mode(), NetworkMode::Client);

    world.shutdown_network();
    assert_eq!(world.network_mode(), NetworkMode::Disabled);
    drop(connector);
}

#[test]
#[should_panic(expected = "network role already initialized")]
fn test_second_role_without_shutdown_panics() {
    let (server_link, connector) = loopback();
    let mut world = World::new(WorldConfig::default());
    world.init_server(DEFAULT_PORT, "host", server_link);

    let link = connector.connect().unwrap();
    world.init_client("imposter", link);
}

#[test]
fn test_disabled_world_simulates_standalone() {
    let (mut world, pawn) = visitor_world();

    for _ in 0..5 {
        world.update(TICK_SECONDS);
    }

    assert_eq!(world.network_mode(), NetworkMode::Disabled);
    assert_eq!(world.registry().alive_count(), 1);
    assert!(world.registry().entity(pawn).is_ok());
}

#[test]
fn test_body_pose_lands_in_scene_same_tick() {
    let mut world = World::new(WorldConfig::default());
    let id = world.spawn_participant("solo").unwrap();
    let pawn = world.registry().handle_of(id).unwrap();
    world.setup_entities();

    press(&mut world, Key::W);
    press(&mut world, Key::Space);
    for _ in 0..10 {
        world.update(TICK_SECONDS);
    }

    let body = world
        .registry()
        .component::<PhysicsComponent>(pawn)
        .unwrap()
        .body;
    let (position, orientation) = world.physics().body_pose(body).unwrap();
    let scene = world
        .registry()
        .component::<SceneComponent>(pawn)
        .unwrap();

    // Mid-jump, mid-walk: the scene transform must carry this tick's
    // body pose exactly, not an approximation of it.
    assert!(position.y > 1.0, "pawn should be airborne, was {}", position.y);
    assert_eq!(
        bytemuck::bytes_of(&scene.transform.position),
        bytemuck::bytes_of(&position)
    );
    assert_eq!(
        bytemuck::bytes_of(&scene.transform.orientation),
        bytemuck::bytes_of(&orientation)
    );
}

#[test]
fn test_two_entity_world_recycles_slots() {
    let config = WorldConfig {
        entity_capacity: 2,
        ..WorldConfig::default()
    };
    let mut world = World::new(config);

    let first = world.create_entity().unwrap();
    let second = world.create_entity().unwrap();

    match world.create_entity() {
        Err(CoreError::PoolExhausted { capacity, .. }) => assert_eq!(capacity, 2),
        other => panic!("expected exhaustion, got {other:?}"),
    }

    world.destroy_entity(first).unwrap();
    let third = world.create_entity().unwrap();
    assert_ne!(third, first);
    assert!(world.registry().entity(second).is_ok());

    match world.destroy_entity(first) {
        Err(CoreError::InvalidHandle { .. }) => {}
        other => panic!("expected stale handle, got {other:?}"),
    }
}

#[test]
fn test_session_replicates_host_pose_to_visitor() {
    let (server_link, connector) = loopback();
    let mut host = World::new(WorldConfig::default());
    let host_id = host.init_server(DEFAULT_PORT, "host", server_link).unwrap();

    let (mut visitor, _pawn) = visitor_world();
    join(&mut visitor, "visitor", &connector);

    run_ticks(&mut host, &mut [&mut visitor], 5);
    assert_eq!(host.registry().alive_count(), 2);
    assert_eq!(visitor.registry().alive_count(), 2);

    press(&mut host, Key::W);
    run_ticks(&mut host, &mut [&mut visitor], 60);
    release(&mut host, Key::W);
    run_ticks(&mut host, &mut [&mut visitor], 5);

    let host_pose = host.pose_of(host_id).unwrap().position;
    assert!(
        host_pose.z < -1.0,
        "host pawn should have walked, is at z {}",
        host_pose.z
    );

    let mirrored = other_positions(&visitor);
    assert_eq!(mirrored.len(), 1);
    assert_eq!(mirrored[0], host_pose);
}

#[test]
fn test_visitor_intent_drives_authoritative_pawn() {
    let (server_link, connector) = loopback();
    let mut host = World::new(WorldConfig::default());
    host.init_server(DEFAULT_PORT, "host", server_link).unwrap();

    let (mut visitor, _pawn) = visitor_world();
    join(&mut visitor, "visitor", &connector);
    run_ticks(&mut host, &mut [&mut visitor], 5);

    press(&mut visitor, Key::W);
    run_ticks(&mut host, &mut [&mut visitor], 60);
    release(&mut visitor, Key::W);
    run_ticks(&mut host, &mut [&mut visitor], 5);

    // The visitor's pawn on the host is everything the host sees
    // beyond its own.
    let authoritative = other_positions(&host);
    assert_eq!(authoritative.len(), 1);
    assert!(
        authoritative[0].z < -1.0,
        "server-side pawn should have moved, is at z {}",
        authoritative[0].z
    );

    // And the visitor's own pawn settles on the authoritative pose.
    let corrected = player_position(&visitor);
    assert_eq!(corrected, authoritative[0]);
}

#[test]
fn test_scenery_replicates_alongside_pawns() {
    let (server_link, connector) = loopback();
    let mut host = World::new(WorldConfig::default());

    let lamp_position = Vec3::new(4.0, 0.5, -3.0);
    let lamp = host.create_entity().unwrap();
    let _ = host
        .attach_component(lamp, SceneComponent::at(lamp_position))
        .unwrap();
    let _ = host
        .attach_component(lamp, ModelComponent::named("lamp", "brass"))
        .unwrap();
    let _ = host
        .attach_component(lamp, LightComponent::default())
        .unwrap();

    host.init_server(DEFAULT_PORT, "host", server_link).unwrap();

    let (mut visitor, _pawn) = visitor_world();
    join(&mut visitor, "visitor", &connector);
    run_ticks(&mut host, &mut [&mut visitor], 5);

    // Host pawn, visitor pawn, lamp on both sides.
    assert_eq!(host.registry().alive_count(), 3);
    assert_eq!(visitor.registry().alive_count(), 3);

    let mirrored = other_positions(&visitor);
    assert_eq!(mirrored.len(), 2);
    assert!(mirrored.contains(&lamp_position));
}

#[test]
fn test_paused_host_keeps_serving_the_session() {
    let (server_link, connector) = loopback();
    let mut host = World::new(WorldConfig::default());
    let host_id = host.init_server(DEFAULT_PORT, "host", server_link).unwrap();

    let (mut visitor, _pawn) = visitor_world();
    join(&mut visitor, "visitor", &connector);
    run_ticks(&mut host, &mut [&mut visitor], 5);

    // The visitor's server-side pawn is the one entity beyond the
    // host's own.
    let mut others = Vec::new();
    host.visit_poses(&mut |pose| {
        if pose.entity_id != host_id.raw() {
            others.push(argos_core::EntityId(pose.entity_id));
        }
    });
    assert_eq!(others.len(), 1);
    let served = host.registry().handle_of(others[0]).unwrap();

    host.pause();
    let frozen = host.pose_of(others[0]).unwrap().position;

    press(&mut visitor, Key::W);
    run_ticks(&mut host, &mut [&mut visitor], 30);

    // Intent crossed the wire while the simulation held still.
    let intent = host
        .registry()
        .component::<ActorComponent>(served)
        .unwrap()
        .intent;
    assert!(intent.is_moving());
    assert_eq!(host.pose_of(others[0]).unwrap().position, frozen);

    host.resume();
    run_ticks(&mut host, &mut [&mut visitor], 30);
    release(&mut visitor, Key::W);

    let walked = host.pose_of(others[0]).unwrap().position;
    assert!(
        walked.z < frozen.z - 0.5,
        "held intent should drive the pawn after resume, z {}",
        walked.z
    );
}

#[test]
fn test_departure_releases_pawn_everywhere() {
    let (server_link, connector) = loopback();
    let mut host = World::new(WorldConfig::default());
    host.init_server(DEFAULT_PORT, "host", server_link).unwrap();

    let (mut first, _) = visitor_world();
    let (mut second, second_pawn) = visitor_world();
    join(&mut first, "first", &connector);
    join(&mut second, "second", &connector);

    run_ticks(&mut host, &mut [&mut first, &mut second], 5);
    assert_eq!(host.registry().alive_count(), 3);
    assert_eq!(first.registry().alive_count(), 3);
    assert_eq!(second.registry().alive_count(), 3);

    second.shutdown_network();
    assert_eq!(second.network_mode(), NetworkMode::Disabled);
    // The departing world keeps its own pawn and sheds the mirrors.
    assert_eq!(second.registry().alive_count(), 1);
    assert!(second.registry().entity(second_pawn).is_ok());

    run_ticks(&mut host, &mut [&mut first], 2);
    assert_eq!(host.registry().alive_count(), 2);
    assert_eq!(first.registry().alive_count(), 2);
}

#[test]
fn test_session_survives_visitor_overflow() {
    let config = WorldConfig {
        entity_capacity: 2,
        ..WorldConfig::default()
    };
    let (server_link, connector) = loopback();
    let mut host = World::new(config);
    host.init_server(DEFAULT_PORT, "host", server_link).unwrap();

    let (mut first, _) = visitor_world();
    let (mut second, _) = visitor_world();
    join(&mut first, "first", &connector);
    run_ticks(&mut host, &mut [&mut first], 3);
    assert_eq!(host.registry().alive_count(), 2);

    // No slot left for a second pawn; the session refuses the visitor
    // and keeps serving the first.
    join(&mut second, "second", &connector);
    run_ticks(&mut host, &mut [&mut first, &mut second], 5);

    assert_eq!(host.registry().alive_count(), 2);
    assert_eq!(host.network_mode(), NetworkMode::Server);
    assert_eq!(first.registry().alive_count(), 2);
    assert_eq!(second.network_mode(), NetworkMode::Client);
    assert_eq!(second.registry().alive_count(), 1);
}
