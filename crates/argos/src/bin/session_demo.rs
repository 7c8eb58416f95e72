//! # ARGOS Session Demo
//!
//! Two worlds in one process: a hosting world and a visiting world,
//! wired over the loopback transport. The host simulates
//! authoritatively; the visitor mirrors what the host broadcasts.
//!
//! The script: the visitor joins, both pawns walk, the visitor jumps,
//! the host pauses and resumes, the visitor leaves.
//!
//! ```bash
//! RUST_LOG=debug cargo run --bin session_demo
//! ```

use argos::config::WorldConfig;
use argos::input::{InputEvent, Key};
use argos::world::World;
use argos_core::{ActorComponent, CameraComponent, LightComponent, ModelComponent, SceneComponent};
use argos_net::{loopback, NetworkSim};
use argos_shared::constants::TICK_SECONDS;
use argos_shared::math::Vec3;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    println!("╔═══════════════════════════════════════════════════════════╗");
    println!("║                   ARGOS SESSION DEMO                      ║");
    println!("║        one host, one visitor, loopback transport          ║");
    println!("╚═══════════════════════════════════════════════════════════╝");
    println!();

    let host_config = WorldConfig::default();
    let port = host_config.network.port;
    let host_name = host_config.network.player_name.clone();

    let visitor_config = WorldConfig {
        physics_enabled: false,
        ..WorldConfig::default()
    };

    // The hosting world. Its own pawn is spawned by the server role.
    let (server_link, connector) = loopback();
    let mut host = World::new(host_config);

    // One lamp by the spawn: scenery the host shares with every visitor.
    if let Ok(lamp) = host.create_entity() {
        let lit = host
            .attach_component(lamp, SceneComponent::at(Vec3::new(2.0, 0.5, -2.0)))
            .and_then(|_| host.attach_component(lamp, ModelComponent::named("lamp", "brass")))
            .and_then(|_| host.attach_component(lamp, LightComponent::default()));
        if let Err(err) = lit {
            eprintln!("Could not light the lamp: {err}");
        }
    }

    let Some(host_pawn) = host.init_server(port, &host_name, server_link) else {
        eprintln!("No room for the host pawn, aborting");
        return;
    };
    println!("Host session up on port {port}, host pawn {host_pawn}");

    // The visiting world builds its own pawn, then joins. The welcome
    // binds the server-side pawn to it and every later state frame
    // corrects it.
    let mut visitor = World::new(visitor_config);
    let Ok(pawn) = visitor.create_entity() else {
        eprintln!("No room for the visitor pawn, aborting");
        return;
    };
    let loadout = visitor
        .attach_component(pawn, ActorComponent::default())
        .and_then(|_| visitor.attach_component(pawn, CameraComponent::default()))
        .and_then(|_| visitor.attach_component(pawn, SceneComponent::at(Vec3::new(0.0, 0.9, 0.0))))
        .and_then(|_| visitor.attach_component(pawn, ModelComponent::named("pawn", "default")));
    if let Err(err) = loadout {
        eprintln!("Could not outfit the visitor pawn: {err}");
        return;
    }
    visitor.set_player(pawn);
    visitor.setup_entities();

    let client_link = match connector.connect() {
        Ok(link) => link,
        Err(err) => {
            eprintln!("Could not reach the host: {err}");
            return;
        }
    };
    visitor.init_client("visitor", client_link);
    println!("Visitor joining as \"visitor\"");
    println!();

    // Five seconds of scripted session at a fixed tick rate.
    for tick in 1..=300u32 {
        match tick {
            30 => {
                println!("-- tick {tick:>3}: both pawns start walking");
                press(&mut host, Key::W);
                press(&mut visitor, Key::W);
            }
            90 => {
                println!("-- tick {tick:>3}: visitor jumps");
                press(&mut visitor, Key::Space);
            }
            120 => {
                println!("-- tick {tick:>3}: everyone stops");
                release(&mut host, Key::W);
                release(&mut visitor, Key::W);
                release(&mut visitor, Key::Space);
            }
            150 => {
                println!("-- tick {tick:>3}: host pauses the simulation");
                host.pause();
            }
            210 => {
                println!("-- tick {tick:>3}: host resumes");
                host.resume();
            }
            _ => {}
        }

        host.update(TICK_SECONDS);
        visitor.update(TICK_SECONDS);

        if tick % 60 == 0 {
            report("host", &host);
            report("visitor", &visitor);
            println!();
        }
    }

    println!("-- visitor leaves, host follows");
    visitor.shutdown_network();
    host.update(TICK_SECONDS);
    report("host", &host);
    host.shutdown_network();

    println!();
    println!("Session over.");
}

/// Applies the command bound to `key` to the world's player pawn.
fn press(world: &mut World, key: Key) {
    let Some(player) = world.player() else {
        return;
    };
    if let Some(command) = world.handle_input(InputEvent::Pressed(key)) {
        command.apply(world.registry_mut(), player);
    }
}

/// Reverts the command bound to `key` on the world's player pawn.
fn release(world: &mut World, key: Key) {
    let Some(player) = world.player() else {
        return;
    };
    if let Some(command) = world.handle_input(InputEvent::Released(key)) {
        command.revert(world.registry_mut(), player);
    }
}

/// Prints one world's pose table.
fn report(label: &str, world: &World) {
    println!(
        "  [{label:>7}] tick {:>3}, {} entities, network {}",
        world.current_tick(),
        world.registry().alive_count(),
        world.network_mode()
    );
    world.visit_poses(&mut |pose| {
        println!(
            "       E{} @ ({:+6.2}, {:+6.2}, {:+6.2})",
            pose.entity_id, pose.position.x, pose.position.y, pose.position.z
        );
    });
}
