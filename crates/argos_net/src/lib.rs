//! # ARGOS Net - Network Roles
//!
//! Session networking for ARGOS worlds: a world runs exactly one network
//! role at a time and swaps it as a whole.
//!
//! ## Architecture
//!
//! - **Roles**: [`DisabledRole`], [`ServerRole`], [`ClientRole`], all
//!   behind the [`NetworkRole`] trait the world drives once per tick
//! - **Seam**: roles never touch entity pools; every simulation change
//!   goes through [`NetworkSim`], which the world implements
//! - **Protocol**: typed frames over bounded channels, pose payloads as
//!   the `Pod` wire structs from `argos_shared`
//! - **Transport**: in-process loopback wiring any number of client
//!   worlds to one server world
//!
//! ## Authority Model
//!
//! ```text
//! CLIENT                            SERVER
//!   |                                 |
//!   |--- Hello: "visitor" ----------->|  spawn pawn
//!   |<-- Welcome: E4 -----------------|
//!   |--- Input: intent bits --------->|  apply to pawn
//!   |<-- State: pose burst -----------|  every tick, every pawn
//! ```
//!
//! Clients never simulate authoritatively. Their own pawn is corrected
//! from the server's pose frames like every other replica.
//!
//! ## Example
//!
//! ```rust,ignore
//! use argos_net::{loopback, ClientRole, ServerRole};
//!
//! let (link, connector) = loopback();
//! let server = ServerRole::start(7777, "argos", 32, link, &mut host_world);
//! let client = ClientRole::new("visitor", connector.connect()?);
//! // Each world ticks its role: role.update(&mut world);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod client;
pub mod disabled;
pub mod error;
pub mod loopback;
pub mod participant;
pub mod protocol;
pub mod role;
pub mod server;
pub mod sim;

// Re-exports for convenience
pub use client::ClientRole;
pub use disabled::DisabledRole;
pub use error::{NetError, NetResult};
pub use loopback::{loopback, ClientLink, LoopbackConnector, ServerLink};
pub use participant::Participant;
pub use protocol::{ClientFrame, PeerId, ServerEvent, ServerFrame};
pub use role::{NetworkMode, NetworkRole};
pub use server::ServerRole;
pub use sim::{NetworkSim, RecordingSim};
