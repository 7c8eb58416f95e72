//! # ARGOS Shared
//!
//! Common types used by the simulation core, the network layer and the
//! orchestrator: math primitives, wire-safe pose/intent structs, and the
//! engine-wide constants.
//!
//! ## RULE
//!
//! This crate must NEVER depend on:
//! - the simulation core
//! - any I/O or transport crate
//!
//! If a type needs pool handles or sockets, it belongs one crate up.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;
pub mod protocol;

pub use constants::{
    DEFAULT_COMPONENT_CAPACITY, DEFAULT_ENTITY_CAPACITY, DEFAULT_PORT, MAX_PARTICIPANTS,
    NET_CHANNEL_CAPACITY, TICK_RATE,
};
pub use math::{Quaternion, Transform, Vec3};
pub use protocol::{ActorIntent, EntityPose};
