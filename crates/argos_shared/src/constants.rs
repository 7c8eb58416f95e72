//! # Engine Constants
//!
//! Defaults shared between the simulation core and the network layer.
//! Configuration files may override the capacities and the port; the tick
//! rate is baked into every deployed binary.

/// Default port for simulation traffic.
pub const DEFAULT_PORT: u16 = 7777;

/// Simulation tick rate (updates per second).
pub const TICK_RATE: u32 = 60;

/// Duration of one tick in seconds.
#[allow(clippy::cast_precision_loss)]
pub const TICK_SECONDS: f32 = 1.0 / TICK_RATE as f32;

/// Default entity pool capacity when configuration does not say otherwise.
pub const DEFAULT_ENTITY_CAPACITY: usize = 256;

/// Default per-kind component pool capacity.
pub const DEFAULT_COMPONENT_CAPACITY: usize = 256;

/// Maximum remote participants a server accepts.
pub const MAX_PARTICIPANTS: usize = 32;

/// Bound for transport event channels; a full channel drops the event at
/// the transport edge rather than blocking the simulation thread.
pub const NET_CHANNEL_CAPACITY: usize = 10_000;
