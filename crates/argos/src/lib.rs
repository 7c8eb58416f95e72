//! # ARGOS
//!
//! The main runtime crate: one [`World`](world::World) per simulation,
//! driving entities, components, systems, physics, networking, and
//! presentation in a fixed per-tick order.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                         ARGOS RUNTIME                          │
//! ├────────────────────────────────────────────────────────────────┤
//! │                                                                │
//! │  ┌──────────────┐      ┌──────────────┐      ┌─────────────┐   │
//! │  │  argos_core  │      │  argos_net   │      │    argos    │   │
//! │  │              │      │              │      │             │   │
//! │  │  • Entities  │      │  • Roles     │      │  • World    │   │
//! │  │  • Components│<─sim─│  • Loopback  │<─────│  • Physics  │   │
//! │  │  • Systems   │ seam │  • Frames    │ tick │  • Input    │   │
//! │  └──────┬───────┘      └──────┬───────┘      └──────┬──────┘   │
//! │         │                     │                     │          │
//! │         └─────────────────────┴─────────────────────┘          │
//! │                         argos_shared                           │
//! │                  (math, protocol, constants)                   │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tick Order
//!
//! ```text
//! network -> systems -> per-entity -> physics -> environment
//! ```
//!
//! The order never changes. Pausing skips the middle three phases;
//! the network role and the environment phase always run.
//!
//! ## Modules
//!
//! - `config`: TOML-backed settings, every field defaulted
//! - `environment`: day cycle and pause state
//! - `input`: key bindings to reversible intent commands
//! - `physics`: physics seam and the built-in engine behind it
//! - `presentation`: render-facing seam and test doubles
//! - `world`: the orchestrator

pub mod config;
pub mod environment;
pub mod input;
pub mod physics;
pub mod presentation;
pub mod world;

// Re-export the layers
pub use argos_core as core;
pub use argos_net as net;
pub use argos_shared as shared;

// Re-export commonly used types
pub use config::{ConfigError, NetworkConfig, WorldConfig};
pub use environment::Environment;
pub use input::{InputEvent, Key, KeyBindings};
pub use physics::{BodyDesc, BuiltinPhysics, Physics};
pub use presentation::{NullPresentation, Presentation, PresentationCall, RecordingPresentation};
pub use world::World;
