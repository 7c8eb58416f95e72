//! # ARGOS Core - The Simulation Kernel
//!
//! Fixed-capacity entity/component runtime driving the simulation loop:
//! - Entity pool with generational handles and O(1) spawn/despawn
//! - One component pool per kind behind a generic create/free surface
//! - Systems dispatched in registration order, every tick
//! - Reversible intent commands for input bindings
//!
//! ## Architecture Rules
//!
//! 1. **All memory is claimed at startup** - pools never grow
//! 2. **Capacity exhaustion is an error, not a crash** - callers decide
//! 3. **Structural invariant violations are panics** - they are bugs,
//!    not runtime conditions
//!
//! ## Example
//!
//! ```rust,ignore
//! use argos_core::{Registry, SceneComponent};
//!
//! let mut registry = Registry::new(256, 256);
//! let entity = registry.spawn()?;
//! registry.attach(entity, SceneComponent::default())?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod command;
pub mod component;
pub mod entity;
pub mod error;
pub mod factory;
pub mod pool;
pub mod registry;
pub mod system;

pub use command::{
    Command, IntentCommand, JUMP, MOVE_BACKWARD, MOVE_FORWARD, MOVE_LEFT, MOVE_RIGHT,
};
pub use component::{
    kind_mask, ActorComponent, BodyId, BodyKind, CameraComponent, Component, ComponentKind,
    KindMask, LightComponent, LightKind, ModelComponent, PhysicsComponent, SceneComponent,
};
pub use entity::{Entity, EntityHandle, EntityId};
pub use error::{CoreError, CoreResult};
pub use factory::{ComponentFactory, ComponentHandle, ComponentPool};
pub use pool::EntityPool;
pub use registry::Registry;
pub use system::{LocomotionSystem, System, SystemManager, TrackedEntities};
