//! Component kinds and their data.
//!
//! The kind set is closed: every component is one of the six variants
//! below, stored in its own fixed-capacity pool inside the factory. An
//! entity holds at most one component per kind, tracked by a bitmask for
//! cheap membership tests.
//!
//! Owner references are bound by the registry during attach and are never
//! writable from outside the crate; a component's owner is valid for as
//! long as the component is attached.

use crate::entity::EntityId;
use crate::factory::{ComponentFactory, ComponentPool};
use argos_shared::math::{Transform, Vec3};
use argos_shared::protocol::ActorIntent;

/// Bitmask over component kinds.
pub type KindMask = u64;

/// The closed set of component kinds.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Player or AI pawn: movement intent and locomotion tuning.
    Actor = 0,
    /// View source: offset from the owner and the derived view pose.
    Camera = 1,
    /// Light emitter parameters for the presentation layer.
    Light = 2,
    /// Renderable mesh/material reference.
    Model = 3,
    /// Rigid body binding into the physics seam.
    Physics = 4,
    /// World-space transform, the canonical pose of the entity.
    Scene = 5,
}

impl ComponentKind {
    /// Number of kinds.
    pub const COUNT: usize = 6;

    /// Every kind, in discriminant order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Actor,
        Self::Camera,
        Self::Light,
        Self::Model,
        Self::Physics,
        Self::Scene,
    ];

    /// Bit of this kind in a [`KindMask`].
    #[must_use]
    pub const fn bit(self) -> KindMask {
        1 << (self as u8)
    }

    /// Index of this kind into kind-indexed arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase kind name, used in diagnostics and pool errors.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Actor => "actor",
            Self::Camera => "camera",
            Self::Light => "light",
            Self::Model => "model",
            Self::Physics => "physics",
            Self::Scene => "scene",
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Builds a [`KindMask`] from a kind list.
#[must_use]
pub const fn kind_mask(kinds: &[ComponentKind]) -> KindMask {
    let mut mask = 0;
    let mut i = 0;
    while i < kinds.len() {
        mask |= kinds[i].bit();
        i += 1;
    }
    mask
}

/// Typed component contract: ties a component struct to its kind tag and
/// to its dedicated pool inside the factory.
///
/// The pool accessors are the kind-to-pool mapping the registry's generic
/// attach path dispatches through; implementations live next to the
/// factory.
pub trait Component: Default + Send + Sync + Sized + 'static {
    /// Kind tag of this component type.
    const KIND: ComponentKind;

    /// Entity this component is attached to; [`EntityId::NONE`] only while
    /// unattached.
    fn owner(&self) -> EntityId;

    /// Binds the owning entity. Called by the registry during attach.
    fn bind_owner(&mut self, owner: EntityId);

    /// This type's pool inside the factory.
    fn pool(factory: &ComponentFactory) -> &ComponentPool<Self>;

    /// This type's pool inside the factory, mutably.
    fn pool_mut(factory: &mut ComponentFactory) -> &mut ComponentPool<Self>;
}

/// Default actor movement speed in units per second.
pub const DEFAULT_MOVE_SPEED: f32 = 5.0;

/// Default actor jump speed in units per second.
pub const DEFAULT_JUMP_SPEED: f32 = 8.0;

/// Pawn state: movement intent plus locomotion tuning.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorComponent {
    pub(crate) owner: EntityId,
    /// Current movement intent, written by commands or the network layer.
    pub intent: ActorIntent,
    /// Horizontal movement speed in units per second.
    pub move_speed: f32,
    /// Vertical jump speed in units per second.
    pub jump_speed: f32,
}

impl Default for ActorComponent {
    fn default() -> Self {
        Self {
            owner: EntityId::NONE,
            intent: ActorIntent::IDLE,
            move_speed: DEFAULT_MOVE_SPEED,
            jump_speed: DEFAULT_JUMP_SPEED,
        }
    }
}

/// View source: view pose derived each tick from the sibling scene
/// transform plus this offset.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraComponent {
    pub(crate) owner: EntityId,
    /// Offset from the owner's scene position to the eye.
    pub offset: Vec3,
    /// View pose computed by the per-entity update pass.
    pub view: Transform,
}

impl Default for CameraComponent {
    fn default() -> Self {
        Self {
            owner: EntityId::NONE,
            offset: Vec3::new(0.0, 1.7, 0.0),
            view: Transform::IDENTITY,
        }
    }
}

/// Light emitter shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LightKind {
    /// Infinite directional light (sun).
    Directional,
    /// Omnidirectional point light.
    #[default]
    Point,
    /// Cone spot light.
    Spot,
}

/// Light emitter parameters, consumed by the presentation layer.
#[derive(Clone, Debug, PartialEq)]
pub struct LightComponent {
    pub(crate) owner: EntityId,
    /// Emitter shape.
    pub kind: LightKind,
    /// Linear RGB color.
    pub color: Vec3,
    /// Emission strength.
    pub intensity: f32,
    /// Falloff range in world units; unused for directional lights.
    pub range: f32,
}

impl Default for LightComponent {
    fn default() -> Self {
        Self {
            owner: EntityId::NONE,
            kind: LightKind::Point,
            color: Vec3::new(1.0, 1.0, 1.0),
            intensity: 1.0,
            range: 10.0,
        }
    }
}

/// Renderable reference: which mesh and material the presentation layer
/// binds for this entity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModelComponent {
    pub(crate) owner: EntityId,
    /// Mesh asset name.
    pub mesh: String,
    /// Material asset name.
    pub material: String,
}

impl ModelComponent {
    /// Model with the given mesh and material names.
    #[must_use]
    pub fn named(mesh: &str, material: &str) -> Self {
        Self {
            owner: EntityId::NONE,
            mesh: mesh.to_owned(),
            material: material.to_owned(),
        }
    }
}

/// Rigid body handle inside the physics seam.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyId(pub u32);

impl BodyId {
    /// Sentinel for "no body bound yet".
    pub const NULL: Self = Self(u32::MAX);

    /// Whether this is the null sentinel.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u32::MAX
    }
}

/// How the physics seam simulates a body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BodyKind {
    /// Never moves.
    Static,
    /// Moved by the simulation, ignores forces.
    Kinematic,
    /// Fully simulated, affected by gravity.
    #[default]
    Dynamic,
}

/// Physics binding: the body this entity owns plus the per-tick requests
/// the locomotion pass hands to the physics phase.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsComponent {
    pub(crate) owner: EntityId,
    /// Body inside the physics seam; null until the orchestrator creates
    /// it during attach.
    pub body: BodyId,
    /// Simulation mode of the body.
    pub body_kind: BodyKind,
    /// Half extents of the collision box.
    pub half_extents: Vec3,
    /// Horizontal velocity requested by locomotion this tick, consumed by
    /// the physics phase.
    pub velocity_request: Option<Vec3>,
    /// Vertical speed requested by a jump this tick; honored only while
    /// the body is grounded.
    pub jump_request: Option<f32>,
}

impl Default for PhysicsComponent {
    fn default() -> Self {
        Self {
            owner: EntityId::NONE,
            body: BodyId::NULL,
            body_kind: BodyKind::Dynamic,
            half_extents: Vec3::new(0.4, 0.9, 0.4),
            velocity_request: None,
            jump_request: None,
        }
    }
}

/// Canonical world-space pose of the entity.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SceneComponent {
    pub(crate) owner: EntityId,
    /// World-space transform.
    pub transform: Transform,
}

impl SceneComponent {
    /// Scene component at `position` with identity orientation.
    #[must_use]
    pub const fn at(position: Vec3) -> Self {
        Self {
            owner: EntityId::NONE,
            transform: Transform::from_position(position),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_bits_are_disjoint() {
        let mut seen: KindMask = 0;
        for kind in ComponentKind::ALL {
            assert_eq!(seen & kind.bit(), 0);
            seen |= kind.bit();
        }
        assert_eq!(seen.count_ones() as usize, ComponentKind::COUNT);
    }

    #[test]
    fn test_kind_mask_builder() {
        let mask = kind_mask(&[ComponentKind::Actor, ComponentKind::Scene]);
        assert_ne!(mask & ComponentKind::Actor.bit(), 0);
        assert_ne!(mask & ComponentKind::Scene.bit(), 0);
        assert_eq!(mask & ComponentKind::Physics.bit(), 0);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ComponentKind::Physics.name(), "physics");
        assert_eq!(ComponentKind::Scene.to_string(), "scene");
    }

    #[test]
    fn test_component_defaults_unowned() {
        assert!(ActorComponent::default().owner.is_none());
        assert!(PhysicsComponent::default().body.is_null());
        assert_eq!(SceneComponent::default().transform, Transform::IDENTITY);
    }
}
