//! Wire-safe simulation state structs.
//!
//! These cross the transport boundary byte-for-byte, so layouts are fixed
//! and covered by size tests. Frame enums that carry them live in the
//! network crate; this module only defines the flat payloads.

use crate::math::{Quaternion, Vec3};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// One entity's authoritative pose for a given tick.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct EntityPose {
    /// Stable entity identity (never a pool slot index).
    pub entity_id: u64,
    /// Position
    pub position: Vec3,
    /// Orientation
    pub orientation: Quaternion,
    /// Tick this pose was sampled on.
    pub tick: u32,
}

impl EntityPose {
    /// Creates a pose sample.
    #[must_use]
    pub const fn new(entity_id: u64, position: Vec3, orientation: Quaternion, tick: u32) -> Self {
        Self {
            entity_id,
            position,
            orientation,
            tick,
        }
    }
}

/// Movement intent flag: move along the facing direction.
pub const INTENT_FORWARD: u32 = 1 << 0;
/// Movement intent flag: move against the facing direction.
pub const INTENT_BACKWARD: u32 = 1 << 1;
/// Movement intent flag: strafe left.
pub const INTENT_LEFT: u32 = 1 << 2;
/// Movement intent flag: strafe right.
pub const INTENT_RIGHT: u32 = 1 << 3;
/// Movement intent flag: jump impulse requested.
pub const INTENT_JUMP: u32 = 1 << 4;

/// A participant's current movement intent.
///
/// Set locally by commands, sent to the server verbatim, and consumed by
/// the locomotion pass on whichever side simulates the entity.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct ActorIntent {
    /// Active `INTENT_*` flags.
    pub flags: u32,
    /// Facing yaw in radians.
    pub yaw: f32,
    /// Look pitch in radians.
    pub pitch: f32,
}

impl ActorIntent {
    /// Intent with no flags set and zero facing.
    pub const IDLE: Self = Self {
        flags: 0,
        yaw: 0.0,
        pitch: 0.0,
    };

    /// Whether `flag` is currently set.
    #[must_use]
    pub const fn contains(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }

    /// Sets `flag`.
    pub fn set(&mut self, flag: u32) {
        self.flags |= flag;
    }

    /// Clears `flag`.
    pub fn clear(&mut self, flag: u32) {
        self.flags &= !flag;
    }

    /// Whether any movement flag is active.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.flags & (INTENT_FORWARD | INTENT_BACKWARD | INTENT_LEFT | INTENT_RIGHT) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_pose_size() {
        // Ensure fixed size for the wire
        assert_eq!(std::mem::size_of::<EntityPose>(), 40);
    }

    #[test]
    fn test_actor_intent_size() {
        assert_eq!(std::mem::size_of::<ActorIntent>(), 12);
    }

    #[test]
    fn test_intent_flags() {
        let mut intent = ActorIntent::IDLE;
        assert!(!intent.is_moving());

        intent.set(INTENT_FORWARD);
        assert!(intent.contains(INTENT_FORWARD));
        assert!(intent.is_moving());

        intent.set(INTENT_JUMP);
        intent.clear(INTENT_FORWARD);
        assert!(!intent.is_moving());
        assert!(intent.contains(INTENT_JUMP));
    }
}
