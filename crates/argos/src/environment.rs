//! # Environment State
//!
//! Ambient state that belongs to the world rather than to any entity.
//! Today that is the sun's position on its day cycle and the paused
//! flag. The environment phase runs every tick, paused or not, so the
//! frame keeps rendering while the simulation holds still.

use std::f32::consts::TAU;

use argos_shared::math::Vec3;

/// How far above the horizon the sun's orbit is tilted.
const SUN_TILT: f32 = 0.35;

/// World-level ambient state.
#[derive(Clone, Debug)]
pub struct Environment {
    /// Current position on the day cycle, radians in `[0, TAU)`.
    sun_angle: f32,
    /// Radians the sun travels per second.
    sun_speed: f32,
    /// While paused the cycle holds still.
    paused: bool,
}

impl Environment {
    /// Environment at dawn, advancing `sun_speed` radians per second.
    #[must_use]
    pub const fn new(sun_speed: f32) -> Self {
        Self {
            sun_angle: 0.0,
            sun_speed,
            paused: false,
        }
    }

    /// Moves the day cycle forward. Holds still while paused.
    pub fn advance(&mut self, dt: f32) {
        if self.paused {
            return;
        }
        self.sun_angle = (self.sun_angle + self.sun_speed * dt).rem_euclid(TAU);
    }

    /// Direction sunlight travels, as a unit vector.
    #[must_use]
    pub fn sun_direction(&self) -> Vec3 {
        Vec3::new(self.sun_angle.cos(), -self.sun_angle.sin(), SUN_TILT).normalized()
    }

    /// Current position on the day cycle, radians in `[0, TAU)`.
    #[must_use]
    pub const fn sun_angle(&self) -> f32 {
        self.sun_angle
    }

    /// Freezes or resumes the day cycle.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Whether the cycle is holding still.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }
}
