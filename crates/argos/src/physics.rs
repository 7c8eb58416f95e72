//! # Physics Seam
//!
//! The world drives rigid bodies through the [`Physics`] trait and never
//! looks inside the engine behind it. [`BuiltinPhysics`] is the
//! first-party implementation: gravity, terminal velocity, and a flat
//! ground plane. Enough to carry pawns, jumps, and falling props without
//! an external solver.

use argos_core::{BodyId, BodyKind};
use argos_shared::math::{Quaternion, Vec3};

/// Gravity acceleration (meters per second squared).
pub const GRAVITY: f32 = 20.0;

/// Terminal fall speed (meters per second).
pub const TERMINAL_VELOCITY: f32 = 50.0;

/// Height of the ground plane.
pub const GROUND_HEIGHT: f32 = 0.0;

/// Everything needed to create a body.
#[derive(Clone, Copy, Debug)]
pub struct BodyDesc {
    /// How the body participates in simulation.
    pub kind: BodyKind,
    /// Center position.
    pub position: Vec3,
    /// Heading around the vertical axis, radians.
    pub yaw: f32,
    /// Half extents of the collision box.
    pub half_extents: Vec3,
}

/// Interface the world steps rigid bodies through.
pub trait Physics {
    /// Creates a body and returns its handle.
    fn create_body(&mut self, desc: BodyDesc) -> BodyId;

    /// Removes a body. Unknown handles are ignored.
    fn remove_body(&mut self, id: BodyId);

    /// Drives the body's horizontal velocity. The vertical axis stays
    /// with gravity.
    fn set_velocity(&mut self, id: BodyId, velocity: Vec3);

    /// Launches the body upward at `speed`, only while grounded.
    fn jump(&mut self, id: BodyId, speed: f32);

    /// Sets the body's heading.
    fn set_yaw(&mut self, id: BodyId, yaw: f32);

    /// Advances every body by `dt` seconds. Called once per tick.
    fn simulate(&mut self, dt: f32);

    /// The body's current pose.
    fn body_pose(&self, id: BodyId) -> Option<(Vec3, Quaternion)>;
}

#[derive(Clone, Copy, Debug)]
struct Body {
    kind: BodyKind,
    position: Vec3,
    yaw: f32,
    velocity: Vec3,
    half_extents: Vec3,
    grounded: bool,
}

/// Built-in rigid body integrator over a flat ground plane.
#[derive(Debug, Default)]
pub struct BuiltinPhysics {
    bodies: Vec<Option<Body>>,
    free: Vec<u32>,
}

impl BuiltinPhysics {
    /// Empty physics world.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bodies: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Number of live bodies.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.iter().flatten().count()
    }

    /// Whether the body is resting on the ground.
    #[must_use]
    pub fn grounded(&self, id: BodyId) -> bool {
        self.body(id).is_some_and(|body| body.grounded)
    }

    fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.0 as usize)?.as_ref()
    }

    fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id.0 as usize)?.as_mut()
    }

    fn floor_for(body: &Body) -> f32 {
        GROUND_HEIGHT + body.half_extents.y
    }
}

impl Physics for BuiltinPhysics {
    #[allow(clippy::cast_possible_truncation)]
    fn create_body(&mut self, desc: BodyDesc) -> BodyId {
        let floor = GROUND_HEIGHT + desc.half_extents.y;
        let body = Body {
            kind: desc.kind,
            position: desc.position,
            yaw: desc.yaw,
            velocity: Vec3::ZERO,
            half_extents: desc.half_extents,
            grounded: desc.position.y <= floor,
        };
        match self.free.pop() {
            Some(index) => {
                self.bodies[index as usize] = Some(body);
                BodyId(index)
            }
            None => {
                self.bodies.push(Some(body));
                BodyId((self.bodies.len() - 1) as u32)
            }
        }
    }

    fn remove_body(&mut self, id: BodyId) {
        let Some(slot) = self.bodies.get_mut(id.0 as usize) else {
            return;
        };
        if slot.take().is_some() {
            self.free.push(id.0);
        }
    }

    fn set_velocity(&mut self, id: BodyId, velocity: Vec3) {
        if let Some(body) = self.body_mut(id) {
            body.velocity.x = velocity.x;
            body.velocity.z = velocity.z;
        }
    }

    fn jump(&mut self, id: BodyId, speed: f32) {
        if let Some(body) = self.body_mut(id) {
            if body.grounded {
                body.velocity.y = speed;
                body.grounded = false;
            }
        }
    }

    fn set_yaw(&mut self, id: BodyId, yaw: f32) {
        if let Some(body) = self.body_mut(id) {
            body.yaw = yaw;
        }
    }

    fn simulate(&mut self, dt: f32) {
        for body in self.bodies.iter_mut().flatten() {
            match body.kind {
                BodyKind::Static => {}
                BodyKind::Kinematic => {
                    body.position += body.velocity * dt;
                }
                BodyKind::Dynamic => {
                    if !body.grounded {
                        body.velocity.y -= GRAVITY * dt;
                        body.velocity.y = body.velocity.y.max(-TERMINAL_VELOCITY);
                    }
                    body.position += body.velocity * dt;

                    let floor = Self::floor_for(body);
                    if body.position.y <= floor {
                        body.position.y = floor;
                        if body.velocity.y <= 0.0 {
                            body.velocity.y = 0.0;
                            body.grounded = true;
                        }
                    } else {
                        body.grounded = false;
                    }
                }
            }
        }
    }

    fn body_pose(&self, id: BodyId) -> Option<(Vec3, Quaternion)> {
        self.body(id)
            .map(|body| (body.position, Quaternion::from_yaw(body.yaw)))
    }
}
