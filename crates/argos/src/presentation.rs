//! # Presentation Seam
//!
//! The world pushes what the frame should show through the
//! [`Presentation`] trait and never learns how it gets drawn. Scene
//! graph, meshes, and materials are the renderer's business, keyed by
//! entity ID on its side.
//!
//! [`RecordingPresentation`] logs every call for tests;
//! [`NullPresentation`] swallows them for headless worlds.

use std::cell::RefCell;
use std::rc::Rc;

use argos_core::EntityId;
use argos_shared::math::{Transform, Vec3};

/// Interface the world pushes frame state through.
pub trait Presentation {
    /// Opens the named scene. Called once when the world is created.
    fn create_scene(&mut self, name: &str);

    /// Tears the scene down. Called once when the world goes away.
    fn destroy_scene(&mut self);

    /// Upserts one entity's transform for this frame.
    fn set_entity_transform(&mut self, id: EntityId, transform: &Transform);

    /// Drops everything shown for the entity.
    fn remove_entity(&mut self, id: EntityId);

    /// Sets the active view pose.
    fn set_view(&mut self, view: &Transform);

    /// Sets the sun's light direction.
    fn set_sun_direction(&mut self, direction: Vec3);

    /// Reflects the world's paused state.
    fn set_paused(&mut self, paused: bool);
}

/// Presentation that shows nothing.
#[derive(Debug, Default)]
pub struct NullPresentation;

impl NullPresentation {
    /// A presentation for worlds with nothing to show.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Presentation for NullPresentation {
    fn create_scene(&mut self, _name: &str) {}
    fn destroy_scene(&mut self) {}
    fn set_entity_transform(&mut self, _id: EntityId, _transform: &Transform) {}
    fn remove_entity(&mut self, _id: EntityId) {}
    fn set_view(&mut self, _view: &Transform) {}
    fn set_sun_direction(&mut self, _direction: Vec3) {}
    fn set_paused(&mut self, _paused: bool) {}
}

/// One recorded presentation call.
#[derive(Clone, Debug, PartialEq)]
pub enum PresentationCall {
    /// `create_scene` with the scene name.
    SceneCreated(String),
    /// `destroy_scene`.
    SceneDestroyed,
    /// `set_entity_transform`.
    EntityTransform(EntityId, Transform),
    /// `remove_entity`.
    EntityRemoved(EntityId),
    /// `set_view`.
    View(Transform),
    /// `set_sun_direction`.
    Sun(Vec3),
    /// `set_paused`.
    Paused(bool),
}

/// Recording double of [`Presentation`].
///
/// Clones share one call log, so a test keeps a handle while the world
/// owns the other and every call stays inspectable.
#[derive(Clone, Debug, Default)]
pub struct RecordingPresentation {
    calls: Rc<RefCell<Vec<PresentationCall>>>,
}

impl RecordingPresentation {
    /// Recorder with an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every call so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<PresentationCall> {
        self.calls.borrow().clone()
    }

    /// Drains the log, returning the calls recorded since the last take.
    #[must_use]
    pub fn take_calls(&self) -> Vec<PresentationCall> {
        self.calls.borrow_mut().drain(..).collect()
    }

    fn record(&self, call: PresentationCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl Presentation for RecordingPresentation {
    fn create_scene(&mut self, name: &str) {
        self.record(PresentationCall::SceneCreated(name.to_owned()));
    }

    fn destroy_scene(&mut self) {
        self.record(PresentationCall::SceneDestroyed);
    }

    fn set_entity_transform(&mut self, id: EntityId, transform: &Transform) {
        self.record(PresentationCall::EntityTransform(id, *transform));
    }

    fn remove_entity(&mut self, id: EntityId) {
        self.record(PresentationCall::EntityRemoved(id));
    }

    fn set_view(&mut self, view: &Transform) {
        self.record(PresentationCall::View(*view));
    }

    fn set_sun_direction(&mut self, direction: Vec3) {
        self.record(PresentationCall::Sun(direction));
    }

    fn set_paused(&mut self, paused: bool) {
        self.record(PresentationCall::Paused(paused));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_one_log() {
        let recorder = RecordingPresentation::new();
        let mut world_side: Box<dyn Presentation> = Box::new(recorder.clone());

        world_side.create_scene("veridia");
        world_side.set_paused(true);

        assert_eq!(
            recorder.take_calls(),
            vec![
                PresentationCall::SceneCreated("veridia".to_owned()),
                PresentationCall::Paused(true),
            ]
        );
        assert!(recorder.calls().is_empty());
    }
}
