//! # Commands
//!
//! Reversible edits to an actor's movement intent. Input bindings map
//! keys to command instances; key-down applies, key-up reverts, and the
//! same pair works for local input and for replaying remote input on the
//! server.
//!
//! Every movement command is the same shape (set a flag, clear a flag),
//! so there is one struct and five statics instead of five types.

use argos_shared::protocol::{
    INTENT_BACKWARD, INTENT_FORWARD, INTENT_JUMP, INTENT_LEFT, INTENT_RIGHT,
};

use crate::component::ActorComponent;
use crate::entity::EntityHandle;
use crate::registry::Registry;

/// A reversible action against one entity.
pub trait Command: Sync {
    /// Diagnostic name of the command.
    fn name(&self) -> &'static str;

    /// Applies the action.
    ///
    /// # Panics
    ///
    /// Panics if the entity lacks the component the command edits.
    /// Commands are only ever bound to entities built with one.
    fn apply(&self, registry: &mut Registry, handle: EntityHandle);

    /// Reverts the action.
    ///
    /// # Panics
    ///
    /// Panics if the entity lacks the component the command edits.
    fn revert(&self, registry: &mut Registry, handle: EntityHandle);
}

/// Command that toggles one intent flag on the actor component.
pub struct IntentCommand {
    name: &'static str,
    flag: u32,
}

impl IntentCommand {
    /// Command toggling `flag`, named for diagnostics.
    #[must_use]
    pub const fn new(name: &'static str, flag: u32) -> Self {
        Self { name, flag }
    }
}

impl Command for IntentCommand {
    fn name(&self) -> &'static str {
        self.name
    }

    fn apply(&self, registry: &mut Registry, handle: EntityHandle) {
        registry
            .expect_component_mut::<ActorComponent>(handle)
            .intent
            .set(self.flag);
    }

    fn revert(&self, registry: &mut Registry, handle: EntityHandle) {
        registry
            .expect_component_mut::<ActorComponent>(handle)
            .intent
            .clear(self.flag);
    }
}

/// Start/stop moving forward.
pub static MOVE_FORWARD: IntentCommand = IntentCommand::new("move_forward", INTENT_FORWARD);

/// Start/stop moving backward.
pub static MOVE_BACKWARD: IntentCommand = IntentCommand::new("move_backward", INTENT_BACKWARD);

/// Start/stop strafing left.
pub static MOVE_LEFT: IntentCommand = IntentCommand::new("move_left", INTENT_LEFT);

/// Start/stop strafing right.
pub static MOVE_RIGHT: IntentCommand = IntentCommand::new("move_right", INTENT_RIGHT);

/// Start/stop jumping.
pub static JUMP: IntentCommand = IntentCommand::new("jump", INTENT_JUMP);

#[cfg(test)]
mod tests {
    use super::*;

    fn actor_entity(registry: &mut Registry) -> EntityHandle {
        let entity = registry.spawn().unwrap();
        let _ = registry.attach(entity, ActorComponent::default()).unwrap();
        entity
    }

    #[test]
    fn test_apply_revert_roundtrip() {
        let mut registry = Registry::new(4, 4);
        let entity = actor_entity(&mut registry);

        MOVE_BACKWARD.apply(&mut registry, entity);
        let actor = registry.component::<ActorComponent>(entity).unwrap();
        assert!(actor.intent.contains(INTENT_BACKWARD));
        assert!(actor.intent.is_moving());

        MOVE_BACKWARD.revert(&mut registry, entity);
        let actor = registry.component::<ActorComponent>(entity).unwrap();
        assert!(!actor.intent.contains(INTENT_BACKWARD));
        assert!(!actor.intent.is_moving());
    }

    #[test]
    fn test_commands_touch_distinct_flags() {
        let mut registry = Registry::new(4, 4);
        let entity = actor_entity(&mut registry);

        MOVE_FORWARD.apply(&mut registry, entity);
        MOVE_LEFT.apply(&mut registry, entity);
        JUMP.apply(&mut registry, entity);

        let intent = registry.component::<ActorComponent>(entity).unwrap().intent;
        assert!(intent.contains(INTENT_FORWARD));
        assert!(intent.contains(INTENT_LEFT));
        assert!(intent.contains(INTENT_JUMP));
        assert!(!intent.contains(INTENT_RIGHT));

        MOVE_FORWARD.revert(&mut registry, entity);
        let intent = registry.component::<ActorComponent>(entity).unwrap().intent;
        assert!(!intent.contains(INTENT_FORWARD));
        assert!(intent.contains(INTENT_LEFT));
    }

    #[test]
    #[should_panic(expected = "missing a required actor component")]
    fn test_apply_without_actor_panics() {
        let mut registry = Registry::new(4, 4);
        let entity = registry.spawn().unwrap();
        MOVE_FORWARD.apply(&mut registry, entity);
    }

    #[test]
    fn test_command_names() {
        assert_eq!(MOVE_FORWARD.name(), "move_forward");
        assert_eq!(JUMP.name(), "jump");
    }
}
