//! # Input Bindings
//!
//! Maps raw key events to the movement commands in
//! [`argos_core::command`]. The world resolves an event to a command
//! and hands it back; the caller applies it on key-down and reverts it
//! on key-up against whatever entity it is driving. The bindings table
//! itself never touches an entity.

use argos_core::command::{Command, JUMP, MOVE_BACKWARD, MOVE_FORWARD, MOVE_LEFT, MOVE_RIGHT};

/// Keys the runtime understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Forward.
    W,
    /// Strafe left.
    A,
    /// Backward.
    S,
    /// Strafe right.
    D,
    /// Jump.
    Space,
    /// Unbound by default. Hosts usually map this to pause themselves.
    Escape,
}

/// A raw key transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// Key went down.
    Pressed(Key),
    /// Key came back up.
    Released(Key),
}

impl InputEvent {
    /// The key the event is about.
    #[must_use]
    pub const fn key(self) -> Key {
        match self {
            Self::Pressed(key) | Self::Released(key) => key,
        }
    }
}

/// Key-to-command table.
///
/// Bindings are static command instances, so the table is copy-free and
/// two keys may share one command.
pub struct KeyBindings {
    bindings: Vec<(Key, &'static dyn Command)>,
}

impl KeyBindings {
    /// Table with nothing bound.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Binds `key` to `command`, replacing any previous binding.
    pub fn bind(&mut self, key: Key, command: &'static dyn Command) {
        if let Some(slot) = self.bindings.iter_mut().find(|(bound, _)| *bound == key) {
            slot.1 = command;
        } else {
            self.bindings.push((key, command));
        }
    }

    /// The command bound to `key`, if any.
    #[must_use]
    pub fn command_for(&self, key: Key) -> Option<&'static dyn Command> {
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == key)
            .map(|(_, command)| *command)
    }
}

/// WASD movement plus space to jump.
impl Default for KeyBindings {
    fn default() -> Self {
        let mut bindings = Self::empty();
        bindings.bind(Key::W, &MOVE_FORWARD);
        bindings.bind(Key::A, &MOVE_LEFT);
        bindings.bind(Key::S, &MOVE_BACKWARD);
        bindings.bind(Key::D, &MOVE_RIGHT);
        bindings.bind(Key::Space, &JUMP);
        bindings
    }
}
