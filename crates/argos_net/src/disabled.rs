//! Null network role for offline worlds.

use crate::role::{NetworkMode, NetworkRole};
use crate::sim::NetworkSim;

/// Role that does nothing. A world starts here and returns here between
/// server or client sessions.
#[derive(Debug, Default)]
pub struct DisabledRole;

impl DisabledRole {
    /// The disabled role, ready to install.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl NetworkRole for DisabledRole {
    fn mode(&self) -> NetworkMode {
        NetworkMode::Disabled
    }

    fn initialized(&self) -> bool {
        false
    }

    fn update(&mut self, _sim: &mut dyn NetworkSim) {}

    fn shutdown(&mut self, _sim: &mut dyn NetworkSim) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::RecordingSim;

    #[test]
    fn test_disabled_role_touches_nothing() {
        let mut sim = RecordingSim::new();
        let mut role = DisabledRole::new();

        assert_eq!(role.mode(), NetworkMode::Disabled);
        assert!(!role.initialized());

        role.update(&mut sim);
        role.shutdown(&mut sim);

        assert!(sim.participants.is_empty());
        assert!(sim.despawned.is_empty());
        assert!(sim.intents.is_empty());
    }
}
