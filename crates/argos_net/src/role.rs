//! # Network Roles
//!
//! A world runs exactly one network role at a time: disabled, server,
//! or client. The role is swapped as a whole object rather than mutated
//! in place, and every swap passes through the disabled role first so
//! shutdown always runs.

use crate::sim::NetworkSim;

/// Which role the world is currently running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetworkMode {
    /// No networking. The world simulates alone.
    Disabled,
    /// Authoritative host. Owns every entity's true pose.
    Server,
    /// Remote participant. Mirrors the server's entities.
    Client,
}

impl std::fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Disabled => "disabled",
            Self::Server => "server",
            Self::Client => "client",
        };
        f.write_str(label)
    }
}

/// One networking behavior the world can run each tick.
///
/// Roles own their transport endpoints and their participant or replica
/// bookkeeping, but never entity memory. Entity changes go through the
/// [`NetworkSim`] the world passes in.
pub trait NetworkRole {
    /// Which mode this role implements.
    fn mode(&self) -> NetworkMode;

    /// Whether this role holds live transport state. The disabled role
    /// reports `false`; server and client report `true` until shutdown.
    fn initialized(&self) -> bool;

    /// Runs one tick of network work: drain inbound traffic, apply it to
    /// the simulation, publish outbound state.
    fn update(&mut self, sim: &mut dyn NetworkSim);

    /// Releases everything this role spawned and closes its transport.
    /// Called exactly once, when the world swaps the role out.
    fn shutdown(&mut self, sim: &mut dyn NetworkSim);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_labels() {
        assert_eq!(NetworkMode::Disabled.to_string(), "disabled");
        assert_eq!(NetworkMode::Server.to_string(), "server");
        assert_eq!(NetworkMode::Client.to_string(), "client");
    }
}
