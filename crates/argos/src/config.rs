//! # World Configuration
//!
//! TOML-backed settings loaded once at startup. Every field has a
//! default, so an empty file, a partial file, and no file at all are
//! all valid configurations.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use argos_shared::constants::{
    DEFAULT_COMPONENT_CAPACITY, DEFAULT_ENTITY_CAPACITY, DEFAULT_PORT, MAX_PARTICIPANTS,
};

/// Default radians per second for the sun's day cycle. A full day in
/// roughly two minutes.
const DEFAULT_SUN_SPEED: f32 = 0.05;

/// Failure to load a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for this schema.
    #[error("could not parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings for one world.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Most entities alive at once.
    pub entity_capacity: usize,
    /// Most live components of each kind.
    pub component_capacity: usize,
    /// Whether the physics phase runs. Mirror worlds that take their
    /// poses from a server turn this off.
    pub physics_enabled: bool,
    /// Scene handed to the presentation layer.
    pub scene_name: String,
    /// Radians the sun travels per second.
    pub sun_speed: f32,
    /// Session settings.
    pub network: NetworkConfig,
}

/// Settings for hosting or joining a session.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    /// Port a hosted session listens on.
    pub port: u16,
    /// Name announced when joining a session.
    pub player_name: String,
    /// Most participants a hosted session admits, the host included.
    pub max_participants: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            entity_capacity: DEFAULT_ENTITY_CAPACITY,
            component_capacity: DEFAULT_COMPONENT_CAPACITY,
            physics_enabled: true,
            scene_name: "veridia".to_owned(),
            sun_speed: DEFAULT_SUN_SPEED,
            network: NetworkConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            player_name: "player".to_owned(),
            max_participants: MAX_PARTICIPANTS,
        }
    }
}

impl WorldConfig {
    /// Parses settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text is not valid TOML
    /// or names a field this schema does not have.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Parse`] when its contents do not parse.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config = WorldConfig::from_toml_str("").unwrap();
        assert_eq!(config, WorldConfig::default());
        assert_eq!(config.entity_capacity, DEFAULT_ENTITY_CAPACITY);
        assert_eq!(config.network.port, DEFAULT_PORT);
        assert!(config.physics_enabled);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = WorldConfig::from_toml_str(
            r#"
            scene_name = "harbor"

            [network]
            port = 9000
            "#,
        )
        .unwrap();

        assert_eq!(config.scene_name, "harbor");
        assert_eq!(config.network.port, 9000);
        assert_eq!(config.network.player_name, "player");
        assert_eq!(config.entity_capacity, DEFAULT_ENTITY_CAPACITY);
    }

    #[test]
    fn test_full_file_round_trip() {
        let config = WorldConfig::from_toml_str(
            r#"
            entity_capacity = 64
            component_capacity = 32
            physics_enabled = false
            scene_name = "flats"
            sun_speed = 0.25

            [network]
            port = 7778
            player_name = "argonaut"
            max_participants = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.entity_capacity, 64);
        assert_eq!(config.component_capacity, 32);
        assert!(!config.physics_enabled);
        assert_eq!(config.scene_name, "flats");
        assert!((config.sun_speed - 0.25).abs() < f32::EPSILON);
        assert_eq!(config.network.port, 7778);
        assert_eq!(config.network.player_name, "argonaut");
        assert_eq!(config.network.max_participants, 4);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = WorldConfig::from_toml_str("gravity = 9.8").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_reports_io_error() {
        let err = WorldConfig::from_path("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
