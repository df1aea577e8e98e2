//! System configuration - root configuration structure.

use serde::Deserialize;

use super::drive::{DriveConfig, SetupProfile};

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    /// Controller connection and gearing.
    pub drive: DriveConfig,

    /// Motion settings applied at setup.
    #[serde(default)]
    pub setup: SetupProfile,
}

impl SystemConfig {
    /// Configuration for a controller at `address` with default settings.
    pub fn for_address(name: &str, address: &str) -> Self {
        Self {
            drive: DriveConfig::new(name, address),
            setup: SetupProfile::default(),
        }
    }

    /// Axis name.
    pub fn name(&self) -> &str {
        self.drive.name.as_str()
    }
}
