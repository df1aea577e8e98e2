//! Builder pattern for StepperDrive.

use core::time::Duration;

use crate::config::{DriveConfig, SystemConfig};
use crate::error::{bounded, ConfigError, Error, Result};
use crate::transport::{Transport, DEFAULT_PURGE_ATTEMPTS, DEFAULT_PURGE_TIMEOUT};

use super::driver::StepperDrive;
use super::gearing::{Gearing, DEFAULT_ELECTRONIC_GEARING, DEFAULT_MECHANICAL_GEARING};

/// Builder for creating StepperDrive instances.
pub struct StepperDriveBuilder<T: Transport> {
    transport: Option<T>,
    name: Option<heapless::String<32>>,
    electronic_gearing: u32,
    mechanical_gearing: f64,
    purge_attempts: u8,
    purge_timeout: Duration,
}

impl<T: Transport> Default for StepperDriveBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> StepperDriveBuilder<T> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            transport: None,
            name: None,
            electronic_gearing: DEFAULT_ELECTRONIC_GEARING,
            mechanical_gearing: DEFAULT_MECHANICAL_GEARING,
            purge_attempts: DEFAULT_PURGE_ATTEMPTS,
            purge_timeout: DEFAULT_PURGE_TIMEOUT,
        }
    }

    /// Set the transport.
    pub fn transport(mut self, transport: T) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the axis name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(bounded(name));
        self
    }

    /// Set pulses per motor revolution.
    ///
    /// This only seeds the local conversion; `setup` sends it to the
    /// controller.
    pub fn electronic_gearing(mut self, pulses_per_revolution: u32) -> Self {
        self.electronic_gearing = pulses_per_revolution;
        self
    }

    /// Set the external gear ratio.
    pub fn mechanical_gearing(mut self, ratio: f64) -> Self {
        self.mechanical_gearing = ratio;
        self
    }

    /// Set the receive attempts used when purging.
    pub fn purge_attempts(mut self, attempts: u8) -> Self {
        self.purge_attempts = attempts;
        self
    }

    /// Set the per-attempt purge timeout.
    pub fn purge_timeout(mut self, timeout: Duration) -> Self {
        self.purge_timeout = timeout;
        self
    }

    /// Configure from a DriveConfig.
    pub fn from_drive_config(mut self, config: &DriveConfig) -> Self {
        self.name = Some(config.name.clone());
        self.electronic_gearing = config.electronic_gearing;
        self.mechanical_gearing = config.mechanical_gearing;
        self.purge_attempts = config.purge_attempts;
        self.purge_timeout = config.purge_timeout();
        self
    }

    /// Configure from a SystemConfig.
    pub fn from_config(self, config: &SystemConfig) -> Self {
        self.from_drive_config(&config.drive)
    }

    /// Build the StepperDrive.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport is missing or the gearing is not
    /// positive.
    pub fn build(self) -> Result<StepperDrive<T>> {
        let transport = self
            .transport
            .ok_or(Error::Config(ConfigError::Missing("transport")))?;

        if self.electronic_gearing == 0 {
            return Err(Error::Config(ConfigError::InvalidGearing(0.0)));
        }
        if !self.mechanical_gearing.is_finite() || self.mechanical_gearing <= 0.0 {
            return Err(Error::Config(ConfigError::InvalidGearing(
                self.mechanical_gearing,
            )));
        }

        let name = self.name.unwrap_or_else(|| bounded("axis"));
        let gearing = Gearing::new(self.electronic_gearing, self.mechanical_gearing);

        Ok(StepperDrive::from_parts(
            transport,
            name,
            gearing,
            self.purge_attempts,
            self.purge_timeout,
        ))
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;

    #[test]
    fn test_build_requires_transport() {
        let result = StepperDriveBuilder::<MockTransport>::new().name("x").build();
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::Missing("transport")))
        ));
    }

    #[test]
    fn test_build_rejects_zero_gearing() {
        let result = StepperDrive::builder()
            .transport(MockTransport::new())
            .electronic_gearing(0)
            .build();
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidGearing(_)))
        ));
    }

    #[test]
    fn test_from_drive_config() {
        let mut config = DriveConfig::new("l1", "10.1.1.10");
        config.electronic_gearing = 800;
        config.mechanical_gearing = 3.0;

        let drive = StepperDrive::builder()
            .transport(MockTransport::new())
            .from_drive_config(&config)
            .build()
            .unwrap();

        assert_eq!(drive.name(), "l1");
        assert_eq!(drive.gearing(), Gearing::new(800, 3.0));
        assert_eq!(drive.target_position(), None);
    }
}
