//! Configuration and argument validation.

use crate::error::{ConfigError, Error, Result, ValidationError};

use super::drive::{DriveConfig, SetupProfile};
use super::SystemConfig;

/// Slowest acceleration the controller accepts, in rev/s².
pub const MIN_ACCELERATION: f64 = 0.167;

/// Fastest acceleration the controller accepts, in rev/s².
pub const MAX_ACCELERATION: f64 = 5461.167;

/// Check an acceleration or deceleration rate against the controller's range.
///
/// Both bounds are inclusive; NaN is rejected.
///
/// # Errors
///
/// Returns `ValidationError::OutOfRange` for values outside
/// `[MIN_ACCELERATION, MAX_ACCELERATION]`.
pub fn check_acceleration(rate: f64) -> core::result::Result<(), ValidationError> {
    if (MIN_ACCELERATION..=MAX_ACCELERATION).contains(&rate) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            value: rate,
            min: MIN_ACCELERATION,
            max: MAX_ACCELERATION,
        })
    }
}

/// Validate a system configuration.
///
/// Checks:
/// - The controller address is an IP address
/// - Timeouts are non-zero
/// - Both gearings are positive
/// - Setup rates are accepted by the controller
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    validate_drive(&config.drive)?;
    validate_setup(&config.setup)?;
    Ok(())
}

fn validate_drive(config: &DriveConfig) -> Result<()> {
    config.ip()?;

    if config.timeout_ms == 0 {
        return Err(Error::Config(ConfigError::InvalidTimeout(config.timeout_ms)));
    }

    if config.purge_timeout_ms == 0 {
        return Err(Error::Config(ConfigError::InvalidTimeout(
            config.purge_timeout_ms,
        )));
    }

    if config.electronic_gearing == 0 {
        return Err(Error::Config(ConfigError::InvalidGearing(0.0)));
    }

    if !(config.mechanical_gearing.is_finite() && config.mechanical_gearing > 0.0) {
        return Err(Error::Config(ConfigError::InvalidGearing(
            config.mechanical_gearing,
        )));
    }

    Ok(())
}

fn validate_setup(setup: &SetupProfile) -> Result<()> {
    if check_acceleration(setup.acceleration.0).is_err() {
        return Err(Error::Config(ConfigError::InvalidRate(setup.acceleration.0)));
    }

    for speed in [setup.jog_speed.0, setup.velocity.0] {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(Error::Config(ConfigError::InvalidRate(speed)));
        }
    }

    Ok(())
}
