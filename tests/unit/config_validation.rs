//! Unit tests for configuration validation.

use stepper_scl::config::{parse_config, validate_config, SystemConfig};
use stepper_scl::error::{ConfigError, Error};

/// Test validation of a valid configuration.
#[test]
fn test_valid_config_passes_validation() {
    let config = SystemConfig::for_address("frame", "10.1.1.10");
    assert!(validate_config(&config).is_ok());
}

/// Test validation fails for a host name instead of an IP address.
#[test]
fn test_invalid_address() {
    let config = SystemConfig::for_address("frame", "controller.local");
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidAddress(_)))
    ));
}

/// Test validation fails for a zero purge timeout.
#[test]
fn test_zero_purge_timeout() {
    let toml_str = r#"
[drive]
address = "10.1.1.10"
purge_timeout_ms = 0
"#;

    assert!(matches!(
        parse_config(toml_str),
        Err(Error::Config(ConfigError::InvalidTimeout(0)))
    ));
}

/// Test validation fails for zero electronic gearing.
#[test]
fn test_zero_electronic_gearing() {
    let mut config = SystemConfig::for_address("frame", "10.1.1.10");
    config.drive.electronic_gearing = 0;

    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidGearing(_)))
    ));
}

/// Test validation of setup rates at and beyond the controller limits.
#[test]
fn test_setup_rate_limits() {
    let mut config = SystemConfig::for_address("frame", "10.1.1.10");

    config.setup.acceleration.0 = 5461.167;
    assert!(validate_config(&config).is_ok());

    config.setup.acceleration.0 = 5461.2;
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidRate(_)))
    ));

    config.setup.acceleration.0 = 0.4;
    config.setup.velocity.0 = 0.0;
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidRate(_)))
    ));
}
