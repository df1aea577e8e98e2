//! Unit tests for TOML configuration parsing.

use std::io::Write;

use stepper_scl::config::units::{EncoderFunction, RevsPerSec};
use stepper_scl::config::{load_config, parse_config, SystemConfig};
use stepper_scl::error::{ConfigError, Error};

/// Test parsing a drive with every field set.
#[test]
fn test_parse_drive_config() {
    let toml_str = r#"
[drive]
name = "l1"
address = "10.1.1.10"
port = 7776
timeout_ms = 1500
electronic_gearing = 400
mechanical_gearing = 4.0
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    let drive = &config.drive;

    assert_eq!(drive.name.as_str(), "l1");
    assert_eq!(drive.port, 7776);
    assert_eq!(drive.timeout().as_millis(), 1500);
    assert_eq!(drive.electronic_gearing, 400);
    assert_eq!(drive.mechanical_gearing, 4.0);
    assert_eq!(drive.local_port(), Ok(15010));
    assert_eq!(drive.remote_addr().unwrap().to_string(), "10.1.1.10:7776");
}

/// Test that an absent setup table falls back to the stock motion profile.
#[test]
fn test_setup_defaults() {
    let config = parse_config("[drive]\naddress = \"10.1.1.20\"\n").unwrap();

    assert_eq!(config.name(), "axis");
    assert_eq!(config.setup.acceleration.0, 0.4);
    assert_eq!(config.setup.jog_speed, RevsPerSec(0.5));
    assert_eq!(config.setup.velocity, RevsPerSec(0.5));
    assert_eq!(config.setup.encoder_function, EncoderFunction::StallPrevention);
    assert_eq!(config.drive.purge_attempts, 15);
    assert_eq!(config.drive.purge_timeout().as_secs(), 3);
}

/// Test encoder function codes in the setup table.
#[test]
fn test_parse_encoder_functions() {
    for (code, expected) in [
        (0, EncoderFunction::Off),
        (1, EncoderFunction::StallDetection),
        (2, EncoderFunction::StallPrevention),
        (6, EncoderFunction::StallPreventionWithTimeout),
    ] {
        let toml_str = format!(
            "[drive]\naddress = \"10.1.1.20\"\n\n[setup]\nencoder_function = {}\n",
            code
        );
        let config = parse_config(&toml_str).unwrap();
        assert_eq!(config.setup.encoder_function, expected);
    }
}

/// Test that a missing address is a parse error.
#[test]
fn test_missing_address() {
    let result = parse_config("[drive]\nname = \"l1\"\n");
    assert!(matches!(result, Err(Error::Config(ConfigError::ParseError(_)))));
}

/// Test loading from a file on disk.
#[test]
fn test_load_config_file() {
    let path = std::env::temp_dir().join(format!("stepper-scl-{}.toml", std::process::id()));
    {
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[drive]\nname = \"frame\"\naddress = \"10.1.1.12\"").unwrap();
    }

    let config = load_config(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.name(), "frame");
    assert_eq!(config.drive.local_port(), Ok(15012));
}
