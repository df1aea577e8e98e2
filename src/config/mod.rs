//! Configuration module for stepper-scl.
//!
//! Provides types for loading and validating drive configurations from TOML
//! files (with `std` feature) or pre-parsed data.

mod drive;
#[cfg(feature = "std")]
mod loader;
mod system;
pub mod units;
mod validation;

pub use drive::{default_local_port, DriveConfig, SetupProfile, LOCAL_PORT_BASE};
pub use system::SystemConfig;
pub use validation::{check_acceleration, validate_config, MAX_ACCELERATION, MIN_ACCELERATION};

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Degrees, EncoderCounts, EncoderFunction, RevsPerSec, RevsPerSecSquared};
