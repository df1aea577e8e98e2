//! # stepper-scl
//!
//! Command/response driver for stepper controllers that speak the SCL
//! (Serial Command Language) over UDP.
//!
//! ## Features
//!
//! - **Framed ASCII protocol**: `00 07 <command> CR` requests, ack-marked replies
//! - **Typed replies**: decimal values, two's-complement hex telemetry, raw text
//! - **Gearing-aware angles**: electronic and mechanical gearing conversions
//! - **Arrival tracking**: target position bookkeeping with a tolerance window
//! - **no_std core**: codec and motion semantics work without the standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepper_scl::{load_config, StepperDrive, UdpConnection};
//! use stepper_scl::config::units::Degrees;
//!
//! let config = load_config("frame.toml")?;
//! let connection = UdpConnection::from_config(&config.drive)?;
//!
//! let mut drive = StepperDrive::builder()
//!     .from_config(&config)
//!     .transport(connection)
//!     .build()?;
//!
//! drive.identify()?;
//! drive.setup(&config.setup)?;
//! drive.set_angle(Degrees(90.0))?;
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables the UDP transport and TOML loading

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Errors carry heapless strings and the remote address for diagnostics
#![allow(clippy::result_large_err)]

pub mod config;
pub mod error;
pub mod motor;
pub mod protocol;
pub mod transport;

pub use config::{validate_config, DriveConfig, SetupProfile, SystemConfig};
pub use error::{Error, Result};
pub use motor::{Gearing, Identity, StepperDrive, StepperDriveBuilder, StopMode, TargetTracker};
pub use protocol::{decode, encode, Command, DecodedValue, ResponseKind};
pub use transport::Transport;

#[cfg(feature = "std")]
pub use config::load_config;

#[cfg(feature = "std")]
pub use transport::UdpConnection;

pub use config::units::{Degrees, EncoderCounts, RevsPerSec, RevsPerSecSquared};
