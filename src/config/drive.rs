//! Drive configuration from TOML.

use core::net::{IpAddr, SocketAddr};
use core::time::Duration;

use heapless::String;
use serde::Deserialize;

use crate::error::{bounded, ConfigError};
use crate::motor::{DEFAULT_ELECTRONIC_GEARING, DEFAULT_MECHANICAL_GEARING};
use crate::transport::{
    DEFAULT_PURGE_ATTEMPTS, DEFAULT_PURGE_TIMEOUT, DEFAULT_READ_TIMEOUT, PROTOCOL_PORT,
};

use super::units::{EncoderFunction, RevsPerSec, RevsPerSecSquared};

/// Base of the local UDP port convention.
pub const LOCAL_PORT_BASE: u16 = 15000;

/// Connection and gearing settings for one controller.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveConfig {
    /// Human-readable axis name (max 32 chars).
    #[serde(default = "default_name")]
    pub name: String<32>,

    /// Controller IP address.
    pub address: String<64>,

    /// Controller UDP port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Local UDP port; derived from the address when unset.
    #[serde(default)]
    pub local_port: Option<u16>,

    /// Read timeout for a command round trip in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Receive attempts when purging after a stop-and-kill.
    #[serde(default = "default_purge_attempts")]
    pub purge_attempts: u8,

    /// Per-attempt purge timeout in milliseconds.
    #[serde(default = "default_purge_timeout_ms")]
    pub purge_timeout_ms: u64,

    /// Pulses per motor revolution configured on the controller.
    #[serde(default = "default_electronic_gearing")]
    pub electronic_gearing: u32,

    /// Ratio of any gear train between the motor shaft and the driven element.
    #[serde(default = "default_mechanical_gearing")]
    pub mechanical_gearing: f64,
}

fn default_name() -> String<32> {
    bounded("axis")
}

fn default_port() -> u16 {
    PROTOCOL_PORT
}

fn default_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT.as_millis() as u64
}

fn default_purge_attempts() -> u8 {
    DEFAULT_PURGE_ATTEMPTS
}

fn default_purge_timeout_ms() -> u64 {
    DEFAULT_PURGE_TIMEOUT.as_millis() as u64
}

fn default_electronic_gearing() -> u32 {
    DEFAULT_ELECTRONIC_GEARING
}

fn default_mechanical_gearing() -> f64 {
    DEFAULT_MECHANICAL_GEARING
}

impl DriveConfig {
    /// Configuration with defaults for everything but the address.
    pub fn new(name: &str, address: &str) -> Self {
        Self {
            name: bounded(name),
            address: bounded(address),
            port: default_port(),
            local_port: None,
            timeout_ms: default_timeout_ms(),
            purge_attempts: default_purge_attempts(),
            purge_timeout_ms: default_purge_timeout_ms(),
            electronic_gearing: default_electronic_gearing(),
            mechanical_gearing: default_mechanical_gearing(),
        }
    }

    /// Parsed controller IP address.
    pub fn ip(&self) -> Result<IpAddr, ConfigError> {
        self.address
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(self.address.clone()))
    }

    /// Controller socket address.
    pub fn remote_addr(&self) -> Result<SocketAddr, ConfigError> {
        Ok(SocketAddr::new(self.ip()?, self.port))
    }

    /// Local UDP port: the configured one, or `15000 + last octet`.
    pub fn local_port(&self) -> Result<u16, ConfigError> {
        match self.local_port {
            Some(port) => Ok(port),
            None => Ok(default_local_port(self.ip()?)),
        }
    }

    /// Read timeout for a command round trip.
    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Per-attempt purge timeout.
    #[inline]
    pub fn purge_timeout(&self) -> Duration {
        Duration::from_millis(self.purge_timeout_ms)
    }
}

/// Local port convention: `15000 + last octet` of the controller address.
///
/// Gives every axis on a `10.1.1.x` network its own predictable port.
pub fn default_local_port(ip: IpAddr) -> u16 {
    let last = match ip {
        IpAddr::V4(v4) => v4.octets()[3],
        IpAddr::V6(v6) => v6.octets()[15],
    };
    LOCAL_PORT_BASE + u16::from(last)
}

/// Motion settings applied by [`StepperDrive::setup`](crate::StepperDrive::setup).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SetupProfile {
    /// Acceleration and deceleration for moves and jogs.
    #[serde(default = "default_acceleration", rename = "acceleration_rps2")]
    pub acceleration: RevsPerSecSquared,

    /// Jog speed.
    #[serde(default = "default_speed", rename = "jog_speed_rps")]
    pub jog_speed: RevsPerSec,

    /// Move velocity.
    #[serde(default = "default_speed", rename = "velocity_rps")]
    pub velocity: RevsPerSec,

    /// Encoder function to select.
    #[serde(default)]
    pub encoder_function: EncoderFunction,
}

fn default_acceleration() -> RevsPerSecSquared {
    RevsPerSecSquared(0.4)
}

fn default_speed() -> RevsPerSec {
    RevsPerSec(0.5)
}

impl Default for SetupProfile {
    fn default() -> Self {
        Self {
            acceleration: default_acceleration(),
            jog_speed: default_speed(),
            velocity: default_speed(),
            encoder_function: EncoderFunction::default(),
        }
    }
}
