//! Unit types for physical quantities.
//!
//! Keeps angles, encoder counts and the controller's rev-based rates apart so
//! a velocity cannot be passed where an acceleration is expected.

use core::fmt;
use core::ops::{Add, Sub};

use serde::Deserialize;

use crate::error::ConfigError;

/// Angular position of the driven element in degrees.
///
/// Converted to [`EncoderCounts`] through the drive's gearing.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct Degrees(pub f64);

impl Degrees {
    /// Create a new Degrees value.
    #[inline]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl Add for Degrees {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Degrees {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

/// Velocity in motor revolutions per second.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct RevsPerSec(pub f64);

impl RevsPerSec {
    /// Create a new RevsPerSec value.
    #[inline]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }
}

/// Acceleration in motor revolutions per second squared.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct RevsPerSecSquared(pub f64);

impl RevsPerSecSquared {
    /// Create a new RevsPerSecSquared value.
    #[inline]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }
}

/// Absolute encoder position as reported by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct EncoderCounts(pub i64);

impl EncoderCounts {
    /// Create a new EncoderCounts value.
    #[inline]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Absolute distance to another position.
    #[inline]
    pub fn distance(self, other: Self) -> u64 {
        self.0.abs_diff(other.0)
    }
}

impl From<i32> for EncoderCounts {
    fn from(value: i32) -> Self {
        Self(i64::from(value))
    }
}

impl Add for EncoderCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for EncoderCounts {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for EncoderCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Controller encoder function (`EF` command).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncoderFunction {
    /// Encoder ignored.
    Off,
    /// Stall detection only.
    StallDetection,
    /// Stall prevention.
    #[default]
    StallPrevention,
    /// Stall prevention with time-out.
    StallPreventionWithTimeout,
}

impl EncoderFunction {
    /// Numeric code sent with `EF`.
    #[inline]
    pub const fn code(self) -> u8 {
        match self {
            EncoderFunction::Off => 0,
            EncoderFunction::StallDetection => 1,
            EncoderFunction::StallPrevention => 2,
            EncoderFunction::StallPreventionWithTimeout => 6,
        }
    }

    /// Look up the function for a code reported by the controller.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEncoderFunction` for unknown codes.
    pub fn from_code(code: u8) -> Result<Self, ConfigError> {
        match code {
            0 => Ok(EncoderFunction::Off),
            1 => Ok(EncoderFunction::StallDetection),
            2 => Ok(EncoderFunction::StallPrevention),
            6 => Ok(EncoderFunction::StallPreventionWithTimeout),
            other => Err(ConfigError::InvalidEncoderFunction(other)),
        }
    }
}

impl TryFrom<u8> for EncoderFunction {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_code(value)
    }
}

impl<'de> Deserialize<'de> for EncoderFunction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use core::fmt::Write;
        let code = u8::deserialize(deserializer)?;
        EncoderFunction::from_code(code).map_err(|e| {
            let mut buf = heapless::String::<128>::new();
            let _ = write!(buf, "{}", e);
            serde::de::Error::custom(buf.as_str())
        })
    }
}

/// Extension trait for creating unit types from primitives.
pub trait UnitExt {
    /// Convert to Degrees.
    fn degrees(self) -> Degrees;
    /// Convert to RevsPerSec.
    fn rps(self) -> RevsPerSec;
    /// Convert to RevsPerSecSquared.
    fn rps2(self) -> RevsPerSecSquared;
}

impl UnitExt for f64 {
    #[inline]
    fn degrees(self) -> Degrees {
        Degrees(self)
    }

    #[inline]
    fn rps(self) -> RevsPerSec {
        RevsPerSec(self)
    }

    #[inline]
    fn rps2(self) -> RevsPerSecSquared {
        RevsPerSecSquared(self)
    }
}
