//! Angle and encoder conversions through electronic and mechanical gearing.

use crate::config::units::{Degrees, EncoderCounts};
use crate::error::ValidationError;

/// Default pulses per revolution configured on the controller.
pub const DEFAULT_ELECTRONIC_GEARING: u32 = 4000;

/// Default ratio for a motor driving its load directly.
pub const DEFAULT_MECHANICAL_GEARING: f64 = 1.0;

const MIN_POSITION: f64 = i32::MIN as f64;
const MAX_POSITION: f64 = i32::MAX as f64;

/// Gearing between encoder counts and the angle of the driven element.
///
/// - `electronic`: pulses per motor revolution, as set with `EG`
///   (200 = 1.8° steps, 400 = 0.9°, 800 = 0.45°)
/// - `mechanical`: ratio of an external gear train, tracked only here
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gearing {
    electronic: u32,
    mechanical: f64,
}

impl Default for Gearing {
    fn default() -> Self {
        Self::new(DEFAULT_ELECTRONIC_GEARING, DEFAULT_MECHANICAL_GEARING)
    }
}

impl Gearing {
    /// Create a gearing pair.
    #[inline]
    pub const fn new(electronic: u32, mechanical: f64) -> Self {
        Self {
            electronic,
            mechanical,
        }
    }

    /// Pulses per motor revolution.
    #[inline]
    pub fn electronic(&self) -> u32 {
        self.electronic
    }

    /// External gear ratio.
    #[inline]
    pub fn mechanical(&self) -> f64 {
        self.mechanical
    }

    /// Replace the electronic gearing.
    #[inline]
    pub fn set_electronic(&mut self, pulses_per_revolution: u32) {
        self.electronic = pulses_per_revolution;
    }

    /// Replace the mechanical gearing.
    #[inline]
    pub fn set_mechanical(&mut self, ratio: f64) {
        self.mechanical = ratio;
    }

    /// True when both ratios are positive and finite.
    pub fn is_valid(&self) -> bool {
        self.electronic > 0 && self.mechanical.is_finite() && self.mechanical > 0.0
    }

    /// Encoder counts per degree of the driven element.
    pub fn counts_per_degree(&self) -> f64 {
        f64::from(self.electronic) * self.mechanical / 360.0
    }

    /// Encoder position that puts the driven element at `angle`.
    ///
    /// `round(angle * mechanical / 360 * electronic)`, halves away from zero.
    ///
    /// The result must fit the controller's 32-bit position register; a
    /// non-finite angle or one beyond that range is
    /// [`ValidationError::OutOfRange`].
    pub fn angle_to_encoder(&self, angle: Degrees) -> Result<EncoderCounts, ValidationError> {
        self.check()?;
        let counts = libm::round(angle.0 * self.mechanical / 360.0 * f64::from(self.electronic));
        if !(MIN_POSITION..=MAX_POSITION).contains(&counts) {
            return Err(ValidationError::OutOfRange {
                value: counts,
                min: MIN_POSITION,
                max: MAX_POSITION,
            });
        }
        Ok(EncoderCounts(counts as i64))
    }

    /// Angle of the driven element at encoder position `counts`.
    pub fn encoder_to_angle(&self, counts: EncoderCounts) -> Result<Degrees, ValidationError> {
        self.check()?;
        let revolutions = counts.0 as f64 / f64::from(self.electronic);
        Ok(Degrees(revolutions * 360.0 / self.mechanical))
    }

    fn check(&self) -> Result<(), ValidationError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ValidationError::InvalidGearing)
        }
    }
}
