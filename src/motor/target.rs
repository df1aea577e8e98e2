//! Target position bookkeeping.

use crate::config::units::EncoderCounts;

/// Half-width of the arrival window in encoder counts.
pub const ARRIVAL_WINDOW: u64 = 40;

/// Remembers the last position fed to the controller.
///
/// The target lives only on the driver side; the controller is never asked
/// for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetTracker {
    target: Option<EncoderCounts>,
    window: u64,
}

impl Default for TargetTracker {
    fn default() -> Self {
        Self::new(ARRIVAL_WINDOW)
    }
}

impl TargetTracker {
    /// Create a tracker with no target and the given window.
    #[inline]
    pub const fn new(window: u64) -> Self {
        Self {
            target: None,
            window,
        }
    }

    /// Last requested position, if any.
    #[inline]
    pub fn target(&self) -> Option<EncoderCounts> {
        self.target
    }

    /// Record a newly requested position.
    #[inline]
    pub fn set(&mut self, target: EncoderCounts) {
        self.target = Some(target);
    }

    /// Forget the target.
    #[inline]
    pub fn clear(&mut self) {
        self.target = None;
    }

    /// Arrival window half-width.
    #[inline]
    pub fn window(&self) -> u64 {
        self.window
    }

    /// True if `position` lies strictly inside the window around the target.
    ///
    /// Always false while no target is set.
    pub fn is_within(&self, position: EncoderCounts) -> bool {
        match self.target {
            Some(target) => position.distance(target) < self.window,
            None => false,
        }
    }
}
