//! Motor module for stepper-scl.
//!
//! Provides the drive facade plus the driver-side gearing and target state.

mod builder;
mod driver;
mod gearing;
mod target;

pub use builder::StepperDriveBuilder;
pub use driver::{Identity, StepperDrive, StopMode};
pub use gearing::{Gearing, DEFAULT_ELECTRONIC_GEARING, DEFAULT_MECHANICAL_GEARING};
pub use target::{TargetTracker, ARRIVAL_WINDOW};
