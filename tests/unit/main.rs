//! Unit test harness for stepper-scl.
//!
//! This module organizes unit tests for each component of the library.

mod codec_properties;
mod config_parsing;
mod config_validation;
