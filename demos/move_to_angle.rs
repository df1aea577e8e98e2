//! Example: Configuration-driven move to an angle.
//!
//! This example demonstrates how to:
//! - Load a drive configuration from TOML
//! - Run the setup sequence on the controller
//! - Feed to an angle and poll until the encoder is inside the arrival window
//!
//! Run with: `cargo run --example move_to_angle -- frame.toml 90`

use std::time::Duration;

use stepper_scl::config::units::Degrees;
use stepper_scl::{load_config, Result, StepperDrive, StopMode, UdpConnection};

/// Blocking delay on top of the standard library.
struct StdDelay;

impl embedded_hal::delay::DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "frame.toml".into());
    let degrees: f64 = args.next().and_then(|a| a.parse().ok()).unwrap_or(90.0);

    let config = load_config(&path)?;
    let connection = UdpConnection::from_config(&config.drive)?;
    let mut drive = StepperDrive::builder()
        .from_config(&config)
        .transport(connection)
        .build()?;

    drive.identify()?;
    drive.setup(&config.setup)?;
    drive.enable_motor()?;

    let target = drive.set_angle(Degrees(degrees))?;
    println!("{}: feeding to {}° ({} counts)", drive.name(), degrees, target);

    if drive.wait_for_arrival(&mut StdDelay, 100, 200)? {
        let angle = drive.angle()?;
        println!("{}: arrived at {:.2}°", drive.name(), angle.0);
    } else {
        println!("{}: not in position, stopping", drive.name());
        let completed = drive.stop_and_purge(StopMode::Decelerate)?;
        println!("{}: purge saw completion marker: {}", drive.name(), completed);
    }

    drive.teardown()
}
