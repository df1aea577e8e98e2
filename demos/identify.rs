//! Example: Identify a controller.
//!
//! Connects to the controller at the given address, prints its model
//! revision and revision level, then closes the socket.
//!
//! Run with: `RUST_LOG=debug cargo run --example identify -- 10.1.1.10`

use stepper_scl::{DriveConfig, Result, StepperDrive, UdpConnection};

fn main() -> Result<()> {
    env_logger::init();

    let address = std::env::args().nth(1).unwrap_or_else(|| "10.1.1.10".into());
    let config = DriveConfig::new("identify", &address);

    let connection = UdpConnection::from_config(&config)?;
    let mut drive = StepperDrive::builder()
        .from_drive_config(&config)
        .transport(connection)
        .build()?;

    let identity = drive.identify()?;
    println!("Controller {}", address);
    println!("  model revision: {}", identity.model_revision);
    println!("  revision level: {}", identity.revision_level);
    println!("  status:         {}", drive.get_request_status()?);

    drive.close();
    Ok(())
}
