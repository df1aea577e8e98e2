//! SCL stepper drive.
//!
//! [`StepperDrive`] pairs a [`Transport`] with the codec and exposes every
//! supported SCL command as a typed method. Each call is one request and one
//! reply; nothing is retried.

use core::fmt;
use core::time::Duration;

use embedded_hal::delay::DelayNs;
use log::{debug, error, info, warn};

use crate::config::units::{Degrees, EncoderCounts, EncoderFunction, RevsPerSec, RevsPerSecSquared};
use crate::config::{check_acceleration, SetupProfile};
use crate::error::{bounded, ConfigError, Error, ProtocolError, Result, ValidationError};
use crate::protocol::{decode, encode, render, Command, DecodedValue, ReplyText, ResponseKind};
use crate::transport::{Transport, DEFAULT_PURGE_ATTEMPTS, DEFAULT_PURGE_TIMEOUT, RECEIVE_BUFFER_SIZE};

use super::builder::StepperDriveBuilder;
use super::gearing::Gearing;
use super::target::TargetTracker;

/// Input selected during setup (`SI3`).
const SETUP_INPUT: u8 = 3;

/// How stop-and-kill brings the motor to rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopMode {
    /// `SK`: abort at once.
    #[default]
    Immediate,
    /// `SKD`: ramp down with the deceleration rate.
    Decelerate,
}

impl StopMode {
    fn mnemonic(self) -> &'static str {
        match self {
            StopMode::Immediate => "SK",
            StopMode::Decelerate => "SKD",
        }
    }
}

/// What a controller reports about itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    /// Model and firmware string (`MV`).
    pub model_revision: ReplyText,
    /// Firmware revision level (`RV`).
    pub revision_level: DecodedValue,
}

/// Command/response driver for one SCL stepper controller.
///
/// Generic over the [`Transport`] so it runs over UDP in production and over
/// a scripted channel in tests.
pub struct StepperDrive<T: Transport> {
    /// Datagram channel to the controller.
    transport: T,

    /// Axis name for logging.
    name: heapless::String<32>,

    /// Local copy of the gearing; `EG` keeps it in sync.
    gearing: Gearing,

    /// Last position fed with `FP`.
    target: TargetTracker,

    /// Receive attempts for a purge.
    purge_attempts: u8,

    /// Per-attempt purge timeout.
    purge_timeout: Duration,
}

impl<T: Transport> StepperDrive<T> {
    /// Wrap a transport with default gearing and purge settings.
    pub fn new(transport: T, name: &str) -> Self {
        Self::from_parts(
            transport,
            bounded(name),
            Gearing::default(),
            DEFAULT_PURGE_ATTEMPTS,
            DEFAULT_PURGE_TIMEOUT,
        )
    }

    pub(crate) fn from_parts(
        transport: T,
        name: heapless::String<32>,
        gearing: Gearing,
        purge_attempts: u8,
        purge_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            name,
            gearing,
            target: TargetTracker::default(),
            purge_attempts,
            purge_timeout,
        }
    }

    /// Start building a drive.
    pub fn builder() -> StepperDriveBuilder<T> {
        StepperDriveBuilder::new()
    }

    /// Axis name.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Current gearing.
    #[inline]
    pub fn gearing(&self) -> Gearing {
        self.gearing
    }

    /// Last position fed to the controller, if any.
    #[inline]
    pub fn target_position(&self) -> Option<EncoderCounts> {
        self.target.target()
    }

    /// Borrow the transport.
    #[inline]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Borrow the transport mutably.
    #[inline]
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    // =========================================================================
    // Round trip
    // =========================================================================

    /// Send one command and decode its reply.
    ///
    /// # Errors
    ///
    /// - [`Error::Transport`] if the datagram could not be sent or no reply
    ///   arrived in time
    /// - [`Error::Protocol`] if the reply was truncated or, for
    ///   [`ResponseKind::ExecutedAck`], carried the wrong ack byte
    pub fn send_command(&mut self, command: &Command, kind: ResponseKind) -> Result<DecodedValue> {
        let remote = self.transport.remote();
        debug!("{}: UDP target {} CMD: {}", self.name, remote, command);

        let frame = encode(command);
        self.transport.send(&frame)?;

        let mut buf = [0u8; RECEIVE_BUFFER_SIZE];
        let len = self.transport.receive(&mut buf)?;
        let raw = &buf[..len];

        let text: ReplyText = render(raw);
        debug!("{}: raw reply '{}'", self.name, text.trim());

        match decode(raw, kind) {
            Ok(value) => {
                debug!("{}: {} returned '{}'", self.name, command, value);
                Ok(value)
            }
            Err(source) => {
                error!(
                    "{}: {} command '{}' to {} failed: {}",
                    self.name, kind, command, remote, source
                );
                Err(Error::Protocol {
                    remote,
                    command: command.clone(),
                    kind,
                    source,
                })
            }
        }
    }

    fn execute(&mut self, mnemonic: &str) -> Result<()> {
        let command = Command::new(mnemonic)?;
        self.send_command(&command, ResponseKind::ExecutedAck)?;
        Ok(())
    }

    fn execute_with<A: fmt::Display>(&mut self, mnemonic: &str, arg: A) -> Result<()> {
        let command = Command::with_arg(mnemonic, arg)?;
        self.send_command(&command, ResponseKind::ExecutedAck)?;
        Ok(())
    }

    fn query(&mut self, mnemonic: &str, kind: ResponseKind) -> Result<DecodedValue> {
        let command = Command::new(mnemonic)?;
        self.send_command(&command, kind)
    }

    fn query_number(&mut self, command: Command) -> Result<f64> {
        let value = self.send_command(&command, ResponseKind::Value)?;
        self.expect_number(command, ResponseKind::Value, value)
    }

    /// Numeric payload of a reply.
    ///
    /// Signed decimals (`EP=-200`) fall outside the decoder's decimal
    /// pattern and arrive as text; they are accepted here.
    fn expect_number(&self, command: Command, kind: ResponseKind, value: DecodedValue) -> Result<f64> {
        if let Some(v) = value.as_f64() {
            return Ok(v);
        }
        let text = value.as_str().unwrap_or_default();
        text.parse::<f64>().map_err(|_| {
            warn!("{}: {} returned non-numeric '{}'", self.name, command, text);
            Error::Protocol {
                remote: self.transport.remote(),
                command,
                kind,
                source: ProtocolError::NotNumeric(bounded(text)),
            }
        })
    }

    fn set_rate(&mut self, mnemonic: &str, rate: RevsPerSecSquared) -> Result<()> {
        check_acceleration(rate.0)?;
        self.execute_with(mnemonic, rate.0)
    }

    fn set_speed(&mut self, mnemonic: &str, speed: RevsPerSec) -> Result<()> {
        if !(speed.0.is_finite() && speed.0 > 0.0) {
            return Err(ValidationError::OutOfRange {
                value: speed.0,
                min: 0.0,
                max: f64::MAX,
            }
            .into());
        }
        self.execute_with(mnemonic, round4(speed.0))
    }

    // =========================================================================
    // Identification and status
    // =========================================================================

    /// Model and firmware string (`MV`), verbatim.
    pub fn get_model_revision(&mut self) -> Result<ReplyText> {
        Ok(self.query("MV", ResponseKind::None)?.into_text())
    }

    /// Model number (`MN`), verbatim.
    pub fn get_model_number(&mut self) -> Result<ReplyText> {
        Ok(self.query("MN", ResponseKind::None)?.into_text())
    }

    /// Firmware revision level (`RV`).
    pub fn get_revision_level(&mut self) -> Result<DecodedValue> {
        self.query("RV", ResponseKind::Value)
    }

    /// Alarm code (`AL`), usually a hex word.
    pub fn get_alarm_code(&mut self) -> Result<DecodedValue> {
        self.query("AL", ResponseKind::Value)
    }

    /// Status letters (`RS`), e.g. `R` ready or `M` moving.
    pub fn get_request_status(&mut self) -> Result<DecodedValue> {
        self.query("RS", ResponseKind::Value)
    }

    /// Send `NO`, which does nothing but produce an ack.
    pub fn no_operation(&mut self) -> Result<()> {
        self.execute("NO")
    }

    /// Restart the controller firmware (`RE`).
    pub fn reset(&mut self) -> Result<()> {
        self.execute("RE")
    }

    // =========================================================================
    // Speeds and rates
    // =========================================================================

    /// Maximum velocity (`VM`).
    pub fn set_velocity_max(&mut self, speed: RevsPerSec) -> Result<()> {
        self.set_speed("VM", speed)
    }

    /// Jog speed (`JS`).
    pub fn set_jog_speed(&mut self, speed: RevsPerSec) -> Result<()> {
        self.set_speed("JS", speed)
    }

    /// Speed used after a change-speed input (`CS`).
    pub fn set_change_speed(&mut self, speed: RevsPerSec) -> Result<()> {
        self.set_speed("CS", speed)
    }

    /// Move velocity (`VE`).
    pub fn set_velocity(&mut self, speed: RevsPerSec) -> Result<()> {
        self.set_speed("VE", speed)
    }

    /// Acceleration rate (`AC`).
    ///
    /// # Errors
    ///
    /// [`ValidationError::OutOfRange`] outside `[0.167, 5461.167]` rev/s²,
    /// before anything is sent.
    pub fn set_acceleration_rate(&mut self, rate: RevsPerSecSquared) -> Result<()> {
        self.set_rate("AC", rate)
    }

    /// Current acceleration rate.
    pub fn get_acceleration_rate(&mut self) -> Result<f64> {
        self.query_number(Command::new("AC")?)
    }

    /// Deceleration rate (`DE`), same range as acceleration.
    pub fn set_deceleration_rate(&mut self, rate: RevsPerSecSquared) -> Result<()> {
        self.set_rate("DE", rate)
    }

    /// Current deceleration rate.
    pub fn get_deceleration_rate(&mut self) -> Result<f64> {
        self.query_number(Command::new("DE")?)
    }

    /// Jog acceleration rate (`JA`).
    pub fn set_jog_acceleration_rate(&mut self, rate: RevsPerSecSquared) -> Result<()> {
        self.set_rate("JA", rate)
    }

    /// Current jog acceleration rate.
    pub fn get_jog_acceleration_rate(&mut self) -> Result<f64> {
        self.query_number(Command::new("JA")?)
    }

    /// Jog deceleration rate (`JL`).
    pub fn set_jog_deceleration_rate(&mut self, rate: RevsPerSecSquared) -> Result<()> {
        self.set_rate("JL", rate)
    }

    /// Current jog deceleration rate.
    pub fn get_jog_deceleration_rate(&mut self) -> Result<f64> {
        self.query_number(Command::new("JL")?)
    }

    // =========================================================================
    // Motion
    // =========================================================================

    /// Start jogging (`CJ`).
    pub fn commence_jogging(&mut self) -> Result<()> {
        self.execute("CJ")
    }

    /// Stop jogging (`SJ`).
    pub fn stop_jogging(&mut self) -> Result<()> {
        self.execute("SJ")
    }

    /// Stop and discard buffered commands (`SK` / `SKD`).
    ///
    /// The controller keeps emitting replies for the discarded commands; see
    /// [`stop_and_purge`](Self::stop_and_purge).
    pub fn stop_and_kill(&mut self, mode: StopMode) -> Result<()> {
        self.execute(mode.mnemonic())
    }

    /// Stop the current move (`ST`).
    pub fn stop(&mut self) -> Result<()> {
        self.execute("ST")
    }

    /// Set the distance or position for the next feed (`DI`).
    pub fn move_distance(&mut self, distance: EncoderCounts) -> Result<()> {
        self.execute_with("DI", distance)
    }

    /// Relative move (`FL`).
    pub fn feed_to_length(&mut self, distance: EncoderCounts) -> Result<()> {
        self.execute_with("FL", distance)
    }

    /// Absolute move (`FP`).
    ///
    /// The target is recorded before the command goes out, so it stays set
    /// even if the controller rejects the move.
    pub fn feed_to_position(&mut self, position: EncoderCounts) -> Result<()> {
        info!("{}: feeding to position {}", self.name, position);
        self.target.set(position);
        self.execute_with("FP", position)
    }

    /// True when the encoder is strictly within ±40 counts of the target.
    ///
    /// Without a target this is `false` and nothing is sent.
    pub fn is_at_target_position(&mut self) -> Result<bool> {
        let Some(target) = self.target.target() else {
            debug!("{}: no target position set", self.name);
            return Ok(false);
        };

        let position = self.get_immediate_encoder_position()?;
        debug!(
            "{}: checking target {} against position {}",
            self.name, target, position
        );
        Ok(self.target.is_within(position))
    }

    /// Poll [`is_at_target_position`](Self::is_at_target_position) until it
    /// holds or `max_polls` checks have failed.
    pub fn wait_for_arrival<D: DelayNs>(
        &mut self,
        delay: &mut D,
        poll_interval_ms: u32,
        max_polls: u32,
    ) -> Result<bool> {
        if self.target.target().is_none() {
            return Ok(false);
        }

        for poll in 0..max_polls {
            if self.is_at_target_position()? {
                debug!("{}: arrived after {} polls", self.name, poll + 1);
                return Ok(true);
            }
            delay.delay_ms(poll_interval_ms);
        }

        warn!("{}: target not reached after {} polls", self.name, max_polls);
        Ok(false)
    }

    /// Soft position limit (`PL`).
    pub fn set_position_limit(&mut self, limit: EncoderCounts) -> Result<()> {
        self.execute_with("PL", limit)
    }

    /// Current soft position limit.
    pub fn get_position_limit(&mut self) -> Result<f64> {
        self.query_number(Command::new("PL")?)
    }

    /// Energize the motor (`ME`).
    pub fn enable_motor(&mut self) -> Result<()> {
        self.execute("ME")
    }

    /// De-energize the motor (`MD`).
    pub fn disable_motor(&mut self) -> Result<()> {
        self.execute("MD")
    }

    /// Seek home on the given input condition (`SH`), e.g. `"3L"`.
    pub fn seek_home<A: fmt::Display>(&mut self, condition: A) -> Result<()> {
        self.execute_with("SH", condition)
    }

    /// Select the input mode (`SI`).
    pub fn enable_input<A: fmt::Display>(&mut self, mode: A) -> Result<()> {
        self.execute_with("SI", mode)
    }

    // =========================================================================
    // Encoder
    // =========================================================================

    /// Select the encoder function (`EF`).
    pub fn set_encoder_function(&mut self, function: EncoderFunction) -> Result<()> {
        self.execute_with("EF", function.code())
    }

    /// Current encoder function.
    pub fn get_encoder_function(&mut self) -> Result<EncoderFunction> {
        let code = self.query_number(Command::new("EF")?)?;
        let byte = code as u8;
        if f64::from(byte) != code {
            return Err(ConfigError::InvalidEncoderFunction(byte).into());
        }
        Ok(EncoderFunction::from_code(byte)?)
    }

    /// Redefine the current motor position (`SP`).
    pub fn set_position(&mut self, position: EncoderCounts) -> Result<()> {
        self.execute_with("SP", position)
    }

    /// Redefine the current encoder position (`EP`).
    pub fn set_encoder_position(&mut self, position: EncoderCounts) -> Result<()> {
        self.execute_with("EP", position)
    }

    /// Encoder position (`EP`).
    pub fn get_encoder_position(&mut self) -> Result<f64> {
        self.query_number(Command::new("EP")?)
    }

    /// Live encoder position (`IE`), reported as 32-bit two's complement hex.
    pub fn get_immediate_encoder_position(&mut self) -> Result<EncoderCounts> {
        let command = Command::new("IE")?;
        let value = self.send_command(&command, ResponseKind::SignedHexValue)?;
        match value.as_i32() {
            Some(counts) => Ok(EncoderCounts::from(counts)),
            None => {
                let text = value.as_str().unwrap_or_default();
                Err(Error::Protocol {
                    remote: self.transport.remote(),
                    command,
                    kind: ResponseKind::SignedHexValue,
                    source: ProtocolError::NotNumeric(bounded(text)),
                })
            }
        }
    }

    /// Encoder resolution in counts per revolution (`ER`).
    pub fn set_encoder_resolution(&mut self, counts_per_rev: u32) -> Result<()> {
        self.execute_with("ER", counts_per_rev)
    }

    /// Current encoder resolution.
    pub fn get_encoder_resolution(&mut self) -> Result<f64> {
        self.query_number(Command::new("ER")?)
    }

    // =========================================================================
    // Gearing and angles
    // =========================================================================

    /// Pulses per revolution (`EG`).
    ///
    /// The local gearing is updated before the command goes out, like the
    /// target in [`feed_to_position`](Self::feed_to_position), so it holds
    /// the requested value even if the controller rejects it.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InvalidGearing`] for zero, before anything is sent.
    pub fn set_electronic_gearing(&mut self, pulses_per_revolution: u32) -> Result<()> {
        if pulses_per_revolution == 0 {
            return Err(ValidationError::InvalidGearing.into());
        }
        self.gearing.set_electronic(pulses_per_revolution);
        self.execute_with("EG", pulses_per_revolution)
    }

    /// Pulses per revolution last set on the controller.
    #[inline]
    pub fn electronic_gearing(&self) -> u32 {
        self.gearing.electronic()
    }

    /// External gear ratio.
    #[inline]
    pub fn mechanical_gearing(&self) -> f64 {
        self.gearing.mechanical()
    }

    /// Change the external gear ratio. Local only.
    pub fn set_mechanical_gearing(&mut self, ratio: f64) -> Result<()> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(ValidationError::InvalidGearing.into());
        }
        self.gearing.set_mechanical(ratio);
        Ok(())
    }

    /// Angle of the driven element from the live encoder position.
    pub fn angle(&mut self) -> Result<Degrees> {
        let counts = self.get_immediate_encoder_position()?;
        Ok(self.gearing.encoder_to_angle(counts)?)
    }

    /// Feed the driven element to `angle`, returning the encoder target.
    pub fn set_angle(&mut self, angle: Degrees) -> Result<EncoderCounts> {
        let counts = self.gearing.angle_to_encoder(angle)?;
        debug!("{}: angle {} maps to {} counts", self.name, angle.0, counts);
        self.feed_to_position(counts)?;
        Ok(counts)
    }

    // =========================================================================
    // Telemetry
    // =========================================================================

    /// Motor current (`IC`).
    pub fn get_immediate_current(&mut self) -> Result<f64> {
        self.query_number(Command::new("IC")?)
    }

    /// Drive temperature (`IT`).
    pub fn get_immediate_temperature(&mut self) -> Result<f64> {
        self.query_number(Command::new("IT")?)
    }

    /// Bus voltage (`IU`).
    pub fn get_immediate_voltage(&mut self) -> Result<f64> {
        self.query_number(Command::new("IU")?)
    }

    /// Actual velocity (`IV0`).
    pub fn get_immediate_velocity_actual(&mut self) -> Result<f64> {
        self.query_number(Command::with_arg("IV", 0)?)
    }

    /// Target velocity (`IV1`).
    pub fn get_immediate_velocity_target(&mut self) -> Result<f64> {
        self.query_number(Command::with_arg("IV", 1)?)
    }

    /// Rated motor current (`MC`).
    pub fn get_motor_current_rated(&mut self) -> Result<f64> {
        self.query_number(Command::new("MC")?)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Read model revision and revision level.
    pub fn identify(&mut self) -> Result<Identity> {
        let model_revision = self.get_model_revision()?;
        info!("{}: model revision: {}", self.name, model_revision);

        let revision_level = self.get_revision_level()?;
        info!("{}: revision level: {}", self.name, revision_level);

        Ok(Identity {
            model_revision,
            revision_level,
        })
    }

    /// Bring the controller into a known motion state.
    ///
    /// Sends `SJ EG EF SI3 VE AC DE JL JA JS` in that order. The acceleration
    /// is checked before the first command goes out.
    pub fn setup(&mut self, profile: &SetupProfile) -> Result<()> {
        check_acceleration(profile.acceleration.0)?;
        info!("{}: setting up motor", self.name);

        self.stop_jogging()?;
        self.set_electronic_gearing(self.gearing.electronic())?;
        self.set_encoder_function(profile.encoder_function)?;
        self.enable_input(SETUP_INPUT)?;
        self.set_velocity(profile.velocity)?;
        self.set_acceleration_rate(profile.acceleration)?;
        self.set_deceleration_rate(profile.acceleration)?;
        self.set_jog_deceleration_rate(profile.acceleration)?;
        self.set_jog_acceleration_rate(profile.acceleration)?;
        self.set_jog_speed(profile.jog_speed)?;

        info!("{}: setup complete", self.name);
        Ok(())
    }

    /// Drain stray replies with the configured purge settings.
    ///
    /// Returns `true` if a `%` completion marker was among them.
    pub fn purge_stray(&mut self) -> Result<bool> {
        Ok(self
            .transport
            .purge_stray(self.purge_attempts, self.purge_timeout)?)
    }

    /// Stop-and-kill, then drain what the controller emits afterwards.
    pub fn stop_and_purge(&mut self, mode: StopMode) -> Result<bool> {
        self.stop_and_kill(mode)?;
        self.purge_stray()
    }

    /// Stop jogging and release the socket.
    ///
    /// The socket is closed even when `SJ` fails; that failure is still
    /// returned.
    pub fn teardown(&mut self) -> Result<()> {
        let stopped = self.stop_jogging();
        if let Err(ref e) = stopped {
            warn!("{}: stop jogging failed during teardown: {}", self.name, e);
        }
        self.close();
        stopped
    }

    /// Release the socket.
    pub fn close(&mut self) {
        info!("{}: closing connection to {}", self.name, self.transport.remote());
        self.transport.close();
    }
}

/// Speeds go out with at most four decimals.
fn round4(value: f64) -> f64 {
    libm::round(value * 10_000.0) / 10_000.0
}
