//! Error types for stepper-scl.
//!
//! Provides unified error handling across configuration, transport, protocol
//! decoding, and local argument validation.

use core::fmt;
use core::net::SocketAddr;

use crate::protocol::{Command, ResponseKind};

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stepper-scl operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Datagram transport error
    Transport(TransportError),
    /// Malformed or unexpected reply to a command
    Protocol {
        /// Controller the command was sent to
        remote: SocketAddr,
        /// Command that was sent
        command: Command,
        /// Reply kind the caller expected
        kind: ResponseKind,
        /// Underlying decoding failure
        source: ProtocolError,
    },
    /// Argument rejected before any I/O
    Validation(ValidationError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Controller address is not a valid IP address
    InvalidAddress(heapless::String<64>),
    /// Timeout must be greater than zero
    InvalidTimeout(u64),
    /// Gearing must be greater than zero
    InvalidGearing(f64),
    /// Setup rate outside the controller's accepted range
    InvalidRate(f64),
    /// Unknown encoder function code
    InvalidEncoderFunction(u8),
    /// Required builder field missing
    Missing(&'static str),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Datagram transport errors.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The socket did not accept the datagram
    SendFailed,
    /// No reply arrived within the read timeout
    Timeout,
    /// Receiving failed for a reason other than a timeout
    ReceiveFailed,
    /// The connection has been closed
    Closed,
    /// Socket setup failed (bind, timeout configuration)
    Socket(heapless::String<64>),
}

/// Reply framing and payload errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// Reply shorter than the minimum frame
    Truncated {
        /// Received length in bytes
        len: usize,
    },
    /// Ack byte was neither `%` nor `*` for an executed command
    UnexpectedAck {
        /// The byte found in the ack position
        received: u8,
        /// Raw reply rendered as text
        reply: heapless::String<64>,
    },
    /// A numeric reply was required but the controller sent text
    NotNumeric(heapless::String<64>),
}

/// Local argument validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Value outside the controller's documented range
    OutOfRange {
        /// Rejected value
        value: f64,
        /// Inclusive minimum
        min: f64,
        /// Inclusive maximum
        max: f64,
    },
    /// Angle conversion attempted with a zero or negative gearing
    InvalidGearing,
    /// Command text cannot be framed (non-ASCII, carriage return, too long)
    InvalidCommand(heapless::String<32>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Transport(e) => write!(f, "Transport error: {}", e),
            Error::Protocol {
                remote,
                command,
                kind,
                source,
            } => write!(
                f,
                "Unexpected response from {}, {} command '{}': {}",
                remote, kind, command, source
            ),
            Error::Validation(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidAddress(addr) => write!(f, "Invalid controller address: '{}'", addr),
            ConfigError::InvalidTimeout(ms) => write!(f, "Invalid timeout: {} ms. Must be > 0", ms),
            ConfigError::InvalidGearing(v) => write!(f, "Invalid gearing: {}. Must be > 0", v),
            ConfigError::InvalidRate(v) => write!(f, "Invalid setup rate: {}", v),
            ConfigError::InvalidEncoderFunction(code) => {
                write!(f, "Invalid encoder function: {}. Valid values: 0, 1, 2, 6", code)
            }
            ConfigError::Missing(field) => write!(f, "{} is required", field),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::SendFailed => write!(f, "Unable to send datagram to controller"),
            TransportError::Timeout => write!(f, "Timed out waiting for controller reply"),
            TransportError::ReceiveFailed => write!(f, "Failed to receive datagram"),
            TransportError::Closed => write!(f, "Connection is closed"),
            TransportError::Socket(msg) => write!(f, "Socket error: {}", msg),
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Truncated { len } => {
                write!(f, "Reply of {} bytes is shorter than a frame", len)
            }
            ProtocolError::UnexpectedAck { received, reply } => write!(
                f,
                "Expected ack '%' or '*', got {:?} in reply '{}'",
                char::from(*received),
                reply
            ),
            ProtocolError::NotNumeric(text) => write!(f, "Expected a numeric reply, got '{}'", text),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::OutOfRange { value, min, max } => {
                write!(f, "Value {} outside range [{}, {}]", value, min, max)
            }
            ValidationError::InvalidGearing => {
                write!(f, "Gearing must be non-zero for angle conversion")
            }
            ValidationError::InvalidCommand(text) => write!(f, "Command cannot be framed: '{}'", text),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Error::Transport(e)
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Validation(e)
    }
}

impl Error {
    /// Returns the protocol failure if this error wraps one.
    pub fn protocol(&self) -> Option<&ProtocolError> {
        match self {
            Error::Protocol { source, .. } => Some(source),
            _ => None,
        }
    }

    /// True if the controller did not reply in time.
    ///
    /// A timeout that persists across commands can also mean the controller
    /// switched to its serial/TCP mode and needs a reset.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Transport(TransportError::Timeout))
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(e) => Some(e),
            Error::Transport(e) => Some(e),
            Error::Protocol { source, .. } => Some(source),
            Error::Validation(e) => Some(e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for TransportError {}

#[cfg(feature = "std")]
impl std::error::Error for ProtocolError {}

#[cfg(feature = "std")]
impl std::error::Error for ValidationError {}

/// Copy `text` into a bounded string, truncating at a char boundary.
pub(crate) fn bounded<const N: usize>(text: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
