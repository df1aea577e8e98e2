//! Command values and expected reply kinds.

use core::fmt::{self, Write};

use crate::error::{bounded, ValidationError};

/// Maximum length of a command (mnemonic plus argument) in bytes.
pub const COMMAND_CAPACITY: usize = 32;

/// Length of an SCL mnemonic.
const MNEMONIC_LEN: usize = 2;

/// What the caller expects back from a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Identification text; the ack byte is not checked.
    None,
    /// An ack marker (`%` or `*`) is required in the ack position.
    ExecutedAck,
    /// A `KEY=number` reply, parsed as a float when purely decimal.
    Value,
    /// A `KEY=HEX` reply, parsed as a 32-bit two's-complement integer.
    SignedHexValue,
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResponseKind::None => "none",
            ResponseKind::ExecutedAck => "executed",
            ResponseKind::Value => "value",
            ResponseKind::SignedHexValue => "value_hex_signed",
        };
        f.write_str(name)
    }
}

/// An SCL command: two-letter mnemonic plus optional argument.
///
/// The text is ASCII, contains no carriage return and fits in
/// [`COMMAND_CAPACITY`] bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    text: heapless::String<COMMAND_CAPACITY>,
}

impl Command {
    /// Create a command without an argument.
    pub fn new(mnemonic: &str) -> Result<Self, ValidationError> {
        Self::from_text(mnemonic)
    }

    /// Create a command with an argument appended to the mnemonic.
    ///
    /// The argument is written with its `Display` impl, e.g. `FP` + `-1200`
    /// becomes `FP-1200`.
    pub fn with_arg<A: fmt::Display>(mnemonic: &str, arg: A) -> Result<Self, ValidationError> {
        let mut text: heapless::String<COMMAND_CAPACITY> = heapless::String::new();
        if write!(text, "{}{}", mnemonic, arg).is_err() {
            return Err(ValidationError::InvalidCommand(bounded(mnemonic)));
        }
        Self::from_text(text.as_str())
    }

    fn from_text(text: &str) -> Result<Self, ValidationError> {
        let framable = text.len() >= MNEMONIC_LEN
            && text.is_ascii()
            && !text.bytes().any(|b| b == b'\r');

        if !framable {
            return Err(ValidationError::InvalidCommand(bounded(text)));
        }

        let text = heapless::String::try_from(text)
            .map_err(|_| ValidationError::InvalidCommand(bounded(text)))?;
        Ok(Self { text })
    }

    /// Full command text.
    #[inline]
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    /// The two-letter mnemonic.
    #[inline]
    pub fn mnemonic(&self) -> &str {
        &self.text[..MNEMONIC_LEN]
    }

    /// The argument, if any.
    pub fn argument(&self) -> Option<&str> {
        let arg = &self.text[MNEMONIC_LEN..];
        (!arg.is_empty()).then_some(arg)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
