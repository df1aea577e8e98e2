//! Frame encoding and reply decoding.

use core::fmt;

use log::trace;

use crate::error::{bounded, ProtocolError};

use super::command::{Command, ResponseKind, COMMAND_CAPACITY};

/// Header bytes that open every request frame.
pub const HEADER: [u8; 2] = [0x00, 0x07];

/// Trailing byte of every request frame.
pub const TERMINATOR: u8 = b'\r';

/// Ack marker for an executed command.
pub const ACK_EXECUTED: u8 = b'%';

/// Ack marker for a buffered command.
pub const ACK_BUFFERED: u8 = b'*';

/// Shortest reply that carries an ack byte.
pub const MIN_REPLY_LEN: usize = 3;

/// Capacity of an encoded request frame.
pub const FRAME_CAPACITY: usize = HEADER.len() + COMMAND_CAPACITY + 1;

/// Capacity of decoded reply text.
pub const TEXT_CAPACITY: usize = 128;

/// An encoded request datagram.
pub type Frame = heapless::Vec<u8, FRAME_CAPACITY>;

/// Reply text kept after decoding.
pub type ReplyText = heapless::String<TEXT_CAPACITY>;

/// A decoded reply payload.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    /// Purely decimal `Value` reply.
    Number(f64),
    /// `SignedHexValue` reply after two's-complement reinterpretation.
    Signed(i32),
    /// Anything else: identification strings, status letters, fallbacks.
    Text(ReplyText),
}

impl DecodedValue {
    /// Numeric value, if the reply was numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DecodedValue::Number(v) => Some(*v),
            DecodedValue::Signed(v) => Some(f64::from(*v)),
            DecodedValue::Text(_) => None,
        }
    }

    /// Signed hex value, if the reply was one.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            DecodedValue::Signed(v) => Some(*v),
            _ => None,
        }
    }

    /// Text value, if the reply fell back to text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DecodedValue::Text(t) => Some(t.as_str()),
            _ => None,
        }
    }

    /// The value rendered as reply text.
    pub fn into_text(self) -> ReplyText {
        match self {
            DecodedValue::Text(t) => t,
            other => {
                let mut text = ReplyText::new();
                let _ = fmt::write(&mut text, format_args!("{}", other));
                text
            }
        }
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Number(v) => write!(f, "{}", v),
            DecodedValue::Signed(v) => write!(f, "{}", v),
            DecodedValue::Text(t) => f.write_str(t),
        }
    }
}

/// Encode a command into a request frame.
///
/// The frame is `00 07 <command> 0D`, i.e. `command.len() + 3` bytes.
pub fn encode(command: &Command) -> Frame {
    let mut frame = Frame::new();
    // Command length is bounded by COMMAND_CAPACITY, so these cannot overflow.
    let _ = frame.extend_from_slice(&HEADER);
    let _ = frame.extend_from_slice(command.as_str().as_bytes());
    let _ = frame.push(TERMINATOR);
    frame
}

/// Decode a reply frame according to the expected response kind.
///
/// The ack byte is only checked for [`ResponseKind::ExecutedAck`]; the other
/// kinds accept whatever sits in that position.
///
/// # Errors
///
/// - [`ProtocolError::Truncated`] if the reply is shorter than three bytes
/// - [`ProtocolError::UnexpectedAck`] for an executed command without a `%`
///   or `*` ack
pub fn decode(raw: &[u8], kind: ResponseKind) -> Result<DecodedValue, ProtocolError> {
    if raw.len() < MIN_REPLY_LEN {
        return Err(ProtocolError::Truncated { len: raw.len() });
    }

    let ack = raw[2];
    if kind == ResponseKind::ExecutedAck && ack != ACK_EXECUTED && ack != ACK_BUFFERED {
        let text: heapless::String<64> = render(raw);
        return Err(ProtocolError::UnexpectedAck {
            received: ack,
            reply: bounded(text.trim()),
        });
    }

    let text: ReplyText = render(raw);
    let text = text.trim();

    Ok(match kind {
        ResponseKind::Value => parse_value(text),
        ResponseKind::SignedHexValue => parse_signed_hex(text),
        ResponseKind::None | ResponseKind::ExecutedAck => DecodedValue::Text(bounded(text)),
    })
}

/// Render a reply as ASCII text.
///
/// An echoed `00 07` header becomes two spaces and any other byte that is
/// neither printable nor whitespace is inert.
pub(crate) fn render<const N: usize>(raw: &[u8]) -> heapless::String<N> {
    let echoed_header = raw.len() >= 2 && raw[..2] == HEADER;

    let mut text = heapless::String::new();
    for (i, &b) in raw.iter().enumerate() {
        let c = if echoed_header && i < HEADER.len() {
            ' '
        } else if b.is_ascii_graphic() || b.is_ascii_whitespace() {
            char::from(b)
        } else {
            ' '
        };
        if text.push(c).is_err() {
            break;
        }
    }
    text
}

fn parse_value(text: &str) -> DecodedValue {
    let value = text.split_once('=').map_or(text, |(_, v)| v).trim();

    if is_decimal(value) {
        if let Ok(v) = value.parse::<f64>() {
            return DecodedValue::Number(v);
        }
    }
    DecodedValue::Text(bounded(value))
}

fn is_decimal(text: &str) -> bool {
    text.bytes().any(|b| b.is_ascii_digit())
        && text.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && text.bytes().filter(|&b| b == b'.').count() <= 1
}

fn parse_signed_hex(text: &str) -> DecodedValue {
    let digits = match text.rsplit_once('=') {
        Some((_, d))
            if !d.is_empty()
                && d.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_uppercase() || b == b'.') =>
        {
            d
        }
        _ => return DecodedValue::Text(bounded(text)),
    };

    match u32::from_str_radix(digits, 16) {
        Ok(raw) => {
            let value = raw as i32;
            trace!("hex '{}' parsed as {}", digits, value);
            DecodedValue::Signed(value)
        }
        Err(_) => DecodedValue::Text(bounded(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(payload: &[u8]) -> heapless::Vec<u8, 64> {
        let mut raw = heapless::Vec::new();
        raw.extend_from_slice(&HEADER).unwrap();
        raw.extend_from_slice(payload).unwrap();
        raw.push(b'\r').unwrap();
        raw
    }

    #[test]
    fn test_encode_frame_layout() {
        let frame = encode(&Command::with_arg("EG", 4000).unwrap());
        assert_eq!(frame.as_slice(), b"\x00\x07EG4000\r");
        assert_eq!(frame.len(), 2 + 6 + 1);
    }

    #[test]
    fn test_decode_revision_value() {
        let raw = [0x00, 0x07, 0x25, 0x52, 0x56, 0x3D, 0x31, 0x32, 0x2E, 0x33, 0x0D];
        assert_eq!(
            decode(&raw, ResponseKind::Value),
            Ok(DecodedValue::Number(12.3))
        );
    }

    #[test]
    fn test_decode_negative_hex_position() {
        let raw = reply(b"IE=FFFFFFF0");
        assert_eq!(
            decode(&raw, ResponseKind::SignedHexValue),
            Ok(DecodedValue::Signed(-16))
        );
    }

    #[test]
    fn test_decode_hex_boundaries() {
        let max = reply(b"IE=7FFFFFFF");
        assert_eq!(
            decode(&max, ResponseKind::SignedHexValue).unwrap().as_i32(),
            Some(i32::MAX)
        );

        let min = reply(b"IE=80000000");
        assert_eq!(
            decode(&min, ResponseKind::SignedHexValue).unwrap().as_i32(),
            Some(i32::MIN)
        );
    }

    #[test]
    fn test_decode_hex_without_key_falls_back_to_text() {
        let raw = reply(b"?1");
        assert_eq!(
            decode(&raw, ResponseKind::SignedHexValue).unwrap().as_str(),
            Some("?1")
        );
    }

    #[test]
    fn test_decode_hex_with_dot_falls_back_to_text() {
        let raw = reply(b"IE=1.5");
        assert!(decode(&raw, ResponseKind::SignedHexValue).unwrap().as_str().is_some());
    }

    #[test]
    fn test_unexpected_ack_for_executed_command() {
        let raw = reply(b"!ME");
        match decode(&raw, ResponseKind::ExecutedAck) {
            Err(ProtocolError::UnexpectedAck { received, reply }) => {
                assert_eq!(received, b'!');
                assert_eq!(reply.as_str(), "!ME");
            }
            other => panic!("expected UnexpectedAck, got {:?}", other),
        }
    }

    #[test]
    fn test_buffered_ack_accepted() {
        let raw = reply(b"*");
        assert!(decode(&raw, ResponseKind::ExecutedAck).is_ok());
    }

    #[test]
    fn test_ack_not_checked_for_queries() {
        let raw = reply(b"!RV=3");
        assert_eq!(
            decode(&raw, ResponseKind::Value),
            Ok(DecodedValue::Number(3.0))
        );
        assert!(decode(&raw, ResponseKind::None).is_ok());
    }

    #[test]
    fn test_truncated_reply() {
        assert_eq!(
            decode(&[0x00, 0x07], ResponseKind::None),
            Err(ProtocolError::Truncated { len: 2 })
        );
    }

    #[test]
    fn test_identification_text_verbatim() {
        let raw = reply(b"MV=105W049K");
        assert_eq!(
            decode(&raw, ResponseKind::None).unwrap().as_str(),
            Some("MV=105W049K")
        );
    }

    #[test]
    fn test_value_status_text_fallback() {
        let raw = reply(b"RS=PR");
        assert_eq!(
            decode(&raw, ResponseKind::Value).unwrap().as_str(),
            Some("PR")
        );
    }

    #[test]
    fn test_value_with_two_dots_is_text() {
        let raw = reply(b"RV=1.2.3");
        assert_eq!(
            decode(&raw, ResponseKind::Value).unwrap().as_str(),
            Some("1.2.3")
        );
    }

    #[test]
    fn test_header_not_echoed_keeps_bytes() {
        let raw = *b"  %AC=25\r";
        assert_eq!(
            decode(&raw, ResponseKind::Value),
            Ok(DecodedValue::Number(25.0))
        );
    }

    #[test]
    fn test_control_bytes_are_inert() {
        let raw = reply(b"%IT=\x01321");
        // Control byte becomes a space which is then trimmed away.
        assert_eq!(
            decode(&raw, ResponseKind::Value),
            Ok(DecodedValue::Number(321.0))
        );
    }
}
