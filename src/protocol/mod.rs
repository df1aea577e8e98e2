//! SCL command framing and reply decoding.
//!
//! Every request is a UDP datagram of the form `00 07 <ascii command> 0D`.
//! Replies echo the two header bytes, carry an ack marker (`%` executed,
//! `*` buffered) and an ASCII payload such as `RV=105` or `IE=FFFFFFF0`.

mod codec;
mod command;

pub use codec::{
    decode, encode, DecodedValue, Frame, ReplyText, ACK_BUFFERED, ACK_EXECUTED, FRAME_CAPACITY,
    HEADER, MIN_REPLY_LEN, TERMINATOR, TEXT_CAPACITY,
};
pub use command::{Command, ResponseKind, COMMAND_CAPACITY};

pub(crate) use codec::render;
