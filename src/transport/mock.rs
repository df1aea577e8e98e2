//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::vec::Vec;

use core::net::SocketAddr;
use core::time::Duration;

use crate::error::TransportError;

use super::{Transport, DEFAULT_READ_TIMEOUT, PROTOCOL_PORT};

/// Replays queued replies and records every datagram sent.
///
/// An empty reply queue behaves like a silent controller: `receive` times out.
pub(crate) struct MockTransport {
    replies: VecDeque<Result<Vec<u8>, TransportError>>,
    sent: Vec<Vec<u8>>,
    timeout: Duration,
    timeouts_set: Vec<Duration>,
    fail_sends: bool,
    closed: bool,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self {
            replies: VecDeque::new(),
            sent: Vec::new(),
            timeout: DEFAULT_READ_TIMEOUT,
            timeouts_set: Vec::new(),
            fail_sends: false,
            closed: false,
        }
    }

    pub(crate) fn push_reply(&mut self, raw: &[u8]) {
        self.replies.push_back(Ok(raw.to_vec()));
    }

    pub(crate) fn push_error(&mut self, error: TransportError) {
        self.replies.push_back(Err(error));
    }

    pub(crate) fn fail_sends(&mut self, fail: bool) {
        self.fail_sends = fail;
    }

    pub(crate) fn pending_replies(&self) -> usize {
        self.replies.len()
    }

    /// Sent datagrams with the header and terminator stripped.
    pub(crate) fn sent_commands(&self) -> Vec<&str> {
        self.sent
            .iter()
            .map(|d| core::str::from_utf8(&d[2..d.len() - 1]).unwrap_or("<invalid>"))
            .collect()
    }

    pub(crate) fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    pub(crate) fn timeouts_set(&self) -> &[Duration] {
        &self.timeouts_set
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Transport for MockTransport {
    fn send(&mut self, datagram: &[u8]) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        if self.fail_sends {
            return Err(TransportError::SendFailed);
        }
        self.sent.push(datagram.to_vec());
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        match self.replies.pop_front() {
            Some(Ok(raw)) => {
                let len = raw.len().min(buf.len());
                buf[..len].copy_from_slice(&raw[..len]);
                Ok(len)
            }
            Some(Err(e)) => Err(e),
            None => Err(TransportError::Timeout),
        }
    }

    fn read_timeout(&self) -> Duration {
        self.timeout
    }

    fn set_read_timeout(&mut self, timeout: Duration) -> Result<(), TransportError> {
        self.timeout = timeout;
        self.timeouts_set.push(timeout);
        Ok(())
    }

    fn remote(&self) -> SocketAddr {
        SocketAddr::from(([10, 1, 1, 10], PROTOCOL_PORT))
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
