//! Datagram transport to a single controller.
//!
//! The protocol is strictly request-then-single-reply: one command in flight,
//! one datagram back, no pipelining. [`Transport`] abstracts the socket so the
//! codec and the drive can be exercised without a network.

use core::net::SocketAddr;
use core::time::Duration;

use log::{debug, info};

use crate::error::TransportError;
use crate::protocol::{render, ReplyText, ACK_EXECUTED};

#[cfg(feature = "std")]
mod udp;

#[cfg(all(test, feature = "std"))]
pub(crate) mod mock;

#[cfg(feature = "std")]
pub use udp::UdpConnection;

/// UDP port the controller listens on.
pub const PROTOCOL_PORT: u16 = 7775;

/// Largest datagram accepted from the controller.
pub const RECEIVE_BUFFER_SIZE: usize = 1024;

/// Default read timeout for a command round trip.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of receive attempts when purging after a stop.
pub const DEFAULT_PURGE_ATTEMPTS: u8 = 15;

/// Default per-attempt timeout when purging after a stop.
pub const DEFAULT_PURGE_TIMEOUT: Duration = Duration::from_secs(3);

/// A bound datagram channel to one controller.
pub trait Transport {
    /// Send one datagram to the controller.
    ///
    /// Fails with [`TransportError::SendFailed`] if the socket accepted
    /// nothing or reported an error.
    fn send(&mut self, datagram: &[u8]) -> Result<(), TransportError>;

    /// Receive exactly one datagram into `buf`, returning its length.
    ///
    /// Blocks at most [`read_timeout`](Self::read_timeout); fails with
    /// [`TransportError::Timeout`] if nothing arrives.
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Current read timeout.
    fn read_timeout(&self) -> Duration;

    /// Change the read timeout used by [`receive`](Self::receive).
    fn set_read_timeout(&mut self, timeout: Duration) -> Result<(), TransportError>;

    /// Address of the controller.
    fn remote(&self) -> SocketAddr;

    /// Release the socket. Calling it again is a no-op.
    fn close(&mut self);

    /// Drain the packets a controller emits after a stop-and-kill.
    ///
    /// Receives up to `max_attempts` datagrams with `per_attempt` as the read
    /// timeout, discarding each. Returns `true` as soon as a discarded
    /// datagram contains `%`, `false` on the first timeout or once the
    /// attempts are exhausted. The previous read timeout is restored in
    /// every case.
    fn purge_stray(
        &mut self,
        max_attempts: u8,
        per_attempt: Duration,
    ) -> Result<bool, TransportError> {
        let normal = self.read_timeout();
        self.set_read_timeout(per_attempt)?;

        let outcome = drain(self, max_attempts);
        let restored = self.set_read_timeout(normal);

        let got_percent = outcome?;
        restored?;

        info!("{}: purge finished, completion marker seen = {}", self.remote(), got_percent);
        Ok(got_percent)
    }
}

fn drain<T: Transport + ?Sized>(transport: &mut T, max_attempts: u8) -> Result<bool, TransportError> {
    let mut buf = [0u8; RECEIVE_BUFFER_SIZE];

    for _ in 0..max_attempts {
        match transport.receive(&mut buf) {
            Ok(len) => {
                let packet = &buf[..len];
                let text: ReplyText = render(packet);
                debug!("{}: purged packet '{}'", transport.remote(), text.trim());

                if packet.contains(&ACK_EXECUTED) {
                    return Ok(true);
                }
            }
            Err(TransportError::Timeout) => {
                debug!("{}: timeout while purging, receive queue is empty", transport.remote());
                return Ok(false);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(false)
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::mock::MockTransport;
    use super::*;

    #[test]
    fn test_purge_stops_at_percent() {
        let mut transport = MockTransport::new();
        transport.push_reply(b"\x00\x07SK");
        transport.push_reply(b"\x00\x07%");
        transport.push_reply(b"\x00\x07never read");

        assert_eq!(transport.purge_stray(15, Duration::from_millis(50)), Ok(true));
        assert_eq!(transport.pending_replies(), 1);
        assert_eq!(transport.read_timeout(), DEFAULT_READ_TIMEOUT);
    }

    #[test]
    fn test_purge_exhausts_attempts() {
        let mut transport = MockTransport::new();
        for _ in 0..20 {
            transport.push_reply(b"\x00\x07*");
        }

        assert_eq!(transport.purge_stray(15, Duration::from_millis(50)), Ok(false));
        assert_eq!(transport.pending_replies(), 5);
        assert_eq!(transport.read_timeout(), DEFAULT_READ_TIMEOUT);
    }

    #[test]
    fn test_purge_timeout_terminates_quietly() {
        let mut transport = MockTransport::new();
        transport.push_reply(b"\x00\x07stray");

        assert_eq!(transport.purge_stray(15, Duration::from_millis(50)), Ok(false));
        assert_eq!(
            transport.timeouts_set(),
            &[Duration::from_millis(50), DEFAULT_READ_TIMEOUT]
        );
    }

    #[test]
    fn test_purge_propagates_receive_failure_after_restore() {
        let mut transport = MockTransport::new();
        transport.push_error(TransportError::ReceiveFailed);

        assert_eq!(
            transport.purge_stray(15, Duration::from_millis(50)),
            Err(TransportError::ReceiveFailed)
        );
        assert_eq!(transport.read_timeout(), DEFAULT_READ_TIMEOUT);
    }
}
