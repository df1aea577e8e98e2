//! UDP transport over `std::net::UdpSocket` (std only).

use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use log::{debug, error, info};

use crate::config::DriveConfig;
use crate::error::{bounded, Result, TransportError};

use super::Transport;

/// An exclusively-owned UDP socket talking to one controller.
///
/// Created once per axis. [`close`](Transport::close) drops the socket;
/// afterwards every operation fails with [`TransportError::Closed`].
#[derive(Debug)]
pub struct UdpConnection {
    socket: Option<UdpSocket>,
    remote: SocketAddr,
    timeout: Duration,
}

impl UdpConnection {
    /// Bind a local socket and associate it with the controller at `remote`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Socket`] if binding or configuring the
    /// read timeout fails.
    pub fn bind<A: ToSocketAddrs>(
        local: A,
        remote: SocketAddr,
        timeout: Duration,
    ) -> core::result::Result<Self, TransportError> {
        let socket = UdpSocket::bind(local).map_err(socket_error)?;
        Self::from_socket(socket, remote, timeout)
    }

    /// Wrap an already bound socket.
    pub fn from_socket(
        socket: UdpSocket,
        remote: SocketAddr,
        timeout: Duration,
    ) -> core::result::Result<Self, TransportError> {
        socket.set_read_timeout(Some(timeout)).map_err(socket_error)?;

        let local = socket.local_addr().map_err(socket_error)?;
        info!("Connecting to controller {} from local UDP {}", remote, local);

        Ok(Self {
            socket: Some(socket),
            remote,
            timeout,
        })
    }

    /// Bind using the addresses and timeout from a drive configuration.
    ///
    /// The local socket listens on all interfaces at the configured local
    /// port, or `15000 + last octet` of the controller address when unset.
    pub fn from_config(config: &DriveConfig) -> Result<Self> {
        let remote = config.remote_addr()?;
        let local = SocketAddr::from(([0, 0, 0, 0], config.local_port()?));
        Ok(Self::bind(local, remote, config.timeout())?)
    }

    /// Local address the socket is bound to.
    pub fn local_addr(&self) -> core::result::Result<SocketAddr, TransportError> {
        self.socket()?.local_addr().map_err(socket_error)
    }

    /// True until [`close`](Transport::close) is called.
    pub fn is_open(&self) -> bool {
        self.socket.is_some()
    }

    fn socket(&self) -> core::result::Result<&UdpSocket, TransportError> {
        self.socket.as_ref().ok_or(TransportError::Closed)
    }
}

impl Transport for UdpConnection {
    fn send(&mut self, datagram: &[u8]) -> core::result::Result<(), TransportError> {
        match self.socket()?.send_to(datagram, self.remote) {
            Ok(0) => {
                error!("Unable to send UDP command to {}: nothing written", self.remote);
                Err(TransportError::SendFailed)
            }
            Ok(_) => Ok(()),
            Err(e) => {
                error!("Unable to send UDP command to {}: {}", self.remote, e);
                Err(TransportError::SendFailed)
            }
        }
    }

    fn receive(&mut self, buf: &mut [u8]) -> core::result::Result<usize, TransportError> {
        match self.socket()?.recv_from(buf) {
            Ok((len, from)) => {
                if from != self.remote {
                    debug!("Reply for {} arrived from {}", self.remote, from);
                }
                Ok(len)
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut => {
                Err(TransportError::Timeout)
            }
            Err(e) => {
                error!("Receive from {} failed: {}", self.remote, e);
                Err(TransportError::ReceiveFailed)
            }
        }
    }

    fn read_timeout(&self) -> Duration {
        self.timeout
    }

    fn set_read_timeout(&mut self, timeout: Duration) -> core::result::Result<(), TransportError> {
        self.socket()?
            .set_read_timeout(Some(timeout))
            .map_err(socket_error)?;
        self.timeout = timeout;
        Ok(())
    }

    fn remote(&self) -> SocketAddr {
        self.remote
    }

    fn close(&mut self) {
        if self.socket.take().is_some() {
            debug!("Closed UDP socket for {}", self.remote);
        }
    }
}

fn socket_error(e: io::Error) -> TransportError {
    TransportError::Socket(bounded(&e.to_string()))
}
