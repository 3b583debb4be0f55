//! Stream transport used by upload and probe sessions.
//!
//! [`Transport`] is the seam between sessions and the socket: anything that
//! can be written to and half-closed. [`Connection`] owns one transport and
//! guarantees it is shut down and dropped exactly once, on every exit path.

use std::{
    io::{self, Write},
    net::{Shutdown, SocketAddr, TcpStream},
};

use tracing::{trace, warn};

use crate::error::{LogClientError, SocketOp};

pub trait Transport: Write {
    fn shutdown(&self, how: Shutdown) -> io::Result<()>;

    fn peer_addr(&self) -> Option<SocketAddr> {
        None
    }
}

impl Transport for TcpStream {
    fn shutdown(&self, how: Shutdown) -> io::Result<()> {
        TcpStream::shutdown(self, how)
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        TcpStream::peer_addr(self).ok()
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn shutdown(&self, how: Shutdown) -> io::Result<()> {
        (**self).shutdown(how)
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        (**self).peer_addr()
    }
}

/// Writes the whole buffer, looping over short writes.
///
/// A write that accepts zero bytes means the peer is gone and fails with
/// [`io::ErrorKind::WriteZero`]. Interrupted writes are retried.
pub fn send_all<W: Write + ?Sized>(writer: &mut W, mut buf: &[u8]) -> io::Result<usize> {
    let total = buf.len();
    while !buf.is_empty() {
        match writer.write(buf) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "connection closed before the buffer was sent",
                ));
            }
            Ok(sent) => {
                trace!(sent, left = buf.len() - sent, "partial send");
                buf = &buf[sent..];
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}

/// Owned transport with scoped release.
pub struct Connection<T: Transport> {
    stream: Option<T>,
}

impl<T: Transport> Connection<T> {
    pub fn new(stream: T) -> Self {
        Self { stream: Some(stream) }
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.stream.as_ref().and_then(Transport::peer_addr)
    }

    pub fn send_all(&mut self, buf: &[u8]) -> Result<usize, LogClientError> {
        let stream = self.stream.as_mut().ok_or(LogClientError::SessionClosed)?;
        send_all(stream, buf).map_err(|e| LogClientError::io(SocketOp::Send, e))
    }

    pub fn shutdown(&mut self, how: Shutdown) -> Result<(), LogClientError> {
        let stream = self.stream.as_ref().ok_or(LogClientError::SessionClosed)?;
        stream.shutdown(how).map_err(|e| LogClientError::io(SocketOp::Shutdown, e))
    }

    /// Shuts down both directions and drops the transport.
    ///
    /// Failures are logged, never returned: by the time a connection is
    /// released the session outcome is already decided. Calling this twice
    /// is a no-op.
    pub fn release(&mut self) {
        let Some(stream) = self.stream.take() else {
            return;
        };
        match stream.shutdown(Shutdown::Both) {
            Ok(()) => {}
            // The peer may already have torn the connection down.
            Err(e) if e.kind() == io::ErrorKind::NotConnected => {}
            Err(e) => warn!(error = %e, "shutdown"),
        }
        drop(stream);
    }
}

impl<T: Transport> Drop for Connection<T> {
    fn drop(&mut self) {
        self.release();
    }
}
