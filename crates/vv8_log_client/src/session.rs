//! Upload session: sends one [`UploadMessage`] over an owned transport.
//!
//! ```text
//! Connected → HeaderSent → NameSent → BodySent → HalfClosed → Closed
//!     ↘           ↘           ↘          ↘           ↘
//!     any failure → Failed → Closed (transport released)
//! ```

use std::{
    io::{self, Read},
    net::{Shutdown, SocketAddr},
};

use tracing::{debug, info};

use crate::{
    error::{LogClientError, SocketOp},
    message::UploadMessage,
    transport::{Connection, Transport},
};

/// Chunk size used when streaming the body from its reader.
const BODY_CHUNK_SIZE: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    HeaderSent,
    NameSent,
    BodySent,
    HalfClosed,
    Failed,
    Closed,
}

/// Byte counts of a completed upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub peer: Option<SocketAddr>,
    pub header_bytes: u64,
    pub name_bytes: u64,
    pub body_bytes: u64,
}

impl UploadReport {
    pub fn total_bytes(&self) -> u64 {
        self.header_bytes + self.name_bytes + self.body_bytes
    }
}

pub struct UploadSession<T: Transport> {
    conn: Connection<T>,
    state: SessionState,
    failed_in: Option<SessionState>,
    shutdown_read: bool,
    bytes_sent: u64,
}

impl<T: Transport> UploadSession<T> {
    pub fn new(stream: T) -> Self {
        Self {
            conn: Connection::new(stream),
            state: SessionState::Connected,
            failed_in: None,
            shutdown_read: true,
            bytes_sent: 0,
        }
    }

    /// Whether to half-close the read side before sending. On by default.
    pub fn with_shutdown_read(mut self, shutdown_read: bool) -> Self {
        self.shutdown_read = shutdown_read;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// State the session was in when it failed, if it did.
    pub fn failed_in(&self) -> Option<SessionState> {
        self.failed_in
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    pub fn is_released(&self) -> bool {
        !self.conn.is_open()
    }

    /// Sends the message, half-closes the write side and releases the
    /// transport. The transport is released on failure too.
    pub fn upload<B: Read>(
        &mut self,
        message: UploadMessage<B>,
    ) -> Result<UploadReport, LogClientError> {
        if self.state != SessionState::Connected {
            return Err(LogClientError::SessionClosed);
        }
        let result = self.run(message);
        if let Err(err) = &result {
            debug!(state = ?self.state, error = %err, "upload session failed");
            self.failed_in = Some(self.state);
            self.transition(SessionState::Failed);
        }
        self.conn.release();
        self.transition(SessionState::Closed);
        result
    }

    fn run<B: Read>(&mut self, message: UploadMessage<B>) -> Result<UploadReport, LogClientError> {
        let peer = self.conn.peer_addr();
        let (name, mut body) = message.into_parts();

        if self.shutdown_read {
            self.conn.shutdown(Shutdown::Read)?;
        }

        let header_bytes = self.send(&name.header())?;
        self.transition(SessionState::HeaderSent);

        let name_bytes = self.send(name.as_bytes())?;
        self.transition(SessionState::NameSent);

        let body_bytes = self.send_body(&mut body)?;
        self.transition(SessionState::BodySent);

        self.conn.shutdown(Shutdown::Write)?;
        self.transition(SessionState::HalfClosed);

        let report = UploadReport { peer, header_bytes, name_bytes, body_bytes };
        info!(
            name = %name,
            peer = ?report.peer,
            body_bytes,
            total_bytes = report.total_bytes(),
            "log uploaded"
        );
        Ok(report)
    }

    fn send(&mut self, buf: &[u8]) -> Result<u64, LogClientError> {
        let sent = self.conn.send_all(buf)? as u64;
        self.bytes_sent += sent;
        Ok(sent)
    }

    fn send_body<B: Read>(&mut self, body: &mut B) -> Result<u64, LogClientError> {
        let mut chunk = vec![0u8; BODY_CHUNK_SIZE];
        let mut sent = 0;
        loop {
            let n = match body.read(&mut chunk) {
                Ok(0) => return Ok(sent),
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(LogClientError::io(SocketOp::Read, e)),
            };
            sent += self.send(&chunk[..n])?;
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug!(from = ?self.state, to = ?next, "upload session");
        self.state = next;
    }
}
