use std::{fmt, io};

use thiserror::Error;

/// Socket-level operation that failed during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketOp {
    Send,
    Shutdown,
    /// Applying the send timeout to a connected socket.
    SetTimeout,
    /// Reading the payload source, not the socket.
    Read,
}

impl fmt::Display for SocketOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocketOp::Send => write!(f, "send"),
            SocketOp::Shutdown => write!(f, "shutdown"),
            SocketOp::SetTimeout => write!(f, "setsockopt"),
            SocketOp::Read => write!(f, "read"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LogClientError {
    #[error("invalid log server port {0:?}, expected a decimal port number in 1..=65535")]
    InvalidPort(String),

    #[error("log filename must not be empty")]
    EmptyName,

    #[error("log filename is {0} bytes, which does not fit the 4-byte length header")]
    NameTooLong(usize),

    #[error("getaddrinfo: {error}")]
    Resolve { endpoint: String, error: io::Error },

    #[error("could not connect to {endpoint}")]
    Connect { endpoint: String, source: Option<io::Error> },

    #[error("{op}: {error}")]
    Io { op: SocketOp, error: io::Error },

    #[error("upload session already closed")]
    SessionClosed,
}

impl LogClientError {
    pub(crate) fn io(op: SocketOp, error: io::Error) -> Self {
        LogClientError::Io { op, error }
    }

    /// True for failures that happen before a connection exists.
    pub fn is_connect_failure(&self) -> bool {
        matches!(
            self,
            LogClientError::InvalidPort(_)
                | LogClientError::Resolve { .. }
                | LogClientError::Connect { .. }
        )
    }
}
