//! Upload message framing.
//!
//! ```text
//! offset  size       field
//! 0       4          name_len   (u32, big-endian)
//! 4       name_len   name       (UTF-8, no terminator)
//! 4+nl    *          body       (opaque, ends at the write-side half-close)
//! ```

use std::{
    fmt,
    io::{Cursor, Read},
};

use crate::error::LogClientError;

/// Size of the filename length header.
pub const NAME_LEN_SIZE: usize = 4;

/// Validated log filename: non-empty and short enough for a `u32` header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogName(String);

impl LogName {
    pub fn new(name: impl Into<String>) -> Result<Self, LogClientError> {
        let name = name.into();
        if name.is_empty() {
            return Err(LogClientError::EmptyName);
        }
        if u32::try_from(name.len()).is_err() {
            return Err(LogClientError::NameTooLong(name.len()));
        }
        Ok(Self(name))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Big-endian length header for this name.
    pub fn header(&self) -> [u8; NAME_LEN_SIZE] {
        // Length is checked in `new`.
        (self.0.len() as u32).to_be_bytes()
    }
}

impl fmt::Display for LogName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for LogName {
    type Error = LogClientError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}

/// One upload: a filename and a body streamed from any reader.
pub struct UploadMessage<B> {
    name: LogName,
    body: B,
}

impl<B: Read> UploadMessage<B> {
    pub fn new(name: LogName, body: B) -> Self {
        Self { name, body }
    }

    pub fn into_parts(self) -> (LogName, B) {
        (self.name, self.body)
    }
}

impl<'a> UploadMessage<Cursor<&'a [u8]>> {
    pub fn from_bytes(name: &str, body: &'a [u8]) -> Result<Self, LogClientError> {
        Ok(Self::new(LogName::new(name)?, Cursor::new(body)))
    }
}

/// Full wire image of an upload, as the server should receive it before
/// the FIN.
pub fn encode(name: &LogName, body: &[u8]) -> Vec<u8> {
    let mut wire = Vec::with_capacity(NAME_LEN_SIZE + name.as_bytes().len() + body.len());
    wire.extend_from_slice(&name.header());
    wire.extend_from_slice(name.as_bytes());
    wire.extend_from_slice(body);
    wire
}
