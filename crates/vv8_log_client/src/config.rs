//! Log server endpoint and client settings.
//!
//! The endpoint is read once from the process environment (`VV8_LOG_HOST`,
//! `VV8_LOG_PORT`) and stays immutable for the lifetime of a session. Unset
//! or empty variables fall back to `localhost:5580`.

use std::{fmt, time::Duration};

use crate::error::LogClientError;

pub const ENV_LOG_HOST: &str = "VV8_LOG_HOST";
pub const ENV_LOG_PORT: &str = "VV8_LOG_PORT";
pub const DEFAULT_LOG_HOST: &str = "localhost";
pub const DEFAULT_LOG_PORT: &str = "5580";

/// Host and port of a log-ingestion server.
///
/// The port is kept as the decimal string it was configured with; it is
/// validated on construction so the resolver never sees a malformed service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: String,
    port_number: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: impl Into<String>) -> Result<Self, LogClientError> {
        let port = port.into();
        let port_number = parse_port(&port)?;
        Ok(Self { host: host.into(), port, port_number })
    }

    /// Reads the endpoint from `VV8_LOG_HOST` and `VV8_LOG_PORT`.
    pub fn from_env() -> Result<Self, LogClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the endpoint from an arbitrary variable lookup, applying the
    /// defaults for unset or empty values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LogClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| {
            lookup(key).filter(|value| !value.is_empty()).unwrap_or_else(|| default.to_string())
        };
        Self::new(var(ENV_LOG_HOST, DEFAULT_LOG_HOST), var(ENV_LOG_PORT, DEFAULT_LOG_PORT))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    pub fn port_number(&self) -> u16 {
        self.port_number
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            host: DEFAULT_LOG_HOST.to_string(),
            port: DEFAULT_LOG_PORT.to_string(),
            port_number: 5580,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

fn parse_port(port: &str) -> Result<u16, LogClientError> {
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LogClientError::InvalidPort(port.to_string()));
    }
    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err(LogClientError::InvalidPort(port.to_string())),
        Ok(number) => Ok(number),
    }
}

/// Settings shared by every session opened by a [`crate::LogClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoint: Endpoint,
    /// Per-candidate connect timeout, none by default.
    pub connect_timeout: Option<Duration>,
    /// Socket write timeout, none by default.
    pub send_timeout: Option<Duration>,
    /// Half-close the read side before uploading.
    pub shutdown_read: bool,
}

impl ClientConfig {
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint, connect_timeout: None, send_timeout: None, shutdown_read: true }
    }

    pub fn from_env() -> Result<Self, LogClientError> {
        Ok(Self::new(Endpoint::from_env()?))
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = Some(timeout);
        self
    }

    pub fn with_shutdown_read(mut self, shutdown_read: bool) -> Self {
        self.shutdown_read = shutdown_read;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(Endpoint::default())
    }
}
