//! Endpoint resolution and connection establishment.

use std::{
    io,
    net::{SocketAddr, TcpStream, ToSocketAddrs},
    time::Duration,
};

use tracing::{debug, info};

use crate::{
    config::Endpoint,
    error::{LogClientError, SocketOp},
};

/// Turns an endpoint into candidate socket addresses, in preference order.
pub trait Resolve {
    fn resolve(&self, endpoint: &Endpoint) -> Result<Vec<SocketAddr>, LogClientError>;
}

/// Platform name service (`getaddrinfo`, any address family, stream sockets).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolve for SystemResolver {
    fn resolve(&self, endpoint: &Endpoint) -> Result<Vec<SocketAddr>, LogClientError> {
        let resolve_err = |error: io::Error| LogClientError::Resolve { endpoint: endpoint.to_string(), error };
        let candidates: Vec<SocketAddr> = (endpoint.host(), endpoint.port_number())
            .to_socket_addrs()
            .map_err(resolve_err)?
            .collect();
        if candidates.is_empty() {
            return Err(resolve_err(io::Error::new(
                io::ErrorKind::NotFound,
                "no address records returned",
            )));
        }
        Ok(candidates)
    }
}

/// Fixed candidate list, used where name service is not wanted.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver(pub Vec<SocketAddr>);

impl Resolve for StaticResolver {
    fn resolve(&self, endpoint: &Endpoint) -> Result<Vec<SocketAddr>, LogClientError> {
        if self.0.is_empty() {
            return Err(LogClientError::Resolve {
                endpoint: endpoint.to_string(),
                error: io::Error::new(io::ErrorKind::NotFound, "no address records configured"),
            });
        }
        Ok(self.0.clone())
    }
}

impl<R: Resolve + ?Sized> Resolve for &R {
    fn resolve(&self, endpoint: &Endpoint) -> Result<Vec<SocketAddr>, LogClientError> {
        (**self).resolve(endpoint)
    }
}

/// Connects to the first candidate that accepts.
///
/// Candidates are tried in order; a failed attempt's socket is closed before
/// moving on. The error names the endpoint and keeps the last attempt's
/// cause.
pub fn connect_first(
    endpoint: &Endpoint,
    candidates: &[SocketAddr],
    timeout: Option<Duration>,
) -> Result<TcpStream, LogClientError> {
    let mut last_error = None;
    for addr in candidates {
        debug!(%addr, "trying log server candidate");
        let attempt = match timeout {
            Some(timeout) => TcpStream::connect_timeout(addr, timeout),
            None => TcpStream::connect(addr),
        };
        match attempt {
            Ok(stream) => {
                info!(%endpoint, %addr, "connected to log server");
                return Ok(stream);
            }
            Err(e) => {
                debug!(%addr, error = %e, "connect");
                last_error = Some(e);
            }
        }
    }
    Err(LogClientError::Connect { endpoint: endpoint.to_string(), source: last_error })
}

/// Resolves an endpoint and opens a stream socket to it.
#[derive(Debug, Clone, Default)]
pub struct Connector<R = SystemResolver> {
    resolver: R,
    connect_timeout: Option<Duration>,
    send_timeout: Option<Duration>,
}

impl<R: Resolve> Connector<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver, connect_timeout: None, send_timeout: None }
    }

    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_send_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.send_timeout = timeout;
        self
    }

    pub fn connect(&self, endpoint: &Endpoint) -> Result<TcpStream, LogClientError> {
        debug!(%endpoint, "resolving log server");
        let candidates = self.resolver.resolve(endpoint)?;
        let stream = connect_first(endpoint, &candidates, self.connect_timeout)?;
        if let Some(timeout) = self.send_timeout {
            stream
                .set_write_timeout(Some(timeout))
                .map_err(|e| LogClientError::io(SocketOp::SetTimeout, e))?;
        }
        Ok(stream)
    }
}
