use std::{
    fs::File,
    io::{BufReader, Read},
    net::TcpStream,
    path::Path,
};

use tracing::info;

use crate::{
    config::ClientConfig,
    error::{LogClientError, SocketOp},
    message::{LogName, UploadMessage},
    probe,
    resolver::{Connector, Resolve, SystemResolver},
    session::{UploadReport, UploadSession},
};

/// Opens one fresh connection per call. Nothing is retried.
#[derive(Debug, Clone)]
pub struct LogClient<R = SystemResolver> {
    config: ClientConfig,
    connector: Connector<R>,
}

impl LogClient<SystemResolver> {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_resolver(config, SystemResolver)
    }

    pub fn from_env() -> Result<Self, LogClientError> {
        Ok(Self::new(ClientConfig::from_env()?))
    }
}

impl<R: Resolve> LogClient<R> {
    pub fn with_resolver(config: ClientConfig, resolver: R) -> Self {
        let connector = Connector::new(resolver)
            .with_connect_timeout(config.connect_timeout)
            .with_send_timeout(config.send_timeout);
        Self { config, connector }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn connect(&self) -> Result<TcpStream, LogClientError> {
        self.connector.connect(&self.config.endpoint)
    }

    /// Uploads `body` under `name`. The name is validated before connecting.
    pub fn upload<B: Read>(&self, name: &str, body: B) -> Result<UploadReport, LogClientError> {
        let message = UploadMessage::new(LogName::new(name)?, body);
        let stream = self.connect()?;
        UploadSession::new(stream).with_shutdown_read(self.config.shutdown_read).upload(message)
    }

    /// Streams the file at `path` as the body of an upload named `name`.
    pub fn upload_file(
        &self,
        name: &str,
        path: impl AsRef<Path>,
    ) -> Result<UploadReport, LogClientError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LogClientError::io(SocketOp::Read, source))?;
        info!(path = %path.display(), %name, "uploading log file");
        self.upload(name, BufReader::new(file))
    }

    /// Sends the greeting line for the current process. Returns bytes sent.
    pub fn probe(&self) -> Result<usize, LogClientError> {
        let stream = self.connect()?;
        probe::send_greeting(stream, std::process::id())
    }
}
