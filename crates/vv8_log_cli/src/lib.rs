//! Shared pieces of the `vv8-log-upload` and `sandbox-experiment` binaries.

use std::{process::ExitCode, sync::Once, time::Duration};

use clap::Args;
use tracing_subscriber::{EnvFilter, fmt};
use vv8_log_client::{
    ClientConfig, Endpoint, LogClientError,
    config::{ENV_LOG_HOST, ENV_LOG_PORT},
};

static INIT: Once = Once::new();

/// Install the stderr subscriber, filtered by `RUST_LOG` (default "warn").
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("warn"))
            .unwrap_or_default();

        fmt().with_writer(std::io::stderr).with_target(false).with_env_filter(filter).init();
    });
}

/// Log server endpoint and socket options common to both binaries.
#[derive(Args, Debug, Clone, Default)]
pub struct EndpointArgs {
    /// Log server host, overrides VV8_LOG_HOST
    #[arg(long)]
    pub host: Option<String>,

    /// Log server port, overrides VV8_LOG_PORT
    #[arg(long)]
    pub port: Option<String>,

    /// Connect timeout per candidate address, in milliseconds
    #[arg(long)]
    pub connect_timeout_ms: Option<u64>,

    /// Socket send timeout, in milliseconds
    #[arg(long)]
    pub send_timeout_ms: Option<u64>,
}

impl EndpointArgs {
    /// Flags win over the environment, which wins over the defaults.
    pub fn client_config(&self) -> Result<ClientConfig, LogClientError> {
        let endpoint = Endpoint::from_lookup(|key| match key {
            ENV_LOG_HOST => self.host.clone().or_else(|| std::env::var(key).ok()),
            ENV_LOG_PORT => self.port.clone().or_else(|| std::env::var(key).ok()),
            _ => std::env::var(key).ok(),
        })?;

        let mut config = ClientConfig::new(endpoint);
        if let Some(ms) = self.connect_timeout_ms {
            config = config.with_connect_timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = self.send_timeout_ms {
            config = config.with_send_timeout(Duration::from_millis(ms));
        }
        Ok(config)
    }
}

/// Reports a failed run on stderr, perror style with the innermost cause
/// first, and picks the exit code.
pub fn report(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            for cause in err.chain().rev() {
                eprintln!("{cause}");
            }
            ExitCode::FAILURE
        }
    }
}
