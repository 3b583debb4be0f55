//! Client for the VisibleV8 log-ingestion server.
//!
//! Each upload is one TCP connection carrying a single message: a 4-byte
//! big-endian filename length, the filename, then the log body until the
//! client half-closes its write side. Nothing is read back from the server.
//!
//! The server endpoint comes from `VV8_LOG_HOST` / `VV8_LOG_PORT`
//! (default `localhost:5580`), see [`config`].
//!
//! ```no_run
//! use vv8_log_client::LogClient;
//!
//! let client = LogClient::from_env()?;
//! client.upload("logfile.test.log", "hello, world!\n".as_bytes())?;
//! # Ok::<(), vv8_log_client::LogClientError>(())
//! ```

#[cfg(test)]
mod tests;

pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod probe;
pub mod resolver;
pub mod session;
pub mod transport;

pub use client::LogClient;
pub use config::{ClientConfig, Endpoint};
pub use error::{LogClientError, SocketOp};
pub use message::{LogName, UploadMessage};
pub use resolver::{Connector, Resolve, StaticResolver, SystemResolver};
pub use session::{SessionState, UploadReport, UploadSession};
pub use transport::{Connection, Transport, send_all};

pub mod vv8_tracing {
    use std::sync::Once;
    use tracing_subscriber::{EnvFilter, fmt};

    static INIT: Once = Once::new();

    /// Initialize tracing for tests.
    /// Output goes through the test writer and is filtered by `RUST_LOG`
    /// (off when unset).
    pub fn init() {
        INIT.call_once(|| {
            let filter = EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new("off"))
                .unwrap_or_default();

            let _ = fmt().with_target(false).with_test_writer().with_env_filter(filter).try_init();
        });
    }
}
