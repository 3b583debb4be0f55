//! Uploads one log to the VV8 log server.
//!
//! With no arguments the built-in demo log is sent as `logfile.test.log` to
//! the endpoint from `VV8_LOG_HOST` / `VV8_LOG_PORT` (default
//! `localhost:5580`).
//!
//! ```bash
//! VV8_LOG_PORT=52528 vv8-log-upload --name vv8-1687.0.log /tmp/vv8-1687.0.log
//! ```

use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::Parser;
use tracing::debug;
use vv8_log_cli::{EndpointArgs, init_tracing, report};
use vv8_log_client::LogClient;

const DEMO_NAME: &str = "logfile.test.log";
const DEMO_BODY: &[u8] = b"hello, world!\nthis is a log\n\nwith lines\n\nand\nstuff...\n";

#[derive(Parser, Debug)]
#[command(name = "vv8-log-upload")]
#[command(about = "Upload a log file to the VV8 log server", long_about = None)]
struct Args {
    #[command(flatten)]
    endpoint: EndpointArgs,

    /// Filename announced to the server
    #[arg(short, long, default_value = DEMO_NAME)]
    name: String,

    /// Log file to send as the body (built-in demo log when omitted)
    file: Option<PathBuf>,

    /// Do not half-close the read side before uploading
    #[arg(long, default_value_t = false)]
    keep_read_side: bool,
}

fn main() -> ExitCode {
    init_tracing();
    report(run(Args::parse()))
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = args
        .endpoint
        .client_config()
        .context("unable to connect to VV8 log server")?
        .with_shutdown_read(!args.keep_read_side);
    let client = LogClient::new(config);
    println!("debug: connecting to {}", client.config().endpoint);

    let result = match &args.file {
        Some(path) => client.upload_file(&args.name, path),
        None => client.upload(&args.name, DEMO_BODY),
    };
    let summary = match result {
        Err(err) if err.is_connect_failure() => {
            return Err(err).context("unable to connect to VV8 log server");
        }
        result => result?,
    };

    debug!(total_bytes = summary.total_bytes(), "upload complete");
    Ok(())
}
