//! Connectivity probe for the VV8 log server: sends `hello from pid=<PID>`.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use vv8_log_cli::{EndpointArgs, init_tracing, report};
use vv8_log_client::LogClient;

#[derive(Parser, Debug)]
#[command(name = "sandbox-experiment")]
#[command(about = "Check that the VV8 log server accepts connections", long_about = None)]
struct Args {
    #[command(flatten)]
    endpoint: EndpointArgs,
}

fn main() -> ExitCode {
    init_tracing();
    report(run(Args::parse()))
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = args.endpoint.client_config().context("unable to connect to VV8 log server")?;
    let client = LogClient::new(config);
    println!("debug: connecting to {}", client.config().endpoint);

    let stream = client.connect().context("unable to connect to VV8 log server")?;
    vv8_log_client::probe::send_greeting(stream, std::process::id())?;
    Ok(())
}
