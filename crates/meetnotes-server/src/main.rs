//! meetnotesd entry point.

use std::process::ExitCode;

use clap::Parser;
use meetnotes_core::{TracingConfig, init_tracing};
use meetnotes_server::cli::Cli;
use meetnotes_server::{ServerResult, SignalHandler};
use tracing::{Level, error};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut tracing_config = TracingConfig::daemon().with_format(cli.log_format);
    if cli.debug {
        tracing_config = tracing_config.with_level(Level::DEBUG);
    }
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ServerResult<()> {
    let config = cli.into_config()?;

    let signals = SignalHandler::new();
    signals.spawn_listener();

    meetnotes_server::run(config, signals.handle()).await
}
