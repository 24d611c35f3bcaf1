//! imgsync CLI - Command-line interface for container image replication.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imgsync_replicator::{LogLevel, ReplicatorConfig};

mod commands;

use commands::{Cli, Commands};

fn init_tracing(level: LogLevel) {
    // stdout carries command output; logs go to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ReplicatorConfig::from_env();
    init_tracing(config.log_level);
    config.tls = cli.global.tls();

    match cli.command {
        Commands::Handle(args) => commands::handle::run(&cli.global, config, &args).await,
        Commands::Replicate(args) => commands::replicate::run(&cli.global, config, &args).await,
        Commands::Version => {
            println!("imgsync {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
