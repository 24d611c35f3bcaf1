//! Handle command: processes one lifecycle event document.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use imgsync_core::LifecycleEvent;
use imgsync_replicator::{LifecycleAdapter, ReplicatorConfig};

use super::GlobalArgs;

/// Arguments for the handle command.
#[derive(Args, Debug)]
pub struct HandleArgs {
    /// Event JSON file, or `-` for stdin
    #[arg(long, default_value = "-")]
    pub event: PathBuf,
}

/// Execute the handle command.
pub async fn run(global: &GlobalArgs, config: ReplicatorConfig, args: &HandleArgs) -> Result<()> {
    let event = read_event(&args.event)?;
    let adapter = LifecycleAdapter::new(global.driver(config));

    let response = adapter
        .handle(&event)
        .await
        .with_context(|| format!("{:?} request failed", event.request_type))?;

    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}

fn read_event(path: &Path) -> Result<LifecycleEvent> {
    tracing::debug!(path = %path.display(), "reading lifecycle event");
    let body = if path == Path::new("-") {
        let mut body = String::new();
        std::io::stdin()
            .read_to_string(&mut body)
            .context("Failed to read event from stdin")?;
        body
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event file: {}", path.display()))?
    };
    parse_event(&body)
}

fn parse_event(body: &str) -> Result<LifecycleEvent> {
    serde_json::from_str(body).context("Failed to parse lifecycle event")
}
