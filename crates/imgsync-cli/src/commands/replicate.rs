//! Replicate command: copies an image described entirely by flags.

use anyhow::{Context, Result};
use clap::Args;

use imgsync_core::{ArchTagPlan, ReplicationProperties};
use imgsync_replicator::{ReplicationReport, ReplicatorConfig};

use super::GlobalArgs;

/// Arguments for the replicate command.
#[derive(Args, Debug)]
pub struct ReplicateArgs {
    /// Source image reference (e.g. docker://docker.io/library/nginx:1.25)
    #[arg(long)]
    pub src: String,

    /// Destination image reference
    #[arg(long)]
    pub dest: String,

    /// Architecture to copy when not copying the whole index
    #[arg(long, default_value = "")]
    pub arch: String,

    /// Copy the whole image index instead of a single image
    #[arg(long)]
    pub copy_image_index: bool,

    /// Per-architecture destination tags as a JSON object
    #[arg(long, default_value = "")]
    pub arch_image_tags: String,

    /// Source credentials: secret ARN, secret name or user:pass
    #[arg(long, env = "IMGSYNC_SRC_CREDS", hide_env_values = true, default_value = "")]
    pub src_creds: String,

    /// Destination credentials: secret ARN, secret name or user:pass
    #[arg(long, env = "IMGSYNC_DEST_CREDS", hide_env_values = true, default_value = "")]
    pub dest_creds: String,

    /// Output format: text, json
    #[arg(long, default_value = "text")]
    pub output: String,
}

impl ReplicateArgs {
    fn properties(&self) -> Result<ReplicationProperties> {
        let arch_image_tags =
            ArchTagPlan::parse(&self.arch_image_tags).context("Invalid --arch-image-tags")?;
        Ok(ReplicationProperties {
            image_arch: self.arch.clone(),
            copy_image_index: self.copy_image_index,
            arch_image_tags,
            src_creds: self.src_creds.clone(),
            dest_creds: self.dest_creds.clone(),
            ..ReplicationProperties::new(&self.src, &self.dest)
        })
    }
}

/// Execute the replicate command.
pub async fn run(global: &GlobalArgs, config: ReplicatorConfig, args: &ReplicateArgs) -> Result<()> {
    let props = args.properties()?;
    let driver = global.driver(config);

    let report = driver
        .replicate(&props)
        .await
        .with_context(|| format!("Replication of {} failed", props.source_image))?;

    if args.output == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text_output(&report);
    }
    Ok(())
}

fn print_text_output(report: &ReplicationReport) {
    println!("Replicated {} image(s):", report.copies.len());
    for copy in &report.copies {
        let arch = if copy.arch.is_empty() {
            if copy.copy_full_index { "all" } else { "default" }
        } else {
            copy.arch.as_str()
        };
        println!(
            "   {} -> {} [{}] in {:.1}s",
            copy.source,
            copy.destination,
            arch,
            copy.elapsed.as_secs_f64()
        );
    }
}
