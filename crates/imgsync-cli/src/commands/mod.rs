//! CLI commands and argument parsing.

pub mod handle;
pub mod replicate;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use imgsync_registry::TlsConfig;
use imgsync_replicator::{ReplicationDriver, ReplicatorConfig};
use imgsync_transport::{AwsCli, SkopeoTransport, DEFAULT_AWS, DEFAULT_SKOPEO};

/// imgsync - Container image replication for managed resources
#[derive(Parser)]
#[command(name = "imgsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Path to the skopeo binary
    #[arg(long, global = true, env = "IMGSYNC_SKOPEO", default_value = DEFAULT_SKOPEO)]
    pub skopeo: PathBuf,

    /// Path to the aws CLI binary
    #[arg(long, global = true, env = "IMGSYNC_AWS", default_value = DEFAULT_AWS)]
    pub aws: PathBuf,

    /// Region for AWS calls whose reference carries none (secret names, s3)
    #[arg(long, global = true, env = "IMGSYNC_AWS_REGION")]
    pub aws_region: Option<String>,

    /// Directory of registry CA certificates and client key pairs
    #[arg(long, global = true)]
    pub cert_dir: Option<PathBuf>,

    /// Skip registry TLS certificate verification
    #[arg(long, global = true)]
    pub insecure_skip_tls_verify: bool,
}

impl GlobalArgs {
    /// TLS settings from the flags.
    pub fn tls(&self) -> TlsConfig {
        let mut tls = TlsConfig::new();
        if let Some(dir) = &self.cert_dir {
            tls = tls.with_cert_dir(dir);
        }
        if self.insecure_skip_tls_verify {
            tls = tls.insecure();
        }
        tls
    }

    /// AWS CLI client from the flags.
    pub fn aws_cli(&self) -> AwsCli {
        let aws = AwsCli::new(&self.aws);
        match &self.aws_region {
            Some(region) => aws.with_region(region),
            None => aws,
        }
    }

    /// Builds a driver wired to the CLI collaborators.
    pub fn driver(&self, config: ReplicatorConfig) -> ReplicationDriver {
        let aws = Arc::new(self.aws_cli());
        let transport = SkopeoTransport::new(&self.skopeo)
            .with_debug(config.log_level.is_debug())
            .with_fetcher(aws.clone());
        ReplicationDriver::new(config, Arc::new(transport), aws.clone(), aws)
    }
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Handle a lifecycle event document
    Handle(handle::HandleArgs),

    /// Replicate an image from flags
    Replicate(replicate::ReplicateArgs),

    /// Print version information
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "imgsync",
            "--skopeo",
            "/opt/skopeo",
            "--insecure-skip-tls-verify",
            "handle",
            "--event",
            "event.json",
        ])
        .unwrap();

        assert_eq!(cli.global.skopeo, PathBuf::from("/opt/skopeo"));
        let tls = cli.global.tls();
        assert!(tls.insecure_skip_verify);
        assert!(tls.cert_dir.is_none());
        assert!(matches!(cli.command, Commands::Handle(ref args) if args.event == PathBuf::from("event.json")));
    }

    #[test]
    fn test_parse_global_flag_after_command() {
        let cli = Cli::try_parse_from([
            "imgsync",
            "replicate",
            "--src",
            "docker://docker.io/library/nginx:1.25",
            "--dest",
            "docker://ghcr.io/org/nginx:1.25",
            "--cert-dir",
            "/etc/certs",
        ])
        .unwrap();
        assert_eq!(cli.global.tls().cert_dir, Some(PathBuf::from("/etc/certs")));
    }

    #[test]
    fn test_aws_region_flag() {
        let cli = Cli::try_parse_from(["imgsync", "--aws-region", "eu-west-1", "version"]).unwrap();
        assert_eq!(cli.global.aws_region.as_deref(), Some("eu-west-1"));
        assert_eq!(cli.global.aws_cli().region(), Some("eu-west-1"));

        let cli = Cli::try_parse_from(["imgsync", "version"]).unwrap();
        assert_eq!(cli.global.aws_cli().region(), None);
    }

    #[test]
    fn test_version_command() {
        let cli = Cli::try_parse_from(["imgsync", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }
}
