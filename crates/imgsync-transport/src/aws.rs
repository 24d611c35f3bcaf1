//! Cloud collaborators through the `aws` CLI.
//!
//! One client covers the three services the replicator talks to: the
//! secret store, ECR token issuance and s3 object fetches.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use imgsync_core::{CredentialRef, Error, SecretStore};
use imgsync_registry::EcrTokenProvider;

use crate::error::{Result, TransportError};
use crate::process::CommandSpec;
use crate::stage::ObjectFetcher;

/// Default program name, resolved through `PATH`.
pub const DEFAULT_AWS: &str = "aws";

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SecretValue {
    secret_string: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthorizationTokenOutput {
    #[serde(default)]
    authorization_data: Vec<AuthorizationData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthorizationData {
    authorization_token: String,
}

/// `aws` CLI client.
#[derive(Debug, Clone)]
pub struct AwsCli {
    program: PathBuf,
    region: Option<String>,
}

impl Default for AwsCli {
    fn default() -> Self {
        Self::new(DEFAULT_AWS)
    }
}

impl AwsCli {
    /// Creates a client running `program`.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            region: None,
        }
    }

    /// Sets the region for calls that do not carry their own.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Region used for calls that do not carry their own.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    fn base(&self, region: Option<&str>) -> CommandSpec {
        let cmd = CommandSpec::new(&self.program);
        match region.or(self.region.as_deref()) {
            Some(region) => cmd.arg("--region").arg(region),
            None => cmd,
        }
    }

    fn secret_command(&self, reference: &str) -> CommandSpec {
        // Full ARNs name their own region.
        let region = match CredentialRef::classify(reference) {
            CredentialRef::SecretArn => reference.split(':').nth(3),
            _ => None,
        };
        self.base(region)
            .args(["secretsmanager", "get-secret-value", "--secret-id"])
            .arg(reference)
            .args(["--output", "json"])
    }

    fn token_command(&self, region: &str) -> CommandSpec {
        self.base(Some(region))
            .args(["ecr", "get-authorization-token", "--output", "json"])
    }

    fn fetch_command(&self, bucket: &str, key: &str, dest: &Path) -> CommandSpec {
        self.base(None)
            .args(["s3", "cp"])
            .arg(format!("s3://{bucket}/{key}"))
            .arg(dest)
            .arg("--only-show-errors")
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

fn parse_secret_string(stdout: &str) -> std::result::Result<String, String> {
    let value: SecretValue =
        serde_json::from_str(stdout).map_err(|e| format!("unreadable response: {e}"))?;
    value
        .secret_string
        .ok_or_else(|| "secret has no string value".to_string())
}

fn parse_authorization_token(stdout: &str) -> std::result::Result<String, String> {
    let output: AuthorizationTokenOutput =
        serde_json::from_str(stdout).map_err(|e| format!("unreadable response: {e}"))?;
    output
        .authorization_data
        .into_iter()
        .next()
        .map(|data| data.authorization_token)
        .ok_or_else(|| "no authorization data returned".to_string())
}

#[async_trait]
impl SecretStore for AwsCli {
    async fn get_secret(&self, reference: &str) -> imgsync_core::Result<String> {
        let to_err = |reason: String| Error::SecretFetch {
            reference: reference.to_string(),
            reason,
        };
        let result = self
            .secret_command(reference)
            .run_checked()
            .await
            .map_err(|e| to_err(e.detail()))?;
        parse_secret_string(&result.stdout).map_err(to_err)
    }
}

#[async_trait]
impl EcrTokenProvider for AwsCli {
    async fn authorization_token(&self, region: &str) -> imgsync_core::Result<String> {
        let to_err = |reason: String| Error::RegistryLogin {
            region: region.to_string(),
            reason,
        };
        let result = self
            .token_command(region)
            .run_checked()
            .await
            .map_err(|e| to_err(e.detail()))?;
        parse_authorization_token(&result.stdout).map_err(to_err)
    }
}

#[async_trait]
impl ObjectFetcher for AwsCli {
    async fn fetch(&self, bucket: &str, key: &str, dest: &Path) -> Result<()> {
        let result = self.fetch_command(bucket, key, dest).run_checked().await?;
        if !dest.exists() {
            return Err(TransportError::InvalidOutput {
                program: self.program_name(),
                reason: format!(
                    "s3://{bucket}/{key} was not written ({})",
                    result.stderr.trim()
                ),
            });
        }
        Ok(())
    }
}
