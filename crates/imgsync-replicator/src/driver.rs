//! The replication driver.
//!
//! A run validates the properties, copies source to destination once, then
//! copies once more per entry of the architecture tag plan. Copies run one
//! at a time and the first failure ends the run.

use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};

use imgsync_core::{ArchTagPlan, CredentialResolver, Error, ReplicationProperties, Result, SecretStore};
use imgsync_registry::{EcrTokenProvider, RegistryContext};
use imgsync_transport::{CopyRequest, ImageTransport, PolicyContext};

use crate::config::{ReplicatorConfig, LOG_LEVEL_ENV};
use crate::state::{CopyRecord, ReplicationReport, ReplicationState};

/// Credential strings resolved for one run.
struct ResolvedCredentials {
    source: String,
    destination: String,
}

/// Sequences the copies of one replication request.
pub struct ReplicationDriver {
    config: ReplicatorConfig,
    transport: Arc<dyn ImageTransport>,
    secrets: Arc<dyn SecretStore>,
    ecr: Arc<dyn EcrTokenProvider>,
}

impl std::fmt::Debug for ReplicationDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplicationDriver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ReplicationDriver {
    /// Creates a driver with the given collaborators.
    #[must_use]
    pub fn new(
        config: ReplicatorConfig,
        transport: Arc<dyn ImageTransport>,
        secrets: Arc<dyn SecretStore>,
        ecr: Arc<dyn EcrTokenProvider>,
    ) -> Self {
        if let Some(raw) = config.rejected_log_level() {
            tracing::warn!(
                variable = LOG_LEVEL_ENV,
                value = raw,
                using = %config.log_level,
                "unrecognized log level"
            );
        }
        Self {
            config,
            transport,
            secrets,
            ecr,
        }
    }

    /// Validates raw resource properties and replicates.
    ///
    /// # Errors
    ///
    /// Returns the first validation, credential, reference or transport
    /// error encountered.
    pub async fn run(&self, props: &Map<String, Value>) -> Result<ReplicationReport> {
        let mut report = ReplicationReport::default();
        report.enter(ReplicationState::Validating);

        match ReplicationProperties::from_map(props) {
            Ok(props) => self.drive(&props, report).await,
            Err(err) => Err(fail(&mut report, err)),
        }
    }

    /// Replicates already-typed properties.
    ///
    /// # Errors
    ///
    /// Returns the first credential, reference or transport error
    /// encountered.
    pub async fn replicate(&self, props: &ReplicationProperties) -> Result<ReplicationReport> {
        let mut report = ReplicationReport::default();
        report.enter(ReplicationState::Validating);
        self.drive(props, report).await
    }

    async fn drive(
        &self,
        props: &ReplicationProperties,
        mut report: ReplicationReport,
    ) -> Result<ReplicationReport> {
        match self.copy_all(props, &mut report).await {
            Ok(()) => {
                report.enter(ReplicationState::Done);
                tracing::info!(
                    source = %props.source_image,
                    destination = %props.dest_image,
                    copies = report.copies.len(),
                    "replication complete"
                );
                Ok(report)
            }
            Err(err) => Err(fail(&mut report, err)),
        }
    }

    async fn copy_all(&self, props: &ReplicationProperties, report: &mut ReplicationReport) -> Result<()> {
        report.enter(ReplicationState::CopyingPrimary);

        let resolver = CredentialResolver::new(self.secrets.as_ref());
        let creds = ResolvedCredentials {
            source: resolver.resolve(&props.src_creds).await?,
            destination: resolver.resolve(&props.dest_creds).await?,
        };

        let primary = self
            .copy_once(
                &props.source_image,
                &props.dest_image,
                &props.image_arch,
                props.copy_image_index,
                &creds,
            )
            .await?;
        report.copies.push(primary);

        if props.arch_image_tags.is_empty() {
            return Ok(());
        }

        report.enter(ReplicationState::FanOutPlanning);
        let targets: Vec<(String, String)> = props
            .arch_image_tags
            .iter()
            .map(|(arch, tag)| (arch.to_string(), ArchTagPlan::destination_for(&props.dest_image, tag)))
            .collect();
        tracing::info!(count = targets.len(), "copying per-architecture tags");

        for (index, (arch, destination)) in targets.into_iter().enumerate() {
            report.enter(ReplicationState::CopyingFanOut {
                index,
                arch: arch.clone(),
            });
            let record = self
                .copy_once(&props.source_image, &destination, &arch, false, &creds)
                .await?;
            report.copies.push(record);
        }

        Ok(())
    }

    async fn copy_once(
        &self,
        source: &str,
        destination: &str,
        arch: &str,
        copy_full_index: bool,
        creds: &ResolvedCredentials,
    ) -> Result<CopyRecord> {
        let mut source_ctx = self.context(source, arch, copy_full_index, &creds.source)?;
        let mut dest_ctx = self.context(destination, arch, copy_full_index, &creds.destination)?;
        source_ctx.authenticate(self.ecr.as_ref()).await?;
        dest_ctx.authenticate(self.ecr.as_ref()).await?;

        let request = CopyRequest::new(source_ctx, dest_ctx, copy_full_index);
        let effective_arch = request.arch_choice().to_string();

        let policy = PolicyContext::accept_anything()?;
        let start = Instant::now();
        let copied = self.transport.copy(&request, &policy).await;
        let elapsed = start.elapsed();
        if let Err(err) = policy.destroy() {
            tracing::warn!(error = %err, "failed to remove trust policy");
        }
        copied?;

        tracing::info!(
            source,
            destination,
            arch = %effective_arch,
            elapsed_ms = elapsed.as_millis(),
            "image copied"
        );
        Ok(CopyRecord {
            source: source.to_string(),
            destination: destination.to_string(),
            arch: effective_arch,
            copy_full_index,
            elapsed,
        })
    }

    fn context(
        &self,
        image_ref: &str,
        arch: &str,
        copy_full_index: bool,
        creds: &str,
    ) -> Result<RegistryContext> {
        RegistryContext::builder(image_ref)
            .arch(arch)
            .copy_full_index(copy_full_index)
            .credentials(creds)
            .tls(self.config.tls.clone())
            .build()
    }
}

fn fail(report: &mut ReplicationReport, err: Error) -> Error {
    tracing::error!(
        state = %report.state(),
        kind = ?err.kind(),
        error = %err,
        "replication failed"
    );
    report.enter(ReplicationState::Failed);
    err
}
