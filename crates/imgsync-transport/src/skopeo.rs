//! Image copies through the `skopeo` CLI.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use imgsync_core::{Location, Transport};
use imgsync_registry::{RegistryAuth, RegistryContext};

use crate::auth_file::AuthFile;
use crate::error::TransportError;
use crate::policy::PolicyContext;
use crate::process::CommandSpec;
use crate::request::{CopyRequest, ImageListSelection};
use crate::stage::{ObjectFetcher, StagedArchive};
use crate::ImageTransport;

/// Default program name, resolved through `PATH`.
pub const DEFAULT_SKOPEO: &str = "skopeo";

/// [`ImageTransport`] backed by `skopeo copy`.
#[derive(Clone)]
pub struct SkopeoTransport {
    program: PathBuf,
    debug: bool,
    fetcher: Option<Arc<dyn ObjectFetcher>>,
}

impl std::fmt::Debug for SkopeoTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkopeoTransport")
            .field("program", &self.program)
            .field("debug", &self.debug)
            .field("fetcher", &self.fetcher.is_some())
            .finish()
    }
}

impl Default for SkopeoTransport {
    fn default() -> Self {
        Self::new(DEFAULT_SKOPEO)
    }
}

impl SkopeoTransport {
    /// Creates a transport running `program`.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            debug: false,
            fetcher: None,
        }
    }

    /// Enables the copier's own debug output.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the fetcher used to stage object-store sources.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn ObjectFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    fn command(
        &self,
        request: &CopyRequest,
        policy: &Path,
        source_ref: &str,
        source_auth: Option<&AuthFile>,
        dest_auth: Option<&AuthFile>,
    ) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.program).arg("--policy").arg(policy);
        if self.debug {
            cmd = cmd.arg("--debug");
        }
        if !request.arch_choice().is_empty() {
            cmd = cmd.arg("--override-arch").arg(request.arch_choice());
        }

        cmd = cmd.arg("copy");
        if request.selection() == ImageListSelection::All {
            cmd = cmd.arg("--all");
        }

        cmd = side_flags(cmd, "src", request.source(), source_auth);
        cmd = side_flags(cmd, "dest", request.destination(), dest_auth);
        cmd.arg(source_ref).arg(request.destination().reference.as_str())
    }

    async fn stage(&self, ctx: &RegistryContext) -> Result<Option<StagedArchive>, TransportError> {
        let Location::Object {
            bucket,
            key,
            reference,
        } = ctx.reference.location()
        else {
            return Ok(None);
        };
        let fetcher = self
            .fetcher
            .as_deref()
            .ok_or_else(|| TransportError::NoObjectFetcher {
                reference: ctx.reference.to_string(),
            })?;
        StagedArchive::fetch(fetcher, bucket, key, reference.as_deref())
            .await
            .map(Some)
    }

    async fn run_copy(&self, request: &CopyRequest, policy: &PolicyContext) -> Result<(), TransportError> {
        let destination = &request.destination().reference;
        if destination.transport() == Transport::S3 {
            return Err(TransportError::UnsupportedDestination {
                transport: destination.transport().to_string(),
                reference: destination.to_string(),
            });
        }

        let staged = self.stage(request.source()).await?;
        let source_ref = staged
            .as_ref()
            .map_or_else(|| request.source().reference.as_str(), StagedArchive::transport_ref);

        let source_auth = AuthFile::for_context(request.source())?;
        let dest_auth = AuthFile::for_context(request.destination())?;
        let cmd = self.command(
            request,
            policy.path(),
            source_ref,
            source_auth.as_ref(),
            dest_auth.as_ref(),
        );

        let result = cmd.run_checked().await?;
        tracing::debug!(
            elapsed_ms = result.duration.as_millis(),
            output = %result.stdout.trim(),
            "copy finished"
        );
        Ok(())
    }
}

fn side_flags(
    mut cmd: CommandSpec,
    side: &str,
    ctx: &RegistryContext,
    auth_file: Option<&AuthFile>,
) -> CommandSpec {
    if !ctx.reference.is_registry() {
        return cmd;
    }

    match (&ctx.auth, auth_file) {
        (RegistryAuth::Basic { .. }, Some(file)) => {
            cmd = cmd.arg(format!("--{side}-authfile")).arg(file.path());
        }
        (RegistryAuth::Bearer { token }, _) => {
            cmd = cmd.arg(format!("--{side}-registry-token")).secret_arg(token);
        }
        (RegistryAuth::AwsEcr { region }, _) => {
            tracing::warn!(reference = %ctx.reference, region = %region, "ECR login not performed; copying with ambient credentials");
        }
        _ => {}
    }

    if ctx.tls.insecure_skip_verify {
        cmd = cmd.arg(format!("--{side}-tls-verify=false"));
    }
    if let Some(dir) = &ctx.tls.cert_dir {
        cmd = cmd.arg(format!("--{side}-cert-dir")).arg(dir);
    }
    cmd
}

#[async_trait]
impl ImageTransport for SkopeoTransport {
    async fn copy(&self, request: &CopyRequest, policy: &PolicyContext) -> imgsync_core::Result<()> {
        tracing::info!(
            source = %request.source().reference,
            destination = %request.destination().reference,
            arch = %request.arch_choice(),
            selection = ?request.selection(),
            "copying image"
        );
        self.run_copy(request, policy).await.map_err(Into::into)
    }
}
