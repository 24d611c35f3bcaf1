//! # imgsync Transport
//!
//! Moves images between locations and talks to the cloud services the
//! replicator depends on.
//!
//! ## Features
//!
//! - **Image transport**: [`ImageTransport`] seam with a `skopeo` backed implementation
//! - **Scoped files**: Trust policy, registry auth files and staged archives are released on drop
//! - **Cloud collaborators**: [`AwsCli`] implements the secret store, ECR token and s3 fetch traits
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use imgsync_registry::RegistryContext;
//! use imgsync_transport::{CopyRequest, ImageTransport, PolicyContext, SkopeoTransport};
//!
//! # async fn run() -> imgsync_core::Result<()> {
//! let source = RegistryContext::builder("docker://docker.io/library/nginx:1.25").build()?;
//! let destination = RegistryContext::builder("docker://ghcr.io/org/nginx:1.25").build()?;
//! let request = CopyRequest::new(source, destination, true);
//!
//! let policy = PolicyContext::accept_anything()?;
//! SkopeoTransport::default().copy(&request, &policy).await?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod auth_file;
mod aws;
mod error;
mod policy;
mod process;
mod request;
mod skopeo;
mod stage;

use async_trait::async_trait;

pub use auth_file::AuthFile;
pub use aws::{AwsCli, DEFAULT_AWS};
pub use error::{Result, TransportError};
pub use policy::PolicyContext;
pub use process::{CommandResult, CommandSpec};
pub use request::{CopyRequest, ImageListSelection};
pub use skopeo::{SkopeoTransport, DEFAULT_SKOPEO};
pub use stage::{ObjectFetcher, StagedArchive};

/// Copies one image as described by a [`CopyRequest`].
#[async_trait]
pub trait ImageTransport: Send + Sync {
    /// Performs the copy under `policy`.
    ///
    /// # Errors
    ///
    /// Returns a transport error (or a reference error for unwritable
    /// destinations) when the copy does not complete.
    async fn copy(&self, request: &CopyRequest, policy: &PolicyContext) -> imgsync_core::Result<()>;
}
