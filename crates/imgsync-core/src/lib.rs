//! # imgsync Core
//!
//! Core types for replicating container images between registries on behalf
//! of a managed-resource lifecycle (create, update, delete).
//!
//! This crate provides the data model shared by the rest of the workspace:
//!
//! - [`ImageReference`] - Transport-qualified image locator (`docker://`, `dir:`, `s3://`, ...)
//! - [`CredentialRef`] and [`CredentialResolver`] - Credential reference classification and resolution
//! - [`ArchTagPlan`] - Per-architecture destination tag planning
//! - [`ReplicationProperties`] - Typed resource properties, validated once
//! - [`LifecycleEvent`] / [`LifecycleResponse`] - Lifecycle input and output
//! - [`SecretStore`] - Secret store collaborator trait
//!
//! ## Example
//!
//! ```rust
//! use imgsync_core::{ArchTagPlan, CredentialRef};
//!
//! assert_eq!(CredentialRef::classify("user:pass"), CredentialRef::Plaintext);
//!
//! let plan = ArchTagPlan::parse(r#"{"arm64":"v1.0-arm64"}"#).unwrap();
//! assert_eq!(plan.get("arm64"), Some("v1.0-arm64"));
//! assert_eq!(
//!     ArchTagPlan::destination_for("registry/repo:latest", "v1.0-arm64"),
//!     "registry/repo:v1.0-arm64"
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod arch;
pub mod credentials;
pub mod error;
pub mod event;
pub mod properties;
pub mod reference;
pub mod secret;


// Re-export main types at crate root
pub use arch::ArchTagPlan;
pub use credentials::{parse_json_secret, CredentialRef, CredentialResolver};
pub use error::{Error, ErrorKind, Result};
pub use event::{LifecycleEvent, LifecycleResponse, RequestType};
pub use properties::ReplicationProperties;
pub use reference::{ImageReference, Location, Transport};
pub use secret::{MemorySecretStore, SecretStore};
