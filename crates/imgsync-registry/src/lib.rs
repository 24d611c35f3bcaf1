//! # imgsync Registry
//!
//! Builds the per-side registry context for an image copy.
//!
//! ## Features
//!
//! - **Auth model**: Basic, Bearer and AWS ECR auto login
//! - **ECR detection**: Region extraction from `*.dkr.ecr.<region>.amazonaws.com[.cn]` hosts
//! - **Architecture policy**: Full-index copies disable the per-image filter
//! - **TLS**: Certificate directory and verification toggle
//!
//! ## Quick Start
//!
//! ```rust
//! use imgsync_registry::{RegistryContext, TlsConfig};
//!
//! let ctx = RegistryContext::builder("docker://ghcr.io/org/app:v1")
//!     .arch("arm64")
//!     .credentials("user:pass")
//!     .tls(TlsConfig::new())
//!     .build()?;
//! assert_eq!(ctx.arch_choice, "arm64");
//! # Ok::<(), imgsync_core::Error>(())
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod config;
mod context;
mod ecr;

pub use config::{RegistryAuth, TlsConfig};
pub use context::{arch_choice, ecr_region, ContextBuilder, RegistryContext};
pub use ecr::{decode_authorization_token, login, EcrTokenProvider};
