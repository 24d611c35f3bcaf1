//! imgsync Replicator
//!
//! This crate drives image replication for a managed resource: it turns a
//! lifecycle event into one primary copy plus one copy per architecture tag.
//!
//! # Overview
//!
//! - **Validation**: Resource properties are typed and checked before any work
//! - **Credentials**: Source and destination references are resolved once per run
//! - **Fan-out**: Each entry of `ArchImageTags` gets its own single-architecture copy
//! - **Lifecycle**: Delete is a no-op; Create and Update replicate
//!
//! # State machine
//!
//! ```text
//! Idle -> Validating -> CopyingPrimary -> [FanOutPlanning -> CopyingFanOut[i]...] -> Done
//!                 \              \                                  \
//!                  +--------------+----------------------------------+-> Failed
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use imgsync_core::ReplicationProperties;
//! use imgsync_replicator::{ReplicationDriver, ReplicatorConfig};
//! use imgsync_transport::{AwsCli, SkopeoTransport};
//!
//! # async fn run() -> imgsync_core::Result<()> {
//! let aws = Arc::new(AwsCli::default());
//! let driver = ReplicationDriver::new(
//!     ReplicatorConfig::from_env(),
//!     Arc::new(SkopeoTransport::default()),
//!     aws.clone(),
//!     aws,
//! );
//!
//! let props = ReplicationProperties::new(
//!     "docker://docker.io/library/nginx:1.25",
//!     "docker://123456789012.dkr.ecr.us-west-2.amazonaws.com/nginx:1.25",
//! );
//! let report = driver.replicate(&props).await?;
//! println!("{} copies", report.copies.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod driver;
pub mod lifecycle;
pub mod state;

// Re-export main types at crate root
pub use config::{LogLevel, ReplicatorConfig, ReplicatorConfigBuilder, LOG_LEVEL_ENV};
pub use driver::ReplicationDriver;
pub use lifecycle::{LifecycleAdapter, LifecycleOutcome};
pub use state::{CopyRecord, ReplicationReport, ReplicationState};
