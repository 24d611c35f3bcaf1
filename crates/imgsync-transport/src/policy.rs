//! Scoped trust policy for copy attempts.
//!
//! Every copy runs under a [`PolicyContext`] that accepts any source (no
//! signature verification). The policy lives in a temporary file that is
//! removed when the context is dropped or destroyed, on every exit path.

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::{Result, TransportError};

#[derive(Serialize)]
struct Policy {
    default: Vec<PolicyRequirement>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum PolicyRequirement {
    InsecureAcceptAnything,
}

/// Trust policy handle for a single copy attempt.
#[derive(Debug)]
pub struct PolicyContext {
    file: NamedTempFile,
}

impl PolicyContext {
    /// Creates a policy that accepts any image without verification.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::TempFile`] if the policy file cannot be written.
    pub fn accept_anything() -> Result<Self> {
        let policy = Policy {
            default: vec![PolicyRequirement::InsecureAcceptAnything],
        };
        let body = serde_json::to_vec(&policy).map_err(|e| TransportError::TempFile {
            what: "trust policy",
            source: e.into(),
        })?;

        let mut file = tempfile::Builder::new()
            .prefix("imgsync-policy-")
            .suffix(".json")
            .tempfile()
            .map_err(|source| TransportError::TempFile {
                what: "trust policy",
                source,
            })?;
        file.write_all(&body)
            .and_then(|()| file.flush())
            .map_err(|source| TransportError::TempFile {
                what: "trust policy",
                source,
            })?;

        Ok(Self { file })
    }

    /// Path of the policy file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Releases the policy, reporting removal failures.
    ///
    /// Dropping the context releases it too, silently.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::TempFile`] if the file cannot be removed.
    pub fn destroy(self) -> Result<()> {
        self.file.close().map_err(|source| TransportError::TempFile {
            what: "trust policy",
            source,
        })
    }
}
