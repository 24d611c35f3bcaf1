//! Error types for transport and collaborator operations.

use thiserror::Error;

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur while driving external collaborators.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The collaborator binary could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program name or path.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The collaborator exited unsuccessfully.
    #[error("{program} failed with exit code {code:?}: {stderr}")]
    CommandFailed {
        /// Program name or path.
        program: String,
        /// Exit code, if the process exited normally.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },

    /// A scoped temporary file could not be written or removed.
    #[error("failed to prepare {what}: {source}")]
    TempFile {
        /// What the file holds.
        what: &'static str,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The collaborator produced output that could not be understood.
    #[error("unexpected output from {program}: {reason}")]
    InvalidOutput {
        /// Program name or path.
        program: String,
        /// What was wrong.
        reason: String,
    },

    /// The reference cannot be written to.
    #[error("{transport} references cannot be used as a copy destination: {reference}")]
    UnsupportedDestination {
        /// Transport name.
        transport: String,
        /// Reference string.
        reference: String,
    },

    /// An object-store source was given but no fetcher is configured.
    #[error("no object fetcher configured for {reference}")]
    NoObjectFetcher {
        /// Reference string.
        reference: String,
    },
}

impl TransportError {
    /// Returns the collaborator's own message when there is one.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::CommandFailed { stderr, .. } if !stderr.trim().is_empty() => {
                stderr.trim().to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<TransportError> for imgsync_core::Error {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::UnsupportedDestination { reference, transport } => {
                Self::InvalidReference {
                    reason: format!("{transport} references cannot be used as a copy destination"),
                    reference,
                }
            }
            other => Self::Copy {
                message: other.detail(),
            },
        }
    }
}
