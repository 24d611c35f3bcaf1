//! Error types for imgsync operations.
//!
//! Every failure surfaced to the lifecycle caller is an [`Error`]. Use
//! [`Error::kind`] to tell input problems apart from credential, reference
//! and transport failures.

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required property is missing or a property has an invalid shape.
    InputValidation,
    /// Credentials could not be classified, fetched or parsed.
    Credential,
    /// An image reference is not addressable by any known transport.
    Reference,
    /// The image transport failed to copy.
    Transport,
}

/// Errors that can occur while replicating an image.
#[derive(Error, Debug)]
pub enum Error {
    /// A required resource property is missing or is not a string.
    #[error("can't get {key}")]
    MissingProperty {
        /// Property key.
        key: String,
    },

    /// A boolean resource property is not literally `"true"` or `"false"`.
    #[error(r#"can't get {key} as bool with value {value}. valid values are "true" and "false""#)]
    InvalidBoolProperty {
        /// Property key.
        key: String,
        /// The offending value, rendered as JSON.
        value: String,
    },

    /// The per-architecture tag mapping is not a JSON object of strings.
    #[error("error parsing arch image tags: {reason}")]
    ArchImageTags {
        /// Parser message.
        reason: String,
    },

    /// Credential text could not be turned into registry auth.
    #[error("invalid credentials: {reason}")]
    InvalidCredentials {
        /// Reason the credentials are invalid.
        reason: String,
    },

    /// The secret store lookup failed.
    #[error("failed to get secret {reference}: {reason}")]
    SecretFetch {
        /// Secret ARN or name.
        reference: String,
        /// Reason for the failure.
        reason: String,
    },

    /// A JSON-shaped secret could not be decoded.
    #[error("error parsing json secret: {reason}")]
    JsonSecret {
        /// Parser message.
        reason: String,
    },

    /// A JSON-shaped secret lacks a required field.
    #[error("error parsing {field} from json secret")]
    SecretField {
        /// Missing or empty field name.
        field: &'static str,
    },

    /// Managed registry login failed.
    #[error("registry login failed for region {region}: {reason}")]
    RegistryLogin {
        /// Registry region.
        region: String,
        /// Reason for the failure.
        reason: String,
    },

    /// Image reference is not addressable by any known transport.
    #[error("invalid image reference '{reference}': {reason}")]
    InvalidReference {
        /// Reference string.
        reference: String,
        /// Reason the reference was rejected.
        reason: String,
    },

    /// The image transport failed.
    #[error("copy image failed: {message}")]
    Copy {
        /// Transport message.
        message: String,
    },
}

impl Error {
    /// Returns the taxonomy bucket this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingProperty { .. }
            | Self::InvalidBoolProperty { .. }
            | Self::ArchImageTags { .. } => ErrorKind::InputValidation,
            Self::InvalidCredentials { .. }
            | Self::SecretFetch { .. }
            | Self::JsonSecret { .. }
            | Self::SecretField { .. }
            | Self::RegistryLogin { .. } => ErrorKind::Credential,
            Self::InvalidReference { .. } => ErrorKind::Reference,
            Self::Copy { .. } => ErrorKind::Transport,
        }
    }

    pub(crate) fn invalid_reference(reference: &str, reason: impl Into<String>) -> Self {
        Self::InvalidReference {
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }
}
