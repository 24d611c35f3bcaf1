//! Typed replication properties.
//!
//! The lifecycle event carries a loosely-typed property map. It is validated
//! once into [`ReplicationProperties`]; nothing downstream reads the raw map.

use serde_json::{Map, Value};

use crate::arch::ArchTagPlan;
use crate::credentials::CredentialRef;
use crate::error::{Error, Result};

/// Property key: source image reference (required).
pub const SRC_IMAGE: &str = "SourceImage";
/// Property key: destination image reference (required).
pub const DEST_IMAGE: &str = "DestImage";
/// Property key: architecture to select.
pub const IMAGE_ARCH: &str = "ImageArch";
/// Property key: `"true"` to copy the whole image index.
pub const COPY_IMAGE_INDEX: &str = "CopyImageIndex";
/// Property key: JSON object of per-architecture destination tags.
pub const ARCH_IMAGE_TAGS: &str = "ArchImageTags";
/// Property key: source credential reference.
pub const SRC_CREDS: &str = "SrcCreds";
/// Property key: destination credential reference.
pub const DEST_CREDS: &str = "DestCreds";

/// Validated replication request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplicationProperties {
    /// Source image reference.
    pub source_image: String,

    /// Destination image reference.
    pub dest_image: String,

    /// Requested architecture; empty selects the native/default image.
    pub image_arch: String,

    /// Copy the full image index rather than a single image.
    pub copy_image_index: bool,

    /// Per-architecture fan-out plan; empty means no fan-out.
    pub arch_image_tags: ArchTagPlan,

    /// Source credential reference; empty means ambient credentials.
    pub src_creds: String,

    /// Destination credential reference; empty means ambient credentials.
    pub dest_creds: String,
}

impl ReplicationProperties {
    /// Creates properties for a plain source-to-destination copy.
    #[must_use]
    pub fn new(source_image: impl Into<String>, dest_image: impl Into<String>) -> Self {
        Self {
            source_image: source_image.into(),
            dest_image: dest_image.into(),
            ..Self::default()
        }
    }

    /// Validates a raw resource property map.
    ///
    /// Unrecognized keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns an input validation error if a required key is missing, a key
    /// holds a non-string value, `CopyImageIndex` is not `"true"`/`"false"`,
    /// or `ArchImageTags` is not a JSON object of strings.
    pub fn from_map(props: &Map<String, Value>) -> Result<Self> {
        let source_image = required_str(props, SRC_IMAGE)?;
        let dest_image = required_str(props, DEST_IMAGE)?;
        let image_arch = optional_str(props, IMAGE_ARCH, "")?;
        let copy_image_index = optional_bool(props, COPY_IMAGE_INDEX, false)?;
        let arch_image_tags = ArchTagPlan::parse(&optional_str(props, ARCH_IMAGE_TAGS, "")?)?;
        let src_creds = optional_str(props, SRC_CREDS, "")?;
        let dest_creds = optional_str(props, DEST_CREDS, "")?;

        Ok(Self {
            source_image,
            dest_image,
            image_arch,
            copy_image_index,
            arch_image_tags,
            src_creds,
            dest_creds,
        })
    }

    /// Returns a copy of `props` with inline plaintext credentials masked.
    #[must_use]
    pub fn redacted_map(props: &Map<String, Value>) -> Map<String, Value> {
        let mut redacted = props.clone();
        for key in [SRC_CREDS, DEST_CREDS] {
            if let Some(Value::String(creds)) = redacted.get_mut(key) {
                *creds = CredentialRef::redact(creds);
            }
        }
        redacted
    }
}

fn required_str(props: &Map<String, Value>, key: &str) -> Result<String> {
    match props.get(key) {
        Some(Value::String(v)) => Ok(v.clone()),
        _ => Err(Error::MissingProperty {
            key: key.to_string(),
        }),
    }
}

fn optional_str(props: &Map<String, Value>, key: &str, default: &str) -> Result<String> {
    match props.get(key) {
        None | Some(Value::Null) => Ok(default.to_string()),
        Some(Value::String(v)) => Ok(v.clone()),
        Some(_) => Err(Error::MissingProperty {
            key: key.to_string(),
        }),
    }
}

fn optional_bool(props: &Map<String, Value>, key: &str, default: bool) -> Result<bool> {
    match props.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::String(v)) if v == "true" => Ok(true),
        Some(Value::String(v)) if v == "false" => Ok(false),
        Some(other) => Err(Error::InvalidBoolProperty {
            key: key.to_string(),
            value: match other {
                Value::String(s) => s.clone(),
                v => v.to_string(),
            },
        }),
    }
}
