//! Transport-qualified image references.
//!
//! References take the form `transport:details`:
//!
//! - `docker://[host[:port]/]repository[:tag][@digest]` - remote registry
//! - `dir:/path` - local directory archive
//! - `oci:/path[:reference]` - OCI layout directory
//! - `docker-archive:/path.tar[:reference]` - docker-save tarball
//! - `oci-archive:/path.tar[:reference]` - OCI layout tarball
//! - `s3://bucket/key[:reference]` - object-store-backed docker-save tarball

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Registry used for docker references without an explicit host.
pub const DEFAULT_REGISTRY: &str = "docker.io";

/// Image transport named by a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    /// Remote registry (`docker://`).
    Docker,
    /// Local directory (`dir:`).
    Dir,
    /// OCI image layout directory (`oci:`).
    Oci,
    /// Docker archive tarball (`docker-archive:`).
    DockerArchive,
    /// OCI archive tarball (`oci-archive:`).
    OciArchive,
    /// Object-store-backed docker archive (`s3://`).
    S3,
}

impl Transport {
    /// Returns the transport name as written in references.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Docker => "docker",
            Self::Dir => "dir",
            Self::Oci => "oci",
            Self::DockerArchive => "docker-archive",
            Self::OciArchive => "oci-archive",
            Self::S3 => "s3",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "docker" => Some(Self::Docker),
            "dir" => Some(Self::Dir),
            "oci" => Some(Self::Oci),
            "docker-archive" => Some(Self::DockerArchive),
            "oci-archive" => Some(Self::OciArchive),
            "s3" => Some(Self::S3),
            _ => None,
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed location of an image, per transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Image in a remote registry.
    Registry {
        /// Registry host, with port if present.
        host: String,
        /// Repository path.
        repository: String,
        /// Tag, if present.
        tag: Option<String>,
        /// Digest, if present.
        digest: Option<String>,
    },
    /// Image on the local filesystem.
    Path {
        /// Directory or archive path.
        path: String,
        /// Image selector inside the layout or archive.
        reference: Option<String>,
    },
    /// Archive stored in an object store.
    Object {
        /// Bucket name.
        bucket: String,
        /// Object key.
        key: String,
        /// Image selector inside the archive.
        reference: Option<String>,
    },
}

/// A parsed image reference.
///
/// # Examples
///
/// ```
/// use imgsync_core::{ImageReference, Transport};
///
/// let reference: ImageReference = "docker://localhost:5000/app:v1".parse().unwrap();
/// assert_eq!(reference.transport(), Transport::Docker);
/// assert_eq!(reference.registry_host(), Some("localhost:5000"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    raw: String,
    transport: Transport,
    location: Location,
}

impl ImageReference {
    /// Parses a transport-qualified reference.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidReference`] if the transport is missing or
    /// unknown, or the details are malformed for that transport.
    pub fn parse(input: &str) -> Result<Self> {
        let (name, details) = input
            .split_once(':')
            .ok_or_else(|| Error::invalid_reference(input, "missing transport prefix"))?;
        let transport = Transport::from_name(name).ok_or_else(|| {
            Error::invalid_reference(input, format!("unknown transport '{name}'"))
        })?;

        let location = match transport {
            Transport::Docker => parse_registry(input, details)?,
            Transport::Dir => Location::Path {
                path: non_empty(input, details, "empty directory path")?.to_string(),
                reference: None,
            },
            Transport::Oci | Transport::DockerArchive | Transport::OciArchive => {
                parse_path(input, details)?
            }
            Transport::S3 => parse_object(input, details)?,
        };

        Ok(Self {
            raw: input.to_string(),
            transport,
            location,
        })
    }

    /// Returns the transport.
    #[must_use]
    pub const fn transport(&self) -> Transport {
        self.transport
    }

    /// Returns the parsed location.
    #[must_use]
    pub const fn location(&self) -> &Location {
        &self.location
    }

    /// Returns the reference exactly as given.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the registry host for `docker://` references.
    #[must_use]
    pub fn registry_host(&self) -> Option<&str> {
        match &self.location {
            Location::Registry { host, .. } => Some(host),
            _ => None,
        }
    }

    /// Returns `true` for references addressing a remote registry.
    #[must_use]
    pub const fn is_registry(&self) -> bool {
        matches!(self.transport, Transport::Docker)
    }
}

impl FromStr for ImageReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn non_empty<'a>(input: &str, value: &'a str, reason: &str) -> Result<&'a str> {
    if value.is_empty() {
        Err(Error::invalid_reference(input, reason))
    } else {
        Ok(value)
    }
}

fn parse_registry(input: &str, details: &str) -> Result<Location> {
    let rest = details
        .strip_prefix("//")
        .ok_or_else(|| Error::invalid_reference(input, "docker references must start with //"))?;
    let rest = non_empty(input, rest, "empty docker reference")?;

    let (name, digest) = match rest.split_once('@') {
        Some((name, digest)) => {
            if !digest.contains(':') {
                return Err(Error::invalid_reference(input, "digest must be algorithm:hex"));
            }
            (name, Some(digest.to_string()))
        }
        None => (rest, None),
    };

    // A colon only separates a tag when it follows the last path segment.
    let last_segment = name.rfind('/').map_or(0, |i| i + 1);
    let (name, tag) = match name[last_segment..].rfind(':') {
        Some(i) => {
            let (name, tag) = name.split_at(last_segment + i);
            let tag = non_empty(input, &tag[1..], "empty tag")?;
            (name, Some(tag.to_string()))
        }
        None => (name, None),
    };

    let (host, repository) = match name.split_once('/') {
        Some((first, rest))
            if first.contains('.') || first.contains(':') || first == "localhost" =>
        {
            (first.to_string(), rest.to_string())
        }
        _ if name.contains('/') => (DEFAULT_REGISTRY.to_string(), name.to_string()),
        _ => (DEFAULT_REGISTRY.to_string(), format!("library/{name}")),
    };

    let repository = non_empty(input, &repository, "empty repository")?;
    if !repository
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "._-/".contains(c))
    {
        return Err(Error::invalid_reference(
            input,
            "repository must contain only lowercase letters, digits and separators",
        ));
    }

    Ok(Location::Registry {
        host,
        repository: repository.to_string(),
        tag,
        digest,
    })
}

fn parse_path(input: &str, details: &str) -> Result<Location> {
    let (path, reference) = match details.split_once(':') {
        Some((path, reference)) => (path, Some(reference.to_string())),
        None => (details, None),
    };
    Ok(Location::Path {
        path: non_empty(input, path, "empty path")?.to_string(),
        reference: reference.filter(|r| !r.is_empty()),
    })
}

fn parse_object(input: &str, details: &str) -> Result<Location> {
    let rest = details
        .strip_prefix("//")
        .ok_or_else(|| Error::invalid_reference(input, "s3 references must start with //"))?;
    let (bucket, object) = rest
        .split_once('/')
        .ok_or_else(|| Error::invalid_reference(input, "expected s3://bucket/key"))?;
    let (key, reference) = match object.split_once(':') {
        Some((key, reference)) => (key, Some(reference.to_string())),
        None => (object, None),
    };

    Ok(Location::Object {
        bucket: non_empty(input, bucket, "empty bucket")?.to_string(),
        key: non_empty(input, key, "empty object key")?.to_string(),
        reference: reference.filter(|r| !r.is_empty()),
    })
}
