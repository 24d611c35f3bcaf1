//! Staging of object-store archives.
//!
//! An `s3://bucket/key[:ref]` source is fetched into a temporary directory
//! and copied from there as a `docker-archive:` reference.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::TempDir;

use crate::error::{Result, TransportError};

const DEFAULT_ARCHIVE_NAME: &str = "image.tar";

/// Downloads objects to the local filesystem.
#[async_trait]
pub trait ObjectFetcher: Send + Sync {
    /// Writes `bucket/key` to `dest`.
    async fn fetch(&self, bucket: &str, key: &str, dest: &Path) -> Result<()>;
}

/// A fetched archive, removed with its directory on drop.
#[derive(Debug)]
pub struct StagedArchive {
    _dir: TempDir,
    path: PathBuf,
    transport_ref: String,
}

impl StagedArchive {
    /// Fetches `bucket/key` and prepares a reference to the local copy.
    ///
    /// `reference` selects an image inside a multi-image archive.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::TempFile`] if the staging directory cannot
    /// be created, or the fetcher's error.
    pub async fn fetch(
        fetcher: &dyn ObjectFetcher,
        bucket: &str,
        key: &str,
        reference: Option<&str>,
    ) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("imgsync-stage-")
            .tempdir()
            .map_err(|source| TransportError::TempFile {
                what: "staging directory",
                source,
            })?;

        let name = key
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_ARCHIVE_NAME);
        let path = dir.path().join(name);

        tracing::info!(bucket, key, path = %path.display(), "staging archive");
        fetcher.fetch(bucket, key, &path).await?;

        let mut transport_ref = format!("docker-archive:{}", path.display());
        if let Some(reference) = reference {
            transport_ref.push(':');
            transport_ref.push_str(reference);
        }

        Ok(Self {
            _dir: dir,
            path,
            transport_ref,
        })
    }

    /// Local path of the archive.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reference to hand to the copier.
    #[must_use]
    pub fn transport_ref(&self) -> &str {
        &self.transport_ref
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct WriteFetcher;

    #[async_trait]
    impl ObjectFetcher for WriteFetcher {
        async fn fetch(&self, bucket: &str, key: &str, dest: &Path) -> Result<()> {
            std::fs::write(dest, format!("{bucket}/{key}")).map_err(|source| {
                TransportError::TempFile {
                    what: "test archive",
                    source,
                }
            })
        }
    }

    #[tokio::test]
    async fn test_stage_archive() {
        let staged = StagedArchive::fetch(&WriteFetcher, "images", "export/app.tar", Some("app:v1"))
            .await
            .unwrap();

        assert!(staged.path().ends_with("app.tar"));
        assert_eq!(
            std::fs::read_to_string(staged.path()).unwrap(),
            "images/export/app.tar"
        );
        assert_eq!(
            staged.transport_ref(),
            format!("docker-archive:{}:app:v1", staged.path().display())
        );

        let path = staged.path().to_path_buf();
        drop(staged);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_stage_archive_default_name() {
        let staged = StagedArchive::fetch(&WriteFetcher, "images", "export/", None)
            .await
            .unwrap();
        assert!(staged.path().ends_with(DEFAULT_ARCHIVE_NAME));
        assert!(!staged.transport_ref().ends_with(':'));
    }
}
