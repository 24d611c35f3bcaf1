//! Scoped registry auth files.
//!
//! Basic credentials are handed to the copier through a temporary
//! `auth.json` rather than the command line. The file is removed when the
//! guard drops.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use base64::Engine;
use serde::Serialize;
use tempfile::NamedTempFile;

use imgsync_registry::{RegistryAuth, RegistryContext};

use crate::error::{Result, TransportError};

#[derive(Serialize)]
struct AuthConfig<'a> {
    auths: BTreeMap<&'a str, AuthEntry>,
}

#[derive(Serialize)]
struct AuthEntry {
    auth: String,
}

/// Temporary auth file for one registry.
#[derive(Debug)]
pub struct AuthFile {
    file: NamedTempFile,
}

impl AuthFile {
    /// Writes an auth file for the context when it carries basic auth for a
    /// registry reference; returns `None` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::TempFile`] if the file cannot be written.
    pub fn for_context(ctx: &RegistryContext) -> Result<Option<Self>> {
        let (RegistryAuth::Basic { username, password }, Some(host)) =
            (&ctx.auth, ctx.reference.registry_host())
        else {
            return Ok(None);
        };

        let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
        let config = AuthConfig {
            auths: BTreeMap::from([(host, AuthEntry { auth: encoded })]),
        };
        let to_err = |source| TransportError::TempFile {
            what: "registry auth file",
            source,
        };

        let body = serde_json::to_vec(&config).map_err(|e| to_err(e.into()))?;
        let mut file = tempfile::Builder::new()
            .prefix("imgsync-auth-")
            .suffix(".json")
            .tempfile()
            .map_err(to_err)?;
        file.write_all(&body)
            .and_then(|()| file.flush())
            .map_err(to_err)?;

        Ok(Some(Self { file }))
    }

    /// Path of the auth file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_file_for_basic_auth() {
        let ctx = RegistryContext::builder("docker://ghcr.io/org/app:v1")
            .credentials("user:pass")
            .build()
            .unwrap();
        let auth = AuthFile::for_context(&ctx).unwrap().unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(auth.path()).unwrap()).unwrap();
        // base64("user:pass")
        assert_eq!(
            value,
            serde_json::json!({"auths": {"ghcr.io": {"auth": "dXNlcjpwYXNz"}}})
        );

        let path = auth.path().to_path_buf();
        drop(auth);
        assert!(!path.exists());
    }

    #[test]
    fn test_no_auth_file_without_basic_auth() {
        let anonymous = RegistryContext::builder("docker://ghcr.io/org/app").build().unwrap();
        assert!(AuthFile::for_context(&anonymous).unwrap().is_none());

        let token = RegistryContext::builder("docker://ghcr.io/org/app")
            .credentials("token")
            .build()
            .unwrap();
        assert!(AuthFile::for_context(&token).unwrap().is_none());

        let local = RegistryContext::builder("dir:/tmp/app")
            .credentials("user:pass")
            .build()
            .unwrap();
        assert!(AuthFile::for_context(&local).unwrap().is_none());
    }
}
