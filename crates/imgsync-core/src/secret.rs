//! Secret store collaborator.
//!
//! The secret store is an opaque key-value lookup. Implementations return the
//! raw secret string, which is either plaintext credentials or a JSON object
//! with `username` and `password` fields.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Fetches raw secret values by ARN or name.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Returns the raw value of the secret identified by `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SecretFetch`] if the secret cannot be retrieved.
    async fn get_secret(&self, reference: &str) -> Result<String>;
}

/// In-memory secret store.
///
/// Useful for local runs and tests; lookups of unknown references fail the
/// same way a remote store would.
#[derive(Debug, Clone, Default)]
pub struct MemorySecretStore {
    secrets: HashMap<String, String>,
}

impl MemorySecretStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a secret, replacing any previous value under the same reference.
    #[must_use]
    pub fn with_secret(mut self, reference: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets.insert(reference.into(), value.into());
        self
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get_secret(&self, reference: &str) -> Result<String> {
        self.secrets
            .get(reference)
            .cloned()
            .ok_or_else(|| Error::SecretFetch {
                reference: reference.to_string(),
                reason: "secret not found".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_lookup() {
        let store = MemorySecretStore::new().with_secret("registry-creds", "user:pass");
        assert_eq!(store.get_secret("registry-creds").await.unwrap(), "user:pass");
    }

    #[tokio::test]
    async fn test_memory_store_missing() {
        let store = MemorySecretStore::new();
        let err = store.get_secret("nope").await.unwrap_err();
        assert!(matches!(err, Error::SecretFetch { reference, .. } if reference == "nope"));
    }
}
