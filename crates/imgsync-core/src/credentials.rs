//! Credential reference classification and resolution.
//!
//! A credential reference is one of:
//!
//! - a secret store ARN (`arn:aws:secretsmanager:<region>:<account>:secret:<name>`,
//!   any `aws` or `aws-<suffix>` partition)
//! - inline plaintext credentials (`user:pass`), recognized by a `:`
//! - a bare secret name (anything else)
//!
//! Secret values that are valid JSON must be objects carrying non-empty
//! `username` and `password` fields. Non-JSON secrets are used verbatim.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::secret::SecretStore;

const ARN_SERVICE: &str = "secretsmanager";
const ARN_RESOURCE: &str = "secret";

/// Syntactic kind of a credential reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialRef {
    /// Secret store ARN.
    SecretArn,
    /// Secret store name.
    SecretName,
    /// Inline `user:pass` credentials.
    Plaintext,
}

impl CredentialRef {
    /// Classifies a credential reference.
    ///
    /// The empty string classifies as [`CredentialRef::SecretName`]; callers
    /// resolve it to "no credentials" before any lookup happens.
    ///
    /// # Examples
    ///
    /// ```
    /// use imgsync_core::CredentialRef;
    ///
    /// assert_eq!(
    ///     CredentialRef::classify("arn:aws-cn:secretsmanager:cn-north-1:000:secret:creds"),
    ///     CredentialRef::SecretArn
    /// );
    /// assert_eq!(CredentialRef::classify("username:password"), CredentialRef::Plaintext);
    /// assert_eq!(CredentialRef::classify("my-secret"), CredentialRef::SecretName);
    /// ```
    #[must_use]
    pub fn classify(reference: &str) -> Self {
        if is_secret_arn(reference) {
            Self::SecretArn
        } else if reference.contains(':') {
            Self::Plaintext
        } else {
            Self::SecretName
        }
    }

    /// Returns `true` if the reference must be looked up in the secret store.
    #[must_use]
    pub const fn is_secret(self) -> bool {
        matches!(self, Self::SecretArn | Self::SecretName)
    }

    /// Renders a credential reference safe for logs.
    ///
    /// Secret references are not sensitive and are returned unchanged;
    /// plaintext credentials keep only the user part.
    #[must_use]
    pub fn redact(reference: &str) -> String {
        match Self::classify(reference) {
            Self::Plaintext => reference
                .split_once(':')
                .map_or_else(String::new, |(user, _)| format!("{user}:******")),
            Self::SecretArn | Self::SecretName => reference.to_string(),
        }
    }
}

/// Matches `arn:aws(-[\w]+)*:secretsmanager:.+:.+:secret:.+`.
fn is_secret_arn(reference: &str) -> bool {
    let mut parts = reference.splitn(7, ':');
    let (
        Some("arn"),
        Some(partition),
        Some(ARN_SERVICE),
        Some(region),
        Some(account),
        Some(ARN_RESOURCE),
        Some(name),
    ) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    )
    else {
        return false;
    };

    is_aws_partition(partition) && !region.is_empty() && !account.is_empty() && !name.is_empty()
}

fn is_aws_partition(partition: &str) -> bool {
    let Some(rest) = partition.strip_prefix("aws") else {
        return false;
    };
    if rest.is_empty() {
        return true;
    }
    let Some(suffixes) = rest.strip_prefix('-') else {
        return false;
    };
    suffixes.split('-').all(|segment| {
        !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

/// Parses a JSON secret into a `username:password` credential string.
///
/// # Errors
///
/// Returns [`Error::JsonSecret`] if the value is not a JSON object and
/// [`Error::SecretField`] if `username` or `password` is missing or empty.
///
/// # Examples
///
/// ```
/// use imgsync_core::parse_json_secret;
///
/// let creds = parse_json_secret(r#"{"username":"user_val","password":"pass_val"}"#).unwrap();
/// assert_eq!(creds, "user_val:pass_val");
/// ```
pub fn parse_json_secret(secret: &str) -> Result<String> {
    let value: Value = serde_json::from_str(secret).map_err(|e| Error::JsonSecret {
        reason: e.to_string(),
    })?;
    let Value::Object(fields) = value else {
        return Err(Error::JsonSecret {
            reason: "expected a JSON object".to_string(),
        });
    };

    let field = |name: &'static str| {
        fields
            .get(name)
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
            .ok_or(Error::SecretField { field: name })
    };

    let username = field("username")?;
    let password = field("password")?;
    Ok(format!("{username}:{password}"))
}

/// Resolves credential references into credential strings.
pub struct CredentialResolver<'a> {
    store: &'a dyn SecretStore,
}

impl<'a> CredentialResolver<'a> {
    /// Creates a resolver backed by the given secret store.
    #[must_use]
    pub fn new(store: &'a dyn SecretStore) -> Self {
        Self { store }
    }

    /// Resolves a credential reference.
    ///
    /// Returns an empty string for an empty reference (ambient credentials),
    /// the reference itself for plaintext, and the fetched secret otherwise.
    ///
    /// # Errors
    ///
    /// Propagates secret store failures and JSON secret parse failures.
    pub async fn resolve(&self, reference: &str) -> Result<String> {
        if reference.is_empty() {
            return Ok(String::new());
        }

        let kind = CredentialRef::classify(reference);
        if !kind.is_secret() {
            return Ok(reference.to_string());
        }

        tracing::debug!(reference, ?kind, "fetching credentials from secret store");
        let secret = self.store.get_secret(reference).await?;

        // JSON-shaped secrets must carry both fields; no fallback to raw text.
        if !secret.is_empty() && serde_json::from_str::<Value>(&secret).is_ok() {
            return parse_json_secret(&secret);
        }
        Ok(secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret::MemorySecretStore;

    #[test]
    fn test_classify() {
        assert_eq!(
            CredentialRef::classify("arn:aws:secretsmanager:us-west-2:00000:secret:fake-secret"),
            CredentialRef::SecretArn
        );
        assert_eq!(
            CredentialRef::classify("arn:aws-cn:secretsmanager:cn-north-1:00000:secret:fake-secret"),
            CredentialRef::SecretArn
        );
        assert_eq!(
            CredentialRef::classify(
                "arn:aws-us-gov:secretsmanager:us-gov-west-1:00000:secret:fake-secret"
            ),
            CredentialRef::SecretArn
        );
        assert_eq!(CredentialRef::classify("fake-secret"), CredentialRef::SecretName);
        assert_eq!(CredentialRef::classify("username:password"), CredentialRef::Plaintext);
        assert_eq!(CredentialRef::classify(""), CredentialRef::SecretName);
    }

    #[test]
    fn test_classify_non_aws_arn_is_plaintext() {
        assert_eq!(
            CredentialRef::classify("arn:azure:secretsmanager:us-west-2:00000:secret:x"),
            CredentialRef::Plaintext
        );
        assert_eq!(
            CredentialRef::classify("arn:aws:ssm:us-west-2:00000:parameter:x"),
            CredentialRef::Plaintext
        );
        assert_eq!(
            CredentialRef::classify("arn:aws-:secretsmanager:us-west-2:00000:secret:x"),
            CredentialRef::Plaintext
        );
        assert_eq!(
            CredentialRef::classify("arn:aws-çn:secretsmanager:cn-north-1:00000:secret:x"),
            CredentialRef::Plaintext
        );
    }

    #[test]
    fn test_redact() {
        assert_eq!(CredentialRef::redact("user:hunter2"), "user:******");
        assert_eq!(CredentialRef::redact("my-secret"), "my-secret");
    }

    #[test]
    fn test_parse_json_secret() {
        assert_eq!(
            parse_json_secret(r#"{"username":"user_val","password":"pass_val"}"#).unwrap(),
            "user_val:pass_val"
        );

        let err = parse_json_secret(r#"{"user}"#).unwrap_err();
        assert!(err.to_string().starts_with("error parsing json secret:"));

        let err = parse_json_secret(r#"{"password":"pass_val"}"#).unwrap_err();
        assert_eq!(err.to_string(), "error parsing username from json secret");

        let err = parse_json_secret(r#"{"username":"user_val"}"#).unwrap_err();
        assert_eq!(err.to_string(), "error parsing password from json secret");

        let err = parse_json_secret(r#"{"username":"","password":"pass_val"}"#).unwrap_err();
        assert!(matches!(err, Error::SecretField { field: "username" }));

        let err = parse_json_secret("[1, 2]").unwrap_err();
        assert!(matches!(err, Error::JsonSecret { .. }));
    }

    #[tokio::test]
    async fn test_resolve_empty() {
        let store = MemorySecretStore::new();
        let resolver = CredentialResolver::new(&store);
        assert_eq!(resolver.resolve("").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_resolve_plaintext() {
        let store = MemorySecretStore::new();
        let resolver = CredentialResolver::new(&store);
        assert_eq!(resolver.resolve("user:pass").await.unwrap(), "user:pass");
    }

    #[tokio::test]
    async fn test_resolve_json_secret_by_arn() {
        let arn = "arn:aws:secretsmanager:us-east-1:123456789012:secret:creds";
        let store = MemorySecretStore::new()
            .with_secret(arn, r#"{"username":"user_val","password":"pass_val"}"#);
        let resolver = CredentialResolver::new(&store);
        assert_eq!(resolver.resolve(arn).await.unwrap(), "user_val:pass_val");
    }

    #[tokio::test]
    async fn test_resolve_raw_secret_by_name() {
        let store = MemorySecretStore::new().with_secret("docker-hub", "bot:s3cret");
        let resolver = CredentialResolver::new(&store);
        assert_eq!(resolver.resolve("docker-hub").await.unwrap(), "bot:s3cret");
    }

    #[tokio::test]
    async fn test_resolve_json_secret_missing_field_is_fatal() {
        let store = MemorySecretStore::new().with_secret("docker-hub", r#"{"username":"bot"}"#);
        let resolver = CredentialResolver::new(&store);
        let err = resolver.resolve("docker-hub").await.unwrap_err();
        assert!(matches!(err, Error::SecretField { field: "password" }));
    }

    #[tokio::test]
    async fn test_resolve_fetch_failure() {
        let store = MemorySecretStore::new();
        let resolver = CredentialResolver::new(&store);
        let err = resolver.resolve("missing-secret").await.unwrap_err();
        assert!(matches!(err, Error::SecretFetch { .. }));
    }
}
