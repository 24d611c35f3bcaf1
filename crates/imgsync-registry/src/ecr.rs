//! Managed registry (ECR) login.
//!
//! ECR hands out an authorization token that is the base64 encoding of
//! `AWS:<password>`. The token is fetched with a region-scoped client and
//! exchanged for basic auth right before a copy.

use async_trait::async_trait;
use base64::Engine;

use crate::config::RegistryAuth;
use imgsync_core::{Error, Result};

/// Fetches ECR authorization tokens.
#[async_trait]
pub trait EcrTokenProvider: Send + Sync {
    /// Returns the raw (base64) authorization token for `region`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RegistryLogin`] if the token cannot be obtained.
    async fn authorization_token(&self, region: &str) -> Result<String>;
}

/// Decodes an ECR authorization token into basic auth.
///
/// # Errors
///
/// Returns [`Error::RegistryLogin`] if the token is not base64 of `user:password`.
///
/// # Examples
///
/// ```
/// use imgsync_registry::{decode_authorization_token, RegistryAuth};
///
/// // base64("AWS:secret")
/// let auth = decode_authorization_token("us-east-1", "QVdTOnNlY3JldA==").unwrap();
/// assert_eq!(auth, RegistryAuth::basic("AWS", "secret"));
/// ```
pub fn decode_authorization_token(region: &str, token: &str) -> Result<RegistryAuth> {
    let login_error = |reason: String| Error::RegistryLogin {
        region: region.to_string(),
        reason,
    };

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(token.trim())
        .map_err(|e| login_error(format!("invalid authorization token: {e}")))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| login_error("authorization token is not UTF-8".to_string()))?;

    match decoded.split_once(':') {
        Some((username, password)) if !username.is_empty() && !password.is_empty() => {
            Ok(RegistryAuth::basic(username, password))
        }
        _ => Err(login_error(
            "authorization token is not username:password".to_string(),
        )),
    }
}

/// Logs in to ECR in `region` and returns the basic auth to use.
///
/// # Errors
///
/// Propagates provider and token decoding failures.
pub async fn login(provider: &dyn EcrTokenProvider, region: &str) -> Result<RegistryAuth> {
    tracing::debug!(region, "requesting ECR authorization token");
    let token = provider.authorization_token(region).await?;
    decode_authorization_token(region, &token)
}
