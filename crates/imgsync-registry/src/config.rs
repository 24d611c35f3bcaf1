//! Authentication and TLS settings for registry access.

use std::path::PathBuf;

use imgsync_core::{Error, Result};

/// Authentication methods for registry access.
#[derive(Clone, PartialEq, Eq)]
pub enum RegistryAuth {
    /// No explicit credentials (ambient or anonymous access).
    None,

    /// Basic authentication (username/password or username/token).
    Basic {
        /// Username.
        username: String,
        /// Password or token.
        password: String,
    },

    /// Bearer token authentication.
    Bearer {
        /// Token value.
        token: String,
    },

    /// AWS ECR authentication, exchanged for basic auth before copying.
    AwsEcr {
        /// AWS region.
        region: String,
    },
}

impl RegistryAuth {
    /// Creates basic authentication.
    ///
    /// # Examples
    ///
    /// ```
    /// use imgsync_registry::RegistryAuth;
    ///
    /// let auth = RegistryAuth::basic("user", "pass");
    /// ```
    #[must_use]
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Creates bearer token authentication.
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// Creates AWS ECR authentication.
    #[must_use]
    pub fn aws_ecr(region: impl Into<String>) -> Self {
        Self::AwsEcr {
            region: region.into(),
        }
    }

    /// Turns a resolved credential string into auth.
    ///
    /// `user:pass` (split at the first `:`) becomes [`RegistryAuth::Basic`],
    /// any other non-empty string a [`RegistryAuth::Bearer`] token, and the
    /// empty string [`RegistryAuth::None`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredentials`] if the username is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use imgsync_registry::RegistryAuth;
    ///
    /// assert_eq!(
    ///     RegistryAuth::from_credentials("user:p:w").unwrap(),
    ///     RegistryAuth::basic("user", "p:w")
    /// );
    /// assert_eq!(RegistryAuth::from_credentials("").unwrap(), RegistryAuth::None);
    /// ```
    pub fn from_credentials(creds: &str) -> Result<Self> {
        if creds.is_empty() {
            return Ok(Self::None);
        }
        match creds.split_once(':') {
            Some(("", _)) => Err(Error::InvalidCredentials {
                reason: "empty username".to_string(),
            }),
            Some((username, password)) => Ok(Self::basic(username, password)),
            None => Ok(Self::bearer(creds)),
        }
    }

    /// Returns `true` if no credentials are configured.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

// Keeps secrets out of logs; `{:?}` on a context must be safe.
impl std::fmt::Debug for RegistryAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Bearer { .. } => f.debug_struct("Bearer").field("token", &"<redacted>").finish(),
            Self::AwsEcr { region } => f.debug_struct("AwsEcr").field("region", region).finish(),
        }
    }
}

/// TLS configuration for registry connections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsConfig {
    /// Directory of CA certificates (`*.crt`) and client pairs (`*.cert`/`*.key`).
    pub cert_dir: Option<PathBuf>,

    /// Whether to skip certificate verification (NOT recommended for production).
    pub insecure_skip_verify: bool,
}

impl TlsConfig {
    /// Creates a new TLS configuration with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cert_dir: None,
            insecure_skip_verify: false,
        }
    }

    /// Sets the certificate directory.
    #[must_use]
    pub fn with_cert_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.cert_dir = Some(path.into());
        self
    }

    /// Enables insecure mode (skips certificate verification).
    ///
    /// # Warning
    ///
    /// This should only be used for testing. Never use in production.
    #[must_use]
    pub const fn insecure(mut self) -> Self {
        self.insecure_skip_verify = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth() {
        let auth = RegistryAuth::basic("user", "pass");
        assert!(matches!(
            auth,
            RegistryAuth::Basic { username, password }
            if username == "user" && password == "pass"
        ));
    }

    #[test]
    fn test_from_credentials() {
        assert_eq!(
            RegistryAuth::from_credentials("user_val:pass_val").unwrap(),
            RegistryAuth::basic("user_val", "pass_val")
        );
        assert_eq!(
            RegistryAuth::from_credentials("ghp_token").unwrap(),
            RegistryAuth::bearer("ghp_token")
        );
        assert!(RegistryAuth::from_credentials("").unwrap().is_none());
        assert!(matches!(
            RegistryAuth::from_credentials(":pass"),
            Err(Error::InvalidCredentials { .. })
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let basic = format!("{:?}", RegistryAuth::basic("user", "hunter2"));
        assert!(basic.contains("user"));
        assert!(!basic.contains("hunter2"));

        let bearer = format!("{:?}", RegistryAuth::bearer("tok-123"));
        assert!(!bearer.contains("tok-123"));
    }

    #[test]
    fn test_tls_config() {
        let tls = TlsConfig::new().with_cert_dir("/etc/containers/certs.d/registry");
        assert_eq!(
            tls.cert_dir,
            Some(PathBuf::from("/etc/containers/certs.d/registry"))
        );
        assert!(!tls.insecure_skip_verify);
        assert!(TlsConfig::new().insecure().insecure_skip_verify);
    }
}
