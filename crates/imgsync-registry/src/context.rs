//! Registry context building.
//!
//! A [`RegistryContext`] is everything the transport needs to address one
//! side of a copy: the parsed reference, the auth to present, the effective
//! architecture choice and TLS settings.

use imgsync_core::{ImageReference, Result};

use crate::config::{RegistryAuth, TlsConfig};
use crate::ecr::{self, EcrTokenProvider};

const ECR_HOST_MARKER: &str = ".dkr.ecr.";
const ECR_HOST_SUFFIXES: [&str; 2] = [".amazonaws.com", ".amazonaws.com.cn"];

/// Returns the effective per-manifest architecture filter.
///
/// Copying a full index delegates selection to the transport's list mode, so
/// no filter applies.
///
/// # Examples
///
/// ```
/// use imgsync_registry::arch_choice;
///
/// assert_eq!(arch_choice("amd64", false), "amd64");
/// assert_eq!(arch_choice("amd64", true), "");
/// ```
#[must_use]
pub fn arch_choice(requested: &str, copy_full_index: bool) -> String {
    if copy_full_index {
        String::new()
    } else {
        requested.to_string()
    }
}

/// Extracts the region from an ECR registry hostname.
///
/// ECR hosts look like `<account>.dkr.ecr.<region>.amazonaws.com`, or end
/// in `.amazonaws.com.cn` in the China partitions. Accepts a bare host or a
/// transport-qualified reference.
///
/// # Examples
///
/// ```
/// use imgsync_registry::ecr_region;
///
/// assert_eq!(
///     ecr_region("docker://1234567890.dkr.ecr.cn-north-1.amazonaws.com.cn/test:ubuntu"),
///     Some("cn-north-1".to_string())
/// );
/// assert_eq!(ecr_region("docker://ghcr.io/org/app"), None);
/// ```
#[must_use]
pub fn ecr_region(reference: &str) -> Option<String> {
    let rest = reference
        .split_once("://")
        .map_or(reference, |(_, rest)| rest);
    let host = rest.split('/').next()?;
    let prefix = ECR_HOST_SUFFIXES
        .iter()
        .find_map(|suffix| host.strip_suffix(suffix))?;
    let (account, region) = prefix.split_once(ECR_HOST_MARKER)?;
    (!account.is_empty() && !region.is_empty() && !region.contains('.'))
        .then(|| region.to_string())
}

/// Connection and auth context for one side of a copy.
#[derive(Debug, Clone)]
pub struct RegistryContext {
    /// Parsed image reference.
    pub reference: ImageReference,

    /// Auth to present to the registry.
    pub auth: RegistryAuth,

    /// Architecture override; empty keeps the transport default.
    pub arch_choice: String,

    /// Region of a managed (ECR) registry.
    pub region: Option<String>,

    /// TLS settings.
    pub tls: TlsConfig,
}

impl RegistryContext {
    /// Starts building a context for `image_ref`.
    ///
    /// # Examples
    ///
    /// ```
    /// use imgsync_registry::{RegistryAuth, RegistryContext};
    ///
    /// let ctx = RegistryContext::builder("docker://123.dkr.ecr.us-west-2.amazonaws.com/app:v1")
    ///     .arch("arm64")
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(ctx.region.as_deref(), Some("us-west-2"));
    /// assert_eq!(ctx.auth, RegistryAuth::aws_ecr("us-west-2"));
    /// assert_eq!(ctx.arch_choice, "arm64");
    /// ```
    #[must_use]
    pub fn builder(image_ref: impl Into<String>) -> ContextBuilder {
        ContextBuilder::new(image_ref)
    }

    /// Exchanges pending ECR auth for basic auth.
    ///
    /// Contexts with any other auth are left untouched.
    ///
    /// # Errors
    ///
    /// Propagates ECR login failures.
    pub async fn authenticate(&mut self, provider: &dyn EcrTokenProvider) -> Result<()> {
        if let RegistryAuth::AwsEcr { region } = &self.auth {
            let region = region.clone();
            tracing::info!(reference = %self.reference, region = %region, "ECR auto login");
            self.auth = ecr::login(provider, &region).await?;
        }
        Ok(())
    }
}

/// Builder for [`RegistryContext`].
#[derive(Debug, Default)]
pub struct ContextBuilder {
    image_ref: String,
    arch: String,
    copy_full_index: bool,
    credentials: String,
    tls: TlsConfig,
}

impl ContextBuilder {
    fn new(image_ref: impl Into<String>) -> Self {
        Self {
            image_ref: image_ref.into(),
            ..Self::default()
        }
    }

    /// Sets the requested architecture.
    #[must_use]
    pub fn arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = arch.into();
        self
    }

    /// Selects full-index copying.
    #[must_use]
    pub const fn copy_full_index(mut self, enabled: bool) -> Self {
        self.copy_full_index = enabled;
        self
    }

    /// Sets the resolved credential string (possibly empty).
    #[must_use]
    pub fn credentials(mut self, creds: impl Into<String>) -> Self {
        self.credentials = creds.into();
        self
    }

    /// Sets the TLS configuration.
    #[must_use]
    pub fn tls(mut self, tls: TlsConfig) -> Self {
        self.tls = tls;
        self
    }

    /// Builds the context.
    ///
    /// # Errors
    ///
    /// Returns a reference error for unaddressable references and a
    /// credential error for malformed credential text.
    pub fn build(self) -> Result<RegistryContext> {
        let reference = ImageReference::parse(&self.image_ref)?;
        let region = reference.registry_host().and_then(ecr_region);

        let auth = match RegistryAuth::from_credentials(&self.credentials)? {
            RegistryAuth::None => match &region {
                Some(region) => RegistryAuth::aws_ecr(region.clone()),
                None => RegistryAuth::None,
            },
            explicit => {
                tracing::info!(reference = %reference, "credentials login mode");
                explicit
            }
        };

        Ok(RegistryContext {
            reference,
            auth,
            arch_choice: arch_choice(&self.arch, self.copy_full_index),
            region,
            tls: self.tls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use imgsync_core::{Error, ErrorKind};

    struct FixedToken;

    #[async_trait]
    impl EcrTokenProvider for FixedToken {
        async fn authorization_token(&self, region: &str) -> Result<String> {
            assert_eq!(region, "us-west-2");
            Ok("QVdTOnB3".to_string())
        }
    }

    struct NoLogin;

    #[async_trait]
    impl EcrTokenProvider for NoLogin {
        async fn authorization_token(&self, region: &str) -> Result<String> {
            Err(Error::RegistryLogin {
                region: region.to_string(),
                reason: "should not be called".to_string(),
            })
        }
    }

    #[test]
    fn test_arch_choice() {
        assert_eq!(arch_choice("amd64", false), "amd64");
        assert_eq!(arch_choice("amd64", true), "");
        assert_eq!(arch_choice("arm64", false), "arm64");
        assert_eq!(arch_choice("arm64", true), "");
    }

    #[test]
    fn test_ecr_region() {
        assert_eq!(
            ecr_region("docker://1234567890.dkr.ecr.us-west-2.amazonaws.com/test:ubuntu").as_deref(),
            Some("us-west-2")
        );
        assert_eq!(
            ecr_region("docker://1234567890.dkr.ecr.us-east-1.amazonaws.com/test:ubuntu").as_deref(),
            Some("us-east-1")
        );
        assert_eq!(
            ecr_region("docker://1234567890.dkr.ecr.cn-north-1.amazonaws.com/test:ubuntu").as_deref(),
            Some("cn-north-1")
        );
        assert_eq!(ecr_region("docker://public.ecr.aws/nginx/nginx"), None);
        assert_eq!(ecr_region("1.dkr.ecr.eu-west-1.amazonaws.com").as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn test_ecr_region_requires_aws_host() {
        assert_eq!(ecr_region("docker://1.dkr.ecr.us-east-1.evil.example/app"), None);
        assert_eq!(ecr_region("docker://ghcr.io/1.dkr.ecr.us-east-1.amazonaws.com/app"), None);
        assert_eq!(ecr_region("docker://1.dkr.ecr.us-east-1.amazonaws.com.evil.example/app"), None);
        assert_eq!(ecr_region("docker://dkr.ecr.us-east-1.amazonaws.com/app"), None);
    }

    #[test]
    fn test_build_lookalike_host_has_no_ecr_auth() {
        let ctx = RegistryContext::builder("docker://1.dkr.ecr.us-east-1.evil.example/app:v1")
            .build()
            .unwrap();
        assert_eq!(ctx.auth, RegistryAuth::None);
        assert!(ctx.region.is_none());
    }

    #[test]
    fn test_build_with_credentials_skips_ecr_login() {
        let ctx = RegistryContext::builder("docker://1.dkr.ecr.us-west-2.amazonaws.com/app:v1")
            .credentials("user:pass")
            .build()
            .unwrap();
        assert_eq!(ctx.auth, RegistryAuth::basic("user", "pass"));
        assert_eq!(ctx.region.as_deref(), Some("us-west-2"));
    }

    #[test]
    fn test_build_full_index_clears_arch() {
        let ctx = RegistryContext::builder("docker://ghcr.io/org/app:v1")
            .arch("arm64")
            .copy_full_index(true)
            .build()
            .unwrap();
        assert!(ctx.arch_choice.is_empty());
        assert!(ctx.auth.is_none());
        assert!(ctx.region.is_none());
    }

    #[test]
    fn test_build_local_reference() {
        let ctx = RegistryContext::builder("dir:/tmp/app.dir").build().unwrap();
        assert!(ctx.auth.is_none());
        assert!(!ctx.reference.is_registry());
    }

    #[test]
    fn test_build_rejects_bad_reference() {
        let err = RegistryContext::builder("nginx:latest").build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Reference);
    }

    #[tokio::test]
    async fn test_authenticate_ecr() {
        let mut ctx = RegistryContext::builder("docker://1.dkr.ecr.us-west-2.amazonaws.com/app")
            .build()
            .unwrap();
        ctx.authenticate(&FixedToken).await.unwrap();
        assert_eq!(ctx.auth, RegistryAuth::basic("AWS", "pw"));
    }

    #[tokio::test]
    async fn test_authenticate_leaves_explicit_auth() {
        let mut ctx = RegistryContext::builder("docker://ghcr.io/org/app")
            .credentials("token-only")
            .build()
            .unwrap();
        ctx.authenticate(&NoLogin).await.unwrap();
        assert_eq!(ctx.auth, RegistryAuth::bearer("token-only"));
    }
}
