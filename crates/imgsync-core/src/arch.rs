//! Per-architecture tag planning.
//!
//! An [`ArchTagPlan`] maps architecture identifiers (`amd64`, `arm64`, ...)
//! to destination tags. Each entry becomes one extra single-architecture
//! copy after the primary copy.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Mapping from architecture identifier to destination tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchTagPlan {
    tags: BTreeMap<String, String>,
}

impl ArchTagPlan {
    /// Parses a JSON object of `architecture -> tag` strings.
    ///
    /// An empty input yields an empty plan.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArchImageTags`] if the input is not a JSON object of
    /// string values.
    ///
    /// # Examples
    ///
    /// ```
    /// use imgsync_core::ArchTagPlan;
    ///
    /// let plan = ArchTagPlan::parse(r#"{"amd64":"v1.0-amd64", "arm64":"v1.0-arm64"}"#).unwrap();
    /// assert_eq!(plan.len(), 2);
    /// assert!(ArchTagPlan::parse("").unwrap().is_empty());
    /// ```
    pub fn parse(mapping: &str) -> Result<Self> {
        if mapping.is_empty() {
            return Ok(Self::default());
        }
        let tags: BTreeMap<String, String> =
            serde_json::from_str(mapping).map_err(|e| Error::ArchImageTags {
                reason: e.to_string(),
            })?;
        Ok(Self { tags })
    }

    /// Returns the destination tag planned for `arch`.
    #[must_use]
    pub fn get(&self, arch: &str) -> Option<&str> {
        self.tags.get(arch).map(String::as_str)
    }

    /// Returns `true` if no fan-out is planned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Number of planned fan-out copies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Iterates `(architecture, tag)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(a, t)| (a.as_str(), t.as_str()))
    }

    /// Rewrites the tag of `base` to `tag`, or appends it if `base` has none.
    ///
    /// Only a `:` after the last `/` is treated as a tag separator, so a
    /// registry port is left alone. A trailing `@digest` is dropped in favour
    /// of the tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use imgsync_core::ArchTagPlan;
    ///
    /// assert_eq!(
    ///     ArchTagPlan::destination_for("docker://localhost:5000/repo", "v1"),
    ///     "docker://localhost:5000/repo:v1"
    /// );
    /// ```
    #[must_use]
    pub fn destination_for(base: &str, tag: &str) -> String {
        let name_start = base.rfind('/').map_or(0, |i| i + 1);
        let (head, name) = base.split_at(name_start);
        let name = name.split_once('@').map_or(name, |(name, _digest)| name);
        let name = name.rsplit_once(':').map_or(name, |(name, _tag)| name);
        format!("{head}{name}:{tag}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plan() {
        let plan = ArchTagPlan::parse(r#"{"amd64":"v1.0-amd64", "arm64":"v1.0-arm64"}"#).unwrap();
        assert_eq!(plan.get("amd64"), Some("v1.0-amd64"));
        assert_eq!(plan.get("arm64"), Some("v1.0-arm64"));
        assert_eq!(plan.get("s390x"), None);
    }

    #[test]
    fn test_parse_malformed() {
        let err = ArchTagPlan::parse(r#"{"amd64":"v1.0-amd64""#).unwrap_err();
        assert!(err.to_string().contains("error parsing arch image tags"));
    }

    #[test]
    fn test_parse_non_string_values() {
        let err = ArchTagPlan::parse(r#"{"amd64": 1}"#).unwrap_err();
        assert!(matches!(err, Error::ArchImageTags { .. }));
    }

    #[test]
    fn test_parse_empty_object() {
        assert!(ArchTagPlan::parse("{}").unwrap().is_empty());
    }

    #[test]
    fn test_destination_for() {
        assert_eq!(
            ArchTagPlan::destination_for("registry/repo:latest", "v1.0-amd64"),
            "registry/repo:v1.0-amd64"
        );
        assert_eq!(
            ArchTagPlan::destination_for("registry/repo", "v1.0-arm64"),
            "registry/repo:v1.0-arm64"
        );
        assert_eq!(
            ArchTagPlan::destination_for(
                "docker://123456789.dkr.ecr.us-west-2.amazonaws.com/my-repo:latest",
                "v1.0-amd64"
            ),
            "docker://123456789.dkr.ecr.us-west-2.amazonaws.com/my-repo:v1.0-amd64"
        );
        assert_eq!(
            ArchTagPlan::destination_for(
                "docker://123456789.dkr.ecr.us-west-2.amazonaws.com/my-repo",
                "v1.0-arm64"
            ),
            "docker://123456789.dkr.ecr.us-west-2.amazonaws.com/my-repo:v1.0-arm64"
        );
    }

    #[test]
    fn test_destination_for_port_and_digest() {
        assert_eq!(
            ArchTagPlan::destination_for("docker://localhost:5000/team/app:1.2", "arm64"),
            "docker://localhost:5000/team/app:arm64"
        );
        assert_eq!(
            ArchTagPlan::destination_for("docker://registry/app@sha256:abcd", "arm64"),
            "docker://registry/app:arm64"
        );
    }
}
