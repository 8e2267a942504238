//! Container image addresses

use crate::error::{PlatformError, Result};
use serde::Deserialize;

/// Default image registry host
pub const DEFAULT_REGISTRY: &str = "registry-vpc.miracle.ac.cn";

/// Default registry namespace for built images
pub const DEFAULT_NAMESPACE: &str = "auto-build";

/// Registry host and namespace images are published under
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ImageRegistry {
    pub registry: String,
    pub namespace: String,
}

impl Default for ImageRegistry {
    fn default() -> Self {
        Self {
            registry: DEFAULT_REGISTRY.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl ImageRegistry {
    /// `{registry}/{namespace}/{repo}:{tag}`
    pub fn image_url(&self, repo: &str, tag: &str) -> Result<String> {
        let repo = repo.trim();
        let tag = tag.trim();
        if repo.is_empty() {
            return Err(PlatformError::InvalidArgument {
                name: "repo_name",
                reason: "must not be empty".to_string(),
            });
        }
        if tag.is_empty() {
            return Err(PlatformError::InvalidArgument {
                name: "tag",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(format!("{}/{}/{}:{}", self.registry, self.namespace, repo, tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_image_url() {
        let url = ImageRegistry::default().image_url("gatk", "4.5.0").unwrap();
        assert_eq!(url, "registry-vpc.miracle.ac.cn/auto-build/gatk:4.5.0");
    }

    #[test]
    fn test_blank_tag_rejected() {
        let err = ImageRegistry::default().image_url("gatk", " ").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("tag"));
    }
}
