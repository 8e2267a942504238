//! Configuration file parsing for the MCP server.
//!
//! Loads registry, reranker, platform and image registry settings from a
//! TOML file. Every section and key is optional; missing values fall back
//! to the public defaults.

use bioflow_dockstore::backend::DEFAULT_SEARCH_TIMEOUT_SECS;
use bioflow_dockstore::formatter::DEFAULT_WORKFLOW_BASE_URL;
use bioflow_dockstore::query::DEFAULT_RESULT_SIZE;
use bioflow_dockstore::{DEFAULT_RERANK_TIMEOUT_SECS, DEFAULT_SEARCH_URL, DEFAULT_TOP_N};
use bioflow_platform::{ImageRegistry, ProgramNames, DEFAULT_ENDPOINT};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        /// Config path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Value out of range
    #[error("Invalid configuration value {field}: {reason}")]
    Invalid {
        /// Dotted key of the offending value
        field: &'static str,
        /// What was wrong
        reason: &'static str,
    },
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Workflow registry search
    pub dockstore: DockstoreConfig,
    /// Rerank service
    pub rerank: RerankConfig,
    /// Platform CLIs
    pub platform: PlatformConfig,
    /// Container image registry
    pub docker: ImageRegistry,
}

/// `[dockstore]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DockstoreConfig {
    /// Search backend endpoint
    pub search_url: String,
    /// Base of workflow page links
    pub workflow_base_url: String,
    /// Hits requested from the backend
    pub result_size: usize,
    /// Upper bound for one backend call
    pub search_timeout_secs: u64,
    /// Results kept when a call does not say
    pub default_top_n: usize,
}

impl Default for DockstoreConfig {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            workflow_base_url: DEFAULT_WORKFLOW_BASE_URL.to_string(),
            result_size: DEFAULT_RESULT_SIZE,
            search_timeout_secs: DEFAULT_SEARCH_TIMEOUT_SECS,
            default_top_n: DEFAULT_TOP_N,
        }
    }
}

/// `[rerank]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RerankConfig {
    /// Rerank service endpoint; unset disables reranking
    pub url: Option<String>,
    /// Upper bound for one rerank call
    pub timeout_secs: u64,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: DEFAULT_RERANK_TIMEOUT_SECS,
        }
    }
}

/// `[platform]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Platform endpoint used when a call does not name one
    pub endpoint: String,
    /// Upper bound for one CLI call; unset means no limit
    pub command_timeout_secs: Option<u64>,
    /// Program names or paths
    pub programs: ProgramNames,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            command_timeout_secs: None,
            programs: ProgramNames::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason| Err(ConfigError::Invalid { field, reason });

        if self.dockstore.search_url.trim().is_empty() {
            return invalid("dockstore.search_url", "must not be empty");
        }
        if self.dockstore.workflow_base_url.trim().is_empty() {
            return invalid("dockstore.workflow_base_url", "must not be empty");
        }
        if self.dockstore.result_size == 0 {
            return invalid("dockstore.result_size", "must be positive");
        }
        if self.dockstore.search_timeout_secs == 0 {
            return invalid("dockstore.search_timeout_secs", "must be positive");
        }
        if self.dockstore.default_top_n == 0 {
            return invalid("dockstore.default_top_n", "must be positive");
        }
        if self.rerank.url.as_deref().is_some_and(|u| u.trim().is_empty()) {
            return invalid("rerank.url", "must not be empty when set");
        }
        if self.rerank.timeout_secs == 0 {
            return invalid("rerank.timeout_secs", "must be positive");
        }
        if self.platform.endpoint.trim().is_empty() {
            return invalid("platform.endpoint", "must not be empty");
        }
        if self.platform.command_timeout_secs == Some(0) {
            return invalid("platform.command_timeout_secs", "must be positive when set");
        }
        if self.docker.registry.trim().is_empty() || self.docker.namespace.trim().is_empty() {
            return invalid("docker", "registry and namespace must not be empty");
        }
        Ok(())
    }

    /// Backend call bound
    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.dockstore.search_timeout_secs)
    }

    /// Rerank call bound
    pub fn rerank_timeout(&self) -> Duration {
        Duration::from_secs(self.rerank.timeout_secs)
    }

    /// CLI call bound, if any
    pub fn command_timeout(&self) -> Option<Duration> {
        self.platform.command_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.dockstore.result_size, 201);
        assert_eq!(config.dockstore.default_top_n, 3);
        assert_eq!(config.rerank.url, None);
        assert_eq!(config.rerank_timeout(), Duration::from_secs(60));
        assert_eq!(config.platform.endpoint, "https://bio-top.miracle.ac.cn");
        assert_eq!(config.docker.namespace, "auto-build");
        assert_eq!(config.command_timeout(), None);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            [dockstore]
            search_url = "http://localhost:9200/_search"
            default_top_n = 5

            [rerank]
            url = "http://localhost:8000/rerank"
            timeout_secs = 15

            [platform]
            command_timeout_secs = 600

            [platform.programs]
            womtool = "/opt/womtool"

            [docker]
            namespace = "team-a"
        "#;

        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.dockstore.search_url, "http://localhost:9200/_search");
        assert_eq!(config.dockstore.default_top_n, 5);
        assert_eq!(config.dockstore.result_size, 201);
        assert_eq!(config.rerank.url.as_deref(), Some("http://localhost:8000/rerank"));
        assert_eq!(config.rerank_timeout(), Duration::from_secs(15));
        assert_eq!(config.command_timeout(), Some(Duration::from_secs(600)));
        assert_eq!(config.platform.programs.womtool, "/opt/womtool");
        assert_eq!(config.platform.programs.bw, "bw");
        assert_eq!(config.docker.registry, "registry-vpc.miracle.ac.cn");
        assert_eq!(config.docker.namespace, "team-a");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = Config::from_toml("[rerank]\ntimeout_secs = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: "rerank.timeout_secs", .. }
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file("/nonexistent/bioflow.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/bioflow.toml"));
    }
}
