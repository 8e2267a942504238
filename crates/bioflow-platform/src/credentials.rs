//! Platform credentials

use crate::error::{PlatformError, Result};
use std::env;
use std::fmt;

/// Environment variable holding the access key
pub const ACCESS_KEY_VAR: &str = "MIRACLE_ACCESS_KEY";

/// Environment variable holding the secret key
pub const SECRET_KEY_VAR: &str = "MIRACLE_SECRET_KEY";

/// Access/secret key pair passed to the platform CLIs
///
/// `Debug` never prints the keys.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key: String,
    secret_key: String,
}

impl Credentials {
    /// Create credentials from explicit keys
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Resolve keys: explicit arguments first, then the environment
    pub fn resolve(access_key: Option<&str>, secret_key: Option<&str>) -> Result<Self> {
        Self::resolve_with(access_key, secret_key, |name| env::var(name).ok())
    }

    /// Resolve keys with a custom environment lookup
    ///
    /// Blank values count as absent.
    pub fn resolve_with<F>(access_key: Option<&str>, secret_key: Option<&str>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |given: Option<&str>, argument: &'static str, variable: &'static str| {
            given
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .or_else(|| lookup(variable).filter(|v| !v.trim().is_empty()))
                .ok_or(PlatformError::MissingCredential { argument, variable })
        };

        Ok(Self {
            access_key: pick(access_key, "ak", ACCESS_KEY_VAR)?,
            secret_key: pick(secret_key, "sk", SECRET_KEY_VAR)?,
        })
    }

    /// Access key
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Secret key
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &"***")
            .field("secret_key", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_arguments_take_precedence() {
        let lookup = env_of(&[(ACCESS_KEY_VAR, "env-ak"), (SECRET_KEY_VAR, "env-sk")]);
        let creds = Credentials::resolve_with(Some("arg-ak"), None, lookup).unwrap();
        assert_eq!(creds.access_key(), "arg-ak");
        assert_eq!(creds.secret_key(), "env-sk");
    }

    #[test]
    fn test_blank_argument_falls_back() {
        let lookup = env_of(&[(ACCESS_KEY_VAR, "env-ak"), (SECRET_KEY_VAR, "env-sk")]);
        let creds = Credentials::resolve_with(Some("  "), Some(""), lookup).unwrap();
        assert_eq!(creds.access_key(), "env-ak");
    }

    #[test]
    fn test_missing_secret_names_variable() {
        let lookup = env_of(&[(ACCESS_KEY_VAR, "env-ak")]);
        let err = Credentials::resolve_with(None, None, lookup).unwrap_err();
        assert!(matches!(
            err,
            PlatformError::MissingCredential { variable: SECRET_KEY_VAR, .. }
        ));
    }

    #[test]
    fn test_debug_redacts() {
        let creds = Credentials::new("AKLTabc", "c2VjcmV0");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("AKLTabc"));
        assert!(!debug.contains("c2VjcmV0"));
    }
}
