//! Provider configuration
//!
//! The API key is always supplied from outside, either explicitly or through
//! the environment:
//!
//! | variable | meaning |
//! |---|---|
//! | `DEEPL_API_KEY` | authentication key (required) |
//! | `DEEPL_API_URL` | base URL override, e.g. a proxy or a test server |
//! | `DEEPL_TIMEOUT_SECS` | request timeout in seconds (default 30) |

use crate::error::{MtError, MtResult};
use std::time::Duration;

pub const API_KEY_VAR: &str = "DEEPL_API_KEY";
pub const API_URL_VAR: &str = "DEEPL_API_URL";
pub const TIMEOUT_VAR: &str = "DEEPL_TIMEOUT_SECS";

const PRO_API_URL: &str = "https://api.deepl.com";
const FREE_API_URL: &str = "https://api-free.deepl.com";

/// Connection settings for the DeepL provider
#[derive(Clone, PartialEq, Eq)]
pub struct DeepLConfig {
    pub api_key: String,
    /// Explicit base URL; derived from the key when unset
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl DeepLConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load the configuration from the process environment
    pub fn from_env() -> MtResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load the configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> MtResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                MtError::ConfigError(format!("{} environment variable not set", API_KEY_VAR))
            })?;

        let mut config = Self::new(api_key);

        if let Some(url) = lookup(API_URL_VAR).filter(|url| !url.trim().is_empty()) {
            config.base_url = Some(url);
        }

        if let Some(raw) = lookup(TIMEOUT_VAR) {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                MtError::ConfigError(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    TIMEOUT_VAR, raw
                ))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Base URL to send requests to
    ///
    /// Free-tier keys end in `:fx` and are only accepted by the free endpoint.
    pub fn resolved_base_url(&self) -> &str {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/'),
            None if self.is_free_key() => FREE_API_URL,
            None => PRO_API_URL,
        }
    }

    pub fn is_free_key(&self) -> bool {
        self.api_key.trim_end().ends_with(":fx")
    }
}

impl std::fmt::Debug for DeepLConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepLConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_from_lookup_with_key_only() {
        let config = DeepLConfig::from_lookup(lookup_from(&[(API_KEY_VAR, "secret")])).unwrap();
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.base_url, None);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.resolved_base_url(), "https://api.deepl.com");
    }

    #[test]
    fn test_from_lookup_missing_key() {
        let result = DeepLConfig::from_lookup(lookup_from(&[]));
        match result {
            Err(MtError::ConfigError(msg)) => assert!(msg.contains("not set")),
            other => panic!("Expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_from_lookup_blank_key() {
        assert!(DeepLConfig::from_lookup(lookup_from(&[(API_KEY_VAR, "  ")])).is_err());
    }

    #[test]
    fn test_from_lookup_all_vars() {
        let config = DeepLConfig::from_lookup(lookup_from(&[
            (API_KEY_VAR, "secret"),
            (API_URL_VAR, "http://localhost:9000/"),
            (TIMEOUT_VAR, "5"),
        ]))
        .unwrap();
        assert_eq!(config.resolved_base_url(), "http://localhost:9000");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_from_lookup_bad_timeout() {
        let result = DeepLConfig::from_lookup(lookup_from(&[
            (API_KEY_VAR, "secret"),
            (TIMEOUT_VAR, "soon"),
        ]));
        assert!(matches!(result, Err(MtError::ConfigError(_))));
    }

    #[test]
    fn test_free_key_uses_free_endpoint() {
        let config = DeepLConfig::new("abc-123:fx");
        assert!(config.is_free_key());
        assert_eq!(config.resolved_base_url(), "https://api-free.deepl.com");
    }

    #[test]
    fn test_debug_masks_key() {
        let debug = format!("{:?}", DeepLConfig::new("top-secret"));
        assert!(debug.contains("***"));
        assert!(!debug.contains("top-secret"));
    }
}
