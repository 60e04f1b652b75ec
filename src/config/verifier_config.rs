use crate::error::{Result, VerifierError};
use crate::utils::HeaderUtils;
use std::collections::BTreeMap;
use std::time::Duration;

/// Public demo API the built-in catalog targets
pub const DEFAULT_BASE_URL: &str = "https://fakerestapi.azurewebsites.net";

/// Setup-time configuration, immutable once handed to a verifier
#[derive(Debug, Clone, PartialEq)]
pub struct VerifierConfig {
    /// Base URL prepended to every resolved path (Default: Fake REST API)
    pub base_url: String,

    /// Timeout applied to each request (Default: 30s)
    pub default_timeout: Duration,

    /// Headers sent with every request; per-request headers win (Default: accept JSON)
    pub default_headers: BTreeMap<String, String>,

    /// Upper bound on in-flight verifications in a suite run (Default: 8)
    pub max_concurrency: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        let mut default_headers = BTreeMap::new();
        default_headers.insert("accept".to_string(), "application/json".to_string());
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_timeout: Duration::from_secs(30),
            default_headers,
            max_concurrency: 8,
        }
    }
}

impl VerifierConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration against another base URL
    pub fn for_base_url<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// One request at a time with a shorter timeout, for CI runs against a shared service
    pub fn sequential() -> Self {
        Self {
            default_timeout: Duration::from_secs(10),
            max_concurrency: 1,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_header<K: AsRef<str>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.default_headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Validate the configuration values
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(VerifierError::Configuration(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }

        if self.default_timeout.is_zero() {
            return Err(VerifierError::Configuration(
                "default_timeout must be greater than 0".to_string(),
            ));
        }

        if self.max_concurrency == 0 {
            return Err(VerifierError::Configuration(
                "max_concurrency must be greater than 0".to_string(),
            ));
        }

        HeaderUtils::validate(&self.default_headers)?;

        Ok(())
    }
}
