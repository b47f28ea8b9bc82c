//! Static configuration for an [`XEntropy`](crate::XEntropy) instance.
//!
//! Built once by the caller (directly or from the environment) and handed to
//! the facade. Nothing in here changes after construction.

use std::fmt;
use std::time::Duration;

use crate::error::{Result, XEntropyError};
use crate::rate_limit::RetryPolicy;

/// Value shipped in sample configs; never a usable key.
pub const PLACEHOLDER_API_KEY: &str = "your-xai-api-key";

pub const DEFAULT_ENDPOINT: &str = "https://api.x.ai/v1/search";
pub const DEFAULT_QUERY: &str = "*";
pub const DEFAULT_DOMAIN: &str = "x.com";
/// API limit per request.
pub const DEFAULT_MAX_RESULTS: u32 = 50;
pub const DEFAULT_ENTROPY_BITS: u32 = 128;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable names read by [`XEntropyConfig::from_env`].
pub mod env {
    pub const API_KEY: &str = "XAI_API_KEY";
    pub const ENDPOINT: &str = "XENTROPY_ENDPOINT";
    pub const RATE_LIMIT_MS: &str = "XENTROPY_RATE_LIMIT_MS";
    pub const ENTROPY_BITS: &str = "XENTROPY_ENTROPY_BITS";
    pub const MAX_ATTEMPTS: &str = "XENTROPY_MAX_ATTEMPTS";
    pub const DEADLINE_SECS: &str = "XENTROPY_DEADLINE_SECS";
    pub const REQUEST_TIMEOUT_SECS: &str = "XENTROPY_REQUEST_TIMEOUT_SECS";
}

/// Bearer credential for the search API. Formatting never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Raw key, for building the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// True for empty, blank, or placeholder keys.
    pub fn is_unset(&self) -> bool {
        let key = self.0.trim();
        key.is_empty() || key == PLACEHOLDER_API_KEY
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unset() {
            f.write_str("<unset>")
        } else {
            f.write_str("<redacted>")
        }
    }
}

/// Everything a facade needs to know before its first call.
#[derive(Debug, Clone)]
pub struct XEntropyConfig {
    pub api_key: ApiKey,
    /// Search endpoint receiving the POST.
    pub endpoint: String,
    /// Match-all query string.
    pub query: String,
    /// Domains the search is restricted to.
    pub domains: Vec<String>,
    pub max_results: u32,
    /// Raw entropy target; collection stops once `ceil(bits / 8)` bytes exist.
    pub entropy_bits: u32,
    pub retry: RetryPolicy,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
}

impl XEntropyConfig {
    /// Defaults for everything except the credential.
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            query: DEFAULT_QUERY.to_string(),
            domains: vec![DEFAULT_DOMAIN.to_string()],
            max_results: DEFAULT_MAX_RESULTS,
            entropy_bits: DEFAULT_ENTROPY_BITS,
            retry: RetryPolicy::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// Unset variables keep their defaults; a set but unparsable number is a
    /// configuration error. `XENTROPY_DEADLINE_SECS=0` disables the deadline.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = ApiKey::new(lookup(env::API_KEY).unwrap_or_default());
        let mut config = Self::new(api_key);

        if let Some(endpoint) = lookup(env::ENDPOINT) {
            config.endpoint = endpoint;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, env::RATE_LIMIT_MS)? {
            config.retry.delay = Duration::from_millis(ms);
        }
        if let Some(bits) = parse_var::<u32>(&lookup, env::ENTROPY_BITS)? {
            config.entropy_bits = bits;
        }
        if let Some(attempts) = parse_var::<u32>(&lookup, env::MAX_ATTEMPTS)? {
            config.retry.max_attempts = Some(attempts);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, env::DEADLINE_SECS)? {
            config.retry.deadline = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(secs) = parse_var::<u64>(&lookup, env::REQUEST_TIMEOUT_SECS)? {
            config.request_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Reject configurations that cannot work. Called by the facade
    /// constructor; a failure here is fatal.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_unset() {
            return Err(XEntropyError::Configuration(
                "xAI API key is not set or invalid".to_string(),
            ));
        }
        if self.entropy_bits == 0 {
            return Err(XEntropyError::Configuration(
                "entropy_bits must be positive".to_string(),
            ));
        }
        if self.max_results == 0 {
            return Err(XEntropyError::Configuration(
                "max_results must be positive".to_string(),
            ));
        }
        if self.domains.is_empty() {
            return Err(XEntropyError::Configuration(
                "at least one search domain is required".to_string(),
            ));
        }
        reqwest::Url::parse(&self.endpoint).map_err(|e| {
            XEntropyError::Configuration(format!("invalid endpoint {:?}: {e}", self.endpoint))
        })?;
        Ok(())
    }

    /// Bytes of raw entropy to collect per call.
    pub fn target_bytes(&self) -> usize {
        (self.entropy_bits as usize).div_ceil(8)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
            XEntropyError::Configuration(format!("{name}={raw:?} is not valid: {e}"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_match_reference_settings() {
        let config = XEntropyConfig::new(ApiKey::new("k"));
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.query, "*");
        assert_eq!(config.domains, vec!["x.com".to_string()]);
        assert_eq!(config.max_results, 50);
        assert_eq!(config.retry.delay, Duration::from_millis(1200));
        assert_eq!(config.target_bytes(), 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn placeholder_and_blank_keys_are_rejected() {
        for key in ["", "   ", PLACEHOLDER_API_KEY] {
            let config = XEntropyConfig::new(ApiKey::new(key));
            assert!(
                matches!(config.validate(), Err(XEntropyError::Configuration(_))),
                "key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn api_key_never_formats_the_secret() {
        let key = ApiKey::new("sk-super-secret");
        assert!(!format!("{key:?}").contains("secret"));
        assert!(!format!("{key}").contains("secret"));
        assert_eq!(key.expose(), "sk-super-secret");
    }

    #[test]
    fn target_bytes_rounds_up() {
        let mut config = XEntropyConfig::new(ApiKey::new("k"));
        config.entropy_bits = 129;
        assert_eq!(config.target_bytes(), 17);
        config.entropy_bits = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn from_lookup_reads_overrides() {
        let config = XEntropyConfig::from_lookup(lookup_from(&[
            (env::API_KEY, "abc"),
            (env::ENDPOINT, "http://127.0.0.1:9/v1/search"),
            (env::RATE_LIMIT_MS, "5"),
            (env::ENTROPY_BITS, "64"),
            (env::MAX_ATTEMPTS, "10"),
            (env::DEADLINE_SECS, "0"),
        ]))
        .unwrap();
        assert_eq!(config.api_key.expose(), "abc");
        assert_eq!(config.endpoint, "http://127.0.0.1:9/v1/search");
        assert_eq!(config.retry.delay, Duration::from_millis(5));
        assert_eq!(config.target_bytes(), 8);
        assert_eq!(config.retry.max_attempts, Some(10));
        assert_eq!(config.retry.deadline, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn from_lookup_rejects_garbage_numbers() {
        let result = XEntropyConfig::from_lookup(lookup_from(&[
            (env::API_KEY, "abc"),
            (env::RATE_LIMIT_MS, "fast"),
        ]));
        assert!(matches!(result, Err(XEntropyError::Configuration(_))));
    }

    #[test]
    fn missing_key_loads_but_fails_validation() {
        let config = XEntropyConfig::from_lookup(lookup_from(&[])).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_endpoint_is_rejected() {
        let mut config = XEntropyConfig::new(ApiKey::new("k"));
        config.endpoint = "not a url".to_string();
        assert!(config.validate().is_err());
    }
}
