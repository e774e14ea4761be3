//! Configuration for Vercel API clients.
//!
//! [`ClientConfig`] can be built in code, deserialised from a file, or read
//! from the same environment variables the Terraform provider honours.

use crate::client::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Environment variable holding the API token.
pub const ENV_API_TOKEN: &str = "VERCEL_API_TOKEN";
/// Environment variable holding the default team id or slug.
///
/// A slug is not a valid `teamId`; it has to be resolved to a `team_...` id
/// before the client is built.
pub const ENV_TEAM: &str = "VERCEL_TEAM";
/// Environment variable overriding the API base URL.
pub const ENV_API_URL: &str = "VERCEL_API_URL";
/// Environment variable overriding the request timeout, in seconds.
pub const ENV_REQUEST_TIMEOUT: &str = "VERCEL_REQUEST_TIMEOUT";

/// Configuration for a Vercel client instance.
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct ClientConfig {
    /// API base URL
    #[validate(url)]
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Bearer token used for every request
    #[serde(default, skip_serializing)]
    pub api_token: Option<String>,

    /// Team that requests are scoped to unless a call overrides it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,

    /// Total request timeout in seconds
    #[validate(range(min = 1, max = 600))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ClientConfig {
    /// Create a configuration for the given token with default settings.
    #[must_use]
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: Some(api_token.into()),
            ..Self::default()
        }
    }

    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is malformed or validation fails.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unset or empty variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout is not a number or validation fails.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut config = Self::default();
        if let Some(url) = get(ENV_API_URL) {
            config.api_url = url;
        }
        config.api_token = get(ENV_API_TOKEN);
        config.team_id = get(ENV_TEAM);
        if let Some(timeout) = get(ENV_REQUEST_TIMEOUT) {
            config.request_timeout_secs = timeout.trim().parse().map_err(|e| {
                Error::ConfigError(format!("Invalid {ENV_REQUEST_TIMEOUT} `{timeout}`: {e}"))
            })?;
        }

        config
            .validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;

        Ok(config)
    }

    /// Set the API base URL.
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the default team.
    #[must_use]
    pub fn with_team_id(mut self, team_id: impl Into<String>) -> Self {
        self.team_id = Some(team_id.into());
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse and validate the API URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_api_url(&self) -> Result<Url, Error> {
        Url::parse(&self.api_url)
            .map_err(|e| Error::ConfigError(format!("Invalid API URL: {e}")))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_token: None,
            team_id: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("team_id", &self.team_id)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_client_config_new() {
        let config = ClientConfig::new("token");
        assert_eq!(config.api_url, "https://api.vercel.com");
        assert_eq!(config.api_token.as_deref(), Some("token"));
        assert!(config.team_id.is_none());
        assert_eq!(config.request_timeout_secs, 120);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::new("token")
            .with_api_url("http://localhost:3000")
            .with_team_id("team_1")
            .with_timeout(30);

        assert_eq!(config.api_url, "http://localhost:3000");
        assert_eq!(config.team_id.as_deref(), Some("team_1"));
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_from_lookup_reads_variables() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_API_TOKEN, "secret"),
            (ENV_TEAM, "my-team"),
            (ENV_API_URL, "http://localhost:9999"),
            (ENV_REQUEST_TIMEOUT, "45"),
        ]))
        .unwrap();

        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.team_id.as_deref(), Some("my-team"));
        assert_eq!(config.api_url, "http://localhost:9999");
        assert_eq!(config.request_timeout_secs, 45);
    }

    #[test]
    fn test_from_lookup_ignores_empty_values() {
        let config =
            ClientConfig::from_lookup(lookup(&[(ENV_TEAM, ""), (ENV_API_URL, "  ")])).unwrap();
        assert!(config.team_id.is_none());
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_from_lookup_rejects_bad_timeout() {
        let err = ClientConfig::from_lookup(lookup(&[(ENV_REQUEST_TIMEOUT, "soon")])).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));

        let err = ClientConfig::from_lookup(lookup(&[(ENV_REQUEST_TIMEOUT, "0")])).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_from_lookup_rejects_bad_url() {
        let result = ClientConfig::from_lookup(lookup(&[(ENV_API_URL, "not-a-url")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_api_url() {
        let config = ClientConfig::new("t").with_api_url("https://api.example.com:8443");
        let url = config.parse_api_url().unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("api.example.com"));
        assert_eq!(url.port(), Some(8443));
    }

    #[test]
    fn test_token_is_not_serialized() {
        let config = ClientConfig::new("super-secret").with_team_id("team_1");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("super-secret"));
        assert!(json.contains("team_1"));

        let deserialized: ClientConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.api_url, config.api_url);
        assert!(deserialized.api_token.is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ClientConfig::new("super-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_config_validation_timeout_range() {
        let mut config = ClientConfig::default();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.request_timeout_secs = 601;
        assert!(config.validate().is_err());

        config.request_timeout_secs = 120;
        assert!(config.validate().is_ok());
    }
}
