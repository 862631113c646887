//! Configuration for the Core client

use crate::error::{Error, Result};
use corelink_core::retry::{ExponentialBackoff, RetryPolicy};
use corelink_transport::HttpTransportConfig;
use http::HeaderMap;
use secrecy::SecretString;
use std::time::Duration;
use url::Url;

/// Default Core host
pub const DEFAULT_HOST: &str = "localhost";

/// Default Core port
pub const DEFAULT_PORT: u16 = 8080;

/// Default service segment of the base path
pub const DEFAULT_SERVICE: &str = "core";

/// Default API version segment of the base path
pub const DEFAULT_API_VERSION: &str = "v1";

/// Configuration for a Core client.
///
/// Handed to the client at construction; nothing in the request pipeline looks
/// at the environment. Use [`ClientConfig::from_env`] to opt into that.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Core host
    pub host: String,

    /// Core port
    pub port: u16,

    /// Full `http(s)://host:port` override for `host`/`port`
    pub uri: Option<String>,

    /// Service segment of `/api/{service}/{api_version}`
    pub service: String,

    /// Version segment of `/api/{service}/{api_version}`
    pub api_version: String,

    /// Fixed correlation id; a fresh one is generated per request when unset
    pub request_id: Option<String>,

    /// Bearer token sent with every request
    pub api_token: Option<SecretString>,

    /// Bound on establishing a connection
    pub connect_timeout: Duration,

    /// Bound on waiting for response data
    pub read_timeout: Duration,

    /// Bound on sending the request
    pub write_timeout: Duration,

    /// Custom headers to include with every request
    pub default_headers: HeaderMap,

    /// Retry behavior for transient failures
    pub retry: RetrySettings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            uri: None,
            service: DEFAULT_SERVICE.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            request_id: None,
            api_token: None,
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(300),
            write_timeout: Duration::from_secs(60),
            default_headers: HeaderMap::new(),
            retry: RetrySettings::default(),
        }
    }
}

impl ClientConfig {
    /// Configuration pointing at `host:port`.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Configuration pointing at a full URI such as `https://core.example.com:8443`.
    pub fn with_uri(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first. Then:
    /// - `CORE_HOST`, `CORE_PORT` or `CORE_URI` for the endpoint
    /// - `CORE_SERVICE`, `CORE_API_VERSION` for the base path
    /// - `CORE_REQUEST_ID` for a fixed correlation id
    /// - `CORE_API_TOKEN` for the bearer token
    /// - `CORE_MAX_ATTEMPTS` for the retry ceiling
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a numeric variable does not parse.
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self> {
        use std::env;

        let _ = dotenvy::dotenv();
        let mut config = Self::default();

        if let Ok(host) = env::var("CORE_HOST") {
            config.host = host;
        }

        if let Ok(port) = env::var("CORE_PORT") {
            config.port = port
                .parse()
                .map_err(|_| Error::Config(format!("CORE_PORT is not a port: {}", port)))?;
        }

        if let Ok(uri) = env::var("CORE_URI") {
            config.uri = Some(uri);
        }

        if let Ok(service) = env::var("CORE_SERVICE") {
            config.service = service;
        }

        if let Ok(api_version) = env::var("CORE_API_VERSION") {
            config.api_version = api_version;
        }

        if let Ok(request_id) = env::var("CORE_REQUEST_ID") {
            config.request_id = Some(request_id);
        }

        if let Ok(token) = env::var("CORE_API_TOKEN") {
            config.api_token = Some(SecretString::new(token.into_boxed_str()));
        }

        if let Ok(attempts) = env::var("CORE_MAX_ATTEMPTS") {
            config.retry.max_attempts = attempts.parse().map_err(|_| {
                Error::Config(format!("CORE_MAX_ATTEMPTS is not a number: {}", attempts))
            })?;
        }

        Ok(config)
    }

    /// Merge this configuration with another, with the other taking precedence.
    ///
    /// Fields of `other` still at their default value leave `self` untouched.
    pub fn merge(mut self, other: ClientConfig) -> Self {
        let defaults = ClientConfig::default();

        if other.host != defaults.host {
            self.host = other.host;
        }
        if other.port != defaults.port {
            self.port = other.port;
        }
        if other.uri.is_some() {
            self.uri = other.uri;
        }
        if other.service != defaults.service {
            self.service = other.service;
        }
        if other.api_version != defaults.api_version {
            self.api_version = other.api_version;
        }
        if other.request_id.is_some() {
            self.request_id = other.request_id;
        }
        if other.api_token.is_some() {
            self.api_token = other.api_token;
        }
        if other.connect_timeout != defaults.connect_timeout {
            self.connect_timeout = other.connect_timeout;
        }
        if other.read_timeout != defaults.read_timeout {
            self.read_timeout = other.read_timeout;
        }
        if other.write_timeout != defaults.write_timeout {
            self.write_timeout = other.write_timeout;
        }
        for (key, value) in other.default_headers.iter() {
            self.default_headers.insert(key.clone(), value.clone());
        }
        if other.retry != defaults.retry {
            self.retry = other.retry;
        }

        self
    }

    /// Check the configuration for values the client cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.uri.is_none() {
            if self.host.trim().is_empty() {
                return Err(Error::Config("host cannot be empty".to_string()));
            }
            if self.port == 0 {
                return Err(Error::Config("port cannot be 0".to_string()));
            }
        }
        if let Some(uri) = &self.uri {
            let parsed =
                Url::parse(uri).map_err(|e| Error::Config(format!("invalid uri {}: {}", uri, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::Config(format!(
                    "uri scheme must be http or https, got {}",
                    parsed.scheme()
                )));
            }
        }
        if self.service.trim().is_empty() {
            return Err(Error::Config("service cannot be empty".to_string()));
        }
        if self.api_version.trim().is_empty() {
            return Err(Error::Config("api_version cannot be empty".to_string()));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::Config("retry.max_attempts must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Base URL of the REST surface: `{scheme}://{host}:{port}/api/{service}/{api_version}`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the endpoint does not form a valid URL.
    pub fn base_url(&self) -> Result<Url> {
        let origin = match &self.uri {
            Some(uri) => uri.trim_end_matches('/').to_string(),
            None => format!("http://{}:{}", self.host, self.port),
        };
        let raw = format!("{}/api/{}/{}", origin, self.service, self.api_version);
        Url::parse(&raw).map_err(|e| Error::Config(format!("invalid base url {}: {}", raw, e)))
    }

    /// Base URL of the debug channel: the REST base with `ws`/`wss`.
    pub fn stream_base_url(&self) -> Result<Url> {
        let mut url = self.base_url()?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|_| Error::Config(format!("cannot derive stream url from {}", url)))?;
        Ok(url)
    }

    /// Transport bounds derived from this configuration.
    pub fn transport_config(&self) -> HttpTransportConfig {
        HttpTransportConfig {
            connect_timeout: self.connect_timeout,
            read_timeout: self.read_timeout,
            write_timeout: self.write_timeout,
            ..Default::default()
        }
    }
}

/// Retry settings for the request pipeline.
///
/// `max_attempts` counts every attempt, including the first.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrySettings {
    /// Total attempts per request
    pub max_attempts: u32,

    /// Delay before the first re-attempt
    pub initial_delay: Duration,

    /// Cap on any single delay
    pub max_delay: Duration,

    /// Growth factor between delays
    pub multiplier: f64,

    /// Random spread applied to each delay, 0.0 to 1.0
    pub jitter: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: 0.1,
        }
    }
}

impl RetrySettings {
    /// A single attempt, no retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Backoff schedule for these settings.
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::builder()
            .max_attempts(self.max_attempts)
            .initial_delay(self.initial_delay)
            .max_delay(self.max_delay)
            .multiplier(self.multiplier)
            .jitter(self.jitter)
            .build()
    }

    /// Retry policy for these settings, without a hook.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.backoff())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 8080);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.read_timeout, Duration::from_secs(300));
        assert_eq!(config.write_timeout, Duration::from_secs(60));
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.request_id.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_base_url_from_host_port() {
        let config = ClientConfig::new("core.internal", 9000);
        assert_eq!(
            config.base_url().unwrap().as_str(),
            "http://core.internal:9000/api/core/v1"
        );
        assert_eq!(
            config.stream_base_url().unwrap().as_str(),
            "ws://core.internal:9000/api/core/v1"
        );
    }

    #[test]
    fn test_uri_overrides_host() {
        let mut config = ClientConfig::with_uri("https://core.example.com:8443/");
        config.api_version = "v2".into();

        assert_eq!(
            config.base_url().unwrap().as_str(),
            "https://core.example.com:8443/api/core/v2"
        );
        assert_eq!(config.stream_base_url().unwrap().scheme(), "wss");
    }

    #[rstest]
    #[case::zero_port(ClientConfig::new("localhost", 0))]
    #[case::empty_host(ClientConfig::new("", 8080))]
    #[case::ftp_uri(ClientConfig::with_uri("ftp://core:21"))]
    #[case::garbage_uri(ClientConfig::with_uri("not a uri"))]
    #[case::empty_service(ClientConfig { service: String::new(), ..Default::default() })]
    #[case::empty_version(ClientConfig { api_version: " ".into(), ..Default::default() })]
    #[case::zero_attempts(ClientConfig {
        retry: RetrySettings { max_attempts: 0, ..Default::default() },
        ..Default::default()
    })]
    fn test_validate_rejects(#[case] config: ClientConfig) {
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_config_merge() {
        let base = ClientConfig {
            request_id: Some("base-id".into()),
            ..ClientConfig::new("core-a", 9000)
        };
        let overlay = ClientConfig {
            read_timeout: Duration::from_secs(30),
            retry: RetrySettings::no_retry(),
            ..ClientConfig::new("core-b", DEFAULT_PORT)
        };

        let merged = base.merge(overlay);
        assert_eq!(merged.host, "core-b");
        assert_eq!(merged.port, 9000);
        assert_eq!(merged.request_id.as_deref(), Some("base-id"));
        assert_eq!(merged.read_timeout, Duration::from_secs(30));
        assert_eq!(merged.retry.max_attempts, 1);
    }

    #[test]
    fn test_retry_settings_policy() {
        let settings = RetrySettings {
            max_attempts: 5,
            ..Default::default()
        };
        assert_eq!(settings.policy().max_attempts(), 5);
        assert_eq!(settings.backoff().max_delay(), Duration::from_secs(10));
    }

    #[cfg(feature = "env")]
    #[test]
    fn test_from_env() {
        temp_env::with_vars(
            [
                ("CORE_HOST", Some("edge-core")),
                ("CORE_PORT", Some("9100")),
                ("CORE_URI", None),
                ("CORE_SERVICE", None),
                ("CORE_API_VERSION", Some("v3")),
                ("CORE_REQUEST_ID", Some("req-42")),
                ("CORE_API_TOKEN", Some("secret")),
                ("CORE_MAX_ATTEMPTS", Some("7")),
            ],
            || {
                let config = ClientConfig::from_env().unwrap();
                assert_eq!(config.host, "edge-core");
                assert_eq!(config.port, 9100);
                assert_eq!(config.api_version, "v3");
                assert_eq!(config.service, "core");
                assert_eq!(config.request_id.as_deref(), Some("req-42"));
                assert!(config.api_token.is_some());
                assert_eq!(config.retry.max_attempts, 7);
            },
        );
    }

    #[cfg(feature = "env")]
    #[test]
    fn test_from_env_bad_port() {
        temp_env::with_var("CORE_PORT", Some("eighty"), || {
            assert!(matches!(ClientConfig::from_env(), Err(Error::Config(_))));
        });
    }
}
