//! Configuration loading and management.
//!
//! This module provides layered configuration for the instrumentation crates
//! using figment. Configuration is loaded from (in order of priority):
//! 1. Default values (compiled in)
//! 2. Config file: `flare.toml` in the working directory (optional)
//! 3. Environment variables with `FLARE_` prefix
//!
//! Environment keys use a double underscore between section and key, so
//! snake_case keys survive the split: `FLARE_MESSENGER__CAPTURE_SOFT_FAILS`
//! maps to `messenger.capture_soft_fails`.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "flare.toml";
const ENV_PREFIX: &str = "FLARE_";

/// Main configuration struct for the instrumentation crates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Error-reporting configuration.
    pub reporting: ReportingConfig,
    /// Message-lifecycle instrumentation configuration.
    pub messenger: MessengerConfig,
    /// HTTP client instrumentation configuration.
    pub http: HttpConfig,
}

impl Config {
    /// Loads configuration from all sources.
    ///
    /// Configuration is loaded in the following order (later sources override
    /// earlier):
    /// 1. Default values
    /// 2. Config file at `flare.toml` (if it exists)
    /// 3. Environment variables with `FLARE_` prefix
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    #[allow(clippy::result_large_err)]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Loads configuration from a custom config file path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    #[allow(clippy::result_large_err)]
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if config_path.as_ref().exists() {
            figment = figment.merge(Toml::file(config_path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment.extract()
    }

    /// Creates a new config builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Error-reporting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportingConfig {
    /// Deployment environment attached to captured events.
    pub environment: Option<String>,
    /// Release identifier attached to captured events.
    pub release: Option<String>,
    /// Maximum breadcrumbs kept per scope.
    pub max_breadcrumbs: usize,
    /// Timeout for synchronous flushes in milliseconds.
    #[serde(with = "duration_ms")]
    pub flush_timeout: Duration,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            environment: None,
            release: None,
            max_breadcrumbs: 100,
            flush_timeout: Duration::from_secs(2),
        }
    }
}

/// Message-lifecycle instrumentation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessengerConfig {
    /// Whether failures of messages that will be retried are captured.
    pub capture_soft_fails: bool,
}

impl Default for MessengerConfig {
    fn default() -> Self {
        Self {
            capture_soft_fails: true,
        }
    }
}

/// HTTP client instrumentation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whether outgoing requests get a child span.
    pub trace_requests: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            trace_requests: true,
        }
    }
}

/// Builder for constructing configuration programmatically.
#[must_use = "builders do nothing unless .build() is called"]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new config builder with default values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Sets the deployment environment.
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.config.reporting.environment = Some(environment.into());
        self
    }

    /// Sets the release identifier.
    pub fn release(mut self, release: impl Into<String>) -> Self {
        self.config.reporting.release = Some(release.into());
        self
    }

    /// Sets the maximum breadcrumbs kept per scope.
    pub fn max_breadcrumbs(mut self, max: usize) -> Self {
        self.config.reporting.max_breadcrumbs = max;
        self
    }

    /// Sets the synchronous flush timeout.
    pub fn flush_timeout(mut self, timeout: Duration) -> Self {
        self.config.reporting.flush_timeout = timeout;
        self
    }

    /// Enables or disables capture of failures that will be retried.
    pub fn capture_soft_fails(mut self, capture: bool) -> Self {
        self.config.messenger.capture_soft_fails = capture;
        self
    }

    /// Enables or disables child spans for outgoing HTTP requests.
    pub fn trace_requests(mut self, trace: bool) -> Self {
        self.config.http.trace_requests = trace;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}
