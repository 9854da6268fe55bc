//! Layered configuration for the gateway binary: a TOML file with defaults,
//! overridden by `GATEWAY__`-prefixed, double-underscore-nested environment
//! variables — the same shape the voice agent's settings loader uses.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(String),

    #[error("failed to parse config: {0}")]
    ParseError(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("environment error: {0}")]
    Environment(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        match &err {
            config::ConfigError::NotFound(path) => ConfigError::FileNotFound(path.clone()),
            config::ConfigError::Message(msg) => ConfigError::ParseError(msg.clone()),
            other => ConfigError::ParseError(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub api_key: String,
}

impl Default for AuthConfig {
    // spec.md §6: the inbound wire contract requires `Authorization: Bearer
    // <gateway_key>` unconditionally, so auth is on unless an operator
    // opts out via `GATEWAY__SERVER__AUTH__ENABLED=false`. An empty
    // `api_key` with auth enabled still fails closed (see auth.rs's
    // `MissingKeyConfigured`), it does not silently admit every caller.
    fn default() -> Self {
        Self { enabled: true, api_key: String::new() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub auth: AuthConfig,
    /// Paths reachable without a bearer token (health/readiness/metrics).
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
}

fn default_port() -> u16 {
    8080
}

fn default_public_paths() -> Vec<String> {
    vec!["/health".into(), "/ready".into(), "/metrics".into()]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port(), auth: AuthConfig::default(), public_paths: default_public_paths() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// `used_ratio` at or above which a model's quota_status becomes
    /// near-exhaust, per §4.7. Default 80.
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: f64,
}

fn default_alert_threshold() -> f64 {
    80.0
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self { alert_threshold: default_alert_threshold() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_connect_timeout_secs")]
    pub probe_timeout_secs: u64,
    #[serde(default = "default_unary_timeout_secs")]
    pub unary_timeout_secs: u64,
    #[serde(default = "default_stream_timeout_secs")]
    pub stream_timeout_secs: u64,
    /// The model id used by the Claude test-request builder during
    /// connectivity probes. The original hard-codes a date-stamped id
    /// (`claude-sonnet-4-20250514`) that will bit-rot; here it's
    /// configurable, resolving the Open Question in spec §9.
    #[serde(default = "default_claude_test_model")]
    pub claude_test_model: String,
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_unary_timeout_secs() -> u64 {
    120
}

fn default_stream_timeout_secs() -> u64 {
    300
}

fn default_claude_test_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            probe_timeout_secs: default_connect_timeout_secs(),
            unary_timeout_secs: default_unary_timeout_secs(),
            stream_timeout_secs: default_stream_timeout_secs(),
            claude_test_model: default_claude_test_model(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewaySettings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub quota: QuotaConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

/// Loads settings from an optional TOML file plus environment overrides
/// under the `GATEWAY` prefix (e.g. `GATEWAY__SERVER__PORT=9090`,
/// `GATEWAY__SERVER__AUTH__ENABLED=true`).
pub fn load_settings(config_path: Option<&str>) -> Result<GatewaySettings, ConfigError> {
    let mut builder = config::Config::builder();

    builder = builder.add_source(
        config::Config::try_from(&GatewaySettings::default())
            .map_err(ConfigError::from)?,
    );

    if let Some(path) = config_path {
        builder = builder.add_source(config::File::with_name(path).required(false));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("GATEWAY")
            .separator("__")
            .try_parsing(true),
    );

    let built = builder.build()?;
    built.try_deserialize().map_err(ConfigError::from)
}
