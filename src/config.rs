use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub upstream: UpstreamSettings,
    pub service: ServiceSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Downstream query-processing service
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamSettings {
    pub base_url: String,
    /// Display name used in fallback and error texts
    #[serde(default = "default_upstream_name")]
    pub name: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl UpstreamSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            name: default_upstream_name(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_upstream_name() -> String {
    "Python".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_connect_timeout_secs() -> u64 {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSettings {
    #[serde(default = "default_service_name")]
    pub name: String,
}

fn default_service_name() -> String {
    "GenIA API Gateway".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}

impl Settings {
    /// Load configuration from defaults, files and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Built-in defaults
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (`GENIA__` prefix, `__` between keys)
    /// 5. `PYTHON_SERVICE_URL`, if set, for the upstream address
    pub fn load() -> Result<Self, ConfigError> {
        let settings = with_defaults(Config::builder())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., GENIA__UPSTREAM__BASE_URL -> upstream.base_url
            .add_source(env_source())
            .build()?;

        apply_legacy_env(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = with_defaults(Config::builder())?
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?;

        settings.try_deserialize()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("GENIA")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

fn with_defaults(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
    builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080_i64)?
        .set_default("server.workers", 4_i64)?
        .set_default("upstream.base_url", "http://localhost:8000")?
        .set_default("upstream.name", default_upstream_name())?
        .set_default("upstream.timeout_secs", default_timeout_secs() as i64)?
        .set_default(
            "upstream.connect_timeout_secs",
            default_connect_timeout_secs() as i64,
        )?
        .set_default("service.name", default_service_name())?
        .set_default("logging.level", default_log_level())?
        .set_default("logging.format", default_log_format())
}

/// The gateway used to read its upstream address from PYTHON_SERVICE_URL
fn apply_legacy_env(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("PYTHON_SERVICE_URL") {
        Ok(url) if !url.trim().is_empty() => Config::builder()
            .add_source(settings)
            .set_override("upstream.base_url", url)?
            .build(),
        _ => Ok(settings),
    }
}
