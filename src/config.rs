//! Bootstrap configuration loading and constants.
//!
//! Loads the process configuration (listener, TLS, data directory, logging) from a
//! TOML file at start-up. The canonical host itself lives in a separate JSON record
//! under the data directory and is reloaded on demand by
//! [`ConfigProvider`](crate::provider::ConfigProvider).

use const_format::formatcp;
use serde::Deserialize;
use std::path::{Path, PathBuf};

// =============================================================================
// Redirect Constants
// =============================================================================

/// Port assumed for a host that carries no explicit port
pub const DEFAULT_HTTPS_PORT: u16 = 443;

/// Scheme used for every canonical-host redirect target
pub const REDIRECT_SCHEME: &str = "https";

// =============================================================================
// HTTP Response Cache Control
// =============================================================================

/// Health probes must never be answered from a cache
pub const CACHE_CONTROL_HEALTH: &str = "no-store";

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Package name, used as the log target prefix
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = formatcp!("config/{}.toml", CRATE_NAME);

/// Default directory holding the runtime configuration record
pub const DEFAULT_DATA_DIR: &str = "data";

/// File name of the runtime configuration record inside the data directory
pub const CONFIGURATION_FILE_NAME: &str = "config.json";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = formatcp!("{}=debug,tower_http=info", CRATE_NAME);

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Seconds to wait for in-flight connections on shutdown
pub const SHUTDOWN_GRACE_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    pub http: HttpServerConfig,
    /// Location of the runtime configuration record
    #[serde(default)]
    pub data: DataConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub tls: TlsConfig,
}

/// How the listener terminates TLS, selected by `mode` in `[http.tls]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TlsConfig {
    /// Plain HTTP, e.g. behind a TLS-terminating reverse proxy
    #[default]
    None,
    /// PEM certificate and key supplied by the operator
    Manual { cert_path: String, key_path: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "DataConfig::default_directory")]
    pub directory: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            directory: Self::default_directory(),
        }
    }
}

impl DataConfig {
    fn default_directory() -> PathBuf {
        PathBuf::from(DEFAULT_DATA_DIR)
    }

    /// Full path of the runtime configuration record
    pub fn configuration_path(&self) -> PathBuf {
        self.directory.join(CONFIGURATION_FILE_NAME)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(ConfigError::Validation(format!(
                "logging.format must be \"text\" or \"json\", got {:?}",
                self.logging.format
            )));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}
