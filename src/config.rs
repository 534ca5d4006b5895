//! Server configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::errors::ServerError;
use crate::logging::LogFormat;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "RELIEF_CONFIG";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "relief.toml";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address the HTTP server listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,

    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// SQL applied at startup; every statement is idempotent.
    #[serde(default = "default_schema_path")]
    pub schema_path: String,

    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// How long a connection waits on a locked database before failing.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Characters of a need's description kept in the map feed.
    #[serde(default = "default_map_description_limit")]
    pub map_description_limit: usize,

    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_database_path() -> String {
    "relief.sqlite3".to_string()
}

fn default_schema_path() -> String {
    "sql/schema.sql".to_string()
}

fn default_max_workers() -> usize {
    8
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_map_description_limit() -> usize {
    200
}

fn default_session_cookie() -> String {
    "session".to_string()
}

impl AppConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ServerError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ServerError> {
        toml::from_str(s).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// `RELIEF_CONFIG` if set, else `relief.toml` if it exists, else defaults.
    pub fn load() -> Result<Self, ServerError> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_toml_file(path);
        }
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::from_toml_file(DEFAULT_CONFIG_FILE);
        }
        Ok(Self::default())
    }

    pub fn log_format(&self) -> Result<LogFormat, ServerError> {
        self.log_format.parse()
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            database_path: default_database_path(),
            schema_path: default_schema_path(),
            max_workers: default_max_workers(),
            busy_timeout_ms: default_busy_timeout_ms(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            map_description_limit: default_map_description_limit(),
            session_cookie: default_session_cookie(),
        }
    }
}
