//! Application configuration loaded from environment variables.
//!
//! Variables carry the `BJJ_API_` prefix (`BJJ_API_PORT`, `BJJ_API_DEBUG`, ...).

use std::net::{IpAddr, SocketAddr};

use serde::Deserialize;

use crate::error::AppError;

/// Prefix shared by all configuration variables.
pub const ENV_PREFIX: &str = "BJJ_API_";

/// Log output formats understood by the subscriber setup in `main`.
pub const LOG_FORMATS: [&str; 2] = ["pretty", "json"];

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// Address to listen on.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on (0 picks an ephemeral port).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Development mode: verbose 500 pages and auto-reload on rebuild.
    /// Never enable this on a reachable host.
    #[serde(default)]
    pub debug: bool,

    // === Logging ===
    /// Log filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            debug: false,
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Ok(envy::prefixed(ENV_PREFIX).from_env()?)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), AppError> {
        self.socket_addr()?;

        if !LOG_FORMATS.contains(&self.log_format.as_str()) {
            return Err(AppError::InvalidConfig(format!(
                "BJJ_API_LOG_FORMAT must be one of {:?}, got {:?}",
                LOG_FORMATS, self.log_format
            )));
        }

        Ok(())
    }

    /// The address the server binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        let ip: IpAddr = self.host.parse().map_err(|_| {
            AppError::InvalidConfig(format!(
                "BJJ_API_HOST must be an IP address, got {:?}",
                self.host
            ))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Whether logs should be emitted as JSON lines.
    pub fn json_logs(&self) -> bool {
        self.log_format == "json"
    }
}
