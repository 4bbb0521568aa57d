//! Process configuration, read from environment variables.

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use thiserror::Error;

use cricket_observability::LogFormat;

/// Who hears about a failed mutation.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ErrorScope {
    /// Only the connection that sent the failing request.
    #[default]
    Originator,
    /// Every connected viewer.
    Everyone,
}

impl FromStr for ErrorScope {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "originator" | "sender" => Ok(ErrorScope::Originator),
            "everyone" | "all" => Ok(ErrorScope::Everyone),
            other => Err(ConfigError::invalid("ERROR_SCOPE", other)),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },

    #[error("{0} must be set when USE_PERSISTENT_STORES=true")]
    Missing(&'static str),
}

impl ConfigError {
    fn invalid(name: &'static str, value: impl Into<String>) -> Self {
        Self::Invalid {
            name,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub database_url: Option<String>,
    pub use_persistent_stores: bool,
    pub db_max_connections: u32,
    pub error_scope: ErrorScope,
    pub realtime_capacity: usize,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 5000,
            database_url: None,
            use_persistent_stores: false,
            db_max_connections: 5,
            error_scope: ErrorScope::Originator,
            realtime_capacity: 256,
            log_format: LogFormat::Json,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any name → value lookup; unset names take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            host: parse(&lookup, "HOST", defaults.host)?,
            port: parse(&lookup, "PORT", defaults.port)?,
            database_url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            use_persistent_stores: parse(&lookup, "USE_PERSISTENT_STORES", false)?,
            db_max_connections: parse(&lookup, "DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            error_scope: parse(&lookup, "ERROR_SCOPE", defaults.error_scope)?,
            realtime_capacity: parse(&lookup, "REALTIME_CAPACITY", defaults.realtime_capacity)?,
            log_format: match lookup("LOG_FORMAT") {
                Some(v) => v.parse().map_err(|_| ConfigError::invalid("LOG_FORMAT", v))?,
                None => defaults.log_format,
            },
        };

        if config.use_persistent_stores && config.database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        if config.realtime_capacity == 0 {
            return Err(ConfigError::invalid("REALTIME_CAPACITY", "0"));
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid(name, raw)),
        None => Ok(default),
    }
}
