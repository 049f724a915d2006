/// Service configuration read from the environment
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::db::PoolSettings;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DB_PATH: &str = "courses.db";
const DEFAULT_POOL_SIZE: u32 = 8;
const DEFAULT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set to something that could not be parsed
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Everything the binary needs to start.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub db_path: String,
    pub pool_size: u32,
    pub acquire_timeout: Duration,
    pub log_level: tracing::Level,
    /// Load the reference courses on startup
    pub seed: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            db_path: DEFAULT_DB_PATH.to_string(),
            pool_size: DEFAULT_POOL_SIZE,
            acquire_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_level: tracing::Level::INFO,
            seed: false,
        }
    }
}

impl ServiceConfig {
    /// Reads the configuration from the process environment, after loading
    /// a `.env` file if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// # Variables
    /// * `COURSE_HOST`, `COURSE_PORT` - Listen address
    /// * `COURSE_DB_PATH` - SQLite file, or `:memory:`
    /// * `COURSE_DB_POOL_SIZE` - Maximum pooled connections
    /// * `COURSE_DB_TIMEOUT_SECS` - Seconds to wait for a free connection
    /// * `COURSE_LOG_LEVEL` - `trace`, `debug`, `info`, `warn` or `error`
    /// * `COURSE_SEED` - `true` to insert the reference courses
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            host: get("COURSE_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or("COURSE_PORT", get("COURSE_PORT"), DEFAULT_PORT)?,
            db_path: get("COURSE_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            pool_size: parse_or(
                "COURSE_DB_POOL_SIZE",
                get("COURSE_DB_POOL_SIZE"),
                DEFAULT_POOL_SIZE,
            )?,
            acquire_timeout: Duration::from_secs(parse_or(
                "COURSE_DB_TIMEOUT_SECS",
                get("COURSE_DB_TIMEOUT_SECS"),
                DEFAULT_TIMEOUT_SECS,
            )?),
            log_level: parse_or(
                "COURSE_LOG_LEVEL",
                get("COURSE_LOG_LEVEL"),
                tracing::Level::INFO,
            )?,
            seed: parse_or("COURSE_SEED", get("COURSE_SEED"), false)?,
        })
    }

    /// Gets the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            db_path: self.db_path.clone(),
            max_size: self.pool_size,
            acquire_timeout: self.acquire_timeout,
        }
    }
}

fn parse_or<T: FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => {
            let parsed = value.trim().parse();
            parsed.map_err(|_| ConfigError::Invalid { key, value })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ServiceConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.socket_addr(), "0.0.0.0:8000");
        assert_eq!(config.db_path, "courses.db");
        assert_eq!(config.pool_size, 8);
        assert_eq!(config.log_level, tracing::Level::INFO);
        assert!(!config.seed);
    }

    #[test]
    fn test_overrides() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("COURSE_HOST", "127.0.0.1"),
            ("COURSE_PORT", "9090"),
            ("COURSE_DB_PATH", ":memory:"),
            ("COURSE_LOG_LEVEL", "debug"),
            ("COURSE_SEED", "true"),
            ("COURSE_DB_TIMEOUT_SECS", "2"),
        ]))
        .unwrap();

        assert_eq!(config.socket_addr(), "127.0.0.1:9090");
        assert_eq!(config.log_level, tracing::Level::DEBUG);
        assert!(config.seed);
        assert!(config.pool_settings().is_in_memory());
        assert_eq!(config.pool_settings().acquire_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_invalid_port_is_reported() {
        let err = ServiceConfig::from_lookup(lookup_from(&[("COURSE_PORT", "eighty")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "COURSE_PORT",
                value: "eighty".to_string()
            }
        );
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = ServiceConfig::from_lookup(lookup_from(&[("COURSE_PORT", "  ")])).unwrap();
        assert_eq!(config.port, 8000);
    }
}
