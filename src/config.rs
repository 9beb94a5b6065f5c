//! Environment configuration for the storefront service.

use std::net::SocketAddr;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8083;
pub const DEFAULT_MAX_DB_CONNECTIONS: u32 = 10;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// Unset means the in-memory store.
    pub database_url: Option<String>,
    pub port: u16,
    pub nats_url: Option<String>,
    pub max_db_connections: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            port: DEFAULT_PORT,
            nats_url: None,
            max_db_connections: DEFAULT_MAX_DB_CONNECTIONS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Ok(Self {
            database_url: get("DATABASE_URL"),
            port: parse(get("PORT"), "PORT")?.unwrap_or(defaults.port),
            nats_url: get("NATS_URL"),
            max_db_connections: parse(get("MAX_DB_CONNECTIONS"), "MAX_DB_CONNECTIONS")?
                .unwrap_or(defaults.max_db_connections),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr { SocketAddr::from(([0, 0, 0, 0], self.port)) }
}

fn parse<T: std::str::FromStr>(value: Option<String>, key: &'static str) -> Result<Option<T>, ConfigError> {
    value
        .map(|v| v.parse().map_err(|_| ConfigError::Invalid { key, value: v }))
        .transpose()
}
