use std::net::SocketAddr;

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_BIND_ADDRESS, DEFAULT_CDN_BASE_URL, DEFAULT_CDN_ROOT,
    DEFAULT_MAX_CONNECTIONS,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Process settings, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    /// Origin image URLs are expanded against.
    pub cdn_base_url: String,
    /// Public origin used in the sitemap.
    pub base_url: String,
    pub bind_address: SocketAddr,
    pub database_max_connections: u32,
    /// Directory served under `/api/cdn`.
    pub cdn_root: String,
}

impl Config {
    /// Loads `.env` if there is one, then reads the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let value = |key: &'static str| lookup(key).filter(|value| !value.trim().is_empty());
        let or_default =
            |key: &'static str, default: &str| value(key).unwrap_or_else(|| default.to_string());

        let database_url = value("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let bind_address = or_default("BIND_ADDRESS", DEFAULT_BIND_ADDRESS);
        let bind_address = bind_address
            .parse()
            .map_err(|_| ConfigError::Invalid {
                key: "BIND_ADDRESS",
                value: bind_address.to_owned(),
            })?;

        let database_max_connections = match value("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "DATABASE_MAX_CONNECTIONS",
                value: raw.to_owned(),
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            cdn_base_url: or_default("CDN_BASE_URL", DEFAULT_CDN_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            base_url: or_default("BASE_URL", DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            bind_address,
            database_max_connections,
            cdn_root: or_default("CDN_ROOT", DEFAULT_CDN_ROOT),
        })
    }
}
