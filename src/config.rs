//! Service configuration from the environment (`.env` honored).

use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8083;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    /// `None` runs on the in-memory repository.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub nats_url: Option<String>,
    pub cache_ttl: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Ok(Self {
            port: parse(&non_empty, "PORT", DEFAULT_PORT)?,
            database_url: non_empty("DATABASE_URL"),
            database_max_connections: parse(&non_empty, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            nats_url: non_empty("NATS_URL"),
            cache_ttl: Duration::from_secs(parse(&non_empty, "CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?),
        })
    }
}

fn parse<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = config(&[]).unwrap();
        assert_eq!(c.port, 8083);
        assert_eq!(c.database_url, None);
        assert_eq!(c.database_max_connections, 10);
        assert_eq!(c.cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_overrides_and_blank_values() {
        let c = config(&[("PORT", "9000"), ("DATABASE_URL", "postgres://localhost/shop"), ("NATS_URL", " "), ("CACHE_TTL_SECS", "0")]).unwrap();
        assert_eq!(c.port, 9000);
        assert_eq!(c.database_url.as_deref(), Some("postgres://localhost/shop"));
        assert_eq!(c.nats_url, None);
        assert_eq!(c.cache_ttl, Duration::ZERO);
    }

    #[test]
    fn test_invalid_number() {
        let err = config(&[("PORT", "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }
}
