//! Centralized configuration (environment variables + defaults).
//!
//! Read once at startup into `AppConfig` and passed down explicitly.

use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-5";
pub const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub vision: VisionConfig,
    pub max_body_bytes: usize,
}

impl AppConfig {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_raw = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = parse_value("BIND_ADDR", &bind_raw)?;

        let store_backend = match var("STORE_BACKEND").as_deref().map(str::trim) {
            None | Some("memory") => StoreBackend::Memory,
            Some("postgres") => StoreBackend::Postgres,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "STORE_BACKEND",
                    value: other.to_string(),
                    reason: "expected 'memory' or 'postgres'".to_string(),
                })
            }
        };

        let database_url = var("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let database_max_connections = match var("DATABASE_MAX_CONNECTIONS") {
            Some(v) => parse_value::<u32>("DATABASE_MAX_CONNECTIONS", &v)?.max(1),
            None => DEFAULT_DATABASE_MAX_CONNECTIONS,
        };

        let timeout_secs = match var("GATEWAY_TIMEOUT_SECS") {
            Some(v) => parse_value::<u64>("GATEWAY_TIMEOUT_SECS", &v)?.max(1),
            None => DEFAULT_GATEWAY_TIMEOUT_SECS,
        };

        let max_body_bytes = match var("MAX_BODY_BYTES") {
            Some(v) => parse_value::<usize>("MAX_BODY_BYTES", &v)?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        let vision = VisionConfig {
            api_key: var("OPENAI_API_KEY"),
            base_url: var("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        };

        Ok(Self {
            bind_addr,
            store_backend,
            database_url,
            database_max_connections,
            vision,
            max_body_bytes,
        })
    }
}

fn parse_value<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        name,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = config_from(&[]).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(cfg.store_backend, StoreBackend::Memory);
        assert_eq!(cfg.vision.model, DEFAULT_OPENAI_MODEL);
        assert_eq!(cfg.vision.base_url, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(cfg.vision.timeout, Duration::from_secs(30));
        assert!(cfg.vision.api_key.is_none());
        assert_eq!(cfg.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }

    #[test]
    fn postgres_backend_requires_database_url() {
        let err = config_from(&[("STORE_BACKEND", "postgres")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));

        let cfg = config_from(&[
            ("STORE_BACKEND", "postgres"),
            ("DATABASE_URL", "postgres://localhost/braingym"),
        ])
        .unwrap();
        assert_eq!(cfg.store_backend, StoreBackend::Postgres);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = config_from(&[("GATEWAY_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(err.to_string().contains("GATEWAY_TIMEOUT_SECS"));

        let err = config_from(&[("STORE_BACKEND", "redis")]).unwrap_err();
        assert!(err.to_string().contains("STORE_BACKEND"));
    }

    #[test]
    fn timeout_has_a_floor_and_base_url_loses_trailing_slash() {
        let cfg = config_from(&[
            ("GATEWAY_TIMEOUT_SECS", "0"),
            ("OPENAI_BASE_URL", "http://127.0.0.1:9999/v1/"),
        ])
        .unwrap();
        assert_eq!(cfg.vision.timeout, Duration::from_secs(1));
        assert_eq!(cfg.vision.base_url, "http://127.0.0.1:9999/v1");
    }
}
