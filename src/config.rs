//! Runtime configuration
//!
//! Read once at startup from the process environment (after an optional
//! `.env` file has been loaded by the binary).

use crate::{
    constants::{COINGECKO_API_URL, DEFAULT_BIND_ADDR, DEFAULT_DATABASE_URL},
    error::ConfigError,
    providers::coingecko::usable_api_key,
};
use std::net::SocketAddr;

/// Settings the service needs to start
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// CoinGecko key, `None` when unset or left at the placeholder
    pub api_key: Option<String>,
    pub coingecko_base_url: String,
    pub database_url: String,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    /// Builds the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database_url = non_empty("DATABASE_URL")
            .or_else(|| non_empty("DB_NAME").map(|name| format!("sqlite://{name}.db")))
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        if let Some(host) = non_empty("DB_HOST") {
            tracing::debug!(
                host = %host,
                user = %non_empty("DB_USER").unwrap_or_default(),
                password_set = non_empty("DB_PASSWORD").is_some(),
                "DB_HOST/DB_USER/DB_PASSWORD are ignored by the SQLite backend"
            );
        }

        let bind_addr = match non_empty("BIND_ADDR") {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
                name: "BIND_ADDR",
                reason: format!("{raw}: {e}"),
            })?,
            None => DEFAULT_BIND_ADDR
                .parse()
                .map_err(|e| ConfigError::InvalidValue {
                    name: "BIND_ADDR",
                    reason: format!("{DEFAULT_BIND_ADDR}: {e}"),
                })?,
        };

        Ok(Self {
            api_key: usable_api_key(lookup("COINGECKO_API_KEY")),
            coingecko_base_url: non_empty("COINGECKO_BASE_URL")
                .unwrap_or_else(|| COINGECKO_API_URL.to_string()),
            database_url,
            bind_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.api_key, None);
        assert_eq!(config.coingecko_base_url, COINGECKO_API_URL);
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
    }

    #[test]
    fn test_placeholder_key_is_dropped() {
        let config = config_from(&[("COINGECKO_API_KEY", "your_key_here")]).unwrap();
        assert_eq!(config.api_key, None);

        let config = config_from(&[("COINGECKO_API_KEY", "CG-real")]).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("CG-real"));
    }

    #[test]
    fn test_database_url_precedence() {
        let config = config_from(&[("DB_NAME", "crypto")]).unwrap();
        assert_eq!(config.database_url, "sqlite://crypto.db");

        let config = config_from(&[
            ("DB_NAME", "crypto"),
            ("DATABASE_URL", "sqlite::memory:"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
    }

    #[test]
    fn test_invalid_bind_addr() {
        let err = config_from(&[("BIND_ADDR", "localhost")]).unwrap_err();
        assert!(err.to_string().contains("BIND_ADDR"));
    }
}
