//! Application configuration.
//!
//! Defaults live here as constants; the environment (and a `.env` file, if
//! present) overrides them, and CLI flags override the environment.

use std::env;
use std::time::Duration;

use crate::error::ConfigError;

/// Explorer `txlist` endpoint.
pub const DEFAULT_EXPLORER_URL: &str = "https://api.etherscan.io/api";

/// Attestation GraphQL endpoint (Sepolia).
pub const DEFAULT_ATTESTATION_URL: &str = "https://sepolia.easscan.org/graphql";

/// Price API base (CoinGecko v3).
pub const DEFAULT_PRICE_URL: &str = "https://api.coingecko.com/api/v3";

/// Records kept per export, taken from the most recent end.
pub const DEFAULT_RECORD_LIMIT: usize = 100;

/// HTTP request timeout for sources, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// HTTP server port.
pub const DEFAULT_PORT: u16 = 3000;

pub const ENV_API_KEY: &str = "ETHERSCAN_API_KEY";
pub const ENV_EXPLORER_URL: &str = "CHAINEXPORT_EXPLORER_URL";
pub const ENV_ATTESTATION_URL: &str = "CHAINEXPORT_ATTESTATION_URL";
pub const ENV_PRICE_URL: &str = "CHAINEXPORT_PRICE_URL";
pub const ENV_RECORD_LIMIT: &str = "CHAINEXPORT_RECORD_LIMIT";
pub const ENV_HTTP_TIMEOUT: &str = "CHAINEXPORT_HTTP_TIMEOUT_SECS";
pub const ENV_PORT: &str = "CHAINEXPORT_PORT";

/// Process-wide settings, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub explorer_url: String,
    /// Explorer API key; transaction fetches fail without it
    pub explorer_api_key: Option<String>,
    pub attestation_url: String,
    pub price_url: String,
    pub record_limit: usize,
    pub http_timeout: Duration,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
            explorer_api_key: None,
            attestation_url: DEFAULT_ATTESTATION_URL.to_string(),
            price_url: DEFAULT_PRICE_URL.to_string(),
            record_limit: DEFAULT_RECORD_LIMIT,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Load `.env` (if present) and read the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            explorer_url: get(ENV_EXPLORER_URL).unwrap_or(defaults.explorer_url),
            explorer_api_key: get(ENV_API_KEY),
            attestation_url: get(ENV_ATTESTATION_URL).unwrap_or(defaults.attestation_url),
            price_url: get(ENV_PRICE_URL).unwrap_or(defaults.price_url),
            record_limit: parse_var(ENV_RECORD_LIMIT, get(ENV_RECORD_LIMIT))?
                .unwrap_or(defaults.record_limit),
            http_timeout: parse_var::<u64>(ENV_HTTP_TIMEOUT, get(ENV_HTTP_TIMEOUT))?
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
            port: parse_var(ENV_PORT, get(ENV_PORT))?.unwrap_or(defaults.port),
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, raw: Option<String>) -> Result<Option<T>, ConfigError> {
    raw.map(|value| {
        value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { name, value })
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.explorer_url, DEFAULT_EXPLORER_URL);
        assert_eq!(config.attestation_url, DEFAULT_ATTESTATION_URL);
        assert_eq!(config.price_url, DEFAULT_PRICE_URL);
        assert_eq!(config.record_limit, 100);
        assert_eq!(config.port, 3000);
        assert!(config.explorer_api_key.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            (ENV_API_KEY, "KEY123"),
            (ENV_RECORD_LIMIT, " 25 "),
            (ENV_HTTP_TIMEOUT, "5"),
            (ENV_EXPLORER_URL, "https://api-sepolia.etherscan.io/api"),
            (ENV_PRICE_URL, "http://localhost:8080/v3"),
        ]))
        .unwrap();
        assert_eq!(config.explorer_api_key.as_deref(), Some("KEY123"));
        assert_eq!(config.record_limit, 25);
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.explorer_url, "https://api-sepolia.etherscan.io/api");
        assert_eq!(config.price_url, "http://localhost:8080/v3");
    }

    #[test]
    fn test_blank_values_fall_back() {
        let config = Config::from_lookup(lookup(&[(ENV_API_KEY, "  "), (ENV_PORT, "")])).unwrap();
        assert!(config.explorer_api_key.is_none());
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_invalid_number() {
        let err = Config::from_lookup(lookup(&[(ENV_RECORD_LIMIT, "lots")])).unwrap_err();
        assert!(err.to_string().contains(ENV_RECORD_LIMIT));
    }
}
