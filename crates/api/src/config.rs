//! Application configuration loaded from environment variables.

use std::time::Duration;

use saga::SagaConfig;
use thiserror::Error;

/// Which services this process hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceRole {
    /// Catalog and shop in one process, stock calls stay in memory.
    Standalone,
    /// Products, categories and the stock ledger.
    Catalog,
    /// Users, carts and orders, talking to a remote catalog.
    Shop,
}

impl ServiceRole {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "standalone" => Some(ServiceRole::Standalone),
            "catalog" => Some(ServiceRole::Catalog),
            "shop" => Some(ServiceRole::Shop),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown SERVICE_ROLE '{0}', expected standalone, catalog or shop")]
    UnknownRole(String),

    #[error("CATALOG_URL is required when SERVICE_ROLE=shop")]
    MissingCatalogUrl,
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `text` or `json` (default: `text`)
/// - `SERVICE_ROLE`: `standalone`, `catalog` or `shop` (default: `standalone`)
/// - `CATALOG_URL`: base URL of the catalog service, required for `shop`
/// - `STOCK_TIMEOUT_MS`: bound on one stock call (default: `5000`)
/// - `SAGA_ABANDON_AFTER_SECS`: age at which an unfinished checkout is
///   reconciled as faulted (default: `60`)
/// - `RECONCILE_INTERVAL_SECS`: period of the background reconciliation
///   pass, `0` turns it off (default: `30`)
/// - `SEED_DEMO_DATA`: load the demo catalog at startup (default: `false`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub role: ServiceRole,
    pub catalog_url: Option<String>,
    pub stock_timeout: Duration,
    pub abandon_after: Duration,
    pub reconcile_interval: Option<Duration>,
    pub seed_demo_data: bool,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let role = match var("SERVICE_ROLE") {
            Some(value) => ServiceRole::parse(&value).ok_or(ConfigError::UnknownRole(value))?,
            None => defaults.role,
        };
        let catalog_url = var("CATALOG_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
        if role == ServiceRole::Shop && catalog_url.is_none() {
            return Err(ConfigError::MissingCatalogUrl);
        }

        Ok(Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: var("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: var("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: match var("LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
            role,
            catalog_url,
            stock_timeout: var("STOCK_TIMEOUT_MS")
                .and_then(|ms| ms.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.stock_timeout),
            abandon_after: var("SAGA_ABANDON_AFTER_SECS")
                .and_then(|secs| secs.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.abandon_after),
            reconcile_interval: match var("RECONCILE_INTERVAL_SECS").and_then(|s| s.parse().ok()) {
                Some(0) => None,
                Some(secs) => Some(Duration::from_secs(secs)),
                None => defaults.reconcile_interval,
            },
            seed_demo_data: var("SEED_DEMO_DATA")
                .is_some_and(|v| matches!(v.trim(), "true" | "1")),
        })
    }

    /// Saga settings derived from this configuration.
    pub fn saga(&self) -> SagaConfig {
        SagaConfig {
            stock_timeout: self.stock_timeout,
            abandon_after: self.abandon_after,
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            role: ServiceRole::Standalone,
            catalog_url: None,
            stock_timeout: Duration::from_millis(5000),
            abandon_after: Duration::from_secs(60),
            reconcile_interval: Some(Duration::from_secs(30)),
            seed_demo_data: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = load(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.role, ServiceRole::Standalone);
        assert_eq!(config.stock_timeout, Duration::from_millis(5000));
        assert_eq!(config.abandon_after, Duration::from_secs(60));
        assert_eq!(config.reconcile_interval, Some(Duration::from_secs(30)));
        assert!(!config.seed_demo_data);
    }

    #[test]
    fn test_addr_formatting() {
        let config = load(&[("HOST", "127.0.0.1"), ("PORT", "8080")]).unwrap();
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_shop_role_requires_catalog_url() {
        assert_eq!(
            load(&[("SERVICE_ROLE", "shop")]).unwrap_err(),
            ConfigError::MissingCatalogUrl
        );

        let config = load(&[
            ("SERVICE_ROLE", "Shop"),
            ("CATALOG_URL", "http://catalog:3000/"),
            ("STOCK_TIMEOUT_MS", "250"),
        ])
        .unwrap();
        assert_eq!(config.catalog_url.as_deref(), Some("http://catalog:3000"));
        assert_eq!(config.stock_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_unknown_role_is_refused() {
        assert!(matches!(
            load(&[("SERVICE_ROLE", "gateway")]),
            Err(ConfigError::UnknownRole(role)) if role == "gateway"
        ));
    }

    #[test]
    fn test_flags() {
        let config = load(&[("LOG_FORMAT", "json"), ("SEED_DEMO_DATA", "true")]).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.seed_demo_data);
    }

    #[test]
    fn test_reconciliation_settings() {
        let config = load(&[
            ("SAGA_ABANDON_AFTER_SECS", "120"),
            ("RECONCILE_INTERVAL_SECS", "5"),
            ("STOCK_TIMEOUT_MS", "800"),
        ])
        .unwrap();
        assert_eq!(config.reconcile_interval, Some(Duration::from_secs(5)));
        let saga = config.saga();
        assert_eq!(saga.abandon_after, Duration::from_secs(120));
        assert_eq!(saga.stock_timeout, Duration::from_millis(800));

        let disabled = load(&[("RECONCILE_INTERVAL_SECS", "0")]).unwrap();
        assert_eq!(disabled.reconcile_interval, None);
    }
}
