//! Application configuration loaded from environment variables.

use common::ServiceId;
use domain::order::DEFAULT_TRACKING_BASE_URL;
use domain::{InMemoryServiceCatalog, OrderCodeGenerator};

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `DATABASE_URL`: PostgreSQL connection string; unset runs on the in-memory store
/// - `DB_MAX_CONNECTIONS`: connection pool size (default: `5`)
/// - `ORDER_CODE_TAG`: organisation segment of tracking codes (default: `"SITE"`)
/// - `ORDER_CODE_MAX_ATTEMPTS`: tracking code retry budget (default: `10`)
/// - `TRACKING_BASE_URL`: prefix of tracking links sent to customers
/// - `SERVICE_TITLES`: service catalogue as `id=Title` pairs separated by `;`
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub order_code_tag: String,
    pub order_code_max_attempts: u32,
    pub tracking_base_url: String,
    pub service_titles: Vec<(ServiceId, String)>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    ///
    /// Missing or unparsable values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            host: non_empty("HOST").unwrap_or(defaults.host),
            port: non_empty("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: non_empty("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: non_empty("DATABASE_URL"),
            db_max_connections: non_empty("DB_MAX_CONNECTIONS")
                .and_then(|n| n.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.db_max_connections),
            order_code_tag: non_empty("ORDER_CODE_TAG").unwrap_or(defaults.order_code_tag),
            order_code_max_attempts: non_empty("ORDER_CODE_MAX_ATTEMPTS")
                .and_then(|n| n.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.order_code_max_attempts),
            tracking_base_url: non_empty("TRACKING_BASE_URL")
                .unwrap_or(defaults.tracking_base_url),
            service_titles: non_empty("SERVICE_TITLES")
                .map(|raw| parse_service_titles(&raw))
                .unwrap_or_default(),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Builds the tracking code generator described by this configuration.
    pub fn code_generator(&self) -> OrderCodeGenerator {
        OrderCodeGenerator::new(&self.order_code_tag)
            .with_max_attempts(self.order_code_max_attempts)
    }

    /// Builds the service catalogue described by this configuration.
    pub fn service_catalog(&self) -> InMemoryServiceCatalog {
        let catalog = InMemoryServiceCatalog::new();
        for (id, title) in &self.service_titles {
            catalog.insert(*id, title.as_str());
        }
        catalog
    }
}

/// Parses `3=Web Design;4=SEO`. Malformed entries are skipped.
fn parse_service_titles(raw: &str) -> Vec<(ServiceId, String)> {
    raw.split(';')
        .filter_map(|entry| {
            let (id, title) = entry.split_once('=')?;
            let id: i64 = id.trim().parse().ok()?;
            let title = title.trim();
            (id > 0 && !title.is_empty()).then(|| (ServiceId::new(id), title.to_string()))
        })
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            db_max_connections: 5,
            order_code_tag: OrderCodeGenerator::DEFAULT_ORG_TAG.to_string(),
            order_code_max_attempts: OrderCodeGenerator::DEFAULT_MAX_ATTEMPTS,
            tracking_base_url: DEFAULT_TRACKING_BASE_URL.to_string(),
            service_titles: Vec::new(),
        }
    }
}
