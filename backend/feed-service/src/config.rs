/// Configuration management for the feed service
///
/// Loads configuration from environment variables.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Feed composition settings
    pub feed: FeedConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// HTTP port
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Min connections in pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Feed composition settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Page size used when the caller passes zero or nothing
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    /// Upper bound on caller-supplied page sizes
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    /// How many candidate posts are enriched concurrently
    #[serde(default = "default_enrich_concurrency")]
    pub enrich_concurrency: usize,
    /// Per-candidate enrichment deadline; a slow candidate is dropped,
    /// not allowed to stall the page
    #[serde(default = "default_enrich_timeout_ms")]
    pub enrich_timeout_ms: u64,
}

// Default values
fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_page_size() -> u32 {
    5
}

fn default_max_page_size() -> u32 {
    50
}

fn default_enrich_concurrency() -> usize {
    8
}

fn default_enrich_timeout_ms() -> u64 {
    5_000
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            enrich_concurrency: default_enrich_concurrency(),
            enrich_timeout_ms: default_enrich_timeout_ms(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(fallback)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_parse("PORT", 8010),
        };

        let database = DatabaseConfig {
            url: std::env::var("DATABASE_URL")
                .context("DATABASE_URL environment variable not set")?,
            max_connections: env_parse("DB_MAX_CONNECTIONS", default_max_connections()),
            min_connections: env_parse("DB_MIN_CONNECTIONS", default_min_connections()),
        };

        let feed = FeedConfig {
            default_page_size: env_parse("FEED_DEFAULT_PAGE_SIZE", default_page_size()),
            max_page_size: env_parse("FEED_MAX_PAGE_SIZE", default_max_page_size()),
            enrich_concurrency: env_parse("FEED_ENRICH_CONCURRENCY", default_enrich_concurrency()),
            enrich_timeout_ms: env_parse("FEED_ENRICH_TIMEOUT_MS", default_enrich_timeout_ms()),
        };

        Ok(Config {
            app,
            database,
            feed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        std::env::set_var("DATABASE_URL", "postgres://test");

        let config = Config::from_env().unwrap();

        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.host, "0.0.0.0");
        assert_eq!(config.app.port, 8010);
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.database.min_connections, 5);
        assert_eq!(config.feed.default_page_size, 5);
        assert_eq!(config.feed.max_page_size, 50);
        assert_eq!(config.feed.enrich_concurrency, 8);
        assert_eq!(config.feed.enrich_timeout_ms, 5_000);
    }
}
