//! Configuration management for RateHub
//!
//! Loads from YAML/TOML files + environment variables via .env

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::types::QuotaTier;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub engine: EngineConfig,
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP API
    pub host: String,
    /// Listen port
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Time-to-live for accepted snapshots in seconds
    pub ttl_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Maximum provider-reported age at which a result is accepted
    /// without trying further providers, in seconds
    pub freshness_threshold_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    pub exchangerate_api: ProviderConfig,
    pub open_exchange_rates: ProviderConfig,
    pub fixer: ProviderConfig,
}

/// Per-provider tuning; credentials come from the environment, not here
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Request budget classification driving selection priority
    pub quota_tier: QuotaTier,
    /// Bounded per-call HTTP timeout in milliseconds
    pub timeout_ms: u64,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let config = Config::builder()
            // Server defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            // Cache defaults (1 hour)
            .set_default("cache.ttl_secs", 3600)?
            // Engine defaults (1 hour freshness window)
            .set_default("engine.freshness_threshold_secs", 3600)?
            // Provider defaults
            .set_default("providers.exchangerate_api.quota_tier", "high")?
            .set_default("providers.exchangerate_api.timeout_ms", 5000)?
            .set_default("providers.open_exchange_rates.quota_tier", "high")?
            .set_default("providers.open_exchange_rates.timeout_ms", 5000)?
            .set_default("providers.fixer.quota_tier", "low")?
            .set_default("providers.fixer.timeout_ms", 5000)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (RATEHUB_*)
            .add_source(Environment::with_prefix("RATEHUB").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Ok(app_config)
    }

    /// Generate a digest of the config (without secrets) for logging
    pub fn digest(&self) -> String {
        format!(
            "listen={}:{} cache_ttl={}s freshness={}s tiers=[era:{} oxr:{} fixer:{}]",
            self.server.host,
            self.server.port,
            self.cache.ttl_secs,
            self.engine.freshness_threshold_secs,
            self.providers.exchangerate_api.quota_tier,
            self.providers.open_exchange_rates.quota_tier,
            self.providers.fixer.quota_tier,
        )
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}

/// Resolve the first non-empty value among candidate environment variables
pub fn resolve_env(var_names: &[&str]) -> Option<String> {
    for var in var_names {
        if let Ok(value) = std::env::var(var) {
            if !value.trim().is_empty() {
                return Some(value);
            }
        }
    }
    None
}
