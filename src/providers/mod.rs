//! Rate provider adapters (ExchangeRate-API, Open Exchange Rates, Fixer)
//!
//! Each adapter translates one upstream API's response shape into the
//! canonical [`RateSnapshot`]. Adapters are pure translation plus a
//! credential-presence check; they never touch the cache or health state.

mod exchangerate_api;
mod fixer;
mod open_exchange_rates;

pub use exchangerate_api::ExchangeRateApiClient;
pub use fixer::FixerClient;
pub use open_exchange_rates::OpenExchangeRatesClient;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::config::{resolve_env, AppConfig};
use crate::error::AdapterError;
use crate::registry::ProviderRegistry;
use crate::types::RateSnapshot;

/// Trait for rate provider clients
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &'static str;

    /// Fetch the full rate table for `base`.
    ///
    /// `NoData` is an expected skip (e.g. the provider's plan does not
    /// support the requested base) and must not be treated as a failure.
    async fn fetch_rates(&self, base: &str) -> Result<FetchOutcome, AdapterError>;
}

/// Result of one adapter call that did not error
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// Canonical snapshot; `rates` is guaranteed non-empty
    Snapshot(RateSnapshot),
    /// The provider cannot serve this request (not a health failure)
    NoData,
}

/// Classify a reqwest error into the adapter taxonomy
pub(crate) fn classify_transport_error(provider: &'static str, err: reqwest::Error) -> AdapterError {
    if err.is_timeout() {
        AdapterError::Timeout { provider }
    } else if err.is_decode() {
        AdapterError::ProviderRejected {
            provider,
            message: format!("malformed payload: {err}"),
        }
    } else {
        AdapterError::Http {
            provider,
            message: err.to_string(),
        }
    }
}

/// Build the provider registry from configuration.
///
/// A provider whose credential is absent is not registered: it is
/// disabled for the life of the process, not fatal to the system.
pub fn build_registry(config: &AppConfig) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();

    let era = &config.providers.exchangerate_api;
    match resolve_env(&[exchangerate_api::CREDENTIAL_VAR]) {
        Some(key) => registry.register(
            Arc::new(ExchangeRateApiClient::new(
                Some(key),
                Duration::from_millis(era.timeout_ms),
            )),
            era.quota_tier,
        ),
        None => warn!(
            provider = ExchangeRateApiClient::NAME,
            "{} not set, provider disabled",
            exchangerate_api::CREDENTIAL_VAR
        ),
    }

    let oxr = &config.providers.open_exchange_rates;
    match resolve_env(&[open_exchange_rates::CREDENTIAL_VAR]) {
        Some(key) => registry.register(
            Arc::new(OpenExchangeRatesClient::new(
                Some(key),
                Duration::from_millis(oxr.timeout_ms),
            )),
            oxr.quota_tier,
        ),
        None => warn!(
            provider = OpenExchangeRatesClient::NAME,
            "{} not set, provider disabled",
            open_exchange_rates::CREDENTIAL_VAR
        ),
    }

    let fixer_cfg = &config.providers.fixer;
    match resolve_env(&[fixer::CREDENTIAL_VAR]) {
        Some(key) => registry.register(
            Arc::new(FixerClient::new(
                Some(key),
                Duration::from_millis(fixer_cfg.timeout_ms),
            )),
            fixer_cfg.quota_tier,
        ),
        None => warn!(
            provider = FixerClient::NAME,
            "{} not set, provider disabled",
            fixer::CREDENTIAL_VAR
        ),
    }

    registry
}
