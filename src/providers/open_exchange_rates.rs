//! Open Exchange Rates adapter
//!
//! Free tier only serves USD as base, so any other base is reported
//! as no data rather than a failure.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::{classify_transport_error, FetchOutcome, RateProvider};
use crate::error::AdapterError;
use crate::types::RateSnapshot;

const API_URL: &str = "https://openexchangerates.org/api/latest.json";
pub(crate) const CREDENTIAL_VAR: &str = "OPENEXCHANGERATES_APP_ID";
const SUPPORTED_BASE: &str = "USD";

/// Client for the Open Exchange Rates `latest.json` endpoint
pub struct OpenExchangeRatesClient {
    client: Client,
    app_id: Option<String>,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    error: Option<bool>,
    description: Option<String>,
    base: Option<String>,
    rates: Option<HashMap<String, f64>>,
    timestamp: Option<i64>,
}

impl OpenExchangeRatesClient {
    pub const NAME: &'static str = "Open Exchange Rates";

    pub fn new(app_id: Option<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            app_id,
            timeout,
        }
    }

    fn map_payload(payload: LatestResponse) -> Result<RateSnapshot, AdapterError> {
        if payload.error == Some(true) {
            let message = payload.description.unwrap_or_else(|| "API Error".to_string());
            return Err(AdapterError::ProviderRejected {
                provider: Self::NAME,
                message,
            });
        }

        let rates = payload.rates.unwrap_or_default();
        if rates.is_empty() {
            return Err(AdapterError::ProviderRejected {
                provider: Self::NAME,
                message: "empty rate table".to_string(),
            });
        }
        let base = payload.base.ok_or_else(|| AdapterError::ProviderRejected {
            provider: Self::NAME,
            message: "missing base".to_string(),
        })?;
        let provider_timestamp = payload.timestamp.ok_or_else(|| AdapterError::ProviderRejected {
            provider: Self::NAME,
            message: "missing timestamp".to_string(),
        })?;

        Ok(RateSnapshot {
            rates,
            base,
            source: Self::NAME.to_string(),
            provider_timestamp,
            retrieved_at: Utc::now(),
        })
    }
}

#[async_trait]
impl RateProvider for OpenExchangeRatesClient {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn fetch_rates(&self, base: &str) -> Result<FetchOutcome, AdapterError> {
        let app_id = self
            .app_id
            .as_deref()
            .ok_or(AdapterError::MissingCredential {
                provider: Self::NAME,
                var: CREDENTIAL_VAR,
            })?;

        // Free tier restriction: base is always USD
        if base != SUPPORTED_BASE {
            debug!(
                provider = Self::NAME,
                %base,
                "free tier only supports USD base, skipping"
            );
            return Ok(FetchOutcome::NoData);
        }

        let url = format!("{API_URL}?app_id={app_id}");
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| classify_transport_error(Self::NAME, e))?;
        let payload: LatestResponse = response
            .json()
            .await
            .map_err(|e| classify_transport_error(Self::NAME, e))?;

        Ok(FetchOutcome::Snapshot(Self::map_payload(payload)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_credential_fails_before_network() {
        let client = OpenExchangeRatesClient::new(None, Duration::from_millis(1));
        let err = client.fetch_rates("USD").await.unwrap_err();
        assert!(matches!(err, AdapterError::MissingCredential { var, .. } if var == CREDENTIAL_VAR));
    }

    #[tokio::test]
    async fn unsupported_base_is_no_data_not_failure() {
        let client =
            OpenExchangeRatesClient::new(Some("key".to_string()), Duration::from_millis(1));
        let outcome = client.fetch_rates("EUR").await.unwrap();
        assert!(matches!(outcome, FetchOutcome::NoData));
    }

    #[test]
    fn maps_success_payload() {
        let payload: LatestResponse = serde_json::from_value(serde_json::json!({
            "base": "USD",
            "rates": {"EUR": 0.92, "JPY": 150.1},
            "timestamp": 1_700_000_000
        }))
        .unwrap();

        let snapshot = OpenExchangeRatesClient::map_payload(payload).unwrap();
        assert_eq!(snapshot.base, "USD");
        assert_eq!(snapshot.source, OpenExchangeRatesClient::NAME);
        assert_eq!(snapshot.rates["JPY"], 150.1);
    }

    #[test]
    fn rejects_error_payload() {
        let payload: LatestResponse = serde_json::from_value(serde_json::json!({
            "error": true,
            "description": "Invalid App ID"
        }))
        .unwrap();

        let err = OpenExchangeRatesClient::map_payload(payload).unwrap_err();
        assert!(
            matches!(err, AdapterError::ProviderRejected { ref message, .. } if message == "Invalid App ID")
        );
    }
}
