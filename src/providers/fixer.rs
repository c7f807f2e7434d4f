//! Fixer.io adapter
//!
//! Free tier only serves EUR as base and speaks plain HTTP, so any
//! other base is reported as no data rather than a failure.

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

const API_URL: &str = "http://data.fixer.io/api/latest";
pub(crate) const CREDENTIAL_VAR: &str = "FIXER_API_KEY";
const SUPPORTED_BASE: &str = "EUR";

/// Client for the Fixer.io `latest` endpoint
pub struct FixerClient {
    client: Client,
    api_key: Option<String>,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    success: bool,
    error: Option<FixerError>,
    base: Option<String>,
    rates: Option<HashMap<String, f64>>,
    timestamp: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct FixerError {
    info: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl FixerClient {
    pub const NAME: &'static str = "Fixer.io";

    pub fn new(api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            api_key,
            timeout,
        }
    }

    fn map_payload(payload: LatestResponse) -> Result<RateSnapshot, AdapterError> {
        if !payload.success {
            let message = payload
                .error
                .and_then(|e| e.info.or(e.kind))
                .unwrap_or_else(|| "API Error".to_string());
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
impl RateProvider for FixerClient {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn fetch_rates(&self, base: &str) -> Result<FetchOutcome, AdapterError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AdapterError::MissingCredential {
                provider: Self::NAME,
                var: CREDENTIAL_VAR,
            })?;

        // Free tier restriction: base is always EUR
        if base != SUPPORTED_BASE {
            debug!(
                provider = Self::NAME,
                %base,
                "free tier only supports EUR base, skipping"
            );
            return Ok(FetchOutcome::NoData);
        }

        let url = format!("{API_URL}?access_key={api_key}");
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
        let client = FixerClient::new(None, Duration::from_millis(1));
        let err = client.fetch_rates("EUR").await.unwrap_err();
        assert!(matches!(err, AdapterError::MissingCredential { var, .. } if var == CREDENTIAL_VAR));
    }

    #[tokio::test]
    async fn unsupported_base_is_no_data_not_failure() {
        let client = FixerClient::new(Some("key".to_string()), Duration::from_millis(1));
        let outcome = client.fetch_rates("USD").await.unwrap();
        assert!(matches!(outcome, FetchOutcome::NoData));
    }

    #[test]
    fn maps_success_payload() {
        let payload: LatestResponse = serde_json::from_value(serde_json::json!({
            "success": true,
            "base": "EUR",
            "rates": {"USD": 1.09, "GBP": 0.86},
            "timestamp": 1_700_000_000
        }))
        .unwrap();

        let snapshot = FixerClient::map_payload(payload).unwrap();
        assert_eq!(snapshot.base, "EUR");
        assert_eq!(snapshot.source, FixerClient::NAME);
        assert_eq!(snapshot.rates["USD"], 1.09);
    }

    #[test]
    fn rejects_error_payload() {
        let payload: LatestResponse = serde_json::from_value(serde_json::json!({
            "success": false,
            "error": {"type": "invalid_access_key", "info": "You have not supplied a valid API Access Key."}
        }))
        .unwrap();

        let err = FixerClient::map_payload(payload).unwrap_err();
        assert!(
            matches!(err, AdapterError::ProviderRejected { ref message, .. } if message.contains("Access Key"))
        );
    }
}
