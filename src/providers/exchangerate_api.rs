//! ExchangeRate-API adapter
//!
//! v6 REST API, documented at https://www.exchangerate-api.com/docs.
//! The paid plan serves any base currency, which makes this the
//! workhorse provider.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::{classify_transport_error, FetchOutcome, RateProvider};
use crate::error::AdapterError;
use crate::types::RateSnapshot;

const API_URL: &str = "https://v6.exchangerate-api.com/v6";
pub(crate) const CREDENTIAL_VAR: &str = "EXCHANGERATE_API_KEY";

/// Client for the ExchangeRate-API `latest` endpoint
pub struct ExchangeRateApiClient {
    client: Client,
    api_key: Option<String>,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    result: String,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    base_code: Option<String>,
    conversion_rates: Option<HashMap<String, f64>>,
    time_last_update_unix: Option<i64>,
}

impl ExchangeRateApiClient {
    pub const NAME: &'static str = "ExchangeRate-API";

    pub fn new(api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            api_key,
            timeout,
        }
    }

    /// Map the native payload into a canonical snapshot
    fn map_payload(payload: LatestResponse) -> Result<RateSnapshot, AdapterError> {
        if payload.result != "success" {
            let kind = payload.error_type.unwrap_or_else(|| "unknown".to_string());
            return Err(AdapterError::ProviderRejected {
                provider: Self::NAME,
                message: format!("API Error: {kind}"),
            });
        }

        let rates = payload.conversion_rates.unwrap_or_default();
        if rates.is_empty() {
            return Err(AdapterError::ProviderRejected {
                provider: Self::NAME,
                message: "empty rate table".to_string(),
            });
        }
        let base = payload.base_code.ok_or_else(|| AdapterError::ProviderRejected {
            provider: Self::NAME,
            message: "missing base_code".to_string(),
        })?;
        let provider_timestamp =
            payload
                .time_last_update_unix
                .ok_or_else(|| AdapterError::ProviderRejected {
                    provider: Self::NAME,
                    message: "missing time_last_update_unix".to_string(),
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
impl RateProvider for ExchangeRateApiClient {
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

        let url = format!("{API_URL}/{api_key}/latest/{base}");
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
        let client = ExchangeRateApiClient::new(None, Duration::from_millis(1));
        let err = client.fetch_rates("USD").await.unwrap_err();
        assert!(matches!(err, AdapterError::MissingCredential { var, .. } if var == CREDENTIAL_VAR));
    }

    #[test]
    fn maps_success_payload() {
        let payload: LatestResponse = serde_json::from_value(serde_json::json!({
            "result": "success",
            "base_code": "USD",
            "conversion_rates": {"EUR": 0.92, "GBP": 0.79},
            "time_last_update_unix": 1_700_000_000
        }))
        .unwrap();

        let snapshot = ExchangeRateApiClient::map_payload(payload).unwrap();
        assert_eq!(snapshot.base, "USD");
        assert_eq!(snapshot.source, ExchangeRateApiClient::NAME);
        assert_eq!(snapshot.provider_timestamp, 1_700_000_000);
        assert_eq!(snapshot.rates["EUR"], 0.92);
    }

    #[test]
    fn rejects_error_payload() {
        let payload: LatestResponse = serde_json::from_value(serde_json::json!({
            "result": "error",
            "error-type": "invalid-key"
        }))
        .unwrap();

        let err = ExchangeRateApiClient::map_payload(payload).unwrap_err();
        assert!(
            matches!(err, AdapterError::ProviderRejected { ref message, .. } if message.contains("invalid-key"))
        );
    }

    #[test]
    fn rejects_empty_rate_table() {
        let payload: LatestResponse = serde_json::from_value(serde_json::json!({
            "result": "success",
            "base_code": "USD",
            "conversion_rates": {},
            "time_last_update_unix": 1_700_000_000
        }))
        .unwrap();

        assert!(ExchangeRateApiClient::map_payload(payload).is_err());
    }
}
