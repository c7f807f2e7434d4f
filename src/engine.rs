//! Rate engine — provider orchestration and freshness-aware fallback
//!
//! One fetch request walks a small state machine: serve from cache,
//! else try providers in quota order, accept the first fresh result
//! immediately, and fall back to the best stale result only after every
//! candidate has been tried. Provider calls are strictly sequential per
//! request; concurrent requests share the cache and registry.

use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::{generic_key, pinned_key, FreshnessCache};
use crate::error::FetchError;
use crate::providers::FetchOutcome;
use crate::registry::ProviderRegistry;
use crate::types::{ProviderStatusReport, RateSnapshot};

/// Aggregation engine; constructed once at startup and shared via `Arc`
pub struct RateEngine {
    registry: Arc<ProviderRegistry>,
    cache: FreshnessCache,
    cache_ttl: Duration,
    /// Maximum provider-reported age accepted without searching further
    freshness_threshold_secs: i64,
}

impl RateEngine {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        cache_ttl_secs: i64,
        freshness_threshold_secs: i64,
    ) -> Self {
        Self {
            registry,
            cache: FreshnessCache::new(),
            cache_ttl: Duration::seconds(cache_ttl_secs),
            freshness_threshold_secs,
        }
    }

    /// Fetch the rate set for `base`, optionally pinned to one provider.
    ///
    /// A pinned request is a request for *that* provider: its failures
    /// propagate as-is with no fallback, and a stale result is accepted
    /// unconditionally.
    pub async fn fetch_rates(
        &self,
        base: &str,
        source: Option<&str>,
    ) -> Result<Arc<RateSnapshot>, FetchError> {
        let key = match source {
            Some(source) => pinned_key(base, source),
            None => generic_key(base),
        };
        if let Some(snapshot) = self.cache.get(&key).await {
            debug!(%base, ?source, "serving from cache");
            return Ok(snapshot);
        }

        match source {
            Some(source) => self.fetch_pinned(base, source).await,
            None => self.fetch_auto(base).await,
        }
    }

    /// Read-only provider health projection
    pub async fn provider_status(&self) -> Vec<ProviderStatusReport> {
        self.registry.status_snapshot().await
    }

    async fn fetch_pinned(
        &self,
        base: &str,
        source: &str,
    ) -> Result<Arc<RateSnapshot>, FetchError> {
        let adapter = self
            .registry
            .get(source)
            .ok_or_else(|| FetchError::UnknownProvider(source.to_string()))?;
        let name = adapter.name();

        match adapter.fetch_rates(base).await {
            Ok(FetchOutcome::Snapshot(snapshot)) => {
                self.registry.record_outcome(name, true, Utc::now()).await;
                let snapshot = Arc::new(snapshot);
                self.store(base, name, &snapshot).await;
                Ok(snapshot)
            }
            Ok(FetchOutcome::NoData) => Err(FetchError::ProviderReturnedNoData {
                provider: name.to_string(),
                base: base.to_string(),
            }),
            Err(err) => {
                self.registry.record_outcome(name, false, Utc::now()).await;
                warn!(provider = name, %base, error = %err, "pinned provider failed");
                Err(err.into())
            }
        }
    }

    async fn fetch_auto(&self, base: &str) -> Result<Arc<RateSnapshot>, FetchError> {
        let mut errors: Vec<String> = Vec::new();
        let mut best_stale: Option<RateSnapshot> = None;

        for adapter in self.registry.candidate_order() {
            let name = adapter.name();
            match adapter.fetch_rates(base).await {
                Ok(FetchOutcome::NoData) => {
                    debug!(provider = name, %base, "no data for base, skipping");
                }
                Ok(FetchOutcome::Snapshot(snapshot)) => {
                    self.registry.record_outcome(name, true, Utc::now()).await;
                    let age = snapshot.age_secs(Utc::now().timestamp());
                    info!(provider = name, %base, age_secs = age, "provider returned data");

                    if age < self.freshness_threshold_secs {
                        let snapshot = Arc::new(snapshot);
                        self.store(base, name, &snapshot).await;
                        return Ok(snapshot);
                    }

                    // Stale but usable: keep only a strictly fresher candidate
                    let fresher = best_stale
                        .as_ref()
                        .map_or(true, |b| snapshot.provider_timestamp > b.provider_timestamp);
                    if fresher {
                        best_stale = Some(snapshot);
                    }
                }
                Err(err) => {
                    warn!(provider = name, %base, error = %err, "provider failed");
                    errors.push(err.to_string());
                    self.registry.record_outcome(name, false, Utc::now()).await;
                }
            }
        }

        if let Some(snapshot) = best_stale {
            info!(
                source = %snapshot.source,
                %base,
                age_secs = snapshot.age_secs(Utc::now().timestamp()),
                "all providers checked, returning best stale candidate"
            );
            let source = snapshot.source.clone();
            let snapshot = Arc::new(snapshot);
            self.store(base, &source, &snapshot).await;
            return Ok(snapshot);
        }

        Err(FetchError::AllProvidersExhausted {
            base: base.to_string(),
            messages: errors,
        })
    }

    /// Store an accepted snapshot under both the generic and the
    /// source-pinned key, so a later pinned or auto lookup reuses it
    async fn store(&self, base: &str, source: &str, snapshot: &Arc<RateSnapshot>) {
        self.cache
            .put(generic_key(base), Arc::clone(snapshot), self.cache_ttl)
            .await;
        self.cache
            .put(pinned_key(base, source), Arc::clone(snapshot), self.cache_ttl)
            .await;
    }
}
