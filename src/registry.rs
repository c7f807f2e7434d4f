//! Provider registry
//!
//! Holds the fixed set of adapters chosen at startup plus the mutable
//! per-provider health state. Health records are owned here exclusively;
//! external collaborators only ever see read-only projections.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::thread_rng;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::providers::RateProvider;
use crate::types::{ProviderHealth, ProviderStatus, ProviderStatusReport, QuotaTier};

struct RegisteredProvider {
    adapter: Arc<dyn RateProvider>,
    tier: QuotaTier,
    health: RwLock<ProviderHealth>,
}

/// Fixed set of (config, adapter) pairs plus per-provider health state.
///
/// Providers are registered once at startup and never removed.
pub struct ProviderRegistry {
    providers: Vec<RegisteredProvider>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Register an adapter with its quota tier. Registration order is
    /// the stable configuration order.
    pub fn register(&mut self, adapter: Arc<dyn RateProvider>, tier: QuotaTier) {
        info!(provider = adapter.name(), %tier, "provider registered");
        self.providers.push(RegisteredProvider {
            adapter,
            tier,
            health: RwLock::new(ProviderHealth::default()),
        });
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Look up a provider by name (pinned-source fetches)
    pub fn get(&self, name: &str) -> Option<Arc<dyn RateProvider>> {
        self.providers
            .iter()
            .find(|p| p.adapter.name() == name)
            .map(|p| Arc::clone(&p.adapter))
    }

    /// All providers in stable configuration order
    pub fn all_providers(&self) -> Vec<Arc<dyn RateProvider>> {
        self.providers
            .iter()
            .map(|p| Arc::clone(&p.adapter))
            .collect()
    }

    /// Candidate ordering for auto-selection.
    ///
    /// High-tier providers come first in a freshly shuffled order so no
    /// single high-quota provider is hammered every cycle; low-tier
    /// providers are appended in fixed configuration order as the last
    /// resort, since their quota is scarce.
    pub fn candidate_order(&self) -> Vec<Arc<dyn RateProvider>> {
        let mut high: Vec<Arc<dyn RateProvider>> = self
            .providers
            .iter()
            .filter(|p| p.tier == QuotaTier::High)
            .map(|p| Arc::clone(&p.adapter))
            .collect();
        high.shuffle(&mut thread_rng());

        let low = self
            .providers
            .iter()
            .filter(|p| p.tier == QuotaTier::Low)
            .map(|p| Arc::clone(&p.adapter));

        high.into_iter().chain(low).collect()
    }

    /// Record a fetch outcome for a provider. Unknown names are a no-op.
    pub async fn record_outcome(&self, name: &str, success: bool, at: DateTime<Utc>) {
        let Some(provider) = self.providers.iter().find(|p| p.adapter.name() == name) else {
            return;
        };
        let mut health = provider.health.write().await;
        if success {
            health.status = ProviderStatus::Active;
            health.last_success_at = Some(at);
        } else {
            health.status = ProviderStatus::Down;
            health.last_failure_at = Some(at);
        }
    }

    /// Read-only health projection for external reporting
    pub async fn status_snapshot(&self) -> Vec<ProviderStatusReport> {
        let mut reports = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            let health = provider.health.read().await;
            reports.push(ProviderStatusReport {
                name: provider.adapter.name().to_string(),
                quota_tier: provider.tier,
                status: health.status,
                last_success_at: health.last_success_at,
                last_failure_at: health.last_failure_at,
            });
        }
        reports
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
