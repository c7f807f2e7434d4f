//! Core types used throughout RateHub
//!
//! Defines the canonical rate snapshot and per-provider health structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Canonical result of one provider query.
///
/// Immutable once constructed; shared between the cache and callers via
/// `Arc`. `rates` is never empty — an adapter that cannot produce rates
/// reports no data or fails instead of building an empty snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSnapshot {
    /// Currency code -> conversion factor relative to `base`
    pub rates: HashMap<String, f64>,
    /// Currency code the rates are expressed against
    pub base: String,
    /// Name of the provider that produced this snapshot
    pub source: String,
    /// Epoch seconds the provider claims the rates were last updated.
    /// Authoritative for freshness decisions.
    pub provider_timestamp: i64,
    /// Wall-clock time the snapshot was received (informational only)
    pub retrieved_at: DateTime<Utc>,
}

impl RateSnapshot {
    /// Age in seconds relative to the provider-claimed update time
    pub fn age_secs(&self, now: i64) -> i64 {
        now - self.provider_timestamp
    }
}

/// Request budget classification of a provider's plan.
///
/// High-tier providers are tried first (in randomized order to spread
/// load); low-tier providers are the last resort because their quota
/// is scarce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaTier {
    High,
    Low,
}

impl fmt::Display for QuotaTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotaTier::High => write!(f, "high"),
            QuotaTier::Low => write!(f, "low"),
        }
    }
}

/// Health status of a provider as observed by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderStatus {
    /// No fetch attempted yet
    Unknown,
    /// Most recent fetch succeeded
    Active,
    /// Most recent fetch failed
    Down,
}

impl Default for ProviderStatus {
    fn default() -> Self {
        ProviderStatus::Unknown
    }
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderStatus::Unknown => write!(f, "unknown"),
            ProviderStatus::Active => write!(f, "active"),
            ProviderStatus::Down => write!(f, "down"),
        }
    }
}

/// Mutable health record for one provider, owned by the registry
#[derive(Debug, Clone, Default)]
pub struct ProviderHealth {
    pub status: ProviderStatus,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_failure_at: Option<DateTime<Utc>>,
}

/// Read-only projection of a provider's health for external reporting
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatusReport {
    pub name: String,
    pub quota_tier: QuotaTier,
    pub status: ProviderStatus,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_failure_at: Option<DateTime<Utc>>,
}
