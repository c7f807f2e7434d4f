//! Error taxonomy for provider adapters and the aggregation engine

use thiserror::Error;

/// Failure of a single provider adapter call
#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    /// Required credential is not configured; raised before any network I/O
    #[error("{provider}: missing credential {var}")]
    MissingCredential {
        provider: &'static str,
        var: &'static str,
    },

    /// The bounded per-call timeout elapsed
    #[error("{provider}: request timed out")]
    Timeout { provider: &'static str },

    /// Transport-level failure (connection, TLS, non-timeout I/O)
    #[error("{provider}: transport error: {message}")]
    Http {
        provider: &'static str,
        message: String,
    },

    /// The provider answered but with an explicit error or a malformed payload
    #[error("{provider}: rejected: {message}")]
    ProviderRejected {
        provider: &'static str,
        message: String,
    },
}

/// Failure of a whole fetch request as seen by callers of the engine
#[derive(Debug, Error)]
pub enum FetchError {
    /// A pinned-source request named a provider that is not registered
    #[error("unknown provider '{0}'")]
    UnknownProvider(String),

    /// A pinned provider skipped the request (e.g. unsupported base)
    #[error("provider '{provider}' returned no data for base {base}")]
    ProviderReturnedNoData { provider: String, base: String },

    /// A pinned provider's adapter failed; propagated as-is
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// Auto-selection exhausted every candidate without a usable snapshot
    #[error("all providers failed for {base}. Errors: {}", messages.join("; "))]
    AllProvidersExhausted {
        base: String,
        messages: Vec<String>,
    },
}
