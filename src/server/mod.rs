//! HTTP API
//!
//! Thin plumbing over the engine: request parsing, symbol filtering,
//! and error-to-status mapping. All rate logic lives in the engine.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use crate::engine::RateEngine;

/// Create the API router with all endpoints
pub fn create_router(engine: Arc<RateEngine>) -> Router {
    Router::new()
        .route("/rates", get(get_rates))
        .route("/api/rates", get(get_rates))
        .route("/providers", get(get_providers))
        .route("/health", get(get_health))
        .with_state(engine)
        // CORS for frontend
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

#[derive(Debug, Deserialize)]
struct RatesQuery {
    base: Option<String>,
    source: Option<String>,
    symbols: Option<String>,
}

#[derive(Debug, Serialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
    base: String,
    source: String,
    timestamp: i64,
    updated_at_local: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// GET /rates?base=USD&source=Fixer.io&symbols=EUR,GBP
///
/// The engine always computes and caches the complete rate set; the
/// symbols filter is applied here as a presentation concern.
async fn get_rates(
    Query(query): Query<RatesQuery>,
    State(engine): State<Arc<RateEngine>>,
) -> Response {
    let base = query
        .base
        .as_deref()
        .unwrap_or("USD")
        .trim()
        .to_uppercase();

    match engine.fetch_rates(&base, query.source.as_deref()).await {
        Ok(snapshot) => {
            let mut rates = snapshot.rates.clone();
            if let Some(symbols) = query.symbols.as_deref() {
                let requested: HashSet<String> = symbols
                    .split(',')
                    .map(|s| s.trim().to_uppercase())
                    .filter(|s| !s.is_empty())
                    .collect();
                rates.retain(|code, _| requested.contains(code));
            }

            Json(RatesResponse {
                rates,
                base: snapshot.base.clone(),
                source: snapshot.source.clone(),
                timestamp: snapshot.provider_timestamp,
                updated_at_local: snapshot.retrieved_at.to_rfc3339(),
            })
            .into_response()
        }
        Err(err) => {
            error!(%base, error = %err, "rate fetch failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /providers - per-provider health projection
async fn get_providers(State(engine): State<Arc<RateEngine>>) -> Response {
    Json(engine.provider_status().await).into_response()
}

/// GET /health - liveness probe, no engine involvement
async fn get_health() -> Response {
    Json(serde_json::json!({"status": "ok"})).into_response()
}
