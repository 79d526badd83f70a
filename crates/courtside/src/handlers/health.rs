//! Health check endpoints for orchestrator liveness and readiness checks.
//!
//! - `/livez` - Basic liveness check (immediate 200, no dependencies)
//! - `/healthz` - Per-repository cache sizes

use std::collections::BTreeMap;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    /// Cached entries per entity kind.
    pub caches: BTreeMap<&'static str, usize>,
}

/// GET /livez - Basic liveness check.
#[axum::debug_handler]
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET /healthz - Cache statistics.
#[axum::debug_handler]
pub async fn healthz(State(state): State<AppState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        caches: state.cache_sizes().await,
    })
}
