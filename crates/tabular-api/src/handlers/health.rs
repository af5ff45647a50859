//! `/health/` probes (`core/health.py::check_health`): HEADs a table
//! known to always exist and reports uptime on success. The resource
//! surface and the metrics surface probe different tables
//! (`tabular/app.py` vs. `metrics/app.py`), so each gets its own route.

use axum::extract::State;
use axum::response::{IntoResponse, Json};
use serde_json::json;

use crate::error::ApiError;
use crate::state::AppState;

/// Table the resource surface's health probe targets; always present
/// regardless of which resources have been parsed (`tabular/app.py`).
const RESOURCE_HEALTH_TABLE: &str = "migrations_csv";

/// Table the metrics surface's health probe targets (`metrics/app.py`).
const METRICS_HEALTH_TABLE: &str = "site";

async fn probe(state: &AppState, table: &str) -> Result<impl IntoResponse, ApiError> {
    let url = format!("{}/{table}", state.config.pgrest_endpoint);
    let response = state
        .http
        .head(&url)
        .send()
        .await
        .map_err(|e| ApiError::new(503, "DB unavailable", json!(e.to_string())))?;
    if !response.status().is_success() {
        return Err(ApiError::new(
            503,
            "DB unavailable",
            json!("postgREST has not started yet"),
        ));
    }
    Ok(Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": state.start_time.elapsed().as_secs_f64(),
    })))
}

pub async fn health(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    probe(&state, RESOURCE_HEALTH_TABLE).await
}

pub async fn health_metrics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    probe(&state, METRICS_HEALTH_TABLE).await
}
