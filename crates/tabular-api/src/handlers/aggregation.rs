//! `/api/aggregation-exceptions/`: the configured allow-list, verbatim.

use axum::extract::State;
use axum::response::{IntoResponse, Json};

use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.config.allow_aggregation.clone())
}
