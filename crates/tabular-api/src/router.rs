//! Router assembly (§10.5): typed path extractors for `{rid}`/`{model}`,
//! `tower-http`'s CORS/compression/trace layers wired the way
//! `ouroboros-api`/`data-bridge-api` compose tower layers around their
//! router, plus the correlation-id middleware (§10.2).

use axum::routing::get;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::correlation::correlation_middleware;
use crate::handlers::{aggregation, docs, health, metrics, resource, stream};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let doc_path = state.config.doc_path.clone();

    Router::new()
        .route("/api/resources/{rid}/", get(resource::metadata))
        .route("/api/resources/{rid}/profile/", get(resource::profile))
        .route("/api/resources/{rid}/swagger/", get(resource::swagger))
        .route("/api/resources/{rid}/data/", get(resource::data))
        .route("/api/resources/{rid}/data/csv/", get(stream::data_csv))
        .route("/api/resources/{rid}/data/json/", get(stream::data_json))
        .route("/health/", get(health::health))
        .route("/api/aggregation-exceptions/", get(aggregation::list))
        .route("/api/{model}/data/", get(metrics::data))
        .route("/api/{model}/data/csv/", get(metrics::data_csv))
        .route("/metrics/health/", get(health::health_metrics))
        .route(&doc_path, get(docs::index))
        .layer(axum::middleware::from_fn(correlation_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
