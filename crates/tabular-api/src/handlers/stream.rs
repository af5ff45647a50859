//! Bulk CSV/JSON export handlers (§4.4, §6.1).

use axum::body::Body;
use axum::extract::{Path, RawQuery, State};
use axum::response::{IntoResponse, Response};
use axum::Extension;

use crate::correlation::CorrelationId;
use crate::error::ApiError;
use crate::query::split_fragments;
use crate::state::AppState;
use tabular_compiler::compile;

async fn prepare(state: &AppState, rid: &str, raw: &Option<String>) -> Result<(String, String), ApiError> {
    tracing::Span::current().record("resource_id", tracing::field::display(&rid));
    let fragments = split_fragments(raw);
    let indexes = state.resolver.index_policy(rid).await?;
    let aggregation_allowed = state.config.is_aggregation_allowed(rid);
    let fragment_refs: Vec<&str> = fragments.iter().map(String::as_str).collect();
    let sql_query = compile(&fragment_refs, Some(rid), aggregation_allowed, indexes.as_ref(), None, 0)?;
    let resource = state.resolver.resolve(rid, &["parsing_table"]).await?;
    Ok((resource.parsing_table, sql_query))
}

pub async fn data_csv(
    State(state): State<AppState>,
    Path(rid): Path<String>,
    RawQuery(raw): RawQuery,
    Extension(cid): Extension<CorrelationId>,
) -> Result<impl IntoResponse, ApiError> {
    let (table, sql_query) = prepare(&state, &rid, &raw)
        .await
        .map_err(|e: ApiError| e.with_code(cid.0.clone()))?;
    let stream = state
        .streaming
        .stream_csv(table, sql_query, None)
        .await
        .map_err(|e| ApiError::from(e).with_code(cid.0))?;
    Ok(Response::builder()
        .header("content-type", "text/csv")
        .header("content-disposition", format!("attachment; filename=\"{rid}.csv\""))
        .body(Body::from_stream(stream))
        .expect("static headers always build a valid response"))
}

pub async fn data_json(
    State(state): State<AppState>,
    Path(rid): Path<String>,
    RawQuery(raw): RawQuery,
    Extension(cid): Extension<CorrelationId>,
) -> Result<impl IntoResponse, ApiError> {
    let (table, sql_query) = prepare(&state, &rid, &raw)
        .await
        .map_err(|e: ApiError| e.with_code(cid.0.clone()))?;
    let stream = state
        .streaming
        .stream_json(table, sql_query, None)
        .await
        .map_err(|e| ApiError::from(e).with_code(cid.0))?;
    Ok(Response::builder()
        .header("content-type", "application/json")
        .header("content-disposition", format!("attachment; filename=\"{rid}.json\""))
        .body(Body::from_stream(stream))
        .expect("static headers always build a valid response"))
}
