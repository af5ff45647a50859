//! Per-resource metadata/profile/swagger/data handlers
//! (§6.1, `tabular/app.py`).

use axum::extract::{Path, RawQuery, State};
use axum::response::{IntoResponse, Json, Response};
use axum::Extension;
use serde_json::json;

use crate::correlation::CorrelationId;
use crate::error::ApiError;
use crate::links::{build_link_with_page, build_next_page};
use crate::query::{build_offset, parse_pagination, split_fragments};
use crate::state::AppState;
use tabular_compiler::compile;

pub async fn metadata(
    State(state): State<AppState>,
    Path(rid): Path<String>,
    Extension(cid): Extension<CorrelationId>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::Span::current().record("resource_id", tracing::field::display(&rid));
    let resource = state
        .resolver
        .resolve(&rid, &["created_at", "url"])
        .await
        .map_err(|e| ApiError::from(e).with_code(cid.0.clone()))?;
    let base = state.config.external_base_url();
    Ok(Json(json!({
        "created_at": resource.created_at,
        "url": resource.url,
        "links": [
            {"href": format!("{base}/api/resources/{rid}/profile/"), "type": "GET", "rel": "profile"},
            {"href": format!("{base}/api/resources/{rid}/data/"), "type": "GET", "rel": "data"},
            {"href": format!("{base}/api/resources/{rid}/swagger/"), "type": "GET", "rel": "swagger"},
        ],
    })))
}

pub async fn profile(
    State(state): State<AppState>,
    Path(rid): Path<String>,
    Extension(cid): Extension<CorrelationId>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::Span::current().record("resource_id", tracing::field::display(&rid));
    let resource = state
        .resolver
        .resolve(&rid, &["profile:csv_detective"])
        .await
        .map_err(|e| ApiError::from(e).with_code(cid.0.clone()))?;
    let indexes = state
        .resolver
        .index_policy(&rid)
        .await
        .map_err(|e| ApiError::from(e).with_code(cid.0.clone()))?;
    Ok(Json(json!({
        "columns": resource.profile,
        "indexes": indexes,
    })))
}

pub async fn swagger(
    State(state): State<AppState>,
    Path(rid): Path<String>,
    Extension(cid): Extension<CorrelationId>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::Span::current().record("resource_id", tracing::field::display(&rid));
    let resource = state
        .resolver
        .resolve(&rid, &["profile:csv_detective"])
        .await
        .map_err(|e| ApiError::from(e).with_code(cid.0.clone()))?;
    let indexes = state
        .resolver
        .index_policy(&rid)
        .await
        .map_err(|e| ApiError::from(e).with_code(cid.0.clone()))?;
    let allowed: Option<Vec<&str>> = indexes.as_ref().map(|set| set.iter().map(String::as_str).collect());
    let aggregation_allowed = state.config.is_aggregation_allowed(&rid);
    let document = tabular_openapi::build_openapi_document(
        &rid,
        &resource.profile,
        aggregation_allowed,
        allowed.as_deref(),
    );
    let response = Response::builder()
        .header("content-type", "application/yaml")
        .body(axum::body::Body::from(document))
        .expect("static headers always build a valid response");
    Ok(response)
}

pub async fn data(
    State(state): State<AppState>,
    Path(rid): Path<String>,
    RawQuery(raw): RawQuery,
    Extension(cid): Extension<CorrelationId>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::Span::current().record("resource_id", tracing::field::display(&rid));
    let fragments = split_fragments(&raw);
    let (page, page_size) = parse_pagination(&fragments, state.config.page_size_default, state.config.page_size_max)?;
    let offset = build_offset(page, page_size);

    let indexes = state
        .resolver
        .index_policy(&rid)
        .await
        .map_err(|e| ApiError::from(e).with_code(cid.0.clone()))?;
    let aggregation_allowed = state.config.is_aggregation_allowed(&rid);
    let fragment_refs: Vec<&str> = fragments.iter().map(String::as_str).collect();
    let sql_query = compile(
        &fragment_refs,
        Some(&rid),
        aggregation_allowed,
        indexes.as_ref(),
        Some(page_size as u64),
        offset,
    )
    .map_err(|e| ApiError::from(e).with_code(cid.0.clone()))?;

    let resource = state
        .resolver
        .resolve(&rid, &["parsing_table"])
        .await
        .map_err(|e| ApiError::from(e).with_code(cid.0.clone()))?;
    let (rows, total) = state
        .executor
        .execute_paged(&resource.parsing_table, &sql_query)
        .await
        .map_err(|e| ApiError::from(e).with_code(cid.0.clone()))?;

    let base = state.config.external_base_url();
    let path = format!("/api/resources/{rid}/data/");
    let next_default = build_link_with_page(&base, &path, &fragments, page + 1, page_size);
    let prev_default = build_link_with_page(&base, &path, &fragments, page.saturating_sub(1).max(1), page_size);
    let next = build_next_page(rows.len(), page_size, offset, total, &next_default);
    let prev = if page > 1 { Some(prev_default) } else { None };

    let mut meta = json!({"page": page, "page_size": page_size});
    if let Some(total) = total {
        meta["total"] = json!(total);
    }

    Ok(Json(json!({
        "data": rows,
        "links": {
            "profile": format!("{base}/api/resources/{rid}/profile/"),
            "swagger": format!("{base}/api/resources/{rid}/swagger/"),
            "next": next,
            "prev": prev,
        },
        "meta": meta,
    })))
}
