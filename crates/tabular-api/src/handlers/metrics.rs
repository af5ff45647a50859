//! The table-agnostic `/api/{model}/data/` variant (§6.1, §10.6):
//! reuses the compiler with no resource id (so no aggregation/index
//! checks) and the streaming pipeline with the size gate engaged,
//! pointed directly at `{model}` with no resolver lookup
//! (`metrics/app.py::metrics_data`/`metrics_data_csv`).

use axum::body::Body;
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

pub async fn data(
    State(state): State<AppState>,
    Path(model): Path<String>,
    RawQuery(raw): RawQuery,
    Extension(cid): Extension<CorrelationId>,
) -> Result<impl IntoResponse, ApiError> {
    let fragments = split_fragments(&raw);
    let (page, page_size) = parse_pagination(&fragments, state.config.page_size_default, state.config.page_size_max)?;
    let offset = build_offset(page, page_size);

    let fragment_refs: Vec<&str> = fragments.iter().map(String::as_str).collect();
    let sql_query = compile(&fragment_refs, None, false, None, Some(page_size as u64), offset)
        .map_err(|e| ApiError::from(e).with_code(cid.0.clone()))?;

    let (rows, total) = state
        .executor
        .execute_paged(&model, &sql_query)
        .await
        .map_err(|e| ApiError::from(e).with_code(cid.0.clone()))?;

    let base = state.config.external_base_url();
    let path = format!("/api/{model}/data/");
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
        "links": {"next": next, "prev": prev},
        "meta": meta,
    })))
}

pub async fn data_csv(
    State(state): State<AppState>,
    Path(model): Path<String>,
    RawQuery(raw): RawQuery,
    Extension(cid): Extension<CorrelationId>,
) -> Result<impl IntoResponse, ApiError> {
    let fragments = split_fragments(&raw);
    let fragment_refs: Vec<&str> = fragments.iter().map(String::as_str).collect();
    let sql_query =
        compile(&fragment_refs, None, false, None, None, 0).map_err(|e| ApiError::from(e).with_code(cid.0.clone()))?;

    let size_gate = Some(state.config.batch_size as u64);
    let stream = state
        .streaming
        .stream_csv(model.clone(), sql_query, size_gate)
        .await
        .map_err(|e| ApiError::from(e).with_code(cid.0))?;

    Ok(Response::builder()
        .header("content-type", "text/csv")
        .header("content-disposition", format!("attachment; filename=\"{model}.csv\""))
        .body(Body::from_stream(stream))
        .expect("static headers always build a valid response"))
}
