//! API-facing error shaping (§6.2, §7, §10.3): flattens every lower
//! error into the `{"errors":[{"code","title","detail"}]}` envelope,
//! following `ouroboros_api::error::ApiError`'s `status_code()` method.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use tabular_client::ClientError;
use tabular_compiler::CompileError;

#[derive(Debug)]
pub struct ApiError {
    status: u16,
    title: String,
    detail: serde_json::Value,
    code: Option<String>,
}

impl ApiError {
    pub fn new(status: u16, title: impl Into<String>, detail: serde_json::Value) -> Self {
        Self {
            status,
            title: title.into(),
            detail,
            code: None,
        }
    }

    /// Attaches the per-request correlation id as the envelope's `code`
    /// field, minted once per request when no telemetry DSN is
    /// configured (§6.2).
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn status_code(&self) -> u16 {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = json!({
            "errors": [{
                "code": self.code,
                "title": self.title,
                "detail": self.detail,
            }]
        });
        (status, Json(body)).into_response()
    }
}

impl From<CompileError> for ApiError {
    fn from(err: CompileError) -> Self {
        let detail = json!(err.to_string());
        match &err {
            CompileError::Malformed(_) | CompileError::ColumnsWithAggregators => {
                ApiError::new(400, "Invalid query string", detail)
            }
            CompileError::AggregationNotAllowed { .. } | CompileError::ColumnNotAllowed { .. } => {
                ApiError::new(403, "Unauthorized", detail)
            }
        }
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        let status = err.status_code();
        let title = match &err {
            ClientError::NotFound(_) => "Resource not found",
            ClientError::Gone { .. } => "Resource gone",
            ClientError::Upstream { .. } => "Database error",
            ClientError::TooLarge { .. } => "Export too large",
            ClientError::Connection(_) => "Service unavailable",
        };
        let detail = match &err {
            ClientError::Upstream { body, .. } => body.clone(),
            other => json!(other.to_string()),
        };
        ApiError::new(status, title, detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregation_not_allowed_maps_to_403() {
        let err: ApiError = CompileError::AggregationNotAllowed {
            resource_id: "r".to_string(),
            operators: "groupby".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn malformed_query_maps_to_400() {
        let err: ApiError = CompileError::Malformed("x".to_string()).into();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn gone_client_error_maps_to_410() {
        let err: ApiError = ClientError::Gone {
            resource_id: "r".to_string(),
            deleted_at: "2024-01-01".to_string(),
            dataset_note: "".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), 410);
    }
}
