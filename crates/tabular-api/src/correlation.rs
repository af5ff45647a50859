//! Per-request correlation id (§6.2, §10.2): a v4 UUID minted once per
//! request, threaded through the tracing span and attached as the
//! error envelope's `code` field so a server-side log line can always
//! be located from a client-visible id.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

#[derive(Clone)]
pub struct CorrelationId(pub String);

pub async fn correlation_middleware(mut req: Request, next: Next) -> Response {
    let id = Uuid::new_v4().to_string();
    req.extensions_mut().insert(CorrelationId(id.clone()));
    let span = tracing::info_span!(
        "request",
        correlation_id = %id,
        path = %req.uri().path(),
        resource_id = tracing::field::Empty,
    );
    async move { next.run(req).await }.instrument(span).await
}
