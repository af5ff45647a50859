//! Top-level API documentation mounted at `DOC_PATH` (§6.3). The
//! per-resource contract lives at `/api/resources/{rid}/swagger/`;
//! this is the table-of-contents document the distilled-from source
//! serves via `aiohttp_swagger`'s static `ressource_app_swagger.yaml`.

use axum::response::{IntoResponse, Response};

pub async fn index() -> impl IntoResponse {
    let document = format!(
        "openapi: 3.0.3\ninfo:\n  title: Tabular API\n  version: {}\npaths:\n  /health/:\n    get:\n      summary: Health check\n  /api/aggregation-exceptions/:\n    get:\n      summary: List resources allowed to aggregate\nexternalDocs:\n  description: Per-resource contracts are generated at /api/resources/{{rid}}/swagger/\n",
        env!("CARGO_PKG_VERSION"),
    );
    Response::builder()
        .header("content-type", "application/yaml")
        .body(axum::body::Body::from(document))
        .expect("static headers always build a valid response")
}
