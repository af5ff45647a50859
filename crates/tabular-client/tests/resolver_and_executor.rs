//! Integration tests against a mock PostgREST instance.
//!
//! Unlike the compiler's pure string-in/string-out tests, the
//! Resolver/Executor/Streaming pipeline need to assert on the request
//! shape (URL, headers) they send and the response shape they accept,
//! so a real HTTP exchange is exercised here via `wiremock` rather than
//! hand-built fixtures.

use serde_json::json;
use tabular_client::{ClientError, Executor, Resolver};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn resolver_resolves_an_existing_resource() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tables_index"))
        .and(query_param("resource_id", "eq.abc-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "created_at": "2024-01-01T00:00:00Z",
            "url": "https://example.org/resource.csv",
            "parsing_table": "tab_abc123",
            "profile": {"columns": {"age": {"python_type": "int"}}},
            "deleted_at": null,
            "dataset_id": "dataset-1",
        }])))
        .mount(&server)
        .await;

    let resolver = Resolver::new(reqwest::Client::new(), server.uri());
    let resource = resolver.resolve("abc-123", &["created_at", "url", "parsing_table", "profile"]).await.unwrap();

    assert_eq!(resource.parsing_table, "tab_abc123");
    assert_eq!(resource.profile.len(), 1);
    assert_eq!(resource.dataset_id.as_deref(), Some("dataset-1"));
}

#[tokio::test]
async fn resolver_reports_not_found_on_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tables_index"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let resolver = Resolver::new(reqwest::Client::new(), server.uri());
    let err = resolver.resolve("missing", &["parsing_table"]).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(id) if id == "missing"));
}

#[tokio::test]
async fn resolver_surfaces_a_gone_resource() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tables_index"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "deleted_at": "2024-06-01T00:00:00Z",
            "dataset_id": "dataset-2",
            "parsing_table": "tab_x",
        }])))
        .mount(&server)
        .await;

    let resolver = Resolver::new(reqwest::Client::new(), server.uri());
    let err = resolver.resolve("gone-rid", &["parsing_table"]).await.unwrap_err();
    match err {
        ClientError::Gone { resource_id, deleted_at, dataset_note } => {
            assert_eq!(resource_id, "gone-rid");
            assert_eq!(deleted_at, "2024-06-01T00:00:00Z");
            assert!(dataset_note.contains("dataset-2"));
        }
        other => panic!("expected Gone, got {other:?}"),
    }
}

#[tokio::test]
async fn index_policy_resolves_none_when_no_exception_record_exists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/resources_exceptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let resolver = Resolver::new(reqwest::Client::new(), server.uri());
    let indexes = resolver.index_policy("abc-123").await.unwrap();
    assert!(indexes.is_none());
}

#[tokio::test]
async fn index_policy_resolves_restricted_column_set() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/resources_exceptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "table_indexes": {"age": "btree", "name": "btree"}
        }])))
        .mount(&server)
        .await;

    let resolver = Resolver::new(reqwest::Client::new(), server.uri());
    let indexes = resolver.index_policy("abc-123").await.unwrap().unwrap();
    assert_eq!(indexes.len(), 2);
    assert!(indexes.contains("age"));
}

#[tokio::test]
async fn executor_reads_rows_and_total_from_content_range() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tab_abc123"))
        .and(header("Prefer", "count=exact"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "0-1/2")
                .set_body_json(json!([{"age": 10}, {"age": 20}])),
        )
        .mount(&server)
        .await;

    let executor = Executor::new(reqwest::Client::new(), server.uri());
    let (rows, total) = executor.execute_paged("tab_abc123", "select=\"age\"&limit=2").await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(total, Some(2));
}

#[tokio::test]
async fn executor_suppresses_total_for_aggregator_queries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tab_abc123"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "0-0/500")
                .set_body_json(json!([{"age__avg": 42.0}])),
        )
        .mount(&server)
        .await;

    let executor = Executor::new(reqwest::Client::new(), server.uri());
    let query = "select=\"age__avg\":\"age\".avg()";
    let (rows, total) = executor.execute_paged("tab_abc123", query).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(total, None);
}

#[tokio::test]
async fn executor_propagates_upstream_error_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tab_abc123"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "relation not found"})))
        .mount(&server)
        .await;

    let executor = Executor::new(reqwest::Client::new(), server.uri());
    let err = executor.execute_paged("tab_abc123", "limit=1").await.unwrap_err();
    match err {
        ClientError::Upstream { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body["message"], "relation not found");
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
}
