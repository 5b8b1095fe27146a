//! End-to-end tests of the error handling layer around an axum router
//!
//! Each route raises one shape of error; the tests check the status line,
//! the exact safe body, and what reached the log sink.

use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::extract::rejection::JsonRejection;
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use error_shield::api::middleware::error_handling::{ErrorDispatcher, ErrorHandlingLayer};
use error_shield::application::classify::DatabaseCodeTable;
use error_shield::application::ports::{ErrorLogEntry, ErrorLogSink, LogSinkError};
use error_shield::domain::{CaughtError, ErrorCategory, HttpException};

/// Sink keeping every entry for inspection
#[derive(Default)]
struct RecordingSink {
    entries: Mutex<Vec<ErrorLogEntry>>,
}

impl RecordingSink {
    fn entries(&self) -> Vec<ErrorLogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl ErrorLogSink for RecordingSink {
    fn record(&self, entry: &ErrorLogEntry) -> Result<(), LogSinkError> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

async fn duplicate_client() -> Result<String, CaughtError> {
    Err(CaughtError::new(
        "error returned from database: duplicate key value violates unique constraint \"clients_ssn_key\"",
    )
    .with_name("sqlx_core::error::Error")
    .with_code("23505"))
}

async fn missing_return() -> Result<String, CaughtError> {
    Err(sqlx::Error::RowNotFound.into())
}

async fn slow_w2() -> Result<String, CaughtError> {
    let err = anyhow::Error::from(sqlx::Error::PoolTimedOut).context("loading W-2 for extraction");
    Err(err.into())
}

async fn invalid_dependent() -> Result<String, HttpException> {
    Err(HttpException::unprocessable(vec![
        "ssn must be 9 digits".to_string(),
        "dateOfBirth must be a date".to_string(),
        "relationship must not be empty".to_string(),
    ]))
}

async fn missing_tax_year() -> Result<String, HttpException> {
    Err(HttpException::bad_request("taxYear is required"))
}

async fn odd_shape() -> Result<String, CaughtError> {
    Err(CaughtError::new("foo").with_name("Object"))
}

async fn exploding() -> String {
    panic!("internal invariant broken at /srv/app/orders.rs:42")
}

async fn submit_order(payload: Result<Json<Value>, JsonRejection>) -> Result<String, CaughtError> {
    let Json(order) = payload?;
    Ok(order.to_string())
}

fn app(sink: Arc<RecordingSink>) -> Router {
    let dispatcher = Arc::new(ErrorDispatcher::new(
        Arc::new(DatabaseCodeTable::builtin().clone()),
        sink,
    ));

    Router::new()
        .route("/ok", get(|| async { "fine" }))
        .route("/v1/clients", post(duplicate_client))
        .route("/v1/returns/{id}", get(missing_return))
        .route("/v1/documents/w2", get(slow_w2))
        .route("/v1/dependents", post(invalid_dependent))
        .route("/v1/returns", get(missing_tax_year))
        .route("/v1/odd", get(odd_shape))
        .route("/v1/panic", get(exploding))
        .route("/v1/orders", post(submit_order))
        .layer(ErrorHandlingLayer::new(dispatcher))
}

async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    read(app.oneshot(request).await.unwrap()).await
}

async fn read(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn without_timestamp(mut body: Value) -> Value {
    body.as_object_mut().unwrap().remove("timestamp");
    body
}

#[tokio::test]
async fn duplicate_key_is_conflict_without_leaking() {
    let sink = Arc::new(RecordingSink::default());

    let (status, body) = send(app(sink.clone()), "POST", "/v1/clients").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Conflict");
    assert_eq!(body["statusCode"], 409);
    assert_eq!(body["success"], false);
    let text = body.to_string();
    assert!(!text.contains("clients_ssn_key"));
    assert!(!text.contains("23505"));
    assert!(!text.contains("error returned from database"));

    let entries = sink.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].category, ErrorCategory::Database);
    assert_eq!(entries[0].code.as_deref(), Some("23505"));
    assert!(entries[0].message.contains("clients_ssn_key"));
}

#[tokio::test]
async fn row_not_found_is_404() {
    let sink = Arc::new(RecordingSink::default());

    let (status, body) = send(app(sink), "GET", "/v1/returns/7").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
    assert_eq!(body["message"], "The requested record does not exist.");
    assert_eq!(body["path"], "/v1/returns/7");
}

#[tokio::test]
async fn wrapped_pool_timeout_is_504() {
    let sink = Arc::new(RecordingSink::default());

    let (status, body) = send(app(sink.clone()), "GET", "/v1/documents/w2").await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"], "Gateway Timeout");
    assert!(!body.to_string().contains("W-2"));

    let entries = sink.entries();
    assert_eq!(entries[0].message, "loading W-2 for extraction");
    assert_eq!(entries[0].causes.len(), 1);
    assert_eq!(entries[0].causes[0].code.as_deref(), Some("SQLX_POOL_TIMED_OUT"));
}

#[tokio::test]
async fn message_array_is_preserved_in_order() {
    let sink = Arc::new(RecordingSink::default());

    let (status, body) = send(app(sink), "POST", "/v1/dependents").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Unprocessable Entity");
    assert_eq!(
        body["message"],
        json!([
            "ssn must be 9 digits",
            "dateOfBirth must be a date",
            "relationship must not be empty"
        ])
    );
}

#[tokio::test]
async fn scalar_message_is_wrapped_in_list() {
    let sink = Arc::new(RecordingSink::default());

    let (status, body) = send(app(sink), "GET", "/v1/returns").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!(["taxYear is required"]));
}

#[tokio::test]
async fn unknown_shape_gets_fixed_response() {
    let sink = Arc::new(RecordingSink::default());

    let (status, body) = send(app(sink), "GET", "/v1/odd").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        without_timestamp(body),
        json!({
            "success": false,
            "statusCode": 500,
            "error": "Internal Server Error",
            "message": "An unexpected error occurred. Please try again later.",
            "path": "/v1/odd",
        })
    );
}

#[tokio::test]
async fn panic_is_answered_and_logged_once() {
    let sink = Arc::new(RecordingSink::default());

    let (status, body) = send(app(sink.clone()), "GET", "/v1/panic").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal Server Error");
    assert!(!body.to_string().contains("/srv/app"));

    let entries = sink.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].error_name, "panic");
    assert!(entries[0].message.contains("/srv/app/orders.rs"));
}

#[tokio::test]
async fn json_rejection_keeps_extractor_status() {
    let sink = Arc::new(RecordingSink::default());
    let request = Request::builder()
        .method("POST")
        .uri("/v1/orders")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();

    let (status, body) = read(app(sink).oneshot(request).await.unwrap()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");
    assert!(body["message"].is_array());
}

#[tokio::test]
async fn success_is_untouched_and_not_logged() {
    let sink = Arc::new(RecordingSink::default());

    let response = app(sink.clone())
        .oneshot(Request::builder().uri("/ok").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(sink.entries().is_empty());
}

#[tokio::test]
async fn identical_errors_give_identical_bodies() {
    let sink = Arc::new(RecordingSink::default());

    let (_, first) = send(app(sink.clone()), "POST", "/v1/clients").await;
    let (_, second) = send(app(sink), "POST", "/v1/clients").await;

    assert_eq!(
        serde_json::to_vec(&without_timestamp(first)).unwrap(),
        serde_json::to_vec(&without_timestamp(second)).unwrap()
    );
}

#[tokio::test]
async fn timestamp_falls_in_request_window() {
    let sink = Arc::new(RecordingSink::default());
    let before = Utc::now() - chrono::Duration::milliseconds(1);

    let (_, body) = send(app(sink), "GET", "/v1/odd").await;

    let after = Utc::now();
    let stamp = DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).unwrap();
    assert!(stamp >= before && stamp <= after);
}
