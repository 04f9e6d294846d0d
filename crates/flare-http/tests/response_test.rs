mod common;

use bytes::Bytes;
use common::{FakeClient, FakeResponse, create_test_span};
use flare_core::Span;
use flare_http::{HttpError, HttpResponse, TracedResponse};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

fn create_traced(status: u16, body: &str) -> (Arc<FakeResponse>, TracedResponse, Span) {
    let client = FakeClient::new();
    let fake = Arc::new(FakeResponse::new(status, body));
    let span = create_test_span();
    let traced = TracedResponse::new(client, fake.clone(), Some(span.clone()));
    (fake, traced, span)
}

#[tokio::test]
async fn test_content_finishes_span_and_returns_body() {
    let (_fake, traced, span) = create_traced(200, "hello");
    assert!(!span.is_finished());

    let body = traced.content(true).await.unwrap();

    assert_eq!(body, Bytes::from("hello"));
    assert!(span.is_finished());
}

#[tokio::test]
async fn test_span_finishes_once_across_content_then_cancel() {
    let (_fake, traced, span) = create_traced(200, "hello");

    traced.content(true).await.unwrap();
    let finished_at = span.finished_at().unwrap();

    tokio::time::sleep(Duration::from_millis(2)).await;
    traced.cancel().await;

    assert_eq!(span.finished_at(), Some(finished_at));
}

#[tokio::test]
async fn test_server_error_classified_after_finish() {
    let (_fake, traced, span) = create_traced(500, "boom");

    let result = traced.content(true).await;

    assert!(matches!(result, Err(HttpError::Server { .. })));
    assert!(span.is_finished());
}

#[tokio::test]
async fn test_status_above_599_classified_as_server_error() {
    let (_fake, traced, span) = create_traced(600, "overloaded");

    let result = traced.content(true).await;

    assert!(matches!(result, Err(HttpError::Server { .. })));
    assert!(span.is_finished());
}

#[tokio::test]
async fn test_client_error_classified() {
    let (_fake, traced, span) = create_traced(404, "missing");

    let result = traced.content(true).await;

    assert!(matches!(result, Err(HttpError::Client { .. })));
    assert!(span.is_finished());
}

#[tokio::test]
async fn test_redirection_classified() {
    let (_fake, traced, span) = create_traced(302, "");

    let result = traced.content(true).await;

    assert!(matches!(result, Err(HttpError::Redirection { .. })));
    assert!(span.is_finished());
}

#[tokio::test]
async fn test_success_status_passes_check() {
    let (_fake, traced, _span) = create_traced(204, "");
    assert!(traced.content(true).await.is_ok());
}

#[tokio::test]
async fn test_error_status_without_check_returns_body() {
    let (_fake, traced, span) = create_traced(500, "boom");

    let body = traced.content(false).await.unwrap();

    assert_eq!(body, Bytes::from("boom"));
    assert!(span.is_finished());
}

#[tokio::test]
async fn test_json_decodes_and_finishes() {
    let (_fake, traced, span) = create_traced(200, r#"{"ready":true}"#);

    let value = traced.json(true).await.unwrap();

    assert_eq!(value["ready"], serde_json::Value::Bool(true));
    assert!(span.is_finished());
}

#[tokio::test]
async fn test_json_decode_error_still_finishes() {
    let (_fake, traced, span) = create_traced(200, "not json");

    let result = traced.json(true).await;

    assert!(matches!(result, Err(HttpError::Decode(_))));
    assert!(span.is_finished());
}

#[tokio::test]
async fn test_cancel_finishes_span_before_inner_cancel() {
    let (fake, traced, span) = create_traced(200, "hello");

    let finished_when_cancelled = Arc::new(AtomicBool::new(false));
    let observed = finished_when_cancelled.clone();
    let watched = span.clone();
    fake.set_cancel_hook(move || {
        observed.store(watched.is_finished(), Ordering::SeqCst);
    });

    traced.cancel().await;

    assert!(fake.was_cancelled());
    assert!(finished_when_cancelled.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_drop_finishes_span() {
    let (_fake, traced, span) = create_traced(200, "hello");

    drop(traced);

    assert!(span.is_finished());
    assert_eq!(span.tag("http.response.status_code"), Some("200".to_string()));
}

#[tokio::test]
async fn test_response_without_span_passes_through() {
    let client = FakeClient::new();
    let fake = Arc::new(FakeResponse::new(200, "hello"));
    let traced = TracedResponse::new(client, fake, None);

    assert!(traced.span().is_none());
    assert_eq!(traced.content(true).await.unwrap(), Bytes::from("hello"));
}

#[tokio::test]
async fn test_status_tag_recorded_on_finish() {
    let (_fake, traced, span) = create_traced(503, "try later");

    let _ = traced.content(true).await;

    assert_eq!(span.tag("http.response.status_code"), Some("503".to_string()));
}

#[test]
fn test_serialization_is_refused_both_ways() {
    let client = FakeClient::new();
    let fake = Arc::new(FakeResponse::new(200, "hello"));
    let traced = TracedResponse::new(client, fake, None);

    let serialize_error = serde_json::to_string(&traced).unwrap_err();
    assert!(serialize_error.to_string().contains("cannot be serialized"));

    let deserialize_error = serde_json::from_str::<TracedResponse>("{}").unwrap_err();
    assert!(deserialize_error.to_string().contains("cannot be deserialized"));
}

#[tokio::test]
async fn test_delegates_identity_to_inner() {
    let client = FakeClient::new();
    let fake = Arc::new(FakeResponse::new(201, "made"));
    let traced = TracedResponse::new(client, fake.clone(), None);

    assert_eq!(traced.id(), fake.id());
    assert_eq!(traced.status().as_u16(), 201);
    assert!(traced.headers().is_empty());
}
