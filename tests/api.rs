//! End-to-end tests driving the full request pipeline through
//! [`App::handle`] with synthetic requests — no sockets involved, every
//! test gets its own isolated store.

use std::sync::Arc;

use bytes::Bytes;
use http::{Request, StatusCode};
use http_body_util::{BodyExt, Full};
use serde_json::{json, Value};

use strprop::{App, Store, StringService};

fn app() -> Arc<App> {
    Arc::new(App::new(StringService::new(Arc::new(Store::new()))))
}

fn empty_body() -> Full<Bytes> {
    Full::new(Bytes::new())
}

async fn send(
    app: &App,
    method: &str,
    uri: &str,
    body: Full<Bytes>,
) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(body)
        .unwrap();
    let response = app.handle(req).await;
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn post_string(app: &App, value: &str) -> (StatusCode, Value) {
    let payload = serde_json::to_vec(&json!({ "value": value })).unwrap();
    send(app, "POST", "/strings", Full::new(Bytes::from(payload))).await
}

#[tokio::test]
async fn full_flow_create_get_delete() {
    let app = app();

    let (status, body) = post_string(&app, "RaceCar").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["value"], "RaceCar");
    assert_eq!(body["properties"]["is_palindrome"], true);
    assert_eq!(body["properties"]["length"], 7);
    assert_eq!(body["properties"]["word_count"], 1);
    assert_eq!(body["properties"]["unique_characters"], 5);
    assert_eq!(body["id"], body["properties"]["sha256_hash"]);
    assert_eq!(body["id"], strprop::properties::content_id("RaceCar"));
    assert!(body["created_at"].is_string());

    let (status, fetched) = send(&app, "GET", "/strings/RaceCar", empty_body()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["value"], "RaceCar");
    assert_eq!(fetched["id"], body["id"]);
    assert_eq!(fetched["properties"], body["properties"]);

    let (status, _) = send(&app, "DELETE", "/strings/RaceCar", empty_body()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", "/strings/RaceCar", empty_body()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/strings/RaceCar", empty_body()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_create_conflicts() {
    let app = app();
    let (status, _) = post_string(&app, "hello").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = post_string(&app, "hello").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "String already exists");
}

#[tokio::test]
async fn create_rejects_bad_payloads() {
    let app = app();

    // Not a string.
    let payload = serde_json::to_vec(&json!({ "value": 5 })).unwrap();
    let (status, body) =
        send(&app, "POST", "/strings", Full::new(Bytes::from(payload))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"], "\"value\" must be a string");

    // Missing key.
    let payload = serde_json::to_vec(&json!({ "not_value": "x" })).unwrap();
    let (status, _) =
        send(&app, "POST", "/strings", Full::new(Bytes::from(payload))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Malformed JSON.
    let (status, _) = send(
        &app,
        "POST",
        "/strings",
        Full::new(Bytes::from_static(b"{not json")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_string_is_a_valid_value() {
    let app = app();
    let (status, body) = post_string(&app, "").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["properties"]["length"], 0);
    assert_eq!(body["properties"]["is_palindrome"], true);
    assert_eq!(body["properties"]["word_count"], 0);
}

#[tokio::test]
async fn percent_encoded_path_segments_round_trip() {
    let app = app();
    post_string(&app, "hello world").await;

    let (status, body) = send(&app, "GET", "/strings/hello%20world", empty_body()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], "hello world");
    assert_eq!(body["properties"]["word_count"], 2);

    let (status, _) = send(&app, "DELETE", "/strings/hello%20world", empty_body()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn list_with_no_filters_returns_everything() {
    let app = app();
    for v in ["one", "two", "three"] {
        post_string(&app, v).await;
    }
    let (status, body) = send(&app, "GET", "/strings", empty_body()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
    assert_eq!(body["filters_applied"], json!({}));
}

#[tokio::test]
async fn list_filters_are_conjunctive_and_inclusive() {
    let app = app();
    for v in ["ab", "abc", "abcd", "abcde", "abcdef"] {
        post_string(&app, v).await;
    }

    let (status, body) =
        send(&app, "GET", "/strings?min_length=3&max_length=5", empty_body()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    for record in body["data"].as_array().unwrap() {
        let len = record["properties"]["length"].as_u64().unwrap();
        assert!((3..=5).contains(&len));
    }
    assert_eq!(body["filters_applied"], json!({"min_length": 3, "max_length": 5}));
}

#[tokio::test]
async fn list_palindrome_and_character_filters() {
    let app = app();
    post_string(&app, "level").await;
    post_string(&app, "sediment").await;

    let (status, body) = send(&app, "GET", "/strings?is_palindrome=true", empty_body()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["value"], "level");

    // Case-sensitive substring test.
    let (_, body) = send(&app, "GET", "/strings?contains_character=v", empty_body()).await;
    assert_eq!(body["count"], 1);
    let (_, body) = send(&app, "GET", "/strings?contains_character=V", empty_body()).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn list_rejects_conflicting_bounds_with_400() {
    let app = app();
    let (status, body) =
        send(&app, "GET", "/strings?min_length=9&max_length=2", empty_body()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "min_length cannot be > max_length");
}

#[tokio::test]
async fn list_rejects_malformed_parameters_with_422() {
    let app = app();
    for uri in [
        "/strings?min_length=-1",
        "/strings?word_count=lots",
        "/strings?is_palindrome=maybe",
        "/strings?contains_character=ab",
        "/strings?contains_character=",
    ] {
        let (status, _) = send(&app, "GET", uri, empty_body()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "uri: {uri}");
    }
}

#[tokio::test]
async fn natural_language_filtering() {
    let app = app();
    post_string(&app, "level").await;
    post_string(&app, "two words").await;
    post_string(&app, "plain").await;

    let (status, body) = send(
        &app,
        "GET",
        "/strings/filter-by-natural-language?query=all%20single%20word%20palindromic%20strings",
        empty_body(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["value"], "level");
    assert_eq!(
        body["interpreted_query"]["parsed_filters"],
        json!({"word_count": 1, "is_palindrome": true})
    );
    assert_eq!(
        body["interpreted_query"]["original"],
        "all single word palindromic strings"
    );
}

#[tokio::test]
async fn natural_language_longer_than_is_strict() {
    let app = app();
    post_string(&app, "short").await; // length 5
    post_string(&app, "longer one").await; // length 10

    let (status, body) = send(
        &app,
        "GET",
        "/strings/filter-by-natural-language?query=strings%20longer%20than%205",
        empty_body(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["interpreted_query"]["parsed_filters"], json!({"min_length": 6}));
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["value"], "longer one");
}

#[tokio::test]
async fn natural_language_unmatched_query_selects_everything() {
    let app = app();
    post_string(&app, "a").await;
    post_string(&app, "b").await;

    let (status, body) = send(
        &app,
        "GET",
        "/strings/filter-by-natural-language?query=show%20me%20everything",
        empty_body(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["interpreted_query"]["parsed_filters"], json!({}));
}

#[tokio::test]
async fn natural_language_empty_query_is_400() {
    let app = app();
    for uri in [
        "/strings/filter-by-natural-language?query=",
        "/strings/filter-by-natural-language?query=%20%20",
        "/strings/filter-by-natural-language",
    ] {
        let (status, body) = send(&app, "GET", uri, empty_body()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {uri}");
        assert_eq!(body["detail"], "Unable to parse natural language query");
    }
}

#[tokio::test]
async fn unknown_routes_and_methods() {
    let app = app();

    let (status, _) = send(&app, "GET", "/no/such/path", empty_body()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Known path, wrong method.
    let (status, _) = send(&app, "PUT", "/strings", empty_body()).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn health_probes() {
    let app = app();
    let (status, _) = send(&app, "GET", "/healthz", empty_body()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", "/readyz", empty_body()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn concurrent_creates_of_one_value_yield_one_record() {
    let app = app();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let app = Arc::clone(&app);
        handles.push(tokio::spawn(async move {
            let (status, _) = post_string(&app, "contended").await;
            status
        }));
    }

    let mut created = 0;
    let mut conflicted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::CREATED => created += 1,
            StatusCode::CONFLICT => conflicted += 1,
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(conflicted, 7);

    let (_, body) = send(&app, "GET", "/strings", empty_body()).await;
    assert_eq!(body["count"], 1);
}
