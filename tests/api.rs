//! End-to-end tests through the router, backed by the in-memory store.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::Router;
use http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use votecast::routes;
use votecast::state::AppState;
use votecast::store::MemoryPollStore;

fn app() -> Router {
    routes::router(AppState::new(Arc::new(MemoryPollStore::new())))
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    split(response).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    split(response).await
}

async fn split(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

#[tokio::test]
async fn create_poll_returns_the_stored_record() {
    let app = app();

    let (status, body) = post(&app, "/poll", json!({ "question": "Pizza or Pasta?" })).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["poll"]["question"], "Pizza or Pasta?");
    assert_eq!(body["activePollId"], body["poll"]["id"]);
    assert!(body["poll"]["closedAt"].is_null());
}

#[tokio::test]
async fn blank_question_is_rejected() {
    let app = app();

    for body in [json!({ "question": "   " }), json!({})] {
        let (status, body) = post(&app, "/poll", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Question is required.");
    }
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let app = app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/poll")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn vote_before_any_poll_fails() {
    let app = app();

    let (status, body) = post(&app, "/vote", json!({ "userId": "alice", "option": "Pizza" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No active poll.");
}

#[tokio::test]
async fn voting_flow_counts_each_participant_once() {
    let app = app();
    post(&app, "/poll", json!({ "question": "Pizza or Pasta?" })).await;

    let (status, body) = post(&app, "/vote", json!({ "userId": "alice", "option": "Pizza" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["totals"], json!({ "Pizza": 1 }));

    let (status, _) = post(&app, "/vote", json!({ "userId": "bob", "option": "Pasta" })).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post(&app, "/vote", json!({ "userId": "alice", "option": "Pasta" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "User already voted.");

    let (status, body) = get(&app, "/poll").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totals"], json!({ "Pasta": 1, "Pizza": 1 }));
}

#[tokio::test]
async fn vote_validation_messages_stay_distinct() {
    let app = app();
    post(&app, "/poll", json!({ "question": "Lunch?" })).await;

    let (status, body) = post(&app, "/vote", json!({ "option": "Pizza" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User ID and option are required.");

    let (status, body) = post(&app, "/vote", json!({ "userId": "alice", "option": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Option is required.");
}

#[tokio::test]
async fn stale_poll_id_gets_a_conflict_not_a_recount() {
    let app = app();
    let (_, first) = post(&app, "/poll", json!({ "question": "First?" })).await;
    let (_, second) = post(&app, "/poll", json!({ "question": "Second?" })).await;

    let (status, body) = post(
        &app,
        "/vote",
        json!({ "userId": "alice", "option": "Yes", "pollId": first["poll"]["id"] }),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Poll is no longer active.");

    // Nothing leaked into the replacement poll's totals.
    let (_, snapshot) = get(&app, "/poll").await;
    assert_eq!(snapshot["activePollId"], second["poll"]["id"]);
    assert_eq!(snapshot["totals"], json!({}));
}

#[tokio::test]
async fn snapshot_without_active_poll_is_all_null() {
    let app = app();

    let (status, body) = get(&app, "/poll").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "poll": null, "activePollId": null, "totals": {} }));
}
