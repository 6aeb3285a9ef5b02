use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use futures::StreamExt;
use tower::ServiceExt;

use countdown::{
    api::create_router,
    services::{MemoryStore, TARGET_SECONDS_KEY},
    state::AppState,
};

fn create_test_app(store: MemoryStore) -> Router {
    let (state, _timer_task) = AppState::new(
        20554,
        "127.0.0.1".to_string(),
        Box::new(store),
        Duration::from_millis(20),
    );
    create_router(Arc::new(state))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test(start_paused = true)]
async fn test_health() {
    let app = create_test_app(MemoryStore::new());
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test(start_paused = true)]
async fn test_starts_idle_with_stored_duration() {
    let app = create_test_app(MemoryStore::with_entry(TARGET_SECONDS_KEY, "8"));
    let (status, body) = send(&app, "GET", "/timer", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "idle");
    assert_eq!(body["target_seconds"], 8);
    assert_eq!(body["display"], "8 seconds");
    assert_eq!(body["progress_percentage"], 0.0);
}

#[tokio::test(start_paused = true)]
async fn test_unparsable_stored_duration_falls_back() {
    let app = create_test_app(MemoryStore::with_entry(TARGET_SECONDS_KEY, "-2"));
    let (_, body) = send(&app, "GET", "/timer", None).await;
    assert_eq!(body["target_seconds"], 5);
}

#[tokio::test(start_paused = true)]
async fn test_start_pause_resume_reset() {
    let app = create_test_app(MemoryStore::new());

    let (status, body) = send(&app, "POST", "/timer/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["timer"]["phase"], "running");
    assert_eq!(body["timer"]["seconds_left"], 5.0);
    assert_eq!(body["timer"]["display"], "5 seconds");

    tokio::time::sleep(Duration::from_millis(1_000)).await;

    let (status, body) = send(&app, "POST", "/timer/pause", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["phase"], "paused");
    assert_eq!(body["timer"]["display"], "4.00 seconds");
    let progress = body["timer"]["progress_percentage"].as_f64().unwrap();
    assert!((progress - 20.0).abs() < 1e-6, "progress = {progress}");

    let (status, body) = send(&app, "POST", "/timer/pause", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "cannot pause while the timer is paused");
    assert_eq!(body["timer"]["phase"], "paused");

    let (status, body) = send(&app, "POST", "/timer/resume", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["phase"], "running");

    let (status, body) = send(&app, "POST", "/timer/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["phase"], "idle");
    assert_eq!(body["timer"]["seconds_left"], Value::Null);

    let (status, _) = send(&app, "POST", "/timer/reset", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_duration_is_rejected() {
    let app = create_test_app(MemoryStore::new());

    let (status, body) = send(&app, "PUT", "/timer/duration", Some(json!({ "value": "abc" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["timer"]["phase"], "idle");
    assert_eq!(body["timer"]["target_seconds"], 5);
    assert_eq!(body["timer"]["duration_input"], "5");
}

#[tokio::test(start_paused = true)]
async fn test_duration_only_changes_while_idle() {
    let app = create_test_app(MemoryStore::new());

    let (status, body) = send(&app, "PUT", "/timer/duration", Some(json!({ "value": "10" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["target_seconds"], 10);

    let (_, body) = send(&app, "POST", "/timer/start", None).await;
    assert_eq!(body["timer"]["seconds_left"], 10.0);

    let (status, body) = send(&app, "PUT", "/timer/duration", Some(json!({ "value": "3" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["timer"]["target_seconds"], 10);
}

#[tokio::test(start_paused = true)]
async fn test_countdown_completes() {
    let app = create_test_app(MemoryStore::new());

    send(&app, "PUT", "/timer/duration", Some(json!({ "value": "1" }))).await;
    send(&app, "POST", "/timer/start", None).await;

    tokio::time::sleep(Duration::from_millis(1_100)).await;

    let (status, body) = send(&app, "GET", "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["phase"], "done");
    assert_eq!(body["timer"]["display"], "Time's up!");
    assert_eq!(body["timer"]["progress_percentage"], 100.0);
    assert_eq!(body["completed_countdowns"], 1);
    assert_eq!(body["last_action"], "start");

    let (status, body) = send(&app, "POST", "/timer/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["phase"], "idle");
}

/// Read the next `timer` event from an SSE body, skipping keep-alive comments
async fn next_timer_event<S>(frames: &mut S) -> Value
where
    S: futures::Stream<Item = Result<axum::body::Bytes, axum::Error>> + Unpin,
{
    let mut buffer = String::new();
    loop {
        if let Some(end) = buffer.find("\n\n") {
            let frame: String = buffer.drain(..end + 2).collect();
            let mut event = None;
            let mut data = None;
            for line in frame.lines() {
                if let Some(name) = line.strip_prefix("event:") {
                    event = Some(name.trim().to_string());
                } else if let Some(payload) = line.strip_prefix("data:") {
                    data = Some(payload.trim().to_string());
                }
            }
            if let (Some(event), Some(data)) = (event, data) {
                assert_eq!(event, "timer");
                return serde_json::from_str(&data).unwrap();
            }
            continue;
        }

        let chunk = frames
            .next()
            .await
            .expect("event stream ended")
            .unwrap();
        buffer.push_str(std::str::from_utf8(&chunk).unwrap());
    }
}

#[tokio::test(start_paused = true)]
async fn test_event_stream_sends_current_view_then_changes() {
    let app = create_test_app(MemoryStore::with_entry(TARGET_SECONDS_KEY, "3"));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/timer/events")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );

    let mut frames = response.into_body().into_data_stream();

    let first = next_timer_event(&mut frames).await;
    assert_eq!(first["phase"], "idle");
    assert_eq!(first["target_seconds"], 3);
    assert_eq!(first["display"], "3 seconds");
    assert_eq!(first["revision"], 0);

    let (status, _) = send(&app, "POST", "/timer/start", None).await;
    assert_eq!(status, StatusCode::OK);

    let changed = next_timer_event(&mut frames).await;
    assert_eq!(changed["phase"], "running");
    assert_eq!(changed["target_seconds"], 3);
    assert!(changed["revision"].as_u64().unwrap() >= 1);
}
