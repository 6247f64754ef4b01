//! Text-to-music integration tests.

mod common;

use std::time::Duration;

use axum::http::StatusCode;

use common::{StubMusic, StubVideo, TestHarness, MUSIC_URL};
use serde_json::json;

#[tokio::test]
async fn generate_charges_one_credit() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/generate")
        .json(&json!({"prompt": "lofi beat", "duration": 10}))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["credits"], 2);
    assert_eq!(body["audio_url"], MUSIC_URL);

    let requests = harness.music.requests.lock().unwrap();
    assert_eq!(requests[0].prompt, "lofi beat");
    assert_eq!(requests[0].duration, 10);
    assert!(requests[0].model_version.is_none());
}

#[tokio::test]
async fn generate_returns_402_once_credits_run_out() {
    let harness = TestHarness::new();
    let body = json!({"prompt": "lofi beat", "duration": 10});

    for expected in [2, 1, 0] {
        let response = harness.server.post("/generate").json(&body).await;
        response.assert_status_ok();
        let json: serde_json::Value = response.json();
        assert_eq!(json["credits"], expected);
    }

    let response = harness.server.post("/generate").json(&body).await;
    response.assert_status(StatusCode::PAYMENT_REQUIRED);
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"], "Insufficient credits. Watch an ad to get more!");

    // The provider is not called without credits
    assert_eq!(harness.music.calls(), 3);
    assert_eq!(harness.credits().await, 0);
}

#[tokio::test]
async fn reward_unlocks_generation_again() {
    let harness = TestHarness::with_config(|config| config.credits.initial_credits = 0);
    let body = json!({"prompt": "ambient"});

    harness
        .server
        .post("/generate")
        .json(&body)
        .await
        .assert_status(StatusCode::PAYMENT_REQUIRED);

    harness.server.post("/reward").await.assert_status_ok();

    let response = harness.server.post("/generate").json(&body).await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["credits"], 4);
}

#[tokio::test]
async fn missing_prompt_is_rejected_before_provider_call() {
    let harness = TestHarness::new();

    for body in [json!({}), json!({"prompt": ""}), json!({"prompt": "  ", "duration": 5})] {
        let response = harness.server.post("/generate").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let json: serde_json::Value = response.json();
        assert_eq!(json["error"], "Prompt is required");
    }

    assert_eq!(harness.music.calls(), 0);
    assert_eq!(harness.credits().await, 3);
}

#[tokio::test]
async fn invalid_duration_is_rejected() {
    let harness = TestHarness::new();

    for duration in [json!(0), json!("ten"), json!(9000), json!(1.5)] {
        let response = harness
            .server
            .post("/generate")
            .json(&json!({"prompt": "x", "duration": duration}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    assert_eq!(harness.music.calls(), 0);
}

#[tokio::test]
async fn numeric_string_duration_is_accepted() {
    let harness = TestHarness::new();

    harness
        .server
        .post("/generate")
        .json(&json!({"prompt": "x", "duration": "15"}))
        .await
        .assert_status_ok();

    assert_eq!(harness.music.requests.lock().unwrap()[0].duration, 15);
}

#[tokio::test]
async fn validation_runs_before_credit_check() {
    let harness = TestHarness::with_config(|config| config.credits.initial_credits = 0);

    let response = harness.server.post("/generate").json(&json!({})).await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_body_returns_json_error() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/generate")
        .content_type("application/json")
        .text("{not json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json: serde_json::Value = response.json();
    assert!(json["error"].is_string());
    assert_eq!(harness.music.calls(), 0);
}

#[tokio::test]
async fn provider_failure_keeps_credits() {
    let harness = TestHarness::with_providers(StubMusic::failing("GPU on fire"), StubVideo::ok());

    let response = harness
        .server
        .post("/generate")
        .json(&json!({"prompt": "lofi beat"}))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"], "GPU on fire");
    assert_eq!(harness.music.calls(), 1);
    assert_eq!(harness.credits().await, 3);
}

#[tokio::test]
async fn oversized_body_returns_413() {
    let harness = TestHarness::with_config(|config| config.max_body_bytes = 64);

    let response = harness
        .server
        .post("/generate")
        .json(&json!({"prompt": "a".repeat(500)}))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"], "Upload too large");
    assert_eq!(harness.music.calls(), 0);
}

#[tokio::test]
async fn slow_provider_times_out_with_json_error() {
    let harness = TestHarness::with_music_and_config(StubMusic::slow(Duration::from_secs(5)), |config| {
        config.request_timeout_seconds = Some(1);
    });

    let response = harness
        .server
        .post("/generate")
        .json(&json!({"prompt": "lofi beat"}))
        .await;

    response.assert_status(StatusCode::REQUEST_TIMEOUT);
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"], "Request timed out");
    assert_eq!(harness.credits().await, 3);
}
