//! Telegram Bot API contract tests.
//!
//! These tests verify the exact HTTP request shape sent to `sendMessage`
//! and the handling of API-level failures, using a local mock server.
//! The channel blocks while sending, so every call runs on the blocking
//! pool to keep the mock server responsive.

use lookaway::channels::telegram::TelegramChannel;
use lookaway::channels::traits::NotificationChannel;
use lookaway::config::TelegramSettings;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_settings() -> TelegramSettings {
    TelegramSettings {
        bot_token: "TEST-TOKEN".to_owned(),
        chat_id: "42".to_owned(),
    }
}

async fn send_blocking(
    channel: TelegramChannel,
    title: &'static str,
    message: &'static str,
) -> anyhow::Result<()> {
    tokio::task::spawn_blocking(move || channel.send(title, message))
        .await
        .expect("join blocking send")
}

// ────────────────────────────────────────────────────────────────────────────
// Request Format Validation Tests
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_send_posts_markdown_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/botTEST-TOKEN/sendMessage"))
        .and(body_partial_json(json!({
            "chat_id": "42",
            "text": "\u{1f514} *Eye Break Reminder*\n\nLook away now\n\n_Take care of your eyes!_ \u{1f440}",
            "parse_mode": "Markdown"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let channel = TelegramChannel::new(test_settings()).with_api_base(mock_server.uri());
    let result = send_blocking(channel, "Eye Break Reminder", "Look away now").await;

    assert!(result.is_ok(), "send should succeed: {result:?}");
}

#[tokio::test]
async fn test_self_test_sends_canned_notification() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/botTEST-TOKEN/sendMessage"))
        .and(body_partial_json(json!({
            "text": "\u{1f514} *Test Notification*\n\nTelegram notifications are working correctly!\n\n_Take care of your eyes!_ \u{1f440}"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let channel = TelegramChannel::new(test_settings()).with_api_base(mock_server.uri());
    let result = tokio::task::spawn_blocking(move || channel.test())
        .await
        .expect("join blocking send");

    assert!(result.is_ok(), "self test should succeed: {result:?}");
}

// ────────────────────────────────────────────────────────────────────────────
// Failure Handling Tests
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_api_error_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/botTEST-TOKEN/sendMessage"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "ok": false,
            "error_code": 401,
            "description": "Unauthorized"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let channel = TelegramChannel::new(test_settings()).with_api_base(mock_server.uri());
    let result = send_blocking(channel, "Eye Break Reminder", "Look away now").await;

    let err = result.expect_err("401 must fail the send");
    assert!(
        err.to_string().contains("telegram send failed"),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn test_missing_credentials_never_reach_the_api() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let channel =
        TelegramChannel::new(TelegramSettings::default()).with_api_base(mock_server.uri());
    let result = send_blocking(channel, "Eye Break Reminder", "Look away now").await;

    let err = result.expect_err("unconfigured channel must fail");
    assert!(err.to_string().contains("incomplete"), "unexpected error: {err}");
}
