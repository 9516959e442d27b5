//! Integration tests for TelegramChannel using wiremock

use review_watcher::config::TelegramConfig;
use review_watcher::notifications::{ChannelError, Notifier, TelegramChannel};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOT_TOKEN: &str = "123456:test-bot-token";

fn channel_for(server: &MockServer) -> TelegramChannel {
    let config = TelegramConfig {
        token: BOT_TOKEN.to_string(),
        chat_id: "4242".to_string(),
        api_base: server.uri(),
        timeout_secs: 5,
    };
    TelegramChannel::new(&config).unwrap()
}

#[tokio::test]
async fn test_send_message_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/bot{BOT_TOKEN}/sendMessage")))
        .and(body_json(json!({ "chat_id": "4242", "text": "hello" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": { "message_id": 17 }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let status = channel_for(&mock_server).send("hello").await.unwrap();

    assert!(status.success);
    assert_eq!(status.channel, "telegram");
    assert_eq!(status.message.as_deref(), Some("message_id 17"));
}

#[tokio::test]
async fn test_ok_false_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": false,
            "description": "Forbidden: bot was blocked by the user"
        })))
        .mount(&mock_server)
        .await;

    let err = channel_for(&mock_server).send("hello").await.unwrap_err();

    match err {
        ChannelError::Rejected(reason) => assert!(reason.contains("blocked")),
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_error_uses_description() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        })))
        .expect(1) // No retry within a cycle
        .mount(&mock_server)
        .await;

    let err = channel_for(&mock_server).send("hello").await.unwrap_err();

    match err {
        ChannelError::Status { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "Bad Request: chat not found");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_transport_error_hides_token() {
    let config = TelegramConfig {
        token: BOT_TOKEN.to_string(),
        chat_id: "4242".to_string(),
        api_base: "http://127.0.0.1:1".to_string(),
        timeout_secs: 2,
    };
    let channel = TelegramChannel::new(&config).unwrap();

    let err = channel.send("hello").await.unwrap_err();

    assert!(matches!(err, ChannelError::Http(_)));
    assert!(!err.to_string().contains("test-bot-token"));
}
