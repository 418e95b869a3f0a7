//! Slack Web API adapter tests against a mock HTTP server.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vitals_core::Report;
use vitals_sources::{SlackClient, SocketModeClient};

fn client(server: &MockServer) -> SlackClient {
    SlackClient::new("xoxb-token")
        .expect("client construction")
        .with_base_url(&server.uri())
}

/// Test: a report reply carries the title/body attachment to the channel.
#[tokio::test]
async fn test_post_message_with_report() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat.postMessage"))
        .and(header("authorization", "Bearer xoxb-token"))
        .and(body_partial_json(json!({
            "channel": "C42",
            "attachments": [{ "title": "System Health Report", "text": "body" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let report = Report {
        title: "System Health Report".to_string(),
        body: "body".to_string(),
    };
    client(&server)
        .post_message("C42", Some(&report))
        .await
        .expect("post succeeds");
}

/// Test: no report still sends a single message with an empty attachment.
#[tokio::test]
async fn test_post_message_without_report() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat.postMessage"))
        .and(body_partial_json(json!({ "channel": "C42", "attachments": [{}] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .post_message("C42", None)
        .await
        .expect("empty reply succeeds");
}

/// Test: `ok: false` responses surface as transport errors.
#[tokio::test]
async fn test_post_message_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat.postMessage"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": false, "error": "channel_not_found" })),
        )
        .mount(&server)
        .await;

    let err = client(&server)
        .post_message("C42", None)
        .await
        .expect_err("api error must surface");
    assert!(err.to_string().contains("channel_not_found"));
}

/// Test: apps.connections.open returns the websocket URL on success and a
/// transport error otherwise.
#[tokio::test]
async fn test_open_connection_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/apps.connections.open"))
        .and(header("authorization", "Bearer xapp-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "url": "wss://wss.example.com/link/abc"
        })))
        .mount(&server)
        .await;

    let url = SocketModeClient::new("xapp-token")
        .expect("client construction")
        .with_base_url(&server.uri())
        .open_connection_url()
        .await
        .expect("url");
    assert_eq!(url, "wss://wss.example.com/link/abc");
}

#[tokio::test]
async fn test_open_connection_invalid_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/apps.connections.open"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "ok": false, "error": "invalid_auth" })),
        )
        .mount(&server)
        .await;

    let err = SocketModeClient::new("xapp-token")
        .expect("client construction")
        .with_base_url(&server.uri())
        .open_connection_url()
        .await
        .expect_err("auth failure surfaces");
    assert!(err.to_string().contains("invalid_auth"));
}
