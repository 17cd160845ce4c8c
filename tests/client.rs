use httpmock::prelude::*;
use mandrill_delivery::{Client, Error, MessagingGateway, TemplateContent};
use serde_json::json;

fn client(server: &MockServer) -> Client {
    Client::builder()
        .api_key("1234567890")
        .base_url(server.url("/api/1.0"))
        .build()
        .unwrap()
}

#[tokio::test]
async fn send_posts_message_and_returns_response() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/1.0/messages/send.json")
                .json_body(json!({
                    "key": "1234567890",
                    "message": {"html": "<p>hi</p>", "to": [{"email": "jane@example.com", "type": "to"}]},
                    "async": false
                }));
            then.status(200).json_body(json!([
                {"email": "jane@example.com", "status": "sent", "_id": "abc123", "reject_reason": null}
            ]));
        })
        .await;

    let response = client(&server)
        .send(
            json!({"html": "<p>hi</p>", "to": [{"email": "jane@example.com", "type": "to"}]}),
            false,
            None,
            None,
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response[0]["status"], "sent");
    assert_eq!(response[0]["_id"], "abc123");
}

#[tokio::test]
async fn send_forwards_pool_and_schedule() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/1.0/messages/send.json")
                .json_body(json!({
                    "key": "1234567890",
                    "message": {},
                    "async": true,
                    "ip_pool": "Main Pool",
                    "send_at": "2016-08-08 18:36:25"
                }));
            then.status(200)
                .json_body(json!([{"email": "jane@example.com", "status": "scheduled"}]));
        })
        .await;

    let response = client(&server)
        .send(
            json!({}),
            true,
            Some("Main Pool".into()),
            Some("2016-08-08 18:36:25".into()),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response[0]["status"], "scheduled");
}

#[tokio::test]
async fn send_template_posts_template_fields() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/1.0/messages/send-template.json")
                .json_body(json!({
                    "key": "1234567890",
                    "template_name": "some-template-slug",
                    "template_content": [{"name": "body", "content": "<some>html</some>"}],
                    "message": {"html": "<some>html</some>"},
                    "async": false
                }));
            then.status(200)
                .json_body(json!([{"email": "jane@example.com", "status": "queued"}]));
        })
        .await;

    let response = client(&server)
        .send_template(
            "some-template-slug".into(),
            vec![TemplateContent::new("body", "<some>html</some>")],
            json!({"html": "<some>html</some>"}),
            false,
            None,
            None,
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response[0]["status"], "queued");
}

#[tokio::test]
async fn api_error_object_becomes_api_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/1.0/messages/send.json");
            then.status(500).json_body(json!({
                "status": "error",
                "code": -1,
                "name": "Invalid_Key",
                "message": "Invalid API key"
            }));
        })
        .await;

    let error = client(&server)
        .send(json!({}), false, None, None)
        .await
        .unwrap_err();

    match error {
        Error::Api {
            status,
            code,
            name,
            message,
        } => {
            assert_eq!(status, 500);
            assert_eq!(code, -1);
            assert_eq!(name, "Invalid_Key");
            assert_eq!(message, "Invalid API key");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn unexpected_error_body_becomes_response_parse() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/1.0/messages/send.json");
            then.status(502).body("Bad Gateway");
        })
        .await;

    let error = client(&server)
        .send(json!({}), false, None, None)
        .await
        .unwrap_err();

    assert!(matches!(error, Error::ResponseParse(ref body) if body.contains("Bad Gateway")));
}

#[tokio::test]
async fn non_json_success_body_becomes_response_parse() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/1.0/messages/send.json");
            then.status(200).body("OK not json");
        })
        .await;

    let error = client(&server)
        .send(json!({}), false, None, None)
        .await
        .unwrap_err();

    assert!(matches!(error, Error::ResponseParse(ref body) if body.contains("OK not json")));
}

#[test]
fn builder_keeps_proxy() {
    let client = Client::builder()
        .api_key("1234567890")
        .proxy("http://127.0.0.1:8080")
        .build()
        .unwrap();

    assert_eq!(client.proxy(), Some("http://127.0.0.1:8080"));
    assert_eq!(client.base_url(), "https://mandrillapp.com/api/1.0");
}
