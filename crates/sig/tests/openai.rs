use std::time::Duration;

use domain::Error;
use serde_json::{json, Value};
use sig::{ChatModel, OpenAiClient, StandardizeConfig, StandardizeHandler};
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn config(server: &MockServer, api_key: Option<&str>) -> StandardizeConfig {
    StandardizeConfig {
        api_key: api_key.map(str::to_string),
        model: "gpt-test".to_string(),
        base_url: server.uri(),
        json_mode: false,
        timeout: Duration::from_secs(5),
    }
}

fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

fn event(text: &str) -> Value {
    json!({ "body": json!({ "text": text }).to_string() })
}

#[tokio::test]
async fn sends_bearer_key_model_and_both_turns() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-test",
            "messages": [
                { "role": "system", "content": "extract" },
                { "role": "user", "content": "Take 1 tab daily" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("[]")))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new("sk-test", &config(&server, None)).unwrap();
    let reply = client.complete("extract", "Take 1 tab daily").await.unwrap();
    assert_eq!(reply, "[]");
}

#[tokio::test]
async fn json_mode_requests_json_object_format() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "response_format": { "type": "json_object" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"medications": [{"medication": "Amoxicillin", "refills": "None"}]}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let config = StandardizeConfig {
        json_mode: true,
        ..config(&server, Some("sk-test"))
    };
    let handler = StandardizeHandler::from_config(&config).unwrap();
    let response = handler.handle(event("Amoxicillin 500mg")).await;

    assert_eq!(response.status_code, 200);
    let body = response.body_json().unwrap();
    assert_eq!(body["text"]["medications"][0]["medication"], "Amoxicillin");
}

#[tokio::test]
async fn standardizes_end_to_end() {
    let server = MockServer::start().await;
    let reply = json!({
        "medication": null,
        "sig_code": "1 TAB PO BID",
        "dosage": "1 tablet",
        "frequency": "twice daily",
        "quantity": "30 tablets",
        "refills": "None",
        "purpose": null
    });
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(&reply.to_string())))
        .expect(1)
        .mount(&server)
        .await;

    let handler = StandardizeHandler::from_config(&config(&server, Some("sk-test"))).unwrap();
    let response = handler
        .handle(event("Take 1 tablet twice daily, 30 tablets, no refills"))
        .await;

    assert_eq!(response.status_code, 200);
    let body = response.body_json().unwrap();
    let medications = body["text"]["medications"].as_array().unwrap();
    assert_eq!(medications.len(), 1);
    assert_eq!(medications[0]["refills"], "None");
    assert_eq!(medications[0]["sig_code"], "1 TAB PO BID");
}

#[tokio::test]
async fn missing_key_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("[]")))
        .expect(0)
        .mount(&server)
        .await;

    let handler = StandardizeHandler::from_config(&config(&server, None)).unwrap();
    let response = handler.handle(event("Take 1 tab daily")).await;

    assert_eq!(response.status_code, 400);
    let body = response.body_json().unwrap();
    assert_eq!(body["error_type"], "ConfigurationError");
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn classifies_provider_errors() {
    let cases = [
        (401, "Incorrect API key provided", 401, "UpstreamAuthError"),
        (400, "Invalid value for 'model'", 400, "UpstreamRequestError"),
        (500, "The server had an error", 500, "UpstreamApiError"),
        (429, "Rate limit reached", 500, "UpstreamApiError"),
    ];

    for (upstream, message, expected, kind) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(upstream).set_body_json(json!({
                "error": { "message": message, "type": "invalid_request_error" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let handler = StandardizeHandler::from_config(&config(&server, Some("sk-test"))).unwrap();
        let response = handler.handle(event("Take 1 tab daily")).await;

        assert_eq!(response.status_code, expected, "upstream {}", upstream);
        let body = response.body_json().unwrap();
        assert_eq!(body["error_type"], kind);
        assert!(body["error"].as_str().unwrap().contains(message));
    }
}

#[tokio::test]
async fn unparsable_reply_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("Here are your medications: Amoxicillin")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let handler = StandardizeHandler::from_config(&config(&server, Some("sk-test"))).unwrap();
    let response = handler.handle(event("Amoxicillin")).await;

    assert_eq!(response.status_code, 500);
    assert_eq!(response.body_json().unwrap()["error_type"], "UpstreamFormatError");
}

#[tokio::test]
async fn empty_choices_is_a_format_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let client = OpenAiClient::new("sk-test", &config(&server, None)).unwrap();
    let err = client.complete("s", "u").await.unwrap_err();
    assert!(matches!(err, Error::UpstreamFormat { .. }));
}

#[tokio::test]
async fn timeouts_are_upstream_api_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("[]"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let config = StandardizeConfig {
        timeout: Duration::from_millis(200),
        ..config(&server, None)
    };
    let client = OpenAiClient::new("sk-test", &config).unwrap();
    let err = client.complete("s", "u").await.unwrap_err();
    assert!(matches!(err, Error::UpstreamApi { .. }));
    assert_eq!(err.status_code(), 500);
}
