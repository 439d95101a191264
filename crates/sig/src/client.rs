use async_trait::async_trait;
use domain::Error;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::StandardizeConfig;

const ROLE_SYSTEM: &str = "system";
const ROLE_USER: &str = "user";

/// One system + user exchange with a chat model, returning the raw reply.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, Error>;
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// OpenAI chat-completions over HTTPS. No streaming, no retries.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    json_mode: bool,
}

impl OpenAiClient {
    pub fn new(api_key: &str, config: &StandardizeConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
            model: config.model.clone(),
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            json_mode: config.json_mode,
        })
    }

    fn payload<'a>(&'a self, system: &'a str, user: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: ROLE_SYSTEM,
                    content: system,
                },
                Message {
                    role: ROLE_USER,
                    content: user,
                },
            ],
            response_format: self.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, Error> {
        tracing::info!("Requesting completion from {} ({})", self.endpoint, self.model);

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.payload(system, user))
            .send()
            .await
            .map_err(|e| Error::UpstreamApi {
                message: format!("Request to OpenAI failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| format!("HTTP {}", status));
            return Err(classify(status, message));
        }

        let reply: ChatResponse = response.json().await.map_err(|e| Error::UpstreamApi {
            message: format!("Malformed completion envelope: {}", e),
        })?;

        reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::upstream_format("Reply contained no message content"))
    }
}

fn classify(status: StatusCode, message: String) -> Error {
    match status {
        StatusCode::UNAUTHORIZED => Error::UpstreamAuth { message },
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
            Error::UpstreamRequest { message }
        }
        _ => Error::UpstreamApi {
            message: format!("{} ({})", message, status),
        },
    }
}
