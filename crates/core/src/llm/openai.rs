use crate::config::LlmConfig;
use crate::llm::{CompletionRequest, LlmClient, LlmError};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);
const LOG_TARGET: &str = "llm::openai";

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    json_mode: bool,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(HTTP_TIMEOUT).build()?;
        let endpoint = format!(
            "{}/chat/completions",
            config.base_url.as_str().trim_end_matches('/')
        );
        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.as_ref().map(|k| k.expose().to_owned()),
            model: config.model.clone(),
            temperature: config.temperature,
            json_mode: true,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Whether to request `response_format: json_object`. Some compatible
    /// servers reject the field, so the strategy chain also tries without it.
    pub fn with_json_mode(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }

    pub fn label(&self) -> String {
        let mode = if self.json_mode { "json" } else { "plain" };
        format!("{}/{mode}", self.model)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

fn first_content(response: ChatResponse) -> Result<String, LlmError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or(LlmError::EmptyResponse)
}

impl LlmClient for OpenAiClient {
    fn complete(&self, request: CompletionRequest) -> BoxFuture<'_, Result<String, LlmError>> {
        async move {
            let body = ChatRequest {
                model: &self.model,
                messages: vec![
                    ChatMessage {
                        role: "system",
                        content: &request.system,
                    },
                    ChatMessage {
                        role: "user",
                        content: &request.user,
                    },
                ],
                temperature: self.temperature,
                response_format: self.json_mode.then_some(ResponseFormat {
                    kind: "json_object",
                }),
            };

            let mut http = self.client.post(&self.endpoint).json(&body);
            if let Some(key) = &self.api_key {
                http = http.bearer_auth(key);
            }
            let response = http.send().await?;

            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                tracing::debug!(
                    target: LOG_TARGET,
                    status,
                    task = %request.task,
                    "completion rejected"
                );
                return Err(LlmError::Api { status, body });
            }

            let parsed: ChatResponse = response
                .json()
                .await
                .map_err(|e| LlmError::Schema(format!("unexpected completion envelope: {e}")))?;
            first_content(parsed)
        }
        .boxed()
    }
}
