use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rentdesk_core::config::LlmConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("language model call timed out after {0:?}")]
    Timeout(Duration),
    #[error("language model transport failure: {0}")]
    Transport(String),
    #[error("language model returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("language model response could not be decoded: {0}")]
    Decode(String),
    #[error("language model returned no content")]
    EmptyResponse,
    #[error("language model client misconfigured: {0}")]
    Configuration(String),
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

/// Chat-completions client for Groq, OpenAI, and Ollama's OpenAI-compatible endpoint.
pub struct OpenAiCompatibleClient {
    client: Client,
    endpoint: String,
    api_key: Option<SecretString>,
    model: String,
    temperature: f32,
    timeout: Duration,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompatibleClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .build()
            .map_err(|error| LlmError::Configuration(error.to_string()))?;

        Ok(Self {
            client,
            endpoint: completions_endpoint(&config.effective_base_url()),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let request = CompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key.expose_secret());
        }

        let response =
            builder.send().await.map_err(|error| LlmError::Transport(error.to_string()))?;
        let status = response.status();
        let body = response.text().await.map_err(|error| LlmError::Transport(error.to_string()))?;

        if !status.is_success() {
            return Err(LlmError::Status { status: status.as_u16(), body: truncate(&body, 512) });
        }

        parse_completion(&body)
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        match tokio::time::timeout(self.timeout, self.send(messages)).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(self.timeout)),
        }
    }
}

fn completions_endpoint(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

pub(crate) fn parse_completion(body: &str) -> Result<String, LlmError> {
    let response: CompletionResponse =
        serde_json::from_str(body).map_err(|error| LlmError::Decode(error.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(LlmError::EmptyResponse)
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
