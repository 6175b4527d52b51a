use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// A single system + user exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("OpenAI API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Anything that can turn a chat request into free text.
///
/// Shared across concurrent analyses; implementations hold credentials only.
pub trait ChatCompletion: Send + Sync {
    fn complete(&self, request: &ChatRequest) -> std::result::Result<String, LlmError>;
}

/// Client for `POST {base_url}/chat/completions`.
pub struct OpenAiClient {
    api_key: String,
    base_url: String,
    client: reqwest::blocking::Client,
}

impl OpenAiClient {
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(api_key: String, base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build OpenAI HTTP client")?;
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            api_key,
            base_url,
            client,
        })
    }
}

impl ChatCompletion for OpenAiClient {
    #[instrument(skip_all, fields(model = %request.model, max_tokens = request.max_tokens))]
    fn complete(&self, request: &ChatRequest) -> std::result::Result<String, LlmError> {
        let body = serde_json::json!({
            "model": request.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        let url = format!("{}/chat/completions", self.base_url);
        debug!(prompt_chars = request.user.len(), "sending chat completion");

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let parsed: CompletionResponse = resp
            .json()
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        first_choice_content(parsed)
    }
}

fn first_choice_content(resp: CompletionResponse) -> std::result::Result<String, LlmError> {
    resp.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| LlmError::InvalidResponse("no message content in first choice".to_string()))
}

/// Prefer `error.message` from an OpenAI error body, else the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|env| env.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}
