/// LLM Client: the single point of entry for all Oracle calls in the interviewer.
///
/// ARCHITECTURAL RULE: No other module may call the generative service directly.
/// All prompts go through the `Oracle` trait; `LlmClient` is the HTTP implementation.
///
/// The Oracle is untrusted: a reply is raw text with no structural guarantee.
/// Recovering JSON from it is the job of `extract`.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod extract;
pub mod prompts;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// How the Oracle should shape its reply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormatHint {
    /// Ask the backend to constrain output to JSON. Still not a guarantee.
    pub json: bool,
    pub temperature: f32,
}

impl FormatHint {
    /// Low-variance JSON, used for yes/no judgements.
    pub const STRICT_JSON: FormatHint = FormatHint {
        json: true,
        temperature: 0.3,
    };

    /// Conversational JSON, used for interviewer utterances and question sets.
    pub const CREATIVE_JSON: FormatHint = FormatHint {
        json: true,
        temperature: 0.7,
    };
}

/// The generative text service. `generate` has no side effects, so resubmitting a
/// prompt is always safe.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn generate(&self, prompt: &str, hint: FormatHint) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

/// HTTP Oracle speaking the Ollama `/api/generate` protocol.
/// Each call is bounded by the client timeout and is never retried here.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    url: String,
    model: String,
}

impl LlmClient {
    pub fn new(url: String, model: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            url,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Oracle for LlmClient {
    async fn generate(&self, prompt: &str, hint: FormatHint) -> Result<String, LlmError> {
        let request_body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            format: hint.json.then_some("json"),
            options: GenerateOptions {
                temperature: hint.temperature,
            },
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            warn!("Oracle returned {}: {}", status, message);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response.json().await?;

        debug!(
            "Oracle call succeeded: prompt_tokens={:?}, output_tokens={:?}",
            body.prompt_eval_count, body.eval_count
        );

        if body.response.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }

        Ok(body.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_json_format_hint() {
        let body = GenerateRequest {
            model: "llama3.1:8b",
            prompt: "hi",
            stream: false,
            format: FormatHint::STRICT_JSON.json.then_some("json"),
            options: GenerateOptions { temperature: 0.3 },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["format"], "json");
        assert_eq!(value["stream"], false);
        assert_eq!(value["model"], "llama3.1:8b");
    }

    #[test]
    fn test_request_omits_format_for_free_text() {
        let body = GenerateRequest {
            model: "m",
            prompt: "hi",
            stream: false,
            format: None,
            options: GenerateOptions { temperature: 0.7 },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("format").is_none());
    }

    #[test]
    fn test_response_tolerates_missing_counters() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"response": "{}"}"#).unwrap();
        assert_eq!(parsed.response, "{}");
        assert!(parsed.eval_count.is_none());
    }
}
