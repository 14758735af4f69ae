//! Document Parser and Resume Scorer: pluggable, trait-based collaborators.
//!
//! Default: `ResumeServiceClient`, an HTTP client for the résumé service
//! (`/parse-resume`, `/evaluate-resume`). `AppState` holds each as an `Arc<dyn _>`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::errors::AppError;
use crate::llm_client::extract::extract_object;
use crate::provisioning::document::UploadedDocument;

/// Outcome of scoring a résumé against a role and topic list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeScore {
    /// 0 – 100
    pub score: u32,
    pub summary: String,
}

#[async_trait]
pub trait DocumentParser: Send + Sync {
    /// `Ok(None)` when the parser answered but produced no content.
    async fn parse(&self, document: &UploadedDocument) -> Result<Option<Value>, AppError>;
}

#[async_trait]
pub trait ResumeScorer: Send + Sync {
    async fn score(
        &self,
        content: &Value,
        role: &str,
        topics: &[String],
    ) -> Result<ResumeScore, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// HTTP implementation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ParseResponse {
    #[serde(default)]
    resume_data: Option<Value>,
}

#[derive(Debug, Serialize)]
struct EvaluateRequest<'a> {
    resume_data: &'a Value,
    job_title: &'a str,
    topics: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EvaluateResponse {
    evaluation: Value,
}

#[derive(Debug, Deserialize)]
struct Evaluation {
    total_score: f64,
    summary_feedback: String,
}

/// Client for the résumé service. Every request is bounded by the client timeout.
#[derive(Clone)]
pub struct ResumeServiceClient {
    client: Client,
    base_url: String,
}

impl ResumeServiceClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

fn upstream(what: &str, err: impl std::fmt::Display) -> AppError {
    AppError::Upstream(format!("{what}: {err}"))
}

#[async_trait]
impl DocumentParser for ResumeServiceClient {
    async fn parse(&self, document: &UploadedDocument) -> Result<Option<Value>, AppError> {
        let bytes = document.read().await?;
        let form = Form::new().part(
            "file",
            Part::bytes(bytes).file_name(document.file_name().to_string()),
        );

        let response = self
            .client
            .post(self.url("parse-resume"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| upstream("résumé parser unreachable", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(upstream(&format!("résumé parser returned {status}"), body));
        }

        let body: ParseResponse = response
            .json()
            .await
            .map_err(|e| upstream("résumé parser sent an unreadable body", e))?;

        normalize_parsed(body.resume_data)
    }
}

/// The parser may return the content as an object or as JSON-in-a-string.
fn normalize_parsed(resume_data: Option<Value>) -> Result<Option<Value>, AppError> {
    match resume_data {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => extract_object::<Value>(&text)
            .map(Some)
            .map_err(|e| upstream("résumé parser returned malformed content", e)),
        Some(value @ Value::Object(_)) => Ok(Some(value)),
        Some(other) => Err(upstream(
            "résumé parser returned unexpected content",
            other,
        )),
    }
}

#[async_trait]
impl ResumeScorer for ResumeServiceClient {
    async fn score(
        &self,
        content: &Value,
        role: &str,
        topics: &[String],
    ) -> Result<ResumeScore, AppError> {
        let response = self
            .client
            .post(self.url("evaluate-resume"))
            .json(&EvaluateRequest {
                resume_data: content,
                job_title: role,
                topics,
            })
            .send()
            .await
            .map_err(|e| upstream("résumé scorer unreachable", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(upstream(&format!("résumé scorer returned {status}"), body));
        }

        let body: EvaluateResponse = response
            .json()
            .await
            .map_err(|e| upstream("résumé scorer sent an unreadable body", e))?;

        let score = normalize_score(body.evaluation)?;
        debug!("Résumé scored {}/100", score.score);
        Ok(score)
    }
}

fn normalize_score(evaluation: Value) -> Result<ResumeScore, AppError> {
    if let Some(err) = evaluation.get("error") {
        return Err(upstream("résumé scorer failed", err));
    }
    let evaluation: Evaluation = serde_json::from_value(evaluation)
        .map_err(|e| upstream("résumé scorer returned malformed evaluation", e))?;

    Ok(ResumeScore {
        score: evaluation.total_score.round().clamp(0.0, 100.0) as u32,
        summary: evaluation.summary_feedback.trim().to_string(),
    })
}
