//! Axum route handlers for the Provisioning API.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;

use crate::errors::AppError;
use crate::provisioning::document::UploadedDocument;
use crate::provisioning::pipeline::{ResumePipeline, ResumeProvisionRequest};
use crate::provisioning::topic::provision_from_topic;
use crate::provisioning::{split_topics, InterviewSpec, ProvisionOutcome};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TopicProvisionRequest {
    pub user_id: String,
    pub role: String,
    pub topic: String,
    pub desired_count: u32,
}

/// Raw multipart fields before validation.
#[derive(Debug, Default)]
struct ResumeForm {
    user_id: String,
    role: String,
    topics: Vec<String>,
    desired_count: Option<String>,
    file: Option<(String, Bytes)>,
}

fn bad_multipart(err: MultipartError) -> AppError {
    AppError::Validation(format!("invalid multipart body: {err}"))
}

async fn read_form(mut multipart: Multipart) -> Result<ResumeForm, AppError> {
    let mut form = ResumeForm::default();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "user_id" => form.user_id = field.text().await.map_err(bad_multipart)?,
            "role" => form.role = field.text().await.map_err(bad_multipart)?,
            "topics" | "topics[]" => form.topics.push(field.text().await.map_err(bad_multipart)?),
            "desired_count" => form.desired_count = Some(field.text().await.map_err(bad_multipart)?),
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                form.file = Some((file_name, bytes));
            }
            other => tracing::debug!("Ignoring unknown multipart field '{other}'"),
        }
    }

    Ok(form)
}

fn parse_count(raw: Option<&str>) -> Result<u32, AppError> {
    let raw = raw.ok_or_else(|| AppError::Validation("desired_count is required".to_string()))?;
    raw.trim()
        .parse::<u32>()
        .map_err(|_| AppError::Validation(format!("desired_count must be a positive integer, got '{raw}'")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews/provision/resume
///
/// Multipart: `user_id`, `role`, `topics` (repeated or comma-separated),
/// `desired_count`, `file`. Progress is pushed to the caller's presence socket.
pub async fn handle_provision_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ProvisionOutcome, AppError> {
    let form = read_form(multipart).await?;

    let desired_count = parse_count(form.desired_count.as_deref())?;
    let spec = InterviewSpec::parse(
        &form.user_id,
        &form.role,
        split_topics(&form.topics),
        desired_count,
    )?;
    let (file_name, bytes) = form
        .file
        .ok_or_else(|| AppError::Validation("a résumé file is required".to_string()))?;
    let document = UploadedDocument::from_bytes(&file_name, &bytes)?;

    ResumePipeline::from_state(&state)
        .run(ResumeProvisionRequest { spec, document })
        .await
}

/// POST /api/v1/interviews/provision/topic
pub async fn handle_provision_topic(
    State(state): State<AppState>,
    Json(request): Json<TopicProvisionRequest>,
) -> Result<ProvisionOutcome, AppError> {
    let spec = InterviewSpec::parse(
        &request.user_id,
        &request.role,
        vec![request.topic],
        request.desired_count,
    )?;
    provision_from_topic(state.oracle.as_ref(), state.store.as_ref(), spec).await
}
