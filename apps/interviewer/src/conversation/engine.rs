//! Conversation Engine: one interviewer utterance per call.
//!
//! The client echoes the list of questions already asked; its length is the turn
//! cursor `k`. With `N` questions in the interview:
//!
//! - `k == 0`      Opening: greeting + lead-in + `question[0]`
//! - `0 < k < N`   MidTurn: feedback on the last answer + lead-in + `question[k]`,
//!                 answer written to `answers[k-1]`
//! - `k == N`      FinalTurn: feedback + closing message, answer written to
//!                 `answers[N-1]`, interview finished
//!
//! The Oracle reply is recovered and checked before anything is written, so a
//! malformed generation leaves the session untouched. Nothing is retried.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::conversation::prompts::{FINAL_TURN_PROMPT, MID_TURN_PROMPT, OPENING_PROMPT};
use crate::errors::AppError;
use crate::llm_client::extract::{extract_object, extract_repaired};
use crate::llm_client::prompts::{render, FEEDBACK_RULES, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{FormatHint, Oracle};
use crate::models::session::{InterviewSession, Question, ANSWER_NOT_PROVIDED};
use crate::store::{require_session, SessionStore};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    pub role: String,
    pub topic: String,
    pub name: String,
    #[serde(default)]
    pub previous_questions: Vec<String>,
    #[serde(default)]
    pub asked_question: Option<String>,
    #[serde(default)]
    pub given_answer: Option<String>,
    pub desired_count: u32,
    pub session_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnReply {
    pub composed_text: String,
    pub next_question: Option<Question>,
    pub finished: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Opening,
    MidTurn(usize),
    FinalTurn,
}

impl TurnPhase {
    /// Resolves the phase from the echoed history length `k` and interview size `n`.
    pub fn resolve(k: usize, n: usize) -> Result<Self, AppError> {
        match k {
            0 => Ok(TurnPhase::Opening),
            k if k < n => Ok(TurnPhase::MidTurn(k)),
            k if k == n => Ok(TurnPhase::FinalTurn),
            k => Err(AppError::Validation(format!(
                "history has {k} questions but the interview only has {n}"
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpeningReply {
    #[serde(default)]
    addressing: String,
    #[serde(default)]
    transition: String,
}

#[derive(Debug, Deserialize)]
struct FeedbackReply {
    #[serde(default)]
    feedback: String,
    #[serde(default)]
    transition: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Normalization
// ────────────────────────────────────────────────────────────────────────────

fn require_text<'a>(field: &str, value: &'a str) -> Result<&'a str, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::MalformedGeneration(format!(
            "oracle reply has an empty '{field}'"
        )));
    }
    Ok(value)
}

/// "Moving on to..." → "Moving on to,"
pub fn ensure_trailing_comma(lead_in: &str) -> Result<String, AppError> {
    let stem = lead_in
        .trim()
        .trim_end_matches(|c: char| matches!(c, '.' | ':' | ';' | '…' | '!' | ',') || c.is_whitespace());
    let stem = require_text("transition", stem)?;
    Ok(format!("{stem},"))
}

/// "Thanks for your time!" → "Thanks for your time."
pub fn ensure_trailing_period(closing: &str) -> Result<String, AppError> {
    let stem = closing.trim().trim_end_matches(|c: char| {
        matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | '…') || c.is_whitespace()
    });
    let stem = require_text("transition", stem)?;
    Ok(format!("{stem}."))
}

fn answer_or_placeholder(answer: Option<&str>) -> String {
    match answer.map(str::trim) {
        Some(a) if !a.is_empty() => a.to_string(),
        _ => ANSWER_NOT_PROVIDED.to_string(),
    }
}

fn with_json_instruction(prompt: String) -> String {
    format!("{prompt}\n\n{JSON_ONLY_INSTRUCTION}")
}

// ────────────────────────────────────────────────────────────────────────────
// Turn
// ────────────────────────────────────────────────────────────────────────────

fn check_request(request: &TurnRequest) -> Result<(), AppError> {
    for (field, value) in [
        ("role", &request.role),
        ("topic", &request.topic),
        ("name", &request.name),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{field} cannot be empty")));
        }
    }
    if request.desired_count == 0 {
        return Err(AppError::Validation(
            "desiredCount must be at least 1".to_string(),
        ));
    }
    let asked = request.asked_question.as_deref().map(str::trim).unwrap_or("");
    if !request.previous_questions.is_empty() && asked.is_empty() {
        return Err(AppError::Validation(
            "askedQuestion is required after the first turn".to_string(),
        ));
    }
    Ok(())
}

fn question_at(session: &InterviewSession, index: usize) -> Result<Question, AppError> {
    session.question(index).cloned().ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "session {} has no question at index {index}",
            session.id()
        ))
    })
}

/// Produces the next interviewer utterance and, past the opening, records the
/// candidate's answer to the previous question.
#[instrument(
    skip_all,
    fields(session_id = %request.session_id, turn = request.previous_questions.len())
)]
pub async fn take_turn(
    oracle: &dyn Oracle,
    store: &dyn SessionStore,
    request: TurnRequest,
) -> Result<TurnReply, AppError> {
    check_request(&request)?;

    let total = request.desired_count as usize;
    let phase = TurnPhase::resolve(request.previous_questions.len(), total)?;

    let session = require_session(store, request.session_id).await?;
    if total > session.questions().len() {
        return Err(AppError::Validation(format!(
            "desiredCount {total} exceeds the {} questions in session {}",
            session.questions().len(),
            session.id()
        )));
    }

    match phase {
        TurnPhase::Opening => {
            let prompt = render(
                OPENING_PROMPT,
                &[
                    ("role", request.role.trim()),
                    ("topic", request.topic.trim()),
                    ("name", request.name.trim()),
                ],
            );
            let raw = oracle
                .generate(&with_json_instruction(prompt), FormatHint::CREATIVE_JSON)
                .await?;
            let reply: OpeningReply = extract_object(&raw)?;
            let addressing = require_text("addressing", &reply.addressing)?;
            let lead_in = ensure_trailing_comma(&reply.transition)?;

            let question = question_at(&session, 0)?;
            info!("Opening turn composed");
            Ok(TurnReply {
                composed_text: format!("{addressing} {lead_in} {}", question.text),
                next_question: Some(question),
                finished: false,
            })
        }
        TurnPhase::MidTurn(k) => {
            let answer = answer_or_placeholder(request.given_answer.as_deref());
            let reply = ask_for_feedback(oracle, &request, MID_TURN_PROMPT, &answer).await?;
            let feedback = require_text("feedback", &reply.feedback)?;
            let lead_in = ensure_trailing_comma(&reply.transition)?;

            let question = question_at(&session, k)?;
            store.record_answer(session.id(), k - 1, answer).await?;

            info!(answer_index = k - 1, "Answer recorded");
            Ok(TurnReply {
                composed_text: format!("{feedback} {lead_in} {}", question.text),
                next_question: Some(question),
                finished: false,
            })
        }
        TurnPhase::FinalTurn => {
            let answer = answer_or_placeholder(request.given_answer.as_deref());
            let reply = ask_for_feedback(oracle, &request, FINAL_TURN_PROMPT, &answer).await?;
            let feedback = require_text("feedback", &reply.feedback)?;
            let closing = ensure_trailing_period(&reply.transition)?;

            store.record_answer(session.id(), total - 1, answer).await?;

            info!(answer_index = total - 1, "Final answer recorded, interview finished");
            Ok(TurnReply {
                composed_text: format!("{feedback} {closing}"),
                next_question: None,
                finished: true,
            })
        }
    }
}

async fn ask_for_feedback(
    oracle: &dyn Oracle,
    request: &TurnRequest,
    template: &str,
    answer: &str,
) -> Result<FeedbackReply, AppError> {
    let question = request.asked_question.as_deref().unwrap_or_default().trim();
    let prompt = render(
        template,
        &[
            ("role", request.role.trim()),
            ("topic", request.topic.trim()),
            ("question", question),
            ("answer", answer),
            ("rules", FEEDBACK_RULES),
        ],
    );
    let raw = oracle
        .generate(&with_json_instruction(prompt), FormatHint::CREATIVE_JSON)
        .await?;
    Ok(extract_repaired(&raw)?)
}
