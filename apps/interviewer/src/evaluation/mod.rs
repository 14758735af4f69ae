// Interview Evaluation
// Scores every answer of a finished interview in one Oracle call and stores the
// per-question reviews alongside an overall verdict.

pub mod handlers;
pub mod prompts;

use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::prompts::EVALUATION_PROMPT;
use crate::llm_client::extract::extract_repaired;
use crate::llm_client::prompts::{render, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{FormatHint, Oracle};
use crate::models::session::{Evaluation, InterviewSession, Review};
use crate::store::{require_session, SessionStore};

const MAX_REVIEW_SCORE: f64 = 10.0;
const MAX_TOTAL_SCORE: f64 = 100.0;

#[derive(Debug, Deserialize)]
struct RawReview {
    #[serde(default)]
    review: String,
    #[serde(default)]
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvaluation {
    #[serde(default)]
    reviews: Vec<RawReview>,
    #[serde(default)]
    total_score: f64,
    #[serde(default)]
    overall_review: String,
}

fn clamp_score(score: f64, max: f64) -> u32 {
    if score.is_finite() {
        score.round().clamp(0.0, max) as u32
    } else {
        0
    }
}

fn transcript(session: &InterviewSession) -> String {
    session
        .questions()
        .iter()
        .zip(session.answers())
        .enumerate()
        .map(|(i, (q, a))| format!("Q{}: {}\nA{}: {}", i + 1, q.text, i + 1, a))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Checks the Oracle's evaluation against the session it claims to cover.
fn into_evaluation(raw: RawEvaluation, question_count: usize) -> Result<Evaluation, AppError> {
    if raw.reviews.len() != question_count {
        return Err(AppError::MalformedGeneration(format!(
            "expected {question_count} reviews, the oracle produced {}",
            raw.reviews.len()
        )));
    }
    let overall_review = raw.overall_review.trim();
    if overall_review.is_empty() {
        return Err(AppError::MalformedGeneration(
            "oracle evaluation has an empty overallReview".to_string(),
        ));
    }

    let reviews = raw
        .reviews
        .into_iter()
        .map(|r| {
            let text = r.review.trim();
            if text.is_empty() {
                return Err(AppError::MalformedGeneration(
                    "oracle evaluation has an empty review".to_string(),
                ));
            }
            Ok(Review {
                text: text.to_string(),
                score: clamp_score(r.score, MAX_REVIEW_SCORE),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Evaluation {
        reviews,
        total_score: clamp_score(raw.total_score, MAX_TOTAL_SCORE),
        overall_review: overall_review.to_string(),
    })
}

/// Reviews every answer of a session and persists the result. Answers are not touched.
/// Re-evaluating overwrites the previous evaluation.
#[instrument(skip(oracle, store))]
pub async fn evaluate_session(
    oracle: &dyn Oracle,
    store: &dyn SessionStore,
    session_id: Uuid,
) -> Result<InterviewSession, AppError> {
    let session = require_session(store, session_id).await?;
    if session.is_evaluated() {
        warn!("Session already evaluated, overwriting");
    }

    let count = session.questions().len();
    let prompt = render(
        EVALUATION_PROMPT,
        &[
            ("role", session.role()),
            ("topics", &session.topics().join(", ")),
            ("count", &count.to_string()),
            ("transcript", &transcript(&session)),
        ],
    );
    let prompt = format!("{prompt}\n\n{JSON_ONLY_INSTRUCTION}");

    let raw = oracle.generate(&prompt, FormatHint::STRICT_JSON).await?;
    let evaluation = into_evaluation(extract_repaired(&raw)?, count)?;

    let evaluated = store.save_evaluation(session_id, evaluation).await?;
    info!(
        "Session evaluated: {}/100",
        evaluated.total_score().unwrap_or_default()
    );
    Ok(evaluated)
}
