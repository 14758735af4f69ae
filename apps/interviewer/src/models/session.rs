use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::Identity;

/// Placeholder stored for every question until its turn writes a real answer.
pub const ANSWER_NOT_PROVIDED: &str = "Answer Not Provided.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    pub text: String,
    /// Expected length of a spoken answer, used by the client's countdown.
    #[serde(rename = "time")]
    pub expected_answer_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "review")]
    pub text: String,
    /// 0 – 10
    pub score: u32,
}

/// One interview: ordered questions, one answer slot per question, and the
/// evaluation written once the interview is over.
///
/// `answers.len() == questions.len()` from construction onward. Fields are private
/// so the only way to touch an answer is the bounds-checked `record_answer`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSession {
    id: Uuid,
    participant: Identity,
    role: String,
    topics: Vec<String>,
    questions: Vec<Question>,
    answers: Vec<String>,
    reviews: Vec<Review>,
    total_score: Option<u32>,
    overall_review: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Everything needed to create a session. Answers are never supplied by callers.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub participant: Identity,
    pub role: String,
    pub topics: Vec<String>,
    pub questions: Vec<Question>,
}

/// Evaluation output written by the closing pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub reviews: Vec<Review>,
    pub total_score: u32,
    pub overall_review: String,
}

impl InterviewSession {
    pub fn new(new: NewSession) -> Self {
        let now = Utc::now();
        let answers = vec![ANSWER_NOT_PROVIDED.to_string(); new.questions.len()];
        Self {
            id: Uuid::new_v4(),
            participant: new.participant,
            role: new.role,
            topics: new.topics,
            questions: new.questions,
            answers,
            reviews: Vec::new(),
            total_score: None,
            overall_review: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn participant(&self) -> &Identity {
        &self.participant
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    pub fn total_score(&self) -> Option<u32> {
        self.total_score
    }

    pub fn is_evaluated(&self) -> bool {
        self.total_score.is_some()
    }

    /// Overwrites the answer slot for question `index`. Repeated writes to the
    /// same slot are allowed; the last one wins.
    pub fn record_answer(&mut self, index: usize, answer: String) -> Result<(), AppError> {
        let slot = self.answers.get_mut(index).ok_or_else(|| {
            AppError::Validation(format!(
                "answer index {index} is out of range for a {}-question interview",
                self.questions.len()
            ))
        })?;
        *slot = answer;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn apply_evaluation(&mut self, evaluation: Evaluation) {
        self.reviews = evaluation.reviews;
        self.total_score = Some(evaluation.total_score);
        self.overall_review = Some(evaluation.overall_review);
        self.updated_at = Utc::now();
    }
}

/// Database row for `interview_sessions`.
#[derive(Debug, Clone, FromRow)]
pub struct InterviewSessionRow {
    pub id: Uuid,
    pub participant: String,
    pub role: String,
    pub topics: Vec<String>,
    pub questions: Json<Vec<Question>>,
    pub answers: Json<Vec<String>>,
    pub reviews: Json<Vec<Review>>,
    pub total_score: Option<i32>,
    pub overall_review: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<InterviewSessionRow> for InterviewSession {
    type Error = AppError;

    fn try_from(row: InterviewSessionRow) -> Result<Self, Self::Error> {
        let questions = row.questions.0;
        let answers = row.answers.0;
        if answers.len() != questions.len() {
            return Err(AppError::Internal(anyhow::anyhow!(
                "session {} has {} answers for {} questions",
                row.id,
                answers.len(),
                questions.len()
            )));
        }
        let participant = Identity::parse(&row.participant).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("session {} has a blank participant", row.id))
        })?;

        Ok(Self {
            id: row.id,
            participant,
            role: row.role,
            topics: row.topics,
            questions,
            answers,
            reviews: row.reviews.0,
            total_score: row.total_score.map(|s| s.clamp(0, 100) as u32),
            overall_review: row.overall_review,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<&InterviewSession> for InterviewSessionRow {
    fn from(session: &InterviewSession) -> Self {
        Self {
            id: session.id,
            participant: session.participant.as_str().to_string(),
            role: session.role.clone(),
            topics: session.topics.clone(),
            questions: Json(session.questions.clone()),
            answers: Json(session.answers.clone()),
            reviews: Json(session.reviews.clone()),
            total_score: session.total_score.map(|s| s as i32),
            overall_review: session.overall_review.clone(),
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}
