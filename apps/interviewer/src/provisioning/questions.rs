//! Question Generator: pluggable, trait-based.
//!
//! Default: `OracleQuestionGenerator`, one Oracle call grounded on the parsed résumé.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::llm_client::extract::extract_repaired;
use crate::llm_client::prompts::{render, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{FormatHint, Oracle};
use crate::models::session::Question;
use crate::provisioning::prompts::RESUME_QUESTIONS_PROMPT;

const MIN_ANSWER_SECONDS: u32 = 30;
const MAX_ANSWER_SECONDS: u32 = 60;
const DEFAULT_ANSWER_SECONDS: u32 = 45;

#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// Returns exactly `count` questions or an error.
    async fn generate(
        &self,
        content: &Value,
        role: &str,
        topics: &[String],
        count: u32,
    ) -> Result<Vec<Question>, AppError>;
}

/// A question as the Oracle writes it. `time` is optional and not trusted.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedQuestion {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub time: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct GeneratedQuestions {
    #[serde(default)]
    questions: Vec<GeneratedQuestion>,
}

/// Drops blank questions, clamps answer times to 30–60 s, and keeps the first `count`.
/// Fewer than `count` usable questions is a malformed generation.
pub fn normalize_questions(
    raw: Vec<GeneratedQuestion>,
    count: u32,
) -> Result<Vec<Question>, AppError> {
    let questions: Vec<Question> = raw
        .into_iter()
        .filter_map(|q| {
            let text = q.question.trim();
            if text.is_empty() {
                return None;
            }
            let seconds = q
                .time
                .filter(|t| t.is_finite())
                .map(|t| {
                    t.round()
                        .clamp(f64::from(MIN_ANSWER_SECONDS), f64::from(MAX_ANSWER_SECONDS))
                        as u32
                })
                .unwrap_or(DEFAULT_ANSWER_SECONDS);
            Some(Question {
                text: text.to_string(),
                expected_answer_seconds: seconds,
            })
        })
        .take(count as usize)
        .collect();

    if questions.len() < count as usize {
        return Err(AppError::MalformedGeneration(format!(
            "expected {count} questions, the oracle produced {} usable ones",
            questions.len()
        )));
    }
    Ok(questions)
}

pub struct OracleQuestionGenerator {
    oracle: Arc<dyn Oracle>,
}

impl OracleQuestionGenerator {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }
}

#[async_trait]
impl QuestionGenerator for OracleQuestionGenerator {
    async fn generate(
        &self,
        content: &Value,
        role: &str,
        topics: &[String],
        count: u32,
    ) -> Result<Vec<Question>, AppError> {
        let resume = serde_json::to_string_pretty(content)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to serialize résumé: {e}")))?;
        let prompt = render(
            RESUME_QUESTIONS_PROMPT,
            &[
                ("count", &count.to_string()),
                ("role", role),
                ("topics", &topics.join(", ")),
                ("resume", &resume),
            ],
        );
        let prompt = format!("{prompt}\n\n{JSON_ONLY_INSTRUCTION}");

        let raw = self.oracle.generate(&prompt, FormatHint::CREATIVE_JSON).await?;
        debug!("Question generation reply: {} chars", raw.len());

        let generated: GeneratedQuestions = extract_repaired(&raw)?;
        let questions = normalize_questions(generated.questions, count)?;
        info!("Generated {} questions for role '{role}'", questions.len());
        Ok(questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedOracle;
    use serde_json::json;

    fn raw(question: &str, time: Option<f64>) -> GeneratedQuestion {
        GeneratedQuestion {
            question: question.to_string(),
            time,
        }
    }

    #[test]
    fn test_times_are_clamped_and_defaulted() {
        let questions = normalize_questions(
            vec![raw("A?", Some(10.0)), raw("B?", Some(95.0)), raw("C?", None), raw("D?", Some(42.4))],
            4,
        )
        .unwrap();
        let times: Vec<u32> = questions.iter().map(|q| q.expected_answer_seconds).collect();
        assert_eq!(times, vec![30, 60, 45, 42]);
    }

    #[test]
    fn test_extra_questions_are_truncated() {
        let questions =
            normalize_questions(vec![raw("A?", None), raw("B?", None), raw("C?", None)], 2).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1].text, "B?");
    }

    #[test]
    fn test_too_few_usable_questions_is_malformed() {
        let err = normalize_questions(vec![raw("A?", None), raw("   ", Some(30.0))], 2).unwrap_err();
        assert!(matches!(err, AppError::MalformedGeneration(_)));
    }

    #[tokio::test]
    async fn test_generator_fills_prompt_and_parses_reply() {
        let oracle = Arc::new(ScriptedOracle::new(&[
            r#"Sure! {"questions": [{"question": "How do B-tree indexes work?", "time": 40}]}"#,
        ]));
        let generator = OracleQuestionGenerator::new(oracle.clone());
        let content = json!({"skills": ["PostgreSQL"]});

        let questions = generator
            .generate(&content, "Backend Engineer", &["Databases".to_string()], 1)
            .await
            .unwrap();

        assert_eq!(questions[0].text, "How do B-tree indexes work?");
        let prompts = oracle.prompts();
        assert!(prompts[0].contains("Backend Engineer"));
        assert!(prompts[0].contains("Databases"));
        assert!(prompts[0].contains("PostgreSQL"));
        assert!(prompts[0].contains("exactly 1 unique"));
    }

    #[tokio::test]
    async fn test_generator_without_json_is_malformed() {
        let oracle = Arc::new(ScriptedOracle::new(&["I cannot help with that."]));
        let generator = OracleQuestionGenerator::new(oracle);
        let err = generator
            .generate(&json!({}), "Backend Engineer", &["Databases".to_string()], 2)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MalformedGeneration(_)));
    }
}
