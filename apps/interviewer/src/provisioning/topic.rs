//! Topic provisioning: one Oracle call that validates (role, topic) and writes the
//! questions. No résumé, no scoring gate, no progress pushes.

use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::llm_client::extract::extract_repaired;
use crate::llm_client::prompts::{render, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{FormatHint, Oracle};
use crate::models::session::NewSession;
use crate::provisioning::prompts::TOPIC_INTERVIEW_PROMPT;
use crate::provisioning::questions::{normalize_questions, GeneratedQuestion};
use crate::provisioning::{InterviewSpec, ProvisionOutcome, Rejection};
use crate::store::SessionStore;

#[derive(Debug, Deserialize)]
struct TopicInterview {
    valid: bool,
    #[serde(default)]
    questions: Vec<GeneratedQuestion>,
}

#[instrument(skip_all, fields(identity = %spec.identity, role = %spec.role))]
pub async fn provision_from_topic(
    oracle: &dyn Oracle,
    store: &dyn SessionStore,
    spec: InterviewSpec,
) -> Result<ProvisionOutcome, AppError> {
    let topic = spec.topics.join(", ");
    let prompt = render(
        TOPIC_INTERVIEW_PROMPT,
        &[
            ("count", &spec.desired_count.to_string()),
            ("role", &spec.role),
            ("topic", &topic),
        ],
    );
    let prompt = format!("{prompt}\n\n{JSON_ONLY_INSTRUCTION}");

    let raw = oracle.generate(&prompt, FormatHint::CREATIVE_JSON).await?;
    let reply: TopicInterview = extract_repaired(&raw)?;

    if !reply.valid {
        warn!("Oracle rejected topic '{topic}' for role '{}'", spec.role);
        return Ok(ProvisionOutcome::Rejected(Rejection::InvalidRoleOrTopic {
            role: spec.role,
            topic,
        }));
    }

    let questions = normalize_questions(reply.questions, spec.desired_count)?;
    let session = store
        .create(NewSession {
            participant: spec.identity,
            role: spec.role,
            topics: spec.topics,
            questions,
        })
        .await?;

    let question_count = session.questions().len();
    info!(session_id = %session.id(), "Topic session created with {question_count} questions");

    Ok(ProvisionOutcome::Ready {
        session_id: session.id(),
        question_count,
    })
}
