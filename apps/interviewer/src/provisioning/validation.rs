//! Role/topic sanity check: one strict-JSON Oracle call per topic.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::llm_client::extract::extract_repaired;
use crate::llm_client::prompts::render;
use crate::llm_client::{FormatHint, Oracle};
use crate::provisioning::prompts::VALIDATE_TOPIC_PROMPT;

#[derive(Debug, Deserialize)]
struct Verdict {
    valid: bool,
}

/// Returns the first topic the Oracle judges unrelated to `role`, or `None` when
/// every topic passes. Stops calling the Oracle at the first negative.
pub async fn first_invalid_topic(
    oracle: &dyn Oracle,
    role: &str,
    topics: &[String],
) -> Result<Option<String>, AppError> {
    for topic in topics {
        let prompt = render(VALIDATE_TOPIC_PROMPT, &[("role", role), ("topic", topic)]);
        let raw = oracle.generate(&prompt, FormatHint::STRICT_JSON).await?;
        let verdict: Verdict = extract_repaired(&raw)?;

        if !verdict.valid {
            warn!("Oracle rejected topic '{topic}' for role '{role}'");
            return Ok(Some(topic.clone()));
        }
        debug!("Topic '{topic}' accepted for role '{role}'");
    }
    Ok(None)
}
