//! Hand-written fakes for the collaborator traits, shared by unit tests.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::errors::AppError;
use crate::llm_client::{FormatHint, LlmError, Oracle};
use crate::models::session::Question;
use crate::models::user::Identity;
use crate::presence::{ProgressSink, PushError, ServerEvent};
use crate::provisioning::collaborators::{DocumentParser, ResumeScore, ResumeScorer};
use crate::provisioning::document::UploadedDocument;
use crate::provisioning::questions::QuestionGenerator;

/// Replays queued replies in order; an exhausted script answers `EmptyContent`.
#[derive(Default)]
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<(String, FormatHint)>>,
}

impl ScriptedOracle {
    pub fn new(replies: &[&str]) -> Self {
        Self::with_results(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn with_results(replies: Vec<Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .map(|(p, _)| p.clone())
            .collect()
    }

    pub fn hints(&self) -> Vec<FormatHint> {
        self.prompts.lock().unwrap().iter().map(|(_, h)| *h).collect()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn generate(&self, prompt: &str, hint: FormatHint) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push((prompt.to_string(), hint));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyContent))
    }
}

/// Holds each call until `open` releases it, then answers with a fixed reply.
pub struct GatedOracle {
    gate: Semaphore,
    reply: String,
}

impl GatedOracle {
    pub fn new(reply: &str) -> Self {
        Self {
            gate: Semaphore::new(0),
            reply: reply.to_string(),
        }
    }

    pub fn open(&self) {
        self.gate.add_permits(1);
    }
}

#[async_trait]
impl Oracle for GatedOracle {
    async fn generate(&self, _prompt: &str, _hint: FormatHint) -> Result<String, LlmError> {
        let _permit = self.gate.acquire().await.map_err(|_| LlmError::EmptyContent)?;
        Ok(self.reply.clone())
    }
}

/// Returns fixed content and remembers which temp files it was handed.
pub struct FakeParser {
    content: Result<Option<Value>, String>,
    pub seen: Mutex<Vec<PathBuf>>,
}

impl FakeParser {
    pub fn returning(content: Value) -> Self {
        Self {
            content: Ok(Some(content)),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self {
            content: Ok(None),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            content: Err(message.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl DocumentParser for FakeParser {
    async fn parse(&self, document: &UploadedDocument) -> Result<Option<Value>, AppError> {
        assert!(document.path().exists(), "document must exist while parsing");
        self.seen.lock().unwrap().push(document.path().to_path_buf());
        self.content.clone().map_err(AppError::Upstream)
    }
}

pub struct FakeScorer {
    score: u32,
    pub calls: Mutex<usize>,
}

impl FakeScorer {
    pub fn new(score: u32) -> Self {
        Self {
            score,
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ResumeScorer for FakeScorer {
    async fn score(
        &self,
        _content: &Value,
        _role: &str,
        _topics: &[String],
    ) -> Result<ResumeScore, AppError> {
        *self.calls.lock().unwrap() += 1;
        Ok(ResumeScore {
            score: self.score,
            summary: format!("Scored {}", self.score),
        })
    }
}

/// Produces `count` numbered questions about the first topic.
#[derive(Default)]
pub struct FakeGenerator {
    pub calls: Mutex<usize>,
}

impl FakeGenerator {
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl QuestionGenerator for FakeGenerator {
    async fn generate(
        &self,
        _content: &Value,
        _role: &str,
        topics: &[String],
        count: u32,
    ) -> Result<Vec<Question>, AppError> {
        *self.calls.lock().unwrap() += 1;
        let topic = topics.first().map(String::as_str).unwrap_or("general");
        Ok((0..count)
            .map(|i| Question {
                text: format!("{topic} question {i}?"),
                expected_answer_seconds: 45,
            })
            .collect())
    }
}

/// Records every emitted event. `connected` controls whether emits succeed.
pub struct RecordingSink {
    connected: bool,
    pub events: Mutex<Vec<(Identity, ServerEvent)>>,
}

impl RecordingSink {
    pub fn connected() -> Self {
        Self {
            connected: true,
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn disconnected() -> Self {
        Self {
            connected: false,
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|(_, e)| e.name()).collect()
    }

    pub fn events(&self) -> Vec<ServerEvent> {
        self.events.lock().unwrap().iter().map(|(_, e)| e.clone()).collect()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, identity: &Identity, event: ServerEvent) -> Result<(), PushError> {
        self.events.lock().unwrap().push((identity.clone(), event));
        if self.connected {
            Ok(())
        } else {
            Err(PushError::NoChannel(identity.clone()))
        }
    }
}
