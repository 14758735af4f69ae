//! Résumé provisioning: orchestrates the full pipeline.
//!
//! Flow: validate topics → parse résumé → score → gate → generate questions →
//!       persist session → announce.
//!
//! Every step either hands its output to the next or aborts the chain. The uploaded
//! document is disposed once, after the chain, whichever way it ended.

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::Oracle;
use crate::models::session::NewSession;
use crate::presence::{ProgressSink, ServerEvent};
use crate::provisioning::collaborators::{DocumentParser, ResumeScore, ResumeScorer};
use crate::provisioning::document::UploadedDocument;
use crate::provisioning::questions::QuestionGenerator;
use crate::provisioning::validation::first_invalid_topic;
use crate::provisioning::{InterviewSpec, ProvisionOutcome, Rejection, MIN_RESUME_SCORE};
use crate::state::AppState;
use crate::store::SessionStore;

pub struct ResumeProvisionRequest {
    pub spec: InterviewSpec,
    pub document: UploadedDocument,
}

/// Why the step chain stopped early.
#[derive(Debug)]
enum Abort {
    Rejected(Rejection),
    Failed(AppError),
}

impl From<AppError> for Abort {
    fn from(err: AppError) -> Self {
        Abort::Failed(err)
    }
}

/// Borrowed view of the collaborators one run needs.
pub struct ResumePipeline<'a> {
    pub oracle: &'a dyn Oracle,
    pub parser: &'a dyn DocumentParser,
    pub scorer: &'a dyn ResumeScorer,
    pub generator: &'a dyn QuestionGenerator,
    pub store: &'a dyn SessionStore,
    pub progress: &'a dyn ProgressSink,
}

impl<'a> ResumePipeline<'a> {
    pub fn from_state(state: &'a AppState) -> Self {
        Self {
            oracle: state.oracle.as_ref(),
            parser: state.parser.as_ref(),
            scorer: state.scorer.as_ref(),
            generator: state.generator.as_ref(),
            store: state.store.as_ref(),
            progress: state.presence.as_ref(),
        }
    }

    /// Runs the chain and disposes of the document.
    ///
    /// `Ok(Rejected)` is an expected business outcome; `Err` is a technical failure.
    #[instrument(
        name = "provision_resume",
        skip_all,
        fields(identity = %request.spec.identity, role = %request.spec.role)
    )]
    pub async fn run(&self, request: ResumeProvisionRequest) -> Result<ProvisionOutcome, AppError> {
        let ResumeProvisionRequest { spec, document } = request;

        let result = self.run_steps(&spec, &document).await;
        document.dispose();

        match result {
            Ok((session_id, question_count)) => {
                info!(%session_id, question_count, "Provisioning complete");
                Ok(ProvisionOutcome::Ready {
                    session_id,
                    question_count,
                })
            }
            Err(Abort::Rejected(rejection)) => {
                warn!("Provisioning rejected: {}", rejection.message());
                Ok(ProvisionOutcome::Rejected(rejection))
            }
            Err(Abort::Failed(err)) => {
                warn!("Provisioning failed: {err}");
                Err(err)
            }
        }
    }

    async fn run_steps(
        &self,
        spec: &InterviewSpec,
        document: &UploadedDocument,
    ) -> Result<(Uuid, usize), Abort> {
        // Step 1: role/topic sanity
        self.validate(spec).await?;

        // Step 2: parse
        let content = self
            .parser
            .parse(document)
            .await?
            .ok_or_else(|| AppError::Upstream("résumé parser returned no content".to_string()))?;
        self.notify(spec, ServerEvent::Parsed);
        info!("Résumé parsed");

        // Step 3: score
        let score = self.scorer.score(&content, &spec.role, &spec.topics).await?;
        info!("Résumé scored {}/100", score.score);
        self.notify(
            spec,
            ServerEvent::Scored {
                score: score.score,
                summary: score.summary.clone(),
            },
        );

        // Step 4: gate
        self.gate(spec, score)?;

        // Step 5: questions
        let questions = self
            .generator
            .generate(&content, &spec.role, &spec.topics, spec.desired_count)
            .await?;

        // Step 6: persist
        let session = self
            .store
            .create(NewSession {
                participant: spec.identity.clone(),
                role: spec.role.clone(),
                topics: spec.topics.clone(),
                questions,
            })
            .await?;
        let count = session.questions().len();
        info!(session_id = %session.id(), "Session persisted with {count} questions");

        // Step 7: announce
        self.notify(
            spec,
            ServerEvent::QuestionsGenerated {
                session_id: session.id(),
                count,
            },
        );

        Ok((session.id(), count))
    }

    async fn validate(&self, spec: &InterviewSpec) -> Result<(), Abort> {
        let invalid = first_invalid_topic(self.oracle, &spec.role, &spec.topics).await?;
        self.notify(
            spec,
            ServerEvent::Validated {
                valid: invalid.is_none(),
            },
        );

        match invalid {
            None => Ok(()),
            Some(topic) => Err(Abort::Rejected(Rejection::InvalidRoleOrTopic {
                role: spec.role.clone(),
                topic,
            })),
        }
    }

    fn gate(&self, spec: &InterviewSpec, score: ResumeScore) -> Result<(), Abort> {
        let passed = score.score >= MIN_RESUME_SCORE;
        self.notify(
            spec,
            ServerEvent::Gated {
                passed,
                threshold: MIN_RESUME_SCORE,
            },
        );

        if passed {
            Ok(())
        } else {
            Err(Abort::Rejected(Rejection::ScoreBelowThreshold {
                score: score.score,
                threshold: MIN_RESUME_SCORE,
                summary: score.summary,
            }))
        }
    }

    /// Pushes are best-effort; a miss never changes the outcome.
    fn notify(&self, spec: &InterviewSpec, event: ServerEvent) {
        let name = event.name();
        if let Err(e) = self.progress.emit(&spec.identity, event) {
            warn!("Dropped '{name}' progress event: {e}");
        }
    }
}
