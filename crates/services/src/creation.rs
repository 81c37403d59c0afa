use std::sync::Arc;
use std::time::Duration;

use quiz_api::QuizApi;
use quiz_core::model::{QuizDraft, QuizId, SubjectChoice, SubjectId, TaskId, TaskReport};

use crate::config::DEFAULT_POLL_INTERVAL;
use crate::error::CreationError;
use crate::poller::{CancelToken, PollOutcome, TaskObserver, TaskPoller};
use crate::settings_service::SettingsService;

const INCORRECT_API_KEY_MESSAGE: &str = "Incorrect API key provided";

/// Why generation failed, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationFailure {
    IncorrectApiKey,
    ServerError { message: String },
}

impl CreationFailure {
    #[must_use]
    pub fn classify(message: &str) -> Self {
        if message == INCORRECT_API_KEY_MESSAGE {
            CreationFailure::IncorrectApiKey
        } else {
            CreationFailure::ServerError {
                message: message.to_string(),
            }
        }
    }

    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            CreationFailure::IncorrectApiKey => {
                "The API key was rejected. Update it in settings and try again."
            }
            CreationFailure::ServerError { .. } => {
                "The quiz could not be generated because of a server error."
            }
        }
    }
}

/// How a generation task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationOutcome {
    Created { quiz_id: QuizId },
    /// Created, but `missing` questions could not be generated.
    PartiallyCreated { quiz_id: QuizId, missing: u32 },
    MaterialTooShort,
    Failed(CreationFailure),
    /// The task finished without telling which quiz it produced.
    UnknownCompletion,
    Cancelled,
}

impl CreationOutcome {
    /// Interpret a finished polling run.
    #[must_use]
    pub fn from_poll(outcome: PollOutcome) -> Self {
        match outcome {
            PollOutcome::Succeeded(report) => Self::from_report(&report),
            PollOutcome::Failed(message) => {
                CreationOutcome::Failed(CreationFailure::classify(&message))
            }
            PollOutcome::Closed => CreationOutcome::UnknownCompletion,
            PollOutcome::Cancelled => CreationOutcome::Cancelled,
        }
    }

    fn from_report(report: &TaskReport) -> Self {
        if report.is_material_too_short() {
            return CreationOutcome::MaterialTooShort;
        }
        let Some(quiz_id) = report.quiz_id else {
            return CreationOutcome::UnknownCompletion;
        };
        match report.missing_questions() {
            Some(missing) => CreationOutcome::PartiallyCreated { quiz_id, missing },
            None => CreationOutcome::Created { quiz_id },
        }
    }

    #[must_use]
    pub fn quiz_id(&self) -> Option<QuizId> {
        match self {
            CreationOutcome::Created { quiz_id }
            | CreationOutcome::PartiallyCreated { quiz_id, .. } => Some(*quiz_id),
            _ => None,
        }
    }
}

/// A generation task accepted by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuiz {
    pub task_id: TaskId,
    pub subject_id: SubjectId,
    pub number_of_questions: u32,
}

/// Validates drafts, starts generation and follows the task to the end.
#[derive(Clone)]
pub struct QuizCreationService {
    api: Arc<dyn QuizApi>,
    settings: Arc<SettingsService>,
    poll_interval: Duration,
}

impl QuizCreationService {
    #[must_use]
    pub fn new(api: Arc<dyn QuizApi>, settings: Arc<SettingsService>) -> Self {
        Self {
            api,
            settings,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Submit a draft and return the generation task.
    ///
    /// The API key is checked before the draft is validated.
    ///
    /// # Errors
    ///
    /// Returns `CreationError::MissingApiKey` without a stored key,
    /// `CreationError::Draft` listing every invalid field, and
    /// `CreationError::Api` when a request fails.
    pub async fn submit(&self, draft: QuizDraft) -> Result<PendingQuiz, CreationError> {
        let api_key = self
            .settings
            .api_key()
            .await?
            .ok_or(CreationError::MissingApiKey)?;
        let request = draft.validate()?;

        let subject_id = self.resolve_subject(&request.subject).await?;
        let number_of_questions = request.number_of_questions;
        let request = request.into_create(subject_id, api_key);

        let task_id = self.api.create_quiz(&request).await?;
        tracing::info!(task = %task_id, subject_id = %subject_id, number_of_questions, "quiz generation started");

        Ok(PendingQuiz {
            task_id,
            subject_id,
            number_of_questions,
        })
    }

    /// Reuse a subject with exactly this title, or create it.
    ///
    /// # Errors
    ///
    /// Returns `CreationError::Api` when a request fails.
    pub async fn resolve_subject(&self, subject: &SubjectChoice) -> Result<SubjectId, CreationError> {
        match subject {
            SubjectChoice::Existing(id) => Ok(*id),
            SubjectChoice::New(title) => {
                let existing = self.api.list_subjects(Some(title)).await?;
                if let Some(found) = existing.iter().find(|subject| subject.title == *title) {
                    return Ok(found.id);
                }
                let id = self.api.create_subject(title).await?;
                tracing::info!(subject_id = %id, %title, "subject created");
                Ok(id)
            }
        }
    }

    /// Poll the task until it ends and interpret the result.
    pub async fn follow(
        &self,
        pending: &PendingQuiz,
        observer: &mut dyn TaskObserver,
        token: CancelToken,
    ) -> CreationOutcome {
        let poller = TaskPoller::new(Arc::clone(&self.api))
            .with_interval(self.poll_interval)
            .with_cancel_token(token);
        let outcome = poller
            .run(&pending.task_id, pending.number_of_questions, observer)
            .await;
        CreationOutcome::from_poll(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{ResponseCode, TaskDetails};

    fn report(code: Option<&str>, message: &str, quiz_id: Option<u64>) -> TaskReport {
        TaskReport {
            message: String::new(),
            quiz_id: quiz_id.map(QuizId::new),
            details: TaskDetails {
                response_code: code.map(|c| ResponseCode::Named(c.to_string())),
                response_message: message.to_string(),
            },
        }
    }

    #[test]
    fn failure_messages_are_classified() {
        assert_eq!(
            CreationFailure::classify("Incorrect API key provided"),
            CreationFailure::IncorrectApiKey
        );
        assert!(matches!(
            CreationFailure::classify("Incorrect API key provided: sk-..."),
            CreationFailure::ServerError { .. }
        ));
    }

    #[test]
    fn success_reports_are_interpreted() {
        let created = CreationOutcome::from_poll(PollOutcome::Succeeded(report(None, "done", Some(42))));
        assert_eq!(created, CreationOutcome::Created { quiz_id: QuizId::new(42) });
        assert_eq!(created.quiz_id(), Some(QuizId::new(42)));

        let partial = CreationOutcome::from_poll(PollOutcome::Succeeded(report(
            None,
            "3 questions could not be generated",
            Some(7),
        )));
        assert_eq!(
            partial,
            CreationOutcome::PartiallyCreated {
                quiz_id: QuizId::new(7),
                missing: 3
            }
        );

        let short = CreationOutcome::from_poll(PollOutcome::Succeeded(report(
            Some("too-short"),
            "material too short",
            None,
        )));
        assert_eq!(short, CreationOutcome::MaterialTooShort);

        let unknown = CreationOutcome::from_poll(PollOutcome::Succeeded(report(None, "done", None)));
        assert_eq!(unknown, CreationOutcome::UnknownCompletion);
    }

    #[test]
    fn other_poll_endings_map_directly() {
        assert_eq!(
            CreationOutcome::from_poll(PollOutcome::Closed),
            CreationOutcome::UnknownCompletion
        );
        assert_eq!(
            CreationOutcome::from_poll(PollOutcome::Cancelled),
            CreationOutcome::Cancelled
        );
        assert_eq!(
            CreationOutcome::from_poll(PollOutcome::Failed("Incorrect API key provided".into())),
            CreationOutcome::Failed(CreationFailure::IncorrectApiKey)
        );
    }
}
