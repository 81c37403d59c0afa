use std::sync::Arc;

use quiz_api::{QuizApi, QuizDetail};
use quiz_core::model::{
    AttemptId, Choice, Question, Quiz, QuizError, QuizFilter, QuizHeader, QuizId, QuizQuery,
    QuizResult, QuizSummary, Subject, SubjectRef,
};
use quiz_core::ShuffleOptions;
use rand::Rng;

use crate::error::CatalogError;

/// Convert a server quiz into the domain model, in server order.
///
/// # Errors
///
/// Returns `QuizError::NoCorrectChoice` for the first question without a
/// correct answer, and other `QuizError`s for malformed questions.
pub fn transform_quiz(detail: QuizDetail, subject_title: String) -> Result<Quiz, QuizError> {
    let questions = detail
        .questions
        .into_iter()
        .map(|question| {
            let correct = question
                .answers
                .iter()
                .find(|answer| answer.is_correct)
                .map(|answer| answer.id)
                .ok_or(QuizError::NoCorrectChoice {
                    question_id: question.id,
                })?;
            let choices = question
                .answers
                .into_iter()
                .map(|answer| Choice::new(answer.id, answer.title))
                .collect();
            Question::new(question.id, question.title, choices, correct)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Quiz::new(
        QuizHeader {
            id: detail.id,
            title: detail.title,
            subject: SubjectRef {
                id: detail.subject_id,
                title: subject_title,
            },
            description: detail.description.unwrap_or_default(),
            duration_secs: detail.duration,
            success_percentage: detail.success_percentage,
            language: detail.language,
            can_delete: detail.can_delete,
        },
        questions,
    )
}

/// Browsing, loading and managing existing quizzes.
#[derive(Clone)]
pub struct CatalogService {
    api: Arc<dyn QuizApi>,
}

impl CatalogService {
    #[must_use]
    pub fn new(api: Arc<dyn QuizApi>) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Returns `CatalogError` if the request fails.
    pub async fn list_subjects(&self, search: Option<&str>) -> Result<Vec<Subject>, CatalogError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        Ok(self.api.list_subjects(search).await?)
    }

    /// Start a feed of shared quizzes matching `filter`.
    #[must_use]
    pub fn feed(&self, filter: QuizFilter) -> QuizFeed {
        QuizFeed::new(Arc::clone(&self.api), filter)
    }

    /// Fetch a quiz ready to be taken, optionally shuffled.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` for unknown quizzes and
    /// `CatalogError::Quiz` when a question has no correct answer.
    pub async fn load_quiz<R: Rng + ?Sized>(
        &self,
        id: QuizId,
        options: ShuffleOptions,
        rng: &mut R,
    ) -> Result<Quiz, CatalogError> {
        let mut detail = self.api.get_quiz(id).await?;
        let subject_title = match detail.subject_title.take() {
            Some(title) => title,
            None => self.api.get_subject(detail.subject_id).await?.title,
        };
        let quiz = transform_quiz(detail, subject_title)?;
        tracing::debug!(quiz_id = %id, questions = quiz.questions().len(), "quiz loaded");
        Ok(quiz.shuffled(options, rng))
    }

    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` for unknown attempts.
    pub async fn load_result(
        &self,
        quiz_id: QuizId,
        attempt_id: AttemptId,
    ) -> Result<QuizResult, CatalogError> {
        Ok(self.api.get_attempt(quiz_id, attempt_id).await?)
    }

    /// # Errors
    ///
    /// Returns `CatalogError` if the quiz cannot be deleted.
    pub async fn delete_quiz(&self, id: QuizId) -> Result<(), CatalogError> {
        self.api.delete_quiz(id).await?;
        tracing::info!(quiz_id = %id, "quiz deleted");
        Ok(())
    }

    /// Publish a quiz unless it already is. Returns whether a request was made.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the share request fails.
    pub async fn share_quiz(&self, id: QuizId, already_shared: bool) -> Result<bool, CatalogError> {
        if already_shared {
            return Ok(false);
        }
        self.api.share_quiz(id).await?;
        tracing::info!(quiz_id = %id, "quiz shared");
        Ok(true)
    }
}

/// Cursor-paginated list of quizzes.
pub struct QuizFeed {
    api: Arc<dyn QuizApi>,
    filter: QuizFilter,
    limit: Option<u32>,
    quizzes: Vec<QuizSummary>,
    next_cursor: Option<String>,
    has_more: bool,
    loaded: bool,
}

impl QuizFeed {
    #[must_use]
    pub fn new(api: Arc<dyn QuizApi>, filter: QuizFilter) -> Self {
        Self {
            api,
            filter,
            limit: None,
            quizzes: Vec::new(),
            next_cursor: None,
            has_more: false,
            loaded: false,
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn quizzes(&self) -> &[QuizSummary] {
        &self.quizzes
    }

    #[must_use]
    pub fn filter(&self) -> &QuizFilter {
        &self.filter
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Replace the list with the first page for `filter`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the request fails; the current list is kept.
    pub async fn refetch(&mut self, filter: QuizFilter) -> Result<usize, CatalogError> {
        let query = QuizQuery {
            filter: filter.clone(),
            limit: self.limit,
            cursor: None,
        };
        let page = self.api.list_quizzes(&query).await?;

        self.filter = filter;
        self.quizzes = page.quizzes;
        self.next_cursor = page.next_cursor;
        self.has_more = page.has_more;
        self.loaded = true;
        Ok(self.quizzes.len())
    }

    /// Append the next page. Loads the first page if nothing was fetched yet
    /// and does nothing once the server reported the end.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the request fails; the current list is kept.
    pub async fn fetch_more(&mut self) -> Result<usize, CatalogError> {
        if !self.loaded {
            return self.refetch(self.filter.clone()).await;
        }
        if !self.has_more {
            return Ok(0);
        }

        let query = QuizQuery {
            filter: self.filter.clone(),
            limit: self.limit,
            cursor: self.next_cursor.clone(),
        };
        let page = self.api.list_quizzes(&query).await?;
        let added = page.quizzes.len();

        self.quizzes.extend(page.quizzes);
        self.next_cursor = page.next_cursor;
        self.has_more = page.has_more;
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_api::{AnswerDetail, QuestionDetail};
    use quiz_core::model::{ChoiceId, QuestionId, SubjectId};

    fn detail(correct: bool) -> QuizDetail {
        QuizDetail {
            id: QuizId::new(5),
            title: "Rivers".into(),
            subject_id: SubjectId::new(2),
            subject_title: None,
            description: None,
            duration: 300,
            success_percentage: 70,
            questions: vec![QuestionDetail {
                id: QuestionId::new(1),
                title: "Longest river?".into(),
                answers: vec![
                    AnswerDetail {
                        id: ChoiceId::new(1),
                        title: "Nile".into(),
                        is_correct: correct,
                    },
                    AnswerDetail {
                        id: ChoiceId::new(2),
                        title: "Thames".into(),
                        is_correct: false,
                    },
                ],
            }],
            language: Some("en".into()),
            can_delete: true,
        }
    }

    #[test]
    fn transform_keeps_server_order() {
        let quiz = transform_quiz(detail(true), "Geography".into()).unwrap();
        assert_eq!(quiz.subject().title, "Geography");
        assert_eq!(quiz.success_percentage(), 70);
        let question = &quiz.questions()[0];
        assert_eq!(question.correct_choice().id, ChoiceId::new(1));
        let titles: Vec<_> = question.choices().iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["Nile", "Thames"]);
    }

    #[test]
    fn transform_rejects_question_without_correct_answer() {
        let err = transform_quiz(detail(false), "Geography".into()).unwrap_err();
        assert_eq!(
            err,
            QuizError::NoCorrectChoice {
                question_id: QuestionId::new(1)
            }
        );
    }
}
