use async_trait::async_trait;
use quiz_core::model::{
    AnsweredQuestion, AttemptId, CreateQuizRequest, QuizId, QuizPage, QuizQuery, QuizResult,
    Subject, SubjectId, TaskId, TaskStatus,
};

use crate::error::ApiError;
use crate::wire::QuizDetail;

/// Server acknowledgement of a submitted attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptReceipt {
    pub attempt_id: AttemptId,
    pub message: String,
}

/// Contract of the remote quiz server, one method per endpoint.
#[async_trait]
pub trait QuizApi: Send + Sync {
    /// `GET /tasks/result/{task_id}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failures or non-2xx responses.
    async fn task_status(&self, task_id: &TaskId) -> Result<TaskStatus, ApiError>;

    /// `POST /quizzing/quizzes` (multipart). Returns the generation task id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failures or non-2xx responses.
    async fn create_quiz(&self, request: &CreateQuizRequest) -> Result<TaskId, ApiError>;

    /// `GET /quizzing/subjects?search_query=`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failures or non-2xx responses.
    async fn list_subjects(&self, search: Option<&str>) -> Result<Vec<Subject>, ApiError>;

    /// `GET /quizzing/subjects/{id}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown subjects.
    async fn get_subject(&self, id: SubjectId) -> Result<Subject, ApiError>;

    /// `POST /quizzing/subjects`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failures or non-2xx responses.
    async fn create_subject(&self, title: &str) -> Result<SubjectId, ApiError>;

    /// `GET /quizzing/quizzes`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failures or non-2xx responses.
    async fn list_quizzes(&self, query: &QuizQuery) -> Result<QuizPage, ApiError>;

    /// `GET /quizzing/quizzes/{id}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown quizzes.
    async fn get_quiz(&self, id: QuizId) -> Result<QuizDetail, ApiError>;

    /// `DELETE /quizzing/quizzes/{id}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failures or non-2xx responses.
    async fn delete_quiz(&self, id: QuizId) -> Result<(), ApiError>;

    /// `POST /quizzing/quizzes/{id}/attempt`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failures or non-2xx responses.
    async fn submit_attempt(
        &self,
        quiz_id: QuizId,
        answers: &[AnsweredQuestion],
    ) -> Result<AttemptReceipt, ApiError>;

    /// `GET /quizzing/quizzes/{id}/attempts/{attempt_id}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown attempts and
    /// `ApiError::InvalidQuiz` when a question lacks its correct choice.
    async fn get_attempt(
        &self,
        quiz_id: QuizId,
        attempt_id: AttemptId,
    ) -> Result<QuizResult, ApiError>;

    /// `PUT /quizzing/quizzes/{id}/share`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failures or non-2xx responses.
    async fn share_quiz(&self, id: QuizId) -> Result<(), ApiError>;
}
