//! Shared error types for the services crate.

use thiserror::Error;

use quiz_api::ApiError;
use quiz_core::model::{AppSettingsError, QuizDraftErrors, QuizError};
use storage::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `SettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsServiceError {
    #[error(transparent)]
    Settings(#[from] AppSettingsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while reading `ClientConfig` from the environment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid API url {value:?}: {source}")]
    InvalidApiUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid poll interval {0:?}, expected milliseconds")]
    InvalidPollInterval(String),
}

/// Errors emitted by `QuizAttempt::submit`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("answer all questions before submitting ({} unanswered)", .missing.len())]
    Unanswered { missing: Vec<usize> },
    #[error("attempt is already being submitted")]
    AlreadySubmitting,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `QuizCreationService` before generation starts.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CreationError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error(transparent)]
    Draft(#[from] QuizDraftErrors),
    #[error(transparent)]
    Settings(#[from] SettingsServiceError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `CatalogService` and `QuizFeed`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Api(ApiError),
}

impl From<ApiError> for CatalogError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotFound => CatalogError::NotFound,
            ApiError::InvalidQuiz(err) => CatalogError::Quiz(err),
            other => CatalogError::Api(other),
        }
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Api(#[from] ApiError),
}
