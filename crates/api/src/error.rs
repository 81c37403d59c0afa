//! Errors raised while talking to the quiz server.

use quiz_core::model::QuizError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("resource not found")]
    NotFound,
    #[error("request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("server sent an invalid quiz: {0}")]
    InvalidQuiz(#[from] QuizError),
    #[error("unexpected response: {0}")]
    Unexpected(String),
}

impl ApiError {
    /// True for failures where the server never produced a usable answer.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Http(_) | ApiError::HttpStatus(_))
    }
}
