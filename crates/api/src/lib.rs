#![forbid(unsafe_code)]

pub mod client;
pub mod error;
pub mod http;
pub mod memory;
pub mod wire;

pub use client::{AttemptReceipt, QuizApi};
pub use error::ApiError;
pub use http::HttpQuizApi;
pub use memory::InMemoryQuizApi;
pub use wire::{AnswerDetail, QuestionDetail, QuizDetail};

pub use reqwest::StatusCode;
