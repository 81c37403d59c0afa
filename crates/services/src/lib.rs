#![forbid(unsafe_code)]

pub mod app_services;
pub mod attempt;
pub mod catalog;
pub mod config;
pub mod creation;
pub mod error;
pub mod notifications;
pub mod poller;
pub mod settings_service;

pub use app_services::AppServices;
pub use attempt::{QuizAttempt, SubmitReceipt, TickOutcome, format_time};
pub use catalog::{CatalogService, QuizFeed, transform_quiz};
pub use config::{ClientConfig, PageSize};
pub use creation::{CreationFailure, CreationOutcome, PendingQuiz, QuizCreationService};
pub use error::{
    AppServicesError, AttemptError, CatalogError, ConfigError, CreationError,
    SettingsServiceError,
};
pub use notifications::{Notifier, Severity, Snackbar};
pub use poller::{CancelToken, PollOutcome, TaskObserver, TaskPoller, progress_percent};
pub use settings_service::SettingsService;
