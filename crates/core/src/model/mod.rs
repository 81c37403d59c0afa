mod app_settings;
mod attempt;
mod catalog;
mod draft;
mod ids;
mod quiz;
mod result;
mod task;

pub use ids::{AttemptId, ChoiceId, ParseIdError, QuestionId, QuizId, SubjectId, TaskId};

pub use app_settings::{AppSettings, AppSettingsDraft, AppSettingsError};
pub use attempt::{AnsweredQuestion, AttemptQuestion, SubmitReason};
pub use catalog::{ALL_FILTER, QuizFilter, QuizPage, QuizQuery, QuizSummary, Subject};
pub use draft::{
    CreateQuizRequest, DraftField, MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS, MaterialFile,
    PASTED_TEXT_FILE_NAME, PLAIN_TEXT_MIME, QuizDraft, QuizDraftError, QuizDraftErrors,
    QuizRequest, SubjectChoice,
};
pub use quiz::{Choice, Question, Quiz, QuizError, QuizHeader, SubjectRef};
pub use result::{ChoiceRecord, QuizResult, ReviewedQuestion, is_passing, score_percentage};
pub use task::{ResponseCode, TaskDetails, TaskProgress, TaskReport, TaskStatus, TaskVerdict};
