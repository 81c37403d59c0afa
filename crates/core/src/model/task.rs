use serde::{Deserialize, Deserializer};

use crate::model::ids::QuizId;

/// Generation progress reported while a task is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TaskProgress {
    pub current: u32,
    pub total: u32,
}

/// Response code attached to a task report; the server sends either a
/// number (e.g. `401`) or a short slug (e.g. `"too-short"`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ResponseCode {
    Numeric(i64),
    Named(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskDetails {
    #[serde(default)]
    pub response_code: Option<ResponseCode>,
    #[serde(default)]
    pub response_message: String,
}

/// Payload carried by a finished quiz-generation task.
///
/// Every field is optional on the wire; a bare `{"quiz_id": "42"}` is a
/// valid report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskReport {
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "quiz_id_from_number_or_text")]
    pub quiz_id: Option<QuizId>,
    #[serde(default)]
    pub details: TaskDetails,
}

/// The task backend serializes ids as either `42` or `"42"`.
fn quiz_id_from_number_or_text<'de, D>(deserializer: D) -> Result<Option<QuizId>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawId::Number(id)) => Ok(Some(QuizId::new(id))),
        Some(RawId::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawId::Text(text)) => text.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

const TOO_SHORT_CODE: &str = "too-short";
const MISSING_QUESTIONS_MARKER: &str = "questions could not be generated";
const UNSPECIFIED_FAILURE: &str = "Quiz generation failed";

impl TaskReport {
    /// Message to surface for a failed task: the detail message, then the
    /// top-level message, then a generic fallback.
    #[must_use]
    pub fn failure_message(self) -> String {
        [self.details.response_message, self.message]
            .into_iter()
            .find(|message| !message.trim().is_empty())
            .unwrap_or_else(|| UNSPECIFIED_FAILURE.to_string())
    }

    /// The uploaded material was too short for the requested question count.
    #[must_use]
    pub fn is_material_too_short(&self) -> bool {
        matches!(
            &self.details.response_code,
            Some(ResponseCode::Named(code)) if code == TOO_SHORT_CODE
        )
    }

    /// Number of questions the generator skipped, parsed from messages like
    /// `"3 questions could not be generated"`.
    #[must_use]
    pub fn missing_questions(&self) -> Option<u32> {
        let message = &self.details.response_message;
        if !message.contains(MISSING_QUESTIONS_MARKER) {
            return None;
        }
        message.split_whitespace().next()?.parse().ok()
    }
}

/// One answer from the task-status endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStatus {
    pub ready: bool,
    pub successful: bool,
    pub progress: Option<TaskProgress>,
    pub report: Option<TaskReport>,
}

/// Classification of a `TaskStatus` into what the poller does next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskVerdict {
    /// Not ready yet; poll again.
    Pending,
    Succeeded(TaskReport),
    Failed { message: String },
    /// Ready, but neither a recognizable success nor failure.
    Unclassified,
}

impl TaskStatus {
    /// Precedence: success, then failure, then pending, then the catch-all.
    #[must_use]
    pub fn verdict(self) -> TaskVerdict {
        match (self.ready, self.successful, self.report) {
            (_, true, Some(report)) => TaskVerdict::Succeeded(report),
            (true, false, Some(report)) => TaskVerdict::Failed {
                message: report.failure_message(),
            },
            (false, _, _) => TaskVerdict::Pending,
            (true, _, _) => TaskVerdict::Unclassified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(code: Option<ResponseCode>, message: &str) -> TaskReport {
        TaskReport {
            message: String::new(),
            quiz_id: Some(QuizId::new(42)),
            details: TaskDetails {
                response_code: code,
                response_message: message.to_string(),
            },
        }
    }

    #[test]
    fn pending_status_keeps_polling() {
        let status = TaskStatus {
            ready: false,
            successful: false,
            progress: Some(TaskProgress {
                current: 1,
                total: 5,
            }),
            report: None,
        };
        assert_eq!(status.verdict(), TaskVerdict::Pending);
    }

    #[test]
    fn successful_report_wins() {
        let status = TaskStatus {
            ready: true,
            successful: true,
            progress: None,
            report: Some(report(None, "ok")),
        };
        assert!(matches!(status.verdict(), TaskVerdict::Succeeded(r) if r.quiz_id == Some(QuizId::new(42))));
    }

    #[test]
    fn failed_report_carries_message() {
        let status = TaskStatus {
            ready: true,
            successful: false,
            progress: None,
            report: Some(report(
                Some(ResponseCode::Numeric(401)),
                "Incorrect API key provided",
            )),
        };
        assert_eq!(
            status.verdict(),
            TaskVerdict::Failed {
                message: "Incorrect API key provided".into()
            }
        );
    }

    #[test]
    fn ready_without_report_is_unclassified() {
        let status = TaskStatus {
            ready: true,
            successful: true,
            progress: None,
            report: None,
        };
        assert_eq!(status.verdict(), TaskVerdict::Unclassified);
    }

    #[test]
    fn report_helpers_read_details() {
        let short = report(Some(ResponseCode::Named("too-short".into())), "");
        assert!(short.is_material_too_short());

        let partial = report(None, "3 questions could not be generated");
        assert_eq!(partial.missing_questions(), Some(3));
        assert_eq!(report(None, "all good").missing_questions(), None);
    }

    #[test]
    fn report_deserializes_numeric_and_named_codes() {
        let json = r#"{"message":"x","quiz_id":null,"details":{"response_code":401,"response_message":"m"}}"#;
        let parsed: TaskReport = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.details.response_code, Some(ResponseCode::Numeric(401)));
        assert_eq!(parsed.quiz_id, None);

        let json = r#"{"quiz_id":5,"details":{"response_code":"too-short","response_message":"m"}}"#;
        let parsed: TaskReport = serde_json::from_str(json).unwrap();
        assert!(parsed.is_material_too_short());
    }

    #[test]
    fn bare_report_accepts_textual_quiz_id() {
        let parsed: TaskReport = serde_json::from_str(r#"{"quiz_id":"42"}"#).unwrap();
        assert_eq!(parsed.quiz_id, Some(QuizId::new(42)));
        assert_eq!(parsed.details, TaskDetails::default());

        let parsed: TaskReport = serde_json::from_str(r#"{"quiz_id":""}"#).unwrap();
        assert_eq!(parsed.quiz_id, None);

        assert!(serde_json::from_str::<TaskReport>(r#"{"quiz_id":"abc"}"#).is_err());
    }

    #[test]
    fn failure_message_falls_back_in_order() {
        assert_eq!(report(None, "bad key").failure_message(), "bad key");

        let top_level = TaskReport {
            message: "worker crashed".into(),
            ..TaskReport::default()
        };
        assert_eq!(top_level.failure_message(), "worker crashed");
        assert_eq!(TaskReport::default().failure_message(), UNSPECIFIED_FAILURE);
    }
}
