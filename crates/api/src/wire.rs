//! JSON shapes exchanged with the server and their domain conversions.

use quiz_core::model::{
    AnsweredQuestion, AttemptId, ChoiceId, ChoiceRecord, QuestionId, QuizError, QuizId, QuizPage,
    QuizResult, QuizSummary, ReviewedQuestion, Subject, SubjectId, TaskProgress, TaskReport,
    TaskStatus,
};
use serde::{Deserialize, Serialize};

use crate::client::AttemptReceipt;

#[derive(Debug, Deserialize)]
pub(crate) struct TaskStatusWire {
    pub ready: bool,
    #[serde(default)]
    pub successful: bool,
    #[serde(default)]
    pub progress: Option<TaskProgress>,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

impl TaskStatusWire {
    /// Any non-null `value` counts as a report. One whose shape cannot be
    /// read keeps only its top-level `message`.
    pub(crate) fn into_status(self) -> TaskStatus {
        let report = self
            .value
            .filter(|value| !value.is_null())
            .map(report_from_value);
        TaskStatus {
            ready: self.ready,
            successful: self.successful,
            progress: self.progress,
            report,
        }
    }
}

fn report_from_value(value: serde_json::Value) -> TaskReport {
    match TaskReport::deserialize(&value) {
        Ok(report) => report,
        Err(err) => {
            tracing::debug!(error = %err, "task payload has an unexpected shape");
            TaskReport {
                message: value
                    .get("message")
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_default(),
                ..TaskReport::default()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateQuizResponse {
    pub task_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubjectWire {
    pub id: SubjectId,
    pub title: String,
}

impl From<SubjectWire> for Subject {
    fn from(wire: SubjectWire) -> Self {
        Subject {
            id: wire.id,
            title: wire.title,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateSubjectRequest<'a> {
    pub title: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateSubjectResponse {
    pub subject_id: SubjectId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuizSummaryWire {
    pub id: QuizId,
    pub title: String,
    pub subject_id: SubjectId,
    #[serde(default)]
    pub subject_title: String,
    #[serde(default)]
    pub number_of_questions: u32,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuizPageWire {
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
    pub quizzes: Vec<QuizSummaryWire>,
}

impl From<QuizPageWire> for QuizPage {
    fn from(wire: QuizPageWire) -> Self {
        QuizPage {
            has_more: wire.has_more,
            next_cursor: wire.next_cursor.filter(|cursor| !cursor.is_empty()),
            quizzes: wire
                .quizzes
                .into_iter()
                .map(|quiz| QuizSummary {
                    id: quiz.id,
                    title: quiz.title,
                    subject_id: quiz.subject_id,
                    subject_title: quiz.subject_title,
                    number_of_questions: quiz.number_of_questions,
                    description: quiz.description.unwrap_or_default(),
                })
                .collect(),
        }
    }
}

/// An answer option as served by the quiz detail endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerDetail {
    pub id: ChoiceId,
    pub title: String,
    #[serde(default)]
    pub is_correct: bool,
}

impl From<AnswerDetail> for ChoiceRecord {
    fn from(answer: AnswerDetail) -> Self {
        ChoiceRecord {
            id: answer.id,
            title: answer.title,
            is_correct: answer.is_correct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDetail {
    pub id: QuestionId,
    pub title: String,
    pub answers: Vec<AnswerDetail>,
}

/// Full quiz payload, including which answers are correct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDetail {
    pub id: QuizId,
    pub title: String,
    pub subject_id: SubjectId,
    #[serde(default)]
    pub subject_title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Seconds.
    pub duration: u32,
    pub success_percentage: u32,
    pub questions: Vec<QuestionDetail>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub can_delete: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptRequest {
    pub answered_questions: Vec<AnsweredWire>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnsweredWire {
    pub question_id: QuestionId,
    pub choice_id: Option<ChoiceId>,
}

impl AttemptRequest {
    pub(crate) fn from_answers(answers: &[AnsweredQuestion]) -> Self {
        Self {
            answered_questions: answers
                .iter()
                .map(|answer| AnsweredWire {
                    question_id: answer.question_id,
                    choice_id: answer.choice_id,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AttemptReceiptWire {
    pub attempt_id: AttemptId,
    #[serde(default)]
    pub message: String,
}

impl From<AttemptReceiptWire> for AttemptReceipt {
    fn from(wire: AttemptReceiptWire) -> Self {
        AttemptReceipt {
            attempt_id: wire.attempt_id,
            message: wire.message,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AttemptQuestionWire {
    pub id: QuestionId,
    pub title: String,
    pub answers: Vec<AnswerDetail>,
    #[serde(default)]
    pub choice: Option<AnswerDetail>,
    #[serde(default)]
    pub correct_choice: Option<AnswerDetail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AttemptWire {
    pub id: AttemptId,
    pub quiz_id: QuizId,
    pub result: u32,
    pub did_pass: bool,
    pub success_percentage: u8,
    #[serde(default)]
    pub is_shared: bool,
    pub questions: Vec<AttemptQuestionWire>,
}

impl AttemptWire {
    pub(crate) fn into_result(self) -> Result<QuizResult, QuizError> {
        let questions = self
            .questions
            .into_iter()
            .map(|q| {
                ReviewedQuestion::new(
                    q.id,
                    q.title,
                    q.answers.into_iter().map(ChoiceRecord::from).collect(),
                    q.choice.map(ChoiceRecord::from),
                    q.correct_choice.map(ChoiceRecord::from),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QuizResult {
            id: self.id,
            quiz_id: self.quiz_id,
            recorded_result: self.result,
            recorded_pass: self.did_pass,
            success_percentage: self.success_percentage,
            is_shared: self.is_shared,
            questions,
        })
    }
}
