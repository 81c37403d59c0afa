//! Scriptable in-process stand-in for the quiz server, used by tests and demos.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use quiz_core::model::{
    AnsweredQuestion, AttemptId, ChoiceRecord, CreateQuizRequest, QuizId, QuizPage, QuizQuery,
    QuizResult, QuizSummary, ReviewedQuestion, Subject, SubjectId, TaskId, TaskStatus,
};
use reqwest::StatusCode;

use crate::client::{AttemptReceipt, QuizApi};
use crate::error::ApiError;
use crate::wire::QuizDetail;

const DEFAULT_PAGE_LIMIT: usize = 12;

enum ScriptedStatus {
    Status(TaskStatus),
    Failure(StatusCode),
}

#[derive(Default)]
struct State {
    statuses: VecDeque<ScriptedStatus>,
    polls: usize,
    subjects: Vec<Subject>,
    quizzes: Vec<QuizDetail>,
    shared: HashSet<QuizId>,
    created: Vec<CreateQuizRequest>,
    submissions: Vec<(QuizId, Vec<AnsweredQuestion>)>,
    attempts: HashMap<AttemptId, (QuizId, Vec<AnsweredQuestion>)>,
    next_id: u64,
    fail_next_submit: Option<StatusCode>,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory [`QuizApi`] with scripted task statuses and recorded calls.
#[derive(Clone, Default)]
pub struct InMemoryQuizApi {
    state: Arc<Mutex<State>>,
}

impl InMemoryQuizApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, ApiError> {
        self.state
            .lock()
            .map_err(|e| ApiError::Unexpected(e.to_string()))
    }

    /// Queue the next answer of the task-status endpoint.
    pub fn push_status(&self, status: TaskStatus) {
        if let Ok(mut state) = self.lock() {
            state.statuses.push_back(ScriptedStatus::Status(status));
        }
    }

    /// Queue a failing task-status response.
    pub fn push_status_failure(&self, status: StatusCode) {
        if let Ok(mut state) = self.lock() {
            state.statuses.push_back(ScriptedStatus::Failure(status));
        }
    }

    /// Make the next attempt submission fail with `status`.
    pub fn fail_next_submit(&self, status: StatusCode) {
        if let Ok(mut state) = self.lock() {
            state.fail_next_submit = Some(status);
        }
    }

    pub fn add_subject(&self, id: SubjectId, title: impl Into<String>) {
        if let Ok(mut state) = self.lock() {
            state.subjects.push(Subject {
                id,
                title: title.into(),
            });
        }
    }

    /// Publish a quiz; it is listed and shared.
    pub fn add_quiz(&self, quiz: QuizDetail) {
        if let Ok(mut state) = self.lock() {
            state.shared.insert(quiz.id);
            state.quizzes.push(quiz);
        }
    }

    /// Add a quiz that can be fetched by id but is not shared yet.
    pub fn add_private_quiz(&self, quiz: QuizDetail) {
        if let Ok(mut state) = self.lock() {
            state.quizzes.push(quiz);
        }
    }

    /// Number of task-status requests served so far.
    #[must_use]
    pub fn poll_count(&self) -> usize {
        self.lock().map(|state| state.polls).unwrap_or_default()
    }

    #[must_use]
    pub fn created_requests(&self) -> Vec<CreateQuizRequest> {
        self.lock()
            .map(|state| state.created.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn submissions(&self) -> Vec<(QuizId, Vec<AnsweredQuestion>)> {
        self.lock()
            .map(|state| state.submissions.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn subjects(&self) -> Vec<Subject> {
        self.lock()
            .map(|state| state.subjects.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_shared(&self, id: QuizId) -> bool {
        self.lock()
            .map(|state| state.shared.contains(&id))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn has_quiz(&self, id: QuizId) -> bool {
        self.lock()
            .map(|state| state.quizzes.iter().any(|quiz| quiz.id == id))
            .unwrap_or_default()
    }
}

fn grade(
    quiz: &QuizDetail,
    attempt_id: AttemptId,
    answers: &[AnsweredQuestion],
    is_shared: bool,
) -> Result<QuizResult, ApiError> {
    let questions = quiz
        .questions
        .iter()
        .map(|question| {
            let choices: Vec<ChoiceRecord> = question
                .answers
                .iter()
                .cloned()
                .map(ChoiceRecord::from)
                .collect();
            let selected = answers
                .iter()
                .find(|answer| answer.question_id == question.id)
                .and_then(|answer| answer.choice_id)
                .and_then(|id| choices.iter().find(|choice| choice.id == id).cloned());
            let correct = choices.iter().find(|choice| choice.is_correct).cloned();
            ReviewedQuestion::new(question.id, question.title.clone(), choices, selected, correct)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let correct = questions.iter().filter(|q| q.is_correct()).count();
    let total = questions.len().max(1);
    let recorded_result = u32::try_from(correct * 100 / total).unwrap_or(0);
    let threshold = u8::try_from(quiz.success_percentage).unwrap_or(100);

    Ok(QuizResult {
        id: attempt_id,
        quiz_id: quiz.id,
        recorded_result,
        recorded_pass: recorded_result >= u32::from(threshold),
        success_percentage: threshold,
        is_shared,
        questions,
    })
}

#[async_trait]
impl QuizApi for InMemoryQuizApi {
    async fn task_status(&self, _task_id: &TaskId) -> Result<TaskStatus, ApiError> {
        let mut state = self.lock()?;
        state.polls += 1;
        match state.statuses.pop_front() {
            Some(ScriptedStatus::Status(status)) => Ok(status),
            Some(ScriptedStatus::Failure(code)) => Err(ApiError::HttpStatus(code)),
            None => Err(ApiError::Unexpected("no scripted task status left".into())),
        }
    }

    async fn create_quiz(&self, request: &CreateQuizRequest) -> Result<TaskId, ApiError> {
        let mut state = self.lock()?;
        state.created.push(request.clone());
        let id = state.next_id();
        TaskId::new(format!("task-{id}")).map_err(|e| ApiError::Unexpected(e.to_string()))
    }

    async fn list_subjects(&self, search: Option<&str>) -> Result<Vec<Subject>, ApiError> {
        let state = self.lock()?;
        let needle = search.unwrap_or_default().to_lowercase();
        Ok(state
            .subjects
            .iter()
            .filter(|subject| subject.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn get_subject(&self, id: SubjectId) -> Result<Subject, ApiError> {
        let state = self.lock()?;
        state
            .subjects
            .iter()
            .find(|subject| subject.id == id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn create_subject(&self, title: &str) -> Result<SubjectId, ApiError> {
        let mut state = self.lock()?;
        let id = SubjectId::new(state.next_id());
        state.subjects.push(Subject {
            id,
            title: title.to_string(),
        });
        Ok(id)
    }

    async fn list_quizzes(&self, query: &QuizQuery) -> Result<QuizPage, ApiError> {
        let state = self.lock()?;
        let offset = match query.cursor.as_deref() {
            Some(cursor) => cursor
                .parse::<usize>()
                .map_err(|_| ApiError::HttpStatus(StatusCode::BAD_REQUEST))?,
            None => 0,
        };
        let limit = query
            .limit
            .and_then(|limit| usize::try_from(limit).ok())
            .unwrap_or(DEFAULT_PAGE_LIMIT);
        let filter = &query.filter;

        let matching: Vec<QuizSummary> = state
            .quizzes
            .iter()
            .rev()
            .filter(|quiz| state.shared.contains(&quiz.id))
            .filter(|quiz| filter.subject_id.is_none_or(|id| quiz.subject_id == id))
            .filter(|quiz| {
                filter
                    .language
                    .as_deref()
                    .is_none_or(|lang| quiz.language.as_deref() == Some(lang))
            })
            .filter(|quiz| {
                filter.search.as_deref().is_none_or(|needle| {
                    let needle = needle.to_lowercase();
                    quiz.title.to_lowercase().contains(&needle)
                        || quiz
                            .description
                            .as_deref()
                            .is_some_and(|d| d.to_lowercase().contains(&needle))
                })
            })
            .map(|quiz| QuizSummary {
                id: quiz.id,
                title: quiz.title.clone(),
                subject_id: quiz.subject_id,
                subject_title: state
                    .subjects
                    .iter()
                    .find(|s| s.id == quiz.subject_id)
                    .map(|s| s.title.clone())
                    .unwrap_or_default(),
                number_of_questions: u32::try_from(quiz.questions.len()).unwrap_or(u32::MAX),
                description: quiz.description.clone().unwrap_or_default(),
            })
            .collect();

        let end = (offset + limit).min(matching.len());
        let quizzes = matching.get(offset..end).map(<[_]>::to_vec).unwrap_or_default();
        let has_more = end < matching.len();

        Ok(QuizPage {
            has_more,
            next_cursor: has_more.then(|| end.to_string()),
            quizzes,
        })
    }

    async fn get_quiz(&self, id: QuizId) -> Result<QuizDetail, ApiError> {
        let state = self.lock()?;
        state
            .quizzes
            .iter()
            .find(|quiz| quiz.id == id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn delete_quiz(&self, id: QuizId) -> Result<(), ApiError> {
        let mut state = self.lock()?;
        let before = state.quizzes.len();
        state.quizzes.retain(|quiz| quiz.id != id);
        if state.quizzes.len() == before {
            return Err(ApiError::NotFound);
        }
        state.shared.remove(&id);
        Ok(())
    }

    async fn submit_attempt(
        &self,
        quiz_id: QuizId,
        answers: &[AnsweredQuestion],
    ) -> Result<AttemptReceipt, ApiError> {
        let mut state = self.lock()?;
        if let Some(code) = state.fail_next_submit.take() {
            return Err(ApiError::HttpStatus(code));
        }
        if !state.quizzes.iter().any(|quiz| quiz.id == quiz_id) {
            return Err(ApiError::NotFound);
        }
        state.submissions.push((quiz_id, answers.to_vec()));
        let attempt_id = AttemptId::new(state.next_id());
        state.attempts.insert(attempt_id, (quiz_id, answers.to_vec()));
        Ok(AttemptReceipt {
            attempt_id,
            message: "Quiz attempt created successfully!".into(),
        })
    }

    async fn get_attempt(
        &self,
        quiz_id: QuizId,
        attempt_id: AttemptId,
    ) -> Result<QuizResult, ApiError> {
        let state = self.lock()?;
        let (stored_quiz, answers) = state.attempts.get(&attempt_id).ok_or(ApiError::NotFound)?;
        if *stored_quiz != quiz_id {
            return Err(ApiError::HttpStatus(StatusCode::BAD_REQUEST));
        }
        let quiz = state
            .quizzes
            .iter()
            .find(|quiz| quiz.id == quiz_id)
            .ok_or(ApiError::NotFound)?;
        grade(quiz, attempt_id, answers, state.shared.contains(&quiz_id))
    }

    async fn share_quiz(&self, id: QuizId) -> Result<(), ApiError> {
        let mut state = self.lock()?;
        if !state.quizzes.iter().any(|quiz| quiz.id == id) {
            return Err(ApiError::NotFound);
        }
        state.shared.insert(id);
        Ok(())
    }
}
