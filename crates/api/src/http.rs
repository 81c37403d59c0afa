use async_trait::async_trait;
use quiz_core::model::{
    AnsweredQuestion, AttemptId, CreateQuizRequest, QuizId, QuizPage, QuizQuery, QuizResult,
    Subject, SubjectId, TaskId, TaskStatus,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::client::{AttemptReceipt, QuizApi};
use crate::error::ApiError;
use crate::wire::{
    AttemptReceiptWire, AttemptRequest, AttemptWire, CreateQuizResponse, CreateSubjectRequest,
    CreateSubjectResponse, QuizDetail, QuizPageWire, SubjectWire, TaskStatusWire,
};

/// `reqwest`-backed implementation of [`QuizApi`].
#[derive(Clone, Debug)]
pub struct HttpQuizApi {
    client: Client,
    base_url: String,
}

impl HttpQuizApi {
    /// Build a client rooted at `base_url` (e.g. `http://localhost:5000/api`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidBaseUrl` if the URL cannot be parsed.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_client(Client::new(), base_url)
    }

    /// # Errors
    ///
    /// Returns `ApiError::InvalidBaseUrl` if the URL cannot be parsed.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url)?;
        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, route: &str) -> String {
        format!("{}{route}", self.base_url)
    }

    async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        match status_error(response.status()) {
            Some(ApiError::NotFound) => Err(ApiError::NotFound),
            Some(err) => {
                tracing::warn!(
                    status = %response.status(),
                    url = %response.url(),
                    "quiz server rejected request"
                );
                Err(err)
            }
            None => Ok(response),
        }
    }

    async fn fetch_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let response = Self::send(request).await?;
        Ok(response.json::<T>().await?)
    }

    fn subjects_request(&self, search: Option<&str>) -> RequestBuilder {
        let request = self.client.get(self.url("/quizzing/subjects"));
        match search.filter(|s| !s.is_empty()) {
            Some(search) => request.query(&[("search_query", search)]),
            None => request,
        }
    }

    fn quizzes_request(&self, query: &QuizQuery) -> RequestBuilder {
        self.client
            .get(self.url("/quizzing/quizzes"))
            .query(&quiz_query_params(query))
    }

    fn create_quiz_request(&self, request: &CreateQuizRequest) -> Result<RequestBuilder, ApiError> {
        let form = material_form(request)?;
        Ok(self
            .client
            .post(self.url("/quizzing/quizzes"))
            .multipart(form))
    }

    fn attempt_request(&self, quiz_id: QuizId, answers: &[AnsweredQuestion]) -> RequestBuilder {
        self.client
            .post(self.url(&format!("/quizzing/quizzes/{quiz_id}/attempt")))
            .json(&AttemptRequest::from_answers(answers))
    }
}

/// `None` for statuses that carry a usable body.
fn status_error(status: StatusCode) -> Option<ApiError> {
    match status {
        StatusCode::NOT_FOUND => Some(ApiError::NotFound),
        status if !status.is_success() => Some(ApiError::HttpStatus(status)),
        _ => None,
    }
}

fn quiz_query_params(query: &QuizQuery) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(limit) = query.limit {
        params.push(("limit", limit.to_string()));
    }
    if let Some(cursor) = query.cursor.as_ref() {
        params.push(("cursor", cursor.clone()));
    }
    if let Some(search) = query.filter.search.as_ref() {
        params.push(("search_query", search.clone()));
    }
    if let Some(subject_id) = query.filter.subject_id {
        params.push(("subject_id", subject_id.to_string()));
    }
    if let Some(language) = query.filter.language.as_ref() {
        params.push(("language", language.clone()));
    }
    params
}

/// Text fields of the quiz creation form; `duration` is in seconds.
fn material_fields(request: &CreateQuizRequest) -> Vec<(&'static str, String)> {
    vec![
        ("openai_api_key", request.api_key.clone()),
        ("subject_id", request.subject_id.to_string()),
        ("title", request.title.clone()),
        ("duration", request.duration_secs.to_string()),
        ("number_of_questions", request.number_of_questions.to_string()),
        ("success_percentage", request.success_percentage.to_string()),
        ("description", request.description.clone()),
    ]
}

fn material_form(request: &CreateQuizRequest) -> Result<Form, ApiError> {
    let mut form = material_fields(request)
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, value));

    for file in &request.files {
        let mut part = Part::bytes(file.bytes.clone()).file_name(file.name.clone());
        if let Some(mime) = file.mime.as_deref() {
            part = part.mime_str(mime)?;
        }
        form = form.part("file", part);
    }

    Ok(form)
}

fn task_id_from(response: CreateQuizResponse) -> Result<TaskId, ApiError> {
    TaskId::new(response.task_id)
        .map_err(|_| ApiError::Unexpected("server returned an empty task id".into()))
}

#[async_trait]
impl QuizApi for HttpQuizApi {
    async fn task_status(&self, task_id: &TaskId) -> Result<TaskStatus, ApiError> {
        let url = self.url(&format!("/tasks/result/{task_id}"));
        let wire: TaskStatusWire = Self::fetch_json(self.client.get(url)).await?;
        Ok(wire.into_status())
    }

    async fn create_quiz(&self, request: &CreateQuizRequest) -> Result<TaskId, ApiError> {
        let response: CreateQuizResponse =
            Self::fetch_json(self.create_quiz_request(request)?).await?;
        task_id_from(response)
    }

    async fn list_subjects(&self, search: Option<&str>) -> Result<Vec<Subject>, ApiError> {
        let subjects: Vec<SubjectWire> = Self::fetch_json(self.subjects_request(search)).await?;
        Ok(subjects.into_iter().map(Subject::from).collect())
    }

    async fn get_subject(&self, id: SubjectId) -> Result<Subject, ApiError> {
        let url = self.url(&format!("/quizzing/subjects/{id}"));
        let subject: SubjectWire = Self::fetch_json(self.client.get(url)).await?;
        Ok(subject.into())
    }

    async fn create_subject(&self, title: &str) -> Result<SubjectId, ApiError> {
        let request = self
            .client
            .post(self.url("/quizzing/subjects"))
            .json(&CreateSubjectRequest { title });
        let response: CreateSubjectResponse = Self::fetch_json(request).await?;
        Ok(response.subject_id)
    }

    async fn list_quizzes(&self, query: &QuizQuery) -> Result<QuizPage, ApiError> {
        let page: QuizPageWire = Self::fetch_json(self.quizzes_request(query)).await?;
        Ok(page.into())
    }

    async fn get_quiz(&self, id: QuizId) -> Result<QuizDetail, ApiError> {
        let url = self.url(&format!("/quizzing/quizzes/{id}"));
        Self::fetch_json(self.client.get(url)).await
    }

    async fn delete_quiz(&self, id: QuizId) -> Result<(), ApiError> {
        let url = self.url(&format!("/quizzing/quizzes/{id}"));
        Self::send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn submit_attempt(
        &self,
        quiz_id: QuizId,
        answers: &[AnsweredQuestion],
    ) -> Result<AttemptReceipt, ApiError> {
        let receipt: AttemptReceiptWire =
            Self::fetch_json(self.attempt_request(quiz_id, answers)).await?;
        Ok(receipt.into())
    }

    async fn get_attempt(
        &self,
        quiz_id: QuizId,
        attempt_id: AttemptId,
    ) -> Result<QuizResult, ApiError> {
        let url = self.url(&format!("/quizzing/quizzes/{quiz_id}/attempts/{attempt_id}"));
        let wire: AttemptWire = Self::fetch_json(self.client.get(url)).await?;
        Ok(wire.into_result()?)
    }

    async fn share_quiz(&self, id: QuizId) -> Result<(), ApiError> {
        let url = self.url(&format!("/quizzing/quizzes/{id}/share"));
        Self::send(self.client.put(url)).await?;
        Ok(())
    }
}
