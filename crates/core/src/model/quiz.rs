use thiserror::Error;

use crate::model::ids::{ChoiceId, QuestionId, QuizId, SubjectId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("question {question_id} has no correct answer")]
    NoCorrectChoice { question_id: QuestionId },

    #[error("question {question_id} needs at least two choices, got {len}")]
    TooFewChoices { question_id: QuestionId, len: usize },

    #[error("success percentage must be within 0..=100, got {0}")]
    InvalidSuccessPercentage(u32),
}

/// One selectable answer for a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub id: ChoiceId,
    pub title: String,
}

impl Choice {
    #[must_use]
    pub fn new(id: ChoiceId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

/// A multiple-choice question with exactly one correct choice.
///
/// The correct choice is always one of `choices`; construction fails otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    title: String,
    choices: Vec<Choice>,
    correct_choice: Choice,
}

impl Question {
    /// Build a question and check the correct choice is present.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::TooFewChoices` for fewer than two choices and
    /// `QuizError::NoCorrectChoice` if `correct_choice` is not among them.
    pub fn new(
        id: QuestionId,
        title: impl Into<String>,
        choices: Vec<Choice>,
        correct_choice: ChoiceId,
    ) -> Result<Self, QuizError> {
        if choices.len() < 2 {
            return Err(QuizError::TooFewChoices {
                question_id: id,
                len: choices.len(),
            });
        }
        let correct_choice = choices
            .iter()
            .find(|choice| choice.id == correct_choice)
            .cloned()
            .ok_or(QuizError::NoCorrectChoice { question_id: id })?;

        Ok(Self {
            id,
            title: title.into(),
            choices,
            correct_choice,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub(crate) fn choices_mut(&mut self) -> &mut [Choice] {
        &mut self.choices
    }

    #[must_use]
    pub fn correct_choice(&self) -> &Choice {
        &self.correct_choice
    }

    #[must_use]
    pub fn choice(&self, id: ChoiceId) -> Option<&Choice> {
        self.choices.iter().find(|choice| choice.id == id)
    }
}

/// Subject a quiz belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectRef {
    pub id: SubjectId,
    pub title: String,
}

/// A quiz ready to be taken. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    id: QuizId,
    title: String,
    subject: SubjectRef,
    description: String,
    duration_secs: u32,
    success_percentage: u8,
    language: Option<String>,
    can_delete: bool,
    questions: Vec<Question>,
}

/// Everything needed to build a `Quiz` apart from its questions.
#[derive(Debug, Clone)]
pub struct QuizHeader {
    pub id: QuizId,
    pub title: String,
    pub subject: SubjectRef,
    pub description: String,
    pub duration_secs: u32,
    pub success_percentage: u32,
    pub language: Option<String>,
    pub can_delete: bool,
}

impl Quiz {
    /// # Errors
    ///
    /// Returns `QuizError::InvalidSuccessPercentage` if the threshold exceeds 100.
    pub fn new(header: QuizHeader, questions: Vec<Question>) -> Result<Self, QuizError> {
        let success_percentage = u8::try_from(header.success_percentage)
            .ok()
            .filter(|pct| *pct <= 100)
            .ok_or(QuizError::InvalidSuccessPercentage(header.success_percentage))?;

        Ok(Self {
            id: header.id,
            title: header.title,
            subject: header.subject,
            description: header.description,
            duration_secs: header.duration_secs,
            success_percentage,
            language: header.language,
            can_delete: header.can_delete,
            questions,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuizId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn subject(&self) -> &SubjectRef {
        &self.subject
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    #[must_use]
    pub fn success_percentage(&self) -> u8 {
        self.success_percentage
    }

    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    #[must_use]
    pub fn can_delete(&self) -> bool {
        self.can_delete
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub(crate) fn questions_mut(&mut self) -> &mut Vec<Question> {
        &mut self.questions
    }

    #[must_use]
    pub fn into_questions(self) -> Vec<Question> {
        self.questions
    }
}
