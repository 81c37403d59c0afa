use std::fmt;

use thiserror::Error;

use crate::model::ids::SubjectId;

pub const MAX_TITLE_CHARS: usize = 250;
pub const MAX_DESCRIPTION_CHARS: usize = 1000;
pub const PASTED_TEXT_FILE_NAME: &str = "user_text.txt";
pub const PLAIN_TEXT_MIME: &str = "text/plain";

/// Subject picked in the creation form: an existing one, or a title to
/// look up / create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectChoice {
    Existing(SubjectId),
    New(String),
}

/// A study file attached to a quiz request.
#[derive(Clone, PartialEq, Eq)]
pub struct MaterialFile {
    pub name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for MaterialFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaterialFile")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Raw creation-form input, as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct QuizDraft {
    pub subject: Option<SubjectChoice>,
    pub title: String,
    pub duration_minutes: String,
    pub number_of_questions: String,
    pub success_percentage: String,
    pub description: String,
    pub files: Vec<MaterialFile>,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Subject,
    Title,
    Duration,
    NumberOfQuestions,
    SuccessPercentage,
    Description,
    Material,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizDraftError {
    #[error("subject is required")]
    SubjectRequired,
    #[error("title is required")]
    TitleRequired,
    #[error("title must be at most 250 characters")]
    TitleTooLong,
    #[error("duration must be a whole number of minutes, at least 1")]
    InvalidDuration,
    #[error("number of questions must be at least 1")]
    InvalidQuestionCount,
    #[error("pass percentage must be between 1 and 100")]
    InvalidPercentage,
    #[error("description must be at most 1000 characters")]
    DescriptionTooLong,
    #[error("upload a file or paste some text")]
    MaterialRequired,
}

/// Every invalid field of a draft, in form order.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("quiz draft has {} invalid field(s)", .fields.len())]
pub struct QuizDraftErrors {
    fields: Vec<(DraftField, QuizDraftError)>,
}

impl QuizDraftErrors {
    #[must_use]
    pub fn fields(&self) -> &[(DraftField, QuizDraftError)] {
        &self.fields
    }

    #[must_use]
    pub fn get(&self, field: DraftField) -> Option<&QuizDraftError> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, err)| err)
    }
}

/// A validated creation request, before subject resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRequest {
    pub subject: SubjectChoice,
    pub title: String,
    pub duration_secs: u32,
    pub number_of_questions: u32,
    pub success_percentage: u8,
    pub description: String,
    pub files: Vec<MaterialFile>,
}

impl QuizRequest {
    /// Attach the resolved subject and the credential for submission.
    #[must_use]
    pub fn into_create(self, subject_id: SubjectId, api_key: String) -> CreateQuizRequest {
        CreateQuizRequest {
            api_key,
            subject_id,
            title: self.title,
            duration_secs: self.duration_secs,
            number_of_questions: self.number_of_questions,
            success_percentage: self.success_percentage,
            description: self.description,
            files: self.files,
        }
    }
}

/// Exactly what goes over the wire to start generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateQuizRequest {
    pub api_key: String,
    pub subject_id: SubjectId,
    pub title: String,
    pub duration_secs: u32,
    pub number_of_questions: u32,
    pub success_percentage: u8,
    pub description: String,
    pub files: Vec<MaterialFile>,
}

impl QuizDraft {
    /// Check every field and report all problems at once.
    ///
    /// Pasted text becomes an extra `user_text.txt` attachment.
    ///
    /// # Errors
    ///
    /// Returns `QuizDraftErrors` listing each invalid field.
    pub fn validate(self) -> Result<QuizRequest, QuizDraftErrors> {
        let mut fields = Vec::new();

        let subject = match self.subject {
            Some(SubjectChoice::New(title)) if title.trim().is_empty() => None,
            Some(SubjectChoice::New(title)) => Some(SubjectChoice::New(title.trim().to_string())),
            other => other,
        };
        if subject.is_none() {
            fields.push((DraftField::Subject, QuizDraftError::SubjectRequired));
        }

        if self.title.trim().is_empty() {
            fields.push((DraftField::Title, QuizDraftError::TitleRequired));
        } else if self.title.chars().count() > MAX_TITLE_CHARS {
            fields.push((DraftField::Title, QuizDraftError::TitleTooLong));
        }

        let duration = parse_positive(&self.duration_minutes);
        let duration_secs = duration.and_then(|minutes| minutes.checked_mul(60));
        if duration_secs.is_none() {
            fields.push((DraftField::Duration, QuizDraftError::InvalidDuration));
        }

        let question_count = parse_positive(&self.number_of_questions);
        if question_count.is_none() {
            fields.push((
                DraftField::NumberOfQuestions,
                QuizDraftError::InvalidQuestionCount,
            ));
        }

        let percentage = parse_positive(&self.success_percentage)
            .filter(|pct| *pct <= 100)
            .and_then(|pct| u8::try_from(pct).ok());
        if percentage.is_none() {
            fields.push((
                DraftField::SuccessPercentage,
                QuizDraftError::InvalidPercentage,
            ));
        }

        if self.description.chars().count() > MAX_DESCRIPTION_CHARS {
            fields.push((DraftField::Description, QuizDraftError::DescriptionTooLong));
        }

        let mut files = self.files;
        if !self.text.is_empty() {
            files.push(MaterialFile {
                name: PASTED_TEXT_FILE_NAME.to_string(),
                mime: Some(PLAIN_TEXT_MIME.to_string()),
                bytes: self.text.into_bytes(),
            });
        }
        if files.is_empty() {
            fields.push((DraftField::Material, QuizDraftError::MaterialRequired));
        }

        match (subject, duration_secs, question_count, percentage) {
            (Some(subject), Some(duration_secs), Some(number_of_questions), Some(success_percentage))
                if fields.is_empty() =>
            {
                Ok(QuizRequest {
                    subject,
                    title: self.title.trim().to_string(),
                    duration_secs,
                    number_of_questions,
                    success_percentage,
                    description: self.description,
                    files,
                })
            }
            _ => Err(QuizDraftErrors { fields }),
        }
    }
}

fn parse_positive(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|value| *value >= 1)
}
