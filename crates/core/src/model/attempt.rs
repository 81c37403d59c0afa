use crate::model::ids::{ChoiceId, QuestionId};
use crate::model::quiz::{Choice, Question};

/// Why an attempt is being submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitReason {
    /// The user pressed submit; every question must be answered.
    UserSubmit,
    /// The countdown reached zero; partial answers are accepted.
    TimeEnded,
}

impl SubmitReason {
    #[must_use]
    pub fn requires_all_answers(self) -> bool {
        matches!(self, SubmitReason::UserSubmit)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SubmitReason::UserSubmit => "user-submit",
            SubmitReason::TimeEnded => "time-ended",
        }
    }
}

/// A question inside a running attempt, with the user's current selection.
///
/// Only the selected choice id is kept; title and correctness are looked up
/// from the question when needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptQuestion {
    index: usize,
    question: Question,
    selected: Option<ChoiceId>,
}

impl AttemptQuestion {
    #[must_use]
    pub fn new(index: usize, question: Question) -> Self {
        Self {
            index,
            question,
            selected: None,
        }
    }

    /// Position of this question in the attempt (0-based).
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn question(&self) -> &Question {
        &self.question
    }

    #[must_use]
    pub fn selected(&self) -> Option<ChoiceId> {
        self.selected
    }

    /// The selected choice resolved against this question's choices.
    #[must_use]
    pub fn selected_choice(&self) -> Option<&Choice> {
        self.selected.and_then(|id| self.question.choice(id))
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.selected.is_some()
    }

    /// Replace the current selection.
    pub fn select(&mut self, choice: ChoiceId) {
        self.selected = Some(choice);
    }

    #[must_use]
    pub fn to_answer(&self) -> AnsweredQuestion {
        AnsweredQuestion {
            question_id: self.question.id(),
            choice_id: self.selected,
        }
    }
}

/// Submission entry for one question; `choice_id` is `None` when unanswered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnsweredQuestion {
    pub question_id: QuestionId,
    pub choice_id: Option<ChoiceId>,
}
