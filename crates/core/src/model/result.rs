use crate::model::ids::{AttemptId, ChoiceId, QuestionId, QuizId};
use crate::model::quiz::QuizError;

/// A choice as reported back with a finished attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceRecord {
    pub id: ChoiceId,
    pub title: String,
    pub is_correct: bool,
}

/// One question of a finished attempt: what was picked versus what was right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewedQuestion {
    id: QuestionId,
    title: String,
    choices: Vec<ChoiceRecord>,
    selected: Option<ChoiceRecord>,
    correct: ChoiceRecord,
}

impl ReviewedQuestion {
    /// # Errors
    ///
    /// Returns `QuizError::NoCorrectChoice` when `correct` is missing or not
    /// one of `choices`.
    pub fn new(
        id: QuestionId,
        title: impl Into<String>,
        choices: Vec<ChoiceRecord>,
        selected: Option<ChoiceRecord>,
        correct: Option<ChoiceRecord>,
    ) -> Result<Self, QuizError> {
        let correct = correct
            .filter(|correct| choices.iter().any(|choice| choice.id == correct.id))
            .ok_or(QuizError::NoCorrectChoice { question_id: id })?;

        Ok(Self {
            id,
            title: title.into(),
            choices,
            selected,
            correct,
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
    pub fn choices(&self) -> &[ChoiceRecord] {
        &self.choices
    }

    #[must_use]
    pub fn selected(&self) -> Option<&ChoiceRecord> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn correct(&self) -> &ChoiceRecord {
        &self.correct
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.selected
            .as_ref()
            .is_some_and(|selected| selected.id == self.correct.id)
    }
}

/// Server-confirmed outcome of an attempt.
///
/// Score, percentage and pass state are recomputed from the per-question
/// records; the server's own figures are kept alongside for reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    pub id: AttemptId,
    pub quiz_id: QuizId,
    pub recorded_result: u32,
    pub recorded_pass: bool,
    pub success_percentage: u8,
    pub is_shared: bool,
    pub questions: Vec<ReviewedQuestion>,
}

impl QuizResult {
    /// Number of correctly answered questions.
    #[must_use]
    pub fn score(&self) -> usize {
        self.questions.iter().filter(|q| q.is_correct()).count()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Correct answers as a percentage rounded to two decimals.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        score_percentage(self.score(), self.total())
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        is_passing(self.score(), self.total(), self.success_percentage)
    }
}

/// `round(correct / total * 100, 2)`; zero for an empty quiz.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn score_percentage(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = correct as f64 / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

/// Pass iff `correct / total >= threshold / 100`. An empty quiz never passes.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn is_passing(correct: usize, total: usize, threshold: u8) -> bool {
    if total == 0 {
        return false;
    }
    correct as f64 / total as f64 >= f64::from(threshold) / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, is_correct: bool) -> ChoiceRecord {
        ChoiceRecord {
            id: ChoiceId::new(id),
            title: format!("choice {id}"),
            is_correct,
        }
    }

    fn reviewed(qid: u64, picked: Option<u64>) -> ReviewedQuestion {
        let choices = vec![record(qid * 10, true), record(qid * 10 + 1, false)];
        let selected = picked.map(|id| record(id, id == qid * 10));
        ReviewedQuestion::new(
            QuestionId::new(qid),
            "Q",
            choices,
            selected,
            Some(record(qid * 10, true)),
        )
        .unwrap()
    }

    fn result(questions: Vec<ReviewedQuestion>, threshold: u8) -> QuizResult {
        QuizResult {
            id: AttemptId::new(1),
            quiz_id: QuizId::new(1),
            recorded_result: 0,
            recorded_pass: false,
            success_percentage: threshold,
            is_shared: false,
            questions,
        }
    }

    #[test]
    fn percentage_is_rounded_to_two_decimals() {
        assert_eq!(score_percentage(1, 3), 33.33);
        assert_eq!(score_percentage(2, 3), 66.67);
        assert_eq!(score_percentage(3, 3), 100.0);
        assert_eq!(score_percentage(0, 0), 0.0);
    }

    #[test]
    fn pass_threshold_is_inclusive() {
        assert!(is_passing(1, 2, 50));
        assert!(!is_passing(1, 3, 50));
        assert!(is_passing(0, 4, 0));
        assert!(!is_passing(0, 0, 0));
    }

    #[test]
    fn result_scores_selected_against_correct() {
        let res = result(
            vec![reviewed(1, Some(10)), reviewed(2, Some(21)), reviewed(3, None)],
            30,
        );
        assert_eq!(res.score(), 1);
        assert_eq!(res.total(), 3);
        assert_eq!(res.percentage(), 33.33);
        assert!(res.passed());
    }

    #[test]
    fn missing_correct_choice_fails_fast() {
        let err = ReviewedQuestion::new(
            QuestionId::new(4),
            "Q",
            vec![record(1, false), record(2, false)],
            None,
            Some(record(3, true)),
        )
        .unwrap_err();
        assert_eq!(
            err,
            QuizError::NoCorrectChoice {
                question_id: QuestionId::new(4)
            }
        );
    }
}
