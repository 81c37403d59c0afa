use quiz_api::QuizApi;
use quiz_core::model::{
    AnsweredQuestion, AttemptId, AttemptQuestion, ChoiceId, Quiz, QuizId, SubmitReason,
};

use super::paging::Pager;
use super::timer::{Countdown, format_time};
use crate::config::PageSize;
use crate::error::AttemptError;

/// What a one-second timer tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    /// Time just ran out; submit with `SubmitReason::TimeEnded`. Fires once.
    Expired,
    /// Submitting, or the expiry already fired.
    Paused,
}

/// Server acknowledgement of a submitted attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub quiz_id: QuizId,
    pub attempt_id: AttemptId,
    pub message: String,
}

impl SubmitReceipt {
    /// Route of the result view for this attempt.
    #[must_use]
    pub fn result_path(&self) -> String {
        format!("/quizzes/{}/result/{}", self.quiz_id, self.attempt_id)
    }
}

/// One user's run through a quiz.
///
/// The selections are an overlay owned by the attempt; the quiz itself is
/// never modified.
#[derive(Debug, Clone)]
pub struct QuizAttempt {
    quiz_id: QuizId,
    title: String,
    subject_title: String,
    questions: Vec<AttemptQuestion>,
    pager: Pager,
    current: usize,
    page: usize,
    countdown: Countdown,
    is_submitting: bool,
    expiry_fired: bool,
}

impl QuizAttempt {
    #[must_use]
    pub fn new(quiz: Quiz, page_size: PageSize) -> Self {
        let quiz_id = quiz.id();
        let title = quiz.title().to_string();
        let subject_title = quiz.subject().title.clone();
        let countdown = Countdown::new(quiz.duration_secs());
        let questions: Vec<AttemptQuestion> = quiz
            .into_questions()
            .into_iter()
            .enumerate()
            .map(|(index, question)| AttemptQuestion::new(index, question))
            .collect();

        Self {
            quiz_id,
            title,
            subject_title,
            pager: Pager::new(questions.len(), page_size.get()),
            questions,
            current: 0,
            page: 0,
            countdown,
            is_submitting: false,
            expiry_fired: false,
        }
    }

    #[must_use]
    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn subject_title(&self) -> &str {
        &self.subject_title
    }

    #[must_use]
    pub fn questions(&self) -> &[AttemptQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current(&self) -> Option<&AttemptQuestion> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.pager.total_pages()
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.pager.page_size()
    }

    /// Questions on the current page of the navigator.
    #[must_use]
    pub fn displayed(&self) -> &[AttemptQuestion] {
        &self.questions[self.pager.range(self.page)]
    }

    #[must_use]
    pub fn time_left(&self) -> u32 {
        self.countdown.remaining()
    }

    #[must_use]
    pub fn format_time(&self) -> String {
        format_time(self.countdown.remaining())
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.questions.iter().filter(|q| q.is_answered()).count()
    }

    /// Indices of questions without a selection.
    #[must_use]
    pub fn unanswered(&self) -> Vec<usize> {
        self.questions
            .iter()
            .filter(|q| !q.is_answered())
            .map(AttemptQuestion::index)
            .collect()
    }

    /// Replace the selection of the current question.
    pub fn select(&mut self, choice: ChoiceId) {
        if let Some(question) = self.questions.get_mut(self.current) {
            question.select(choice);
        }
    }

    /// Move to the next question, turning the page when leaving the last
    /// question of the current one.
    pub fn next_question(&mut self) -> bool {
        if self.is_last_question() {
            return false;
        }
        let leaving_page = self.current == self.pager.last_on(self.page);
        self.current += 1;
        if leaving_page {
            self.next_page();
        }
        true
    }

    pub fn prev_question(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        let leaving_page = self.current == self.pager.first_on(self.page);
        self.current -= 1;
        if leaving_page {
            self.prev_page();
        }
        true
    }

    /// Jump to `index` and show the page containing it.
    pub fn go_to_question(&mut self, index: usize) -> bool {
        if index >= self.questions.len() {
            return false;
        }
        self.current = index;
        self.page = self.pager.page_of(index);
        true
    }

    /// Page the navigator without moving the current question.
    pub fn next_page(&mut self) {
        self.page = (self.page + 1).min(self.pager.last_page());
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> TickOutcome {
        if self.is_submitting || self.expiry_fired {
            return TickOutcome::Paused;
        }
        if !self.countdown.is_expired() {
            self.countdown.tick();
        }
        if self.countdown.is_expired() {
            self.expiry_fired = true;
            return TickOutcome::Expired;
        }
        TickOutcome::Running
    }

    /// Submission payload, one entry per question in quiz order.
    #[must_use]
    pub fn answers(&self) -> Vec<AnsweredQuestion> {
        self.questions.iter().map(AttemptQuestion::to_answer).collect()
    }

    /// Submit the attempt.
    ///
    /// A user submit requires every question to be answered and makes no
    /// request otherwise. A time-ended submit sends whatever is selected.
    /// On success the submitting latch stays set; it is cleared on every
    /// error.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::Unanswered` for incomplete user submits,
    /// `AttemptError::AlreadySubmitting` while a submit is in flight, and
    /// `AttemptError::Api` when the server rejects the attempt.
    pub async fn submit(
        &mut self,
        reason: SubmitReason,
        api: &dyn QuizApi,
    ) -> Result<SubmitReceipt, AttemptError> {
        if self.is_submitting {
            return Err(AttemptError::AlreadySubmitting);
        }
        self.is_submitting = true;
        if reason == SubmitReason::TimeEnded {
            self.expiry_fired = true;
        }

        if reason.requires_all_answers() {
            let missing = self.unanswered();
            if !missing.is_empty() {
                self.is_submitting = false;
                return Err(AttemptError::Unanswered { missing });
            }
        }

        let answers = self.answers();
        tracing::info!(
            quiz_id = %self.quiz_id,
            reason = reason.as_str(),
            answered = self.answered_count(),
            total = answers.len(),
            "submitting attempt"
        );

        match api.submit_attempt(self.quiz_id, &answers).await {
            Ok(receipt) => Ok(SubmitReceipt {
                quiz_id: self.quiz_id,
                attempt_id: receipt.attempt_id,
                message: receipt.message,
            }),
            Err(err) => {
                tracing::warn!(quiz_id = %self.quiz_id, error = %err, "attempt submission failed");
                self.is_submitting = false;
                Err(AttemptError::Api(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Choice, Question, QuestionId, QuizHeader, SubjectId, SubjectRef};

    fn quiz(questions: u64, duration_secs: u32) -> Quiz {
        let questions = (1..=questions)
            .map(|id| {
                Question::new(
                    QuestionId::new(id),
                    format!("Q{id}"),
                    vec![
                        Choice::new(ChoiceId::new(id * 10), "yes"),
                        Choice::new(ChoiceId::new(id * 10 + 1), "no"),
                    ],
                    ChoiceId::new(id * 10),
                )
                .unwrap()
            })
            .collect();
        Quiz::new(
            QuizHeader {
                id: QuizId::new(1),
                title: "Sample".into(),
                subject: SubjectRef {
                    id: SubjectId::new(1),
                    title: "General".into(),
                },
                description: String::new(),
                duration_secs,
                success_percentage: 50,
                language: None,
                can_delete: false,
            },
            questions,
        )
        .unwrap()
    }

    #[test]
    fn paging_follows_question_navigation() {
        let mut attempt = QuizAttempt::new(quiz(10, 60), PageSize::Compact);
        assert_eq!(attempt.total_pages(), 3);
        assert_eq!(attempt.displayed().len(), 4);

        for _ in 0..4 {
            assert!(attempt.next_question());
        }
        assert_eq!(attempt.current_index(), 4);
        assert_eq!(attempt.page(), 1);

        assert!(attempt.prev_question());
        assert_eq!(attempt.current_index(), 3);
        assert_eq!(attempt.page(), 0);
    }

    #[test]
    fn go_to_question_syncs_page() {
        let mut attempt = QuizAttempt::new(quiz(10, 60), PageSize::Compact);
        assert!(attempt.go_to_question(7));
        assert_eq!(attempt.page(), 1);
        assert!(!attempt.go_to_question(10));
        assert_eq!(attempt.current_index(), 7);
    }

    #[test]
    fn navigation_stops_at_bounds() {
        let mut attempt = QuizAttempt::new(quiz(3, 60), PageSize::Wide);
        assert!(!attempt.prev_question());
        attempt.go_to_question(2);
        assert!(attempt.is_last_question());
        assert!(!attempt.next_question());

        attempt.next_page();
        assert_eq!(attempt.page(), 0);
        attempt.prev_page();
        assert_eq!(attempt.page(), 0);
    }

    #[test]
    fn last_page_shows_remainder() {
        let mut attempt = QuizAttempt::new(quiz(10, 60), PageSize::Compact);
        attempt.next_page();
        attempt.next_page();
        attempt.next_page();
        assert_eq!(attempt.page(), 2);
        assert_eq!(attempt.displayed().len(), 2);
        assert_eq!(attempt.current_index(), 0);
    }

    #[test]
    fn selection_counts_answers() {
        let mut attempt = QuizAttempt::new(quiz(3, 60), PageSize::Wide);
        attempt.select(ChoiceId::new(11));
        attempt.select(ChoiceId::new(10));
        attempt.go_to_question(2);
        attempt.select(ChoiceId::new(31));

        assert_eq!(attempt.answered_count(), 2);
        assert_eq!(attempt.unanswered(), vec![1]);
        assert_eq!(attempt.questions()[0].selected(), Some(ChoiceId::new(10)));
    }

    #[test]
    fn timer_expires_once() {
        let mut attempt = QuizAttempt::new(quiz(1, 2), PageSize::Wide);
        assert_eq!(attempt.format_time(), "0:02");
        assert_eq!(attempt.tick(), TickOutcome::Running);
        assert_eq!(attempt.tick(), TickOutcome::Expired);
        assert_eq!(attempt.time_left(), 0);
        assert_eq!(attempt.tick(), TickOutcome::Paused);
    }

    #[test]
    fn zero_duration_expires_on_first_tick() {
        let mut attempt = QuizAttempt::new(quiz(1, 0), PageSize::Wide);
        assert_eq!(attempt.tick(), TickOutcome::Expired);
    }

    #[test]
    fn receipt_points_at_result_view() {
        let receipt = SubmitReceipt {
            quiz_id: QuizId::new(4),
            attempt_id: AttemptId::new(9),
            message: String::new(),
        };
        assert_eq!(receipt.result_path(), "/quizzes/4/result/9");
    }
}
