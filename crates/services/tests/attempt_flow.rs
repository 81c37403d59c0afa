mod common;

use std::sync::Arc;

use quiz_api::{InMemoryQuizApi, StatusCode};
use quiz_core::ShuffleOptions;
use quiz_core::model::{QuestionId, QuizId, SubjectId, SubmitReason};
use rand::SeedableRng;
use rand::rngs::StdRng;
use services::{AttemptError, CatalogService, PageSize, QuizAttempt, TickOutcome};

use common::{correct_choice, quiz_detail, wrong_choice};

async fn start(api: &InMemoryQuizApi, questions: u64, page_size: PageSize) -> QuizAttempt {
    api.add_subject(SubjectId::new(1), "Chemistry");
    api.add_quiz(quiz_detail(1, 1, questions));
    let catalog = CatalogService::new(Arc::new(api.clone()));
    let mut rng = StdRng::seed_from_u64(7);
    let quiz = catalog
        .load_quiz(QuizId::new(1), ShuffleOptions::none(), &mut rng)
        .await
        .unwrap();
    QuizAttempt::new(quiz, page_size)
}

#[tokio::test]
async fn loaded_quiz_keeps_server_order_without_shuffle() {
    let api = InMemoryQuizApi::new();
    let attempt = start(&api, 5, PageSize::Wide).await;

    assert_eq!(attempt.subject_title(), "Chemistry");
    let ids: Vec<u64> = attempt
        .questions()
        .iter()
        .map(|q| q.question().id().value())
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    for q in attempt.questions() {
        let choices: Vec<_> = q.question().choices().iter().map(|c| c.id).collect();
        let id = q.question().id().value();
        assert_eq!(choices[0], correct_choice(id));
        assert_eq!(choices[1], wrong_choice(id));
    }
}

#[tokio::test]
async fn seeded_shuffle_keeps_every_question() {
    let api = InMemoryQuizApi::new();
    api.add_subject(SubjectId::new(1), "Chemistry");
    api.add_quiz(quiz_detail(1, 1, 12));
    let catalog = CatalogService::new(Arc::new(api.clone()));

    let mut first = StdRng::seed_from_u64(99);
    let mut second = StdRng::seed_from_u64(99);
    let a = catalog
        .load_quiz(QuizId::new(1), ShuffleOptions::all(), &mut first)
        .await
        .unwrap();
    let b = catalog
        .load_quiz(QuizId::new(1), ShuffleOptions::all(), &mut second)
        .await
        .unwrap();
    assert_eq!(a, b);

    let mut ids: Vec<u64> = a.questions().iter().map(|q| q.id().value()).collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=12).collect::<Vec<_>>());
    for question in a.questions() {
        assert_eq!(
            question.correct_choice().id,
            correct_choice(question.id().value())
        );
    }
}

#[tokio::test]
async fn ten_questions_paged_by_four() {
    let api = InMemoryQuizApi::new();
    let mut attempt = start(&api, 10, PageSize::Compact).await;

    assert_eq!(attempt.total_pages(), 3);
    assert!(attempt.go_to_question(7));
    assert_eq!(attempt.page(), 1);
    let shown: Vec<usize> = attempt.displayed().iter().map(|q| q.index()).collect();
    assert_eq!(shown, vec![4, 5, 6, 7]);
}

#[tokio::test]
async fn user_submit_requires_every_answer() {
    let api = InMemoryQuizApi::new();
    let mut attempt = start(&api, 3, PageSize::Wide).await;
    attempt.select(correct_choice(1));

    let err = attempt
        .submit(SubmitReason::UserSubmit, &api)
        .await
        .unwrap_err();

    assert!(matches!(err, AttemptError::Unanswered { ref missing } if missing == &[1, 2]));
    assert!(api.submissions().is_empty());
    assert!(!attempt.is_submitting());
    assert_eq!(attempt.tick(), TickOutcome::Running);
}

#[tokio::test]
async fn time_ended_submits_partial_answers() {
    let api = InMemoryQuizApi::new();
    let mut attempt = start(&api, 3, PageSize::Wide).await;
    attempt.select(correct_choice(1));

    let receipt = attempt
        .submit(SubmitReason::TimeEnded, &api)
        .await
        .unwrap();

    let submissions = api.submissions();
    assert_eq!(submissions.len(), 1);
    let (quiz_id, answers) = &submissions[0];
    assert_eq!(*quiz_id, QuizId::new(1));
    assert_eq!(answers.len(), 3);
    assert_eq!(answers[0].choice_id, Some(correct_choice(1)));
    assert_eq!(answers[1].question_id, QuestionId::new(2));
    assert_eq!(answers[1].choice_id, None);
    assert_eq!(answers[2].choice_id, None);

    assert!(attempt.is_submitting());
    assert_eq!(attempt.tick(), TickOutcome::Paused);
    assert_eq!(
        receipt.result_path(),
        format!("/quizzes/1/result/{}", receipt.attempt_id)
    );
}

#[tokio::test]
async fn second_submit_is_rejected_while_latched() {
    let api = InMemoryQuizApi::new();
    let mut attempt = start(&api, 1, PageSize::Wide).await;
    attempt.select(correct_choice(1));

    attempt.submit(SubmitReason::UserSubmit, &api).await.unwrap();
    let err = attempt
        .submit(SubmitReason::TimeEnded, &api)
        .await
        .unwrap_err();

    assert!(matches!(err, AttemptError::AlreadySubmitting));
    assert_eq!(api.submissions().len(), 1);
}

#[tokio::test]
async fn failed_submit_clears_latch() {
    let api = InMemoryQuizApi::new();
    let mut attempt = start(&api, 1, PageSize::Wide).await;
    attempt.select(correct_choice(1));
    api.fail_next_submit(StatusCode::BAD_GATEWAY);

    let err = attempt
        .submit(SubmitReason::UserSubmit, &api)
        .await
        .unwrap_err();
    assert!(matches!(err, AttemptError::Api(_)));
    assert!(!attempt.is_submitting());

    attempt.submit(SubmitReason::UserSubmit, &api).await.unwrap();
    assert_eq!(api.submissions().len(), 1);
}

#[tokio::test]
async fn timer_expiry_then_result() {
    let api = InMemoryQuizApi::new();
    let mut attempt = start(&api, 4, PageSize::Wide).await;
    attempt.select(correct_choice(1));
    attempt.go_to_question(1);
    attempt.select(wrong_choice(2));
    attempt.go_to_question(2);
    attempt.select(correct_choice(3));

    let mut ticks = 0;
    let outcome = loop {
        ticks += 1;
        match attempt.tick() {
            TickOutcome::Running => continue,
            other => break other,
        }
    };
    assert_eq!(outcome, TickOutcome::Expired);
    assert_eq!(ticks, 120);
    assert_eq!(attempt.format_time(), "0:00");

    let receipt = attempt
        .submit(SubmitReason::TimeEnded, &api)
        .await
        .unwrap();

    let catalog = CatalogService::new(Arc::new(api.clone()));
    let result = catalog
        .load_result(receipt.quiz_id, receipt.attempt_id)
        .await
        .unwrap();

    assert_eq!(result.score(), 2);
    assert_eq!(result.total(), 4);
    assert!((result.percentage() - 50.0).abs() < f64::EPSILON);
    assert!(result.passed());
    assert!(!result.questions[1].is_correct());
    assert!(result.questions[3].selected().is_none());
}
