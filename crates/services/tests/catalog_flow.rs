mod common;

use std::sync::Arc;

use quiz_api::InMemoryQuizApi;
use quiz_core::ShuffleOptions;
use quiz_core::model::{QuizFilter, QuizId, SubjectId};
use rand::SeedableRng;
use rand::rngs::StdRng;
use services::{CatalogError, CatalogService};

use common::quiz_detail;

fn catalog(api: &InMemoryQuizApi) -> CatalogService {
    CatalogService::new(Arc::new(api.clone()))
}

#[tokio::test]
async fn feed_pages_until_exhausted() {
    let api = InMemoryQuizApi::new();
    for id in 1..=5 {
        api.add_quiz(quiz_detail(id, 1, 2));
    }
    let mut feed = catalog(&api).feed(QuizFilter::default()).with_limit(2);

    assert_eq!(feed.fetch_more().await.unwrap(), 2);
    assert!(feed.has_more());
    assert_eq!(feed.fetch_more().await.unwrap(), 2);
    assert_eq!(feed.fetch_more().await.unwrap(), 1);
    assert!(!feed.has_more());
    assert_eq!(feed.fetch_more().await.unwrap(), 0);

    let ids: Vec<u64> = feed.quizzes().iter().map(|q| q.id.value()).collect();
    assert_eq!(ids, vec![5, 4, 3, 2, 1]);
}

#[tokio::test]
async fn refetch_replaces_with_filtered_list() {
    let api = InMemoryQuizApi::new();
    api.add_subject(SubjectId::new(1), "Math");
    api.add_subject(SubjectId::new(2), "History");
    api.add_quiz(quiz_detail(1, 1, 2));
    api.add_quiz(quiz_detail(2, 2, 2));
    api.add_quiz(quiz_detail(3, 2, 2));

    let mut feed = catalog(&api).feed(QuizFilter::default());
    assert_eq!(feed.refetch(QuizFilter::default()).await.unwrap(), 3);

    let history = QuizFilter::from_inputs(Some("all"), Some("2"), Some("all"));
    assert_eq!(feed.refetch(history).await.unwrap(), 2);
    assert!(
        feed.quizzes()
            .iter()
            .all(|q| q.subject_id == SubjectId::new(2) && q.subject_title == "History")
    );
    assert_eq!(feed.filter().subject_id, Some(SubjectId::new(2)));
}

#[tokio::test]
async fn share_publishes_private_quiz_once() {
    let api = InMemoryQuizApi::new();
    api.add_private_quiz(quiz_detail(9, 1, 2));
    let catalog = catalog(&api);

    let mut feed = catalog.feed(QuizFilter::default());
    assert_eq!(feed.refetch(QuizFilter::default()).await.unwrap(), 0);

    assert!(catalog.share_quiz(QuizId::new(9), false).await.unwrap());
    assert!(!catalog.share_quiz(QuizId::new(9), true).await.unwrap());
    assert!(api.is_shared(QuizId::new(9)));
    assert_eq!(feed.refetch(QuizFilter::default()).await.unwrap(), 1);
}

#[tokio::test]
async fn deleted_quiz_is_not_found() {
    let api = InMemoryQuizApi::new();
    api.add_subject(SubjectId::new(1), "Math");
    api.add_quiz(quiz_detail(4, 1, 2));
    let catalog = catalog(&api);

    catalog.delete_quiz(QuizId::new(4)).await.unwrap();

    let mut rng = StdRng::seed_from_u64(1);
    let err = catalog
        .load_quiz(QuizId::new(4), ShuffleOptions::none(), &mut rng)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotFound));
    assert!(matches!(
        catalog.delete_quiz(QuizId::new(4)).await,
        Err(CatalogError::NotFound)
    ));
}

#[tokio::test]
async fn quiz_with_missing_correct_answer_is_rejected() {
    let api = InMemoryQuizApi::new();
    api.add_subject(SubjectId::new(1), "Math");
    let mut detail = quiz_detail(6, 1, 2);
    for answer in &mut detail.questions[1].answers {
        answer.is_correct = false;
    }
    api.add_quiz(detail);

    let mut rng = StdRng::seed_from_u64(1);
    let err = catalog(&api)
        .load_quiz(QuizId::new(6), ShuffleOptions::none(), &mut rng)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Quiz(_)));
}

#[tokio::test]
async fn subjects_are_searched_by_title() {
    let api = InMemoryQuizApi::new();
    api.add_subject(SubjectId::new(1), "Organic Chemistry");
    api.add_subject(SubjectId::new(2), "History");

    let found = catalog(&api).list_subjects(Some(" chem ")).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, SubjectId::new(1));
    assert_eq!(catalog(&api).list_subjects(None).await.unwrap().len(), 2);
}
