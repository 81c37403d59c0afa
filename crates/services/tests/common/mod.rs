#![allow(dead_code)]

use quiz_api::{AnswerDetail, QuestionDetail, QuizDetail};
use quiz_core::model::{ChoiceId, QuestionId, QuizId, SubjectId};

/// Quiz with `questions` questions of three answers; the first answer of
/// each question is correct. Choice ids are `question * 10 + n`.
pub fn quiz_detail(id: u64, subject: u64, questions: u64) -> QuizDetail {
    QuizDetail {
        id: QuizId::new(id),
        title: format!("Quiz {id}"),
        subject_id: SubjectId::new(subject),
        subject_title: None,
        description: Some(format!("Practice set {id}")),
        duration: 120,
        success_percentage: 50,
        questions: (1..=questions)
            .map(|q| QuestionDetail {
                id: QuestionId::new(q),
                title: format!("Question {q}"),
                answers: (0..3)
                    .map(|n| AnswerDetail {
                        id: ChoiceId::new(q * 10 + n),
                        title: format!("Answer {n}"),
                        is_correct: n == 0,
                    })
                    .collect(),
            })
            .collect(),
        language: Some("en".into()),
        can_delete: true,
    }
}

pub fn correct_choice(question: u64) -> ChoiceId {
    ChoiceId::new(question * 10)
}

pub fn wrong_choice(question: u64) -> ChoiceId {
    ChoiceId::new(question * 10 + 1)
}
