use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::Quiz;

/// Which parts of a quiz get reordered before an attempt starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShuffleOptions {
    pub questions: bool,
    pub answers: bool,
}

impl ShuffleOptions {
    /// Keep server order for both questions and answers.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Shuffle both questions and answers; used when starting an attempt.
    #[must_use]
    pub fn all() -> Self {
        Self {
            questions: true,
            answers: true,
        }
    }
}

/// Uniform in-place shuffle driven by the given random source.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    items.shuffle(rng);
}

impl Quiz {
    /// Reorder questions and/or answers according to `options`.
    ///
    /// With `ShuffleOptions::none()` the quiz is returned untouched.
    #[must_use]
    pub fn shuffled<R: Rng + ?Sized>(mut self, options: ShuffleOptions, rng: &mut R) -> Self {
        if options.answers {
            for question in self.questions_mut().iter_mut() {
                shuffle(question.choices_mut(), rng);
            }
        }
        if options.questions {
            shuffle(self.questions_mut().as_mut_slice(), rng);
        }
        self
    }
}
