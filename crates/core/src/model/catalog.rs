use crate::model::ids::{QuizId, SubjectId};

/// Sentinel used by filter inputs to mean "no filter".
pub const ALL_FILTER: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: SubjectId,
    pub title: String,
}

/// Quiz as shown in listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSummary {
    pub id: QuizId,
    pub title: String,
    pub subject_id: SubjectId,
    pub subject_title: String,
    pub number_of_questions: u32,
    pub description: String,
}

/// One cursor page of quizzes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizPage {
    pub has_more: bool,
    pub next_cursor: Option<String>,
    pub quizzes: Vec<QuizSummary>,
}

/// Filters for quiz listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizFilter {
    pub search: Option<String>,
    pub subject_id: Option<SubjectId>,
    pub language: Option<String>,
}

impl QuizFilter {
    /// Build a filter from raw inputs, treating `"all"` and blanks as unset.
    #[must_use]
    pub fn from_inputs(search: Option<&str>, subject: Option<&str>, language: Option<&str>) -> Self {
        Self {
            search: non_sentinel(search).map(str::to_owned),
            subject_id: non_sentinel(subject).and_then(|raw| raw.parse().ok()),
            language: non_sentinel(language).map(str::to_owned),
        }
    }
}

fn non_sentinel(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|val| !val.is_empty() && *val != ALL_FILTER)
}

/// Full listing query: filter plus paging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizQuery {
    pub filter: QuizFilter,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_sentinel_clears_filters() {
        let filter = QuizFilter::from_inputs(Some("  "), Some("all"), Some("all"));
        assert_eq!(filter, QuizFilter::default());
    }

    #[test]
    fn filter_parses_subject_id() {
        let filter = QuizFilter::from_inputs(Some("rust"), Some("12"), Some("en"));
        assert_eq!(filter.search.as_deref(), Some("rust"));
        assert_eq!(filter.subject_id, Some(SubjectId::new(12)));
        assert_eq!(filter.language.as_deref(), Some("en"));
    }
}
