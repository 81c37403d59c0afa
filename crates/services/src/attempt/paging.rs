use std::ops::Range;

/// Splits `len` questions into pages of `page_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    len: usize,
    page_size: usize,
}

impl Pager {
    /// A zero `page_size` is treated as one question per page.
    #[must_use]
    pub fn new(len: usize, page_size: usize) -> Self {
        Self {
            len,
            page_size: page_size.max(1),
        }
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.len.div_ceil(self.page_size)
    }

    #[must_use]
    pub fn last_page(&self) -> usize {
        self.total_pages().saturating_sub(1)
    }

    #[must_use]
    pub fn page_of(&self, index: usize) -> usize {
        index / self.page_size
    }

    #[must_use]
    pub fn first_on(&self, page: usize) -> usize {
        page * self.page_size
    }

    #[must_use]
    pub fn last_on(&self, page: usize) -> usize {
        self.first_on(page) + self.page_size - 1
    }

    /// Indices shown on `page`, empty past the end.
    #[must_use]
    pub fn range(&self, page: usize) -> Range<usize> {
        let start = self.first_on(page).min(self.len);
        let end = (start + self.page_size).min(self.len);
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_questions_by_four() {
        let pager = Pager::new(10, 4);
        assert_eq!(pager.total_pages(), 3);
        assert_eq!(pager.page_of(7), 1);
        assert_eq!(pager.range(2), 8..10);
        assert_eq!(pager.range(5), 10..10);
    }

    #[test]
    fn empty_quiz_has_no_pages() {
        let pager = Pager::new(0, 30);
        assert_eq!(pager.total_pages(), 0);
        assert_eq!(pager.last_page(), 0);
        assert!(pager.range(0).is_empty());
    }
}
