//! Page bookkeeping for the query history.

/// Current page, page size and total count of a paginated list.
///
/// Pages are 1-based. Navigation is refused outside `1..=page_count()` and
/// while a fetch is in flight; the owner re-fetches after a successful move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    current_page: u32,
    page_size: u32,
    total_count: u64,
    fetching: bool,
}

impl Pagination {
    /// Default number of items per page.
    pub const DEFAULT_PAGE_SIZE: u32 = 5;

    /// Start on page 1 with nothing loaded. A zero page size is raised to 1.
    #[must_use]
    pub fn new(page_size: u32) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
            total_count: 0,
            fetching: false,
        }
    }

    #[must_use]
    pub const fn current_page(&self) -> u32 {
        self.current_page
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    #[must_use]
    pub const fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Whether a page fetch is in flight.
    #[must_use]
    pub const fn is_fetching(&self) -> bool {
        self.fetching
    }

    /// `ceil(total_count / page_size)`; zero when the list is empty.
    #[must_use]
    pub fn page_count(&self) -> u32 {
        let pages = self.total_count.div_ceil(u64::from(self.page_size));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Move to `page` if it exists and no fetch is in flight.
    ///
    /// Returns whether the current page changed.
    pub fn go_to_page(&mut self, page: u32) -> bool {
        if self.fetching || page < 1 || page > self.page_count() || page == self.current_page {
            return false;
        }
        self.current_page = page;
        true
    }

    /// Move back one page.
    pub fn previous(&mut self) -> bool {
        self.go_to_page(self.current_page.saturating_sub(1))
    }

    /// Move forward one page.
    pub fn next(&mut self) -> bool {
        self.go_to_page(self.current_page.saturating_add(1))
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.current_page < self.page_count()
    }

    /// Whether navigation controls are shown (more than one page).
    #[must_use]
    pub fn shows_controls(&self) -> bool {
        self.total_count > u64::from(self.page_size)
    }

    /// Mark a fetch as started.
    pub const fn begin_fetch(&mut self) {
        self.fetching = true;
    }

    /// Record the total reported by a completed fetch.
    pub const fn finish_fetch(&mut self, total_count: u64) {
        self.total_count = total_count;
        self.fetching = false;
    }

    /// Record a failed fetch; the list is treated as empty.
    pub const fn fail_fetch(&mut self) {
        self.finish_fetch(0);
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(total: u64) -> Pagination {
        let mut p = Pagination::default();
        p.begin_fetch();
        p.finish_fetch(total);
        p
    }

    #[test]
    fn test_page_count() {
        assert_eq!(loaded(0).page_count(), 0);
        assert_eq!(loaded(1).page_count(), 1);
        assert_eq!(loaded(5).page_count(), 1);
        assert_eq!(loaded(6).page_count(), 2);
        assert_eq!(loaded(12).page_count(), 3);
    }

    #[test]
    fn test_go_to_page_bounds() {
        let mut p = loaded(12);
        assert!(p.go_to_page(3));
        assert_eq!(p.current_page(), 3);

        assert!(!p.go_to_page(4));
        assert!(!p.go_to_page(0));
        assert_eq!(p.current_page(), 3);
    }

    #[test]
    fn test_navigation_blocked_while_fetching() {
        let mut p = loaded(12);
        p.begin_fetch();
        assert!(!p.next());
        assert_eq!(p.current_page(), 1);

        p.finish_fetch(12);
        assert!(p.next());
        assert_eq!(p.current_page(), 2);
    }

    #[test]
    fn test_previous_and_next_at_edges() {
        let mut p = loaded(10);
        assert!(!p.has_previous());
        assert!(!p.previous());
        assert!(p.has_next());
        assert!(p.next());
        assert!(!p.has_next());
        assert!(!p.next());
        assert!(p.previous());
        assert_eq!(p.current_page(), 1);
    }

    #[test]
    fn test_controls_only_with_more_than_one_page() {
        assert!(!loaded(0).shows_controls());
        assert!(!loaded(5).shows_controls());
        assert!(loaded(6).shows_controls());
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        assert_eq!(Pagination::new(0).page_size(), 1);
    }

    #[test]
    fn test_failed_fetch_empties_the_list() {
        let mut p = loaded(12);
        p.begin_fetch();
        p.fail_fetch();
        assert_eq!(p.total_count(), 0);
        assert_eq!(p.page_count(), 0);
        assert!(!p.is_fetching());
    }
}
