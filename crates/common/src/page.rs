use serde::Serialize;

/// One page of a larger, ordered result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: usize,
    pub per_page: usize,
    /// Number of matching rows across all pages.
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: usize, per_page: usize, total: u64) -> Self {
        Self {
            items,
            page,
            per_page,
            total,
        }
    }

    /// Returns the number of pages needed to show `total` rows.
    pub fn total_pages(&self) -> usize {
        if self.per_page == 0 {
            return 0;
        }
        (self.total as usize).div_ceil(self.per_page)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}
