//! Page position and load state.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const DEFAULT_PAGE_SIZE_OPTIONS: [usize; 4] = [25, 50, 100, 200];

/// Zero-based page position over `total` rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    page_size: usize,
    page_size_options: Vec<usize>,
    /// Unknown until the first load completes
    total: Option<usize>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            total: None,
        }
    }
}

impl Pagination {
    pub fn new(page_size: usize, page_size_options: Vec<usize>) -> Result<Self> {
        if page_size == 0 {
            return Err(GridError::Configuration("page size must be at least 1".into()));
        }
        if page_size_options.contains(&0) {
            return Err(GridError::Configuration("page size options must be at least 1".into()));
        }
        Ok(Self {
            page_size,
            page_size_options,
            ..Self::default()
        })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_size_options(&self) -> &[usize] {
        &self.page_size_options
    }

    pub fn total(&self) -> Option<usize> {
        self.total
    }

    /// Number of pages; `None` while the total is unknown. An empty result
    /// still has one (empty) page.
    pub fn total_pages(&self) -> Option<usize> {
        self.total.map(|t| t.div_ceil(self.page_size).max(1))
    }

    /// Move to page `n`, clamped to the last page when the total is known.
    pub fn set_page(&mut self, n: usize) -> bool {
        let target = match self.total_pages() {
            Some(pages) => n.min(pages - 1),
            None => n,
        };
        let changed = target != self.page;
        self.page = target;
        changed
    }

    /// A different size sends the view back to the first page.
    pub fn set_page_size(&mut self, size: usize) -> Result<bool> {
        if size == 0 {
            return Err(GridError::Configuration("page size must be at least 1".into()));
        }
        if size == self.page_size {
            return Ok(false);
        }
        self.page_size = size;
        self.page = 0;
        Ok(true)
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page(self.page + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        match self.page.checked_sub(1) {
            Some(prev) => self.set_page(prev),
            None => false,
        }
    }

    pub fn has_next(&self) -> bool {
        self.total_pages().map_or(true, |pages| self.page + 1 < pages)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    /// Record the row total and pull the page back inside it.
    /// Returns true if the page moved.
    pub fn set_total(&mut self, total: usize) -> bool {
        self.total = Some(total);
        let page = self.page;
        self.set_page(page)
    }

    pub(crate) fn reset_page(&mut self) -> bool {
        let changed = self.page != 0;
        self.page = 0;
        changed
    }

    /// Row index range of the current page within `len` rows.
    pub fn range(&self, len: usize) -> Range<usize> {
        let start = self.page.saturating_mul(self.page_size).min(len);
        let end = start.saturating_add(self.page_size).min(len);
        start..end
    }
}

/// Data load lifecycle. Client mode goes straight to `Loaded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Errored,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(Pagination::new(0, vec![10]).is_err());
        let mut p = Pagination::default();
        assert!(p.set_page_size(0).is_err());
        assert_eq!(p.page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_set_page_clamped_when_total_known() {
        let mut p = Pagination::new(10, vec![10, 20]).unwrap();
        assert!(p.set_page(7), "unknown total: not clamped");
        p.set_total(35);
        assert_eq!(p.page(), 3);
        p.set_page(99);
        assert_eq!(p.page(), 3);
        assert_eq!(p.range(35), 30..35);
    }

    #[test]
    fn test_page_size_change_resets_page() {
        let mut p = Pagination::new(10, vec![]).unwrap();
        p.set_total(100);
        p.set_page(4);
        assert!(p.set_page_size(25).unwrap());
        assert_eq!(p.page(), 0);
        assert!(!p.set_page_size(25).unwrap());
    }

    #[test]
    fn test_empty_total_has_one_page() {
        let mut p = Pagination::new(10, vec![]).unwrap();
        p.set_total(0);
        assert_eq!(p.total_pages(), Some(1));
        assert!(!p.has_next());
        assert!(!p.next_page());
        assert_eq!(p.range(0), 0..0);
    }

    #[test]
    fn test_next_prev() {
        let mut p = Pagination::new(5, vec![]).unwrap();
        p.set_total(12);
        assert!(p.next_page());
        assert!(p.next_page());
        assert!(!p.next_page());
        assert_eq!(p.page(), 2);
        assert!(p.prev_page());
        assert_eq!(p.page(), 1);
        assert!(p.has_prev());
        assert!(p.prev_page());
        assert!(!p.has_prev());
        assert!(!p.prev_page());
    }
}
