//! Paginated, client-side cache of lab results.
//!
//! [`ResultList`] owns the in-memory copy of the result store's contents and
//! the pagination state derived from it. It is the only thing allowed to
//! mutate the collection; every mutation recomputes `total_pages`.
//!
//! # Pagination invariants
//!
//! - `total_pages == ceil(len / page_size)`, so an empty list has zero pages.
//! - `1 <= current_page <= max(total_pages, 1)`. Page 1 of an empty list is a
//!   valid, empty page.
//!
//! `load` resets to page 1. `insert_created` keeps the current page.
//! `remove_by_id` keeps the current page unless it no longer exists, in which
//! case it steps back to the new last page.

use labres_storage::LabResult;

/// Results per page when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone)]
pub struct ResultList {
    results: Vec<LabResult>,
    current_page: usize,
    page_size: usize,
    total_pages: usize,
    error: Option<String>,
    loading: bool,
}

impl Default for ResultList {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ResultList {
    /// Create an empty list. A `page_size` of zero is raised to one.
    pub fn new(page_size: usize) -> Self {
        Self {
            results: Vec::new(),
            current_page: 1,
            page_size: page_size.max(1),
            total_pages: 0,
            error: None,
            loading: false,
        }
    }

    // ── Mutations ────────────────────────────────────────────────────────────

    /// Replace the whole collection with a fresh fetch and go back to page 1.
    ///
    /// Also clears any previous load error.
    pub fn load(&mut self, results: Vec<LabResult>) {
        self.results = results;
        self.recompute_total_pages();
        self.current_page = 1;
        self.error = None;
        tracing::debug!(
            count = self.results.len(),
            total_pages = self.total_pages,
            "result list loaded"
        );
    }

    /// Move to page `target`. Out-of-range targets are ignored, not clamped.
    ///
    /// Returns whether the page changed.
    pub fn change_page(&mut self, target: usize) -> bool {
        if target < 1 || target > self.total_pages {
            tracing::debug!(target, total_pages = self.total_pages, "page change rejected");
            return false;
        }
        self.current_page = target;
        true
    }

    /// Prepend a freshly created result. The current page is kept.
    pub fn insert_created(&mut self, result: LabResult) {
        self.results.insert(0, result);
        self.recompute_total_pages();
    }

    /// Drop the result with `id`. Returns whether anything was removed.
    pub fn remove_by_id(&mut self, id: i64) -> bool {
        let before = self.results.len();
        self.results.retain(|r| r.id != id);
        if self.results.len() == before {
            return false;
        }
        self.recompute_total_pages();
        let last = self.total_pages.max(1);
        if self.current_page > last {
            self.current_page = last;
        }
        true
    }

    /// Replace the result with `id` in place.
    ///
    /// Unknown ids are ignored; returns whether a record was replaced.
    pub fn patch_status(&mut self, id: i64, updated: LabResult) -> bool {
        match self.results.iter_mut().find(|r| r.id == id) {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => {
                tracing::debug!(id, "status patch for unknown result dropped");
                false
            }
        }
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    /// The results on the current page.
    ///
    /// Shorter than `page_size` on the last page; empty for an empty list.
    pub fn page(&self) -> &[LabResult] {
        let start = (self.current_page - 1) * self.page_size;
        if start >= self.results.len() {
            return &[];
        }
        let end = (start + self.page_size).min(self.results.len());
        &self.results[start..end]
    }

    pub fn results(&self) -> &[LabResult] {
        &self.results
    }

    pub fn find(&self, id: i64) -> Option<&LabResult> {
        self.results.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn recompute_total_pages(&mut self) {
        self.total_pages = self.results.len().div_ceil(self.page_size);
    }
}
