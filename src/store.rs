//! Reconciliation store: the last-fetched document set plus the active
//! filter/search/pagination criteria, with derived views recomputed
//! deterministically from both. All mutation goes through the transitions
//! defined here; nothing else touches the document list.

use crate::model::{Request, RequestStatus, StatusCounts};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;

/// Fixed page size for every table view.
pub const PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Only(RequestStatus),
}

impl StatusFilter {
    fn admits(&self, status: RequestStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

/// Case-insensitive substring match against the serialized document.
pub fn matches_search(doc: &Value, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    doc.to_string().to_lowercase().contains(&term.to_lowercase())
}

/// Index range of `page` (1-based) over `len` items. The caller guarantees
/// the page is in range; an out-of-range page yields an empty range.
fn page_bounds(len: usize, page: usize, page_size: usize) -> std::ops::Range<usize> {
    let start = (page.saturating_sub(1)) * page_size;
    let end = (start + page_size).min(len);
    if start >= len {
        0..0
    } else {
        start..end
    }
}

fn page_count_for(len: usize, page_size: usize) -> usize {
    if len == 0 {
        1
    } else {
        len.div_ceil(page_size)
    }
}

pub struct RequestStore {
    documents: Vec<Request>,
    filter: StatusFilter,
    search: String,
    page: usize,
    page_size: usize,
    fresh: HashMap<String, DateTime<Utc>>,
    last_refreshed: Option<DateTime<Utc>>,
}

impl RequestStore {
    pub fn new(page_size: usize) -> Self {
        Self {
            documents: Vec::new(),
            filter: StatusFilter::All,
            search: String::new(),
            page: 1,
            page_size: page_size.max(1),
            fresh: HashMap::new(),
            last_refreshed: None,
        }
    }

    /// Atomically swap the visible document list. The current page is
    /// clamped so the view never points past the new last page.
    pub fn replace_all(&mut self, documents: Vec<Request>) {
        self.documents = documents;
        let last = self.page_count();
        if self.page > last {
            self.page = last;
        }
    }

    pub fn documents(&self) -> &[Request] {
        &self.documents
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
        self.page = 1;
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_string();
        self.page = 1;
    }

    /// Move to `page` if it exists. Out-of-range pages are rejected (the
    /// navigation controls disable rather than wrap).
    pub fn set_page(&mut self, page: usize) -> bool {
        if page == 0 || page > self.page_count() {
            return false;
        }
        self.page = page;
        true
    }

    pub fn page_count(&self) -> usize {
        page_count_for(self.visible().len(), self.page_size)
    }

    /// Status filter AND search, original relative order preserved.
    pub fn visible(&self) -> Vec<&Request> {
        self.documents
            .iter()
            .filter(|r| self.filter.admits(r.status))
            .filter(|r| {
                self.search.is_empty()
                    || serde_json::to_value(r)
                        .map(|v| matches_search(&v, &self.search))
                        .unwrap_or(false)
            })
            .collect()
    }

    pub fn page_slice(&self) -> Vec<&Request> {
        let visible = self.visible();
        let range = page_bounds(visible.len(), self.page, self.page_size);
        visible[range].to_vec()
    }

    /// Totals over the full document set, not the filtered view.
    pub fn counts(&self) -> StatusCounts {
        StatusCounts::tally(&self.documents)
    }

    /// Lookup within the currently filtered view. A record filtered out of
    /// view is a miss, not an error.
    pub fn find(&self, id: &str) -> Option<&Request> {
        self.visible().into_iter().find(|r| r.id == id)
    }

    /// Apply a status transition directly to the stored record, returning
    /// the prior `(status, updated_at)` pair for rollback. Ignores the
    /// active filter: the mutation controller addresses records by id.
    pub fn apply_status(
        &mut self,
        id: &str,
        status: RequestStatus,
        updated_at: Option<DateTime<Utc>>,
    ) -> Option<(RequestStatus, Option<DateTime<Utc>>)> {
        let doc = self.documents.iter_mut().find(|r| r.id == id)?;
        let prior = (doc.status, doc.updated_at);
        doc.status = status;
        doc.updated_at = updated_at;
        Some(prior)
    }

    pub fn known_ids(&self) -> Vec<String> {
        self.documents.iter().map(|r| r.id.clone()).collect()
    }

    pub fn mark_fresh<I: IntoIterator<Item = String>>(&mut self, ids: I, expiry: DateTime<Utc>) {
        for id in ids {
            self.fresh.insert(id, expiry);
        }
    }

    /// Drop fresh markers whose display window has passed.
    pub fn expire_fresh(&mut self, now: DateTime<Utc>) {
        self.fresh.retain(|_, expiry| *expiry > now);
    }

    pub fn is_fresh(&self, id: &str) -> bool {
        self.fresh.contains_key(id)
    }

    pub fn set_last_refreshed(&mut self, when: DateTime<Utc>) {
        self.last_refreshed = Some(when);
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.last_refreshed
    }
}

/// Read-only browser over a secondary collection: same search and
/// pagination mechanics as `RequestStore`, no status filter, no actions.
pub struct CollectionBrowser {
    collection: String,
    documents: Vec<Value>,
    search: String,
    page: usize,
    page_size: usize,
}

impl CollectionBrowser {
    pub fn new(collection: &str, page_size: usize) -> Self {
        Self {
            collection: collection.to_string(),
            documents: Vec::new(),
            search: String::new(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn replace_all(&mut self, documents: Vec<Value>) {
        self.documents = documents;
        let last = self.page_count();
        if self.page > last {
            self.page = last;
        }
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_string();
        self.page = 1;
    }

    pub fn set_page(&mut self, page: usize) -> bool {
        if page == 0 || page > self.page_count() {
            return false;
        }
        self.page = page;
        true
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        page_count_for(self.visible().len(), self.page_size)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn visible(&self) -> Vec<&Value> {
        self.documents
            .iter()
            .filter(|doc| matches_search(doc, &self.search))
            .collect()
    }

    pub fn page_slice(&self) -> Vec<&Value> {
        let visible = self.visible();
        let range = page_bounds(visible.len(), self.page, self.page_size);
        visible[range].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_is_case_insensitive_over_serialized_form() {
        let doc = json!({"name": "Ana Garcia", "skills": ["Color"]});
        assert!(matches_search(&doc, "ana gar"));
        assert!(matches_search(&doc, "COLOR"));
        assert!(matches_search(&doc, ""));
        assert!(!matches_search(&doc, "fade"));
    }

    #[test]
    fn page_bounds_clamps_final_partial_page() {
        assert_eq!(page_bounds(45, 1, 20), 0..20);
        assert_eq!(page_bounds(45, 2, 20), 20..40);
        assert_eq!(page_bounds(45, 3, 20), 40..45);
        assert_eq!(page_bounds(45, 4, 20), 0..0);
    }

    #[test]
    fn empty_set_still_has_one_page() {
        assert_eq!(page_count_for(0, 20), 1);
        assert_eq!(page_count_for(20, 20), 1);
        assert_eq!(page_count_for(21, 20), 2);
    }

    #[test]
    fn browser_paginates_and_searches() {
        let mut browser = CollectionBrowser::new("tasks", 2);
        browser.replace_all(vec![
            json!({"_id": "t1", "title": "Order supplies"}),
            json!({"_id": "t2", "title": "Update price list"}),
            json!({"_id": "t3", "title": "Order more towels"}),
        ]);
        assert_eq!(browser.page_count(), 2);
        assert!(browser.set_page(2));
        assert_eq!(browser.page_slice().len(), 1);
        assert!(!browser.set_page(3));

        browser.set_search("order");
        assert_eq!(browser.page(), 1);
        assert_eq!(browser.visible().len(), 2);
    }
}
