//! Query results
//!
//! One page of records plus the count and flags needed to render paging
//! controls. Local and remote sources produce the same shape.

use serde::{Deserialize, Serialize};

use super::pager::{page_links, PageLink};

/// A single page of query results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPage<T> {
    /// Records on this page, at most `page_size`
    pub items: Vec<T>,
    /// Records surviving search and filters, before pagination
    pub total_count: usize,
    pub is_filtered: bool,
    pub is_sorted: bool,
    pub is_searched: bool,
    /// Zero-based index this page was requested at
    pub page_index: usize,
    pub page_size: usize,
}

impl<T> ResultPage<T> {
    /// Empty page for the given paging request
    pub fn empty(page_index: usize, page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            is_filtered: false,
            is_sorted: false,
            is_searched: false,
            page_index,
            page_size,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Number of pages needed for `total_count`
    pub fn total_pages(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.total_count.div_ceil(self.page_size)
    }

    /// True when no records follow this page
    pub fn is_last_page(&self) -> bool {
        self.page_index.saturating_add(1) >= self.total_pages()
    }

    /// Navigation strip around this page
    pub fn page_links(&self) -> Vec<PageLink> {
        page_links(self.total_pages(), self.page_index.saturating_add(1))
    }

    /// Converts items, keeping count and flags
    pub fn map<U, F>(self, f: F) -> ResultPage<U>
    where
        F: FnMut(T) -> U,
    {
        ResultPage {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            is_filtered: self.is_filtered,
            is_sorted: self.is_sorted,
            is_searched: self.is_searched,
            page_index: self.page_index,
            page_size: self.page_size,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}
