//! Pagination types and traits
//!
//! Defines the core pagination abstractions used by all strategies.

use reqwest::header::HeaderMap;
use serde_json::Value;

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// More pages available at this URL (absolute, or relative to the base URL)
    Continue {
        /// URL of the next page
        url: String,
    },
    /// No more pages
    Done,
}

impl NextPage {
    /// Create a continuation with a new URL
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::Continue { url: url.into() }
    }

    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// How a continuation link is turned into a request URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkRebase {
    /// Use the link as given
    #[default]
    Absolute,
    /// Keep only path and query, so the request goes to the configured base
    /// URL even when the controller advertises another host name
    PathAndQuery,
}

/// Running pagination state
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Pages fetched so far
    pub page: u32,
    /// Total records fetched so far
    pub total_fetched: u64,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    /// Increment page number
    pub fn next_page(&mut self) {
        self.page += 1;
    }

    /// Add to total fetched
    pub fn add_fetched(&mut self, count: u64) {
        self.total_fetched += count;
    }
}

/// Core trait for pagination strategies
pub trait Paginator: Send + Sync {
    /// Process a response and determine if there's a next page
    fn process_response(
        &self,
        body: &Value,
        headers: &HeaderMap,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage;
}
