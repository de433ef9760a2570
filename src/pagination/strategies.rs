//! Pagination strategy implementations

use super::types::{LinkRebase, NextPage, PaginationState, Paginator};
use crate::decode::value_at_path;
use reqwest::header::HeaderMap;
use serde_json::Value;

// ============================================================================
// Link Header Pagination
// ============================================================================

/// RFC 5988 `Link` header pagination
#[derive(Debug, Clone)]
pub struct LinkHeaderPaginator {
    /// Rel value to follow (default: "next")
    pub rel: String,
}

impl Default for LinkHeaderPaginator {
    fn default() -> Self {
        Self {
            rel: "next".to_string(),
        }
    }
}

impl LinkHeaderPaginator {
    /// Create a new link header paginator
    pub fn new(rel: impl Into<String>) -> Self {
        Self { rel: rel.into() }
    }
}

impl Paginator for LinkHeaderPaginator {
    fn process_response(
        &self,
        _body: &Value,
        headers: &HeaderMap,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage {
        state.add_fetched(records_count as u64);

        if let Some(link_header) = headers.get("link").and_then(|v| v.to_str().ok()) {
            if let Some(next_url) = parse_link_header(link_header, &self.rel) {
                state.next_page();
                return NextPage::with_url(next_url);
            }
        }

        state.mark_done();
        NextPage::Done
    }
}

/// Parse a Link header and extract the URL for the given rel
pub fn parse_link_header(header: &str, target_rel: &str) -> Option<String> {
    // Link header format: <url>; rel="next", <url>; rel="prev"
    for part in header.split(',') {
        let part = part.trim();
        let mut url = None;
        let mut rel = None;

        for segment in part.split(';') {
            let segment = segment.trim();
            if segment.starts_with('<') && segment.ends_with('>') {
                url = Some(&segment[1..segment.len() - 1]);
            } else if let Some(stripped) = segment.strip_prefix("rel=") {
                let rel_value = stripped.trim_matches('"').trim_matches('\'');
                rel = Some(rel_value);
            }
        }

        if let (Some(u), Some(r)) = (url, rel) {
            if r == target_rel {
                return Some(u.to_string());
            }
        }
    }

    None
}

// ============================================================================
// Next URL Pagination
// ============================================================================

/// Next URL pagination (URL in response body)
///
/// ISE ERS: `SearchResult.nextPage.href`; FMC: `paging.next[0]`.
#[derive(Debug, Clone)]
pub struct NextUrlPaginator {
    /// Dot path of the next URL in the body
    pub path: String,
    /// How the link becomes a request URL
    pub rebase: LinkRebase,
}

impl NextUrlPaginator {
    /// Create a new next URL paginator
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            rebase: LinkRebase::Absolute,
        }
    }

    /// Rebase links onto the configured base URL
    #[must_use]
    pub fn rebased(mut self) -> Self {
        self.rebase = LinkRebase::PathAndQuery;
        self
    }
}

impl Paginator for NextUrlPaginator {
    fn process_response(
        &self,
        body: &Value,
        _headers: &HeaderMap,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage {
        state.add_fetched(records_count as u64);

        match value_at_path(body, &self.path).and_then(Value::as_str) {
            Some(next) if !next.is_empty() => {
                state.next_page();
                let url = match self.rebase {
                    LinkRebase::Absolute => next.to_string(),
                    LinkRebase::PathAndQuery => path_and_query(next),
                };
                NextPage::with_url(url)
            }
            _ => {
                state.mark_done();
                NextPage::Done
            }
        }
    }
}

/// Path and query of a link; relative links are returned unchanged
pub fn path_and_query(link: &str) -> String {
    match url::Url::parse(link) {
        Ok(parsed) => match parsed.query() {
            Some(query) => format!("{}?{query}", parsed.path()),
            None => parsed.path().to_string(),
        },
        Err(_) => link.to_string(),
    }
}
