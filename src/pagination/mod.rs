//! Pagination module
//!
//! Supports: Link Header (Meraki) and Next URL in the body (ISE ERS, FMC).
//!
//! # Overview
//!
//! Each strategy inspects a response and yields the next page URL, or
//! signals that pagination is complete. [`collect_pages`] drives a strategy
//! against an [`HttpClient`] and concatenates the unwrapped items of all
//! pages in order.

mod strategies;
mod types;

pub use strategies::{
    parse_link_header, path_and_query, LinkHeaderPaginator, NextUrlPaginator,
};
pub use types::{LinkRebase, NextPage, PaginationState, Paginator};

use crate::decode::{EnvelopeDecoder, Payload};
use crate::error::Result;
use crate::http::{HttpClient, RequestConfig};
use crate::types::Method;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Fetch `url` and every following page, concatenating the items.
///
/// `first` applies to the first request only; continuation URLs carry their
/// own query. A single-object response on the only page stays
/// [`Payload::Single`].
pub async fn collect_pages(
    client: &HttpClient,
    url: &str,
    first: RequestConfig,
    paginator: &dyn Paginator,
    envelope: &dyn EnvelopeDecoder,
) -> Result<Payload> {
    let mut state = PaginationState::new();
    let mut visited = HashSet::new();
    let mut items = Vec::new();
    let mut next_url = url.to_string();
    let mut request = Some(first);

    loop {
        visited.insert(next_url.clone());
        let config = request.take().unwrap_or_default();
        let response = client.request_json(Method::GET, &next_url, config).await?;

        let next = paginator.process_response(&response.body, &response.headers, 0, &mut state);
        let payload = envelope.unwrap_body(response.body);
        state.add_fetched(payload.len() as u64);

        match (next, payload) {
            (NextPage::Done, Payload::Single(value)) if items.is_empty() => {
                return Ok(Payload::Single(value));
            }
            (NextPage::Done, payload) => {
                items.extend(payload.into_items());
                break;
            }
            (NextPage::Continue { url }, payload) => {
                items.extend(payload.into_items());
                if visited.contains(&url) {
                    warn!(url = %url, "Pagination link repeats a visited page, stopping");
                    break;
                }
                debug!(page = state.page, next = %url, "Following next page");
                next_url = url;
            }
        }
    }

    debug!(url = %url, pages = state.page + 1, items = items.len(), "Pagination complete");
    Ok(Payload::from_items(items))
}
