//! Secure Firewall Management Center adapter
//!
//! Token headers from a basic-auth handshake, tenant domain fan-out before
//! traversal, and `paging.next` pagination of `items` lists.

use super::{append_query, client_config, ControllerAdapter};
use crate::auth::{AuthConfig, Credentials};
use crate::config::{CollectorConfig, FMC_REQUESTS_PER_SECOND};
use crate::decode::{value_at_path, Envelope, Payload};
use crate::error::Result;
use crate::http::{HttpClient, RateLimiterConfig, RequestConfig};
use crate::loader::EndpointDefinition;
use crate::pagination::{collect_pages, NextPage, PaginationState, Paginator};
use crate::partition::{DomainRouter, IdFields, PartitionRouter};
use crate::types::Solution;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;
use tracing::{debug, info};

const ID_FIELDS: [&str; 3] = ["id", "uuid", "name"];

/// FMC adapter
pub struct FmcAdapter {
    client: HttpClient,
    page_limit: u32,
    envelope: Envelope,
}

impl FmcAdapter {
    /// Create an adapter
    pub fn new(config: &CollectorConfig) -> Result<Self> {
        let http = client_config(config)
            .header("Content-Type", "application/json")
            .rate_limit(RateLimiterConfig::new(FMC_REQUESTS_PER_SECOND, 1))
            .build();
        let auth = AuthConfig::TokenHeaders {
            credentials: Credentials::new(&config.username, &config.password),
            token_path: "/api/fmc_platform/v1/auth/generatetoken".to_string(),
            refresh_path: "/api/fmc_platform/v1/auth/refreshtoken".to_string(),
            access_header: "X-auth-access-token".to_string(),
            refresh_header: "X-auth-refresh-token".to_string(),
            domains_header: "DOMAINS".to_string(),
        };

        Ok(Self {
            client: HttpClient::with_auth(http, auth)?,
            page_limit: config.fmc_page_limit,
            envelope: Envelope::field("items"),
        })
    }
}

/// Follows `paging.next[0]`, keeping only its query and applying it to the
/// endpoint being paged
#[derive(Debug, Clone)]
struct FmcPaging {
    endpoint: String,
}

impl Paginator for FmcPaging {
    fn process_response(
        &self,
        body: &Value,
        _headers: &HeaderMap,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage {
        state.add_fetched(records_count as u64);

        let query = value_at_path(body, "paging.next.0")
            .and_then(Value::as_str)
            .and_then(|next| next.split_once('?'))
            .map(|(_, query)| query);

        match query {
            Some(query) if !query.is_empty() => {
                state.next_page();
                NextPage::with_url(format!("{}?{query}", self.endpoint))
            }
            _ => {
                state.mark_done();
                NextPage::Done
            }
        }
    }
}

/// Drop items whose owning domain is not the one in `endpoint`
///
/// Objects inherited from a parent domain are listed again under every
/// child domain.
fn filter_domain_items(endpoint: &str, payload: Payload) -> Payload {
    payload.filter(|item| {
        match value_at_path(item, "metadata.domain.id").and_then(Value::as_str) {
            Some(domain) => endpoint.contains(domain),
            None => true,
        }
    })
}

#[async_trait]
impl ControllerAdapter for FmcAdapter {
    fn solution(&self) -> Solution {
        Solution::Fmc
    }

    fn client(&self) -> &HttpClient {
        &self.client
    }

    async fn prepare(&self, defs: Vec<EndpointDefinition>) -> Vec<EndpointDefinition> {
        let domains: Vec<String> = self
            .client
            .domains()
            .await
            .into_iter()
            .map(|domain| domain.uuid)
            .collect();
        info!(count = domains.len(), "Expanding domain endpoints");
        DomainRouter::new(domains).expand(defs)
    }

    async fn fetch_data(&self, _def: &EndpointDefinition, path: &str) -> Result<Payload> {
        let first = append_query(&append_query(path, "expanded", "true"), "limit", self.page_limit);
        let paging = FmcPaging {
            endpoint: path.to_string(),
        };

        let payload = collect_pages(
            &self.client,
            &first,
            RequestConfig::new(),
            &paging,
            &self.envelope,
        )
        .await?;

        let before = payload.len();
        let payload = filter_domain_items(path, payload);
        if payload.len() != before {
            debug!(endpoint = %path, dropped = before - payload.len(), "Dropped inherited items");
        }
        Ok(payload)
    }

    fn id_fields(&self, def: &EndpointDefinition) -> IdFields {
        IdFields::new(&ID_FIELDS).with_override(def.metadata.id_name.as_deref())
    }
}
