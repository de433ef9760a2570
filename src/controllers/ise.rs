//! Identity Services Engine adapter
//!
//! ERS list endpoints answer with a `SearchResult` of links. Every page is
//! followed, then every linked resource is fetched for its full detail.

use super::{append_query, client_config, ControllerAdapter};
use crate::auth::{AuthConfig, Credentials, ProbeEndpoint};
use crate::config::CollectorConfig;
use crate::decode::{value_at_path, Envelope, EnvelopeDecoder, Payload};
use crate::error::Result;
use crate::http::{HttpClient, RequestConfig};
use crate::loader::EndpointDefinition;
use crate::pagination::{
    collect_pages, path_and_query, NextPage, NextUrlPaginator, PaginationState, Paginator,
};
use crate::partition::IdFields;
use crate::types::Solution;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;
use tracing::{debug, warn};

const ID_FIELDS: [&str; 3] = ["id", "rule.id", "name"];

/// Marker of paged ERS list endpoints
const ERS_CONFIG: &str = "/ers/config/";

/// ISE adapter
pub struct IseAdapter {
    client: HttpClient,
    page_size: u32,
    envelope: Envelope,
    search_envelope: Envelope,
    search_paging: NextUrlPaginator,
}

impl IseAdapter {
    /// Create an adapter
    pub fn new(config: &CollectorConfig) -> Result<Self> {
        let http = client_config(config)
            .header("Content-Type", "application/json")
            .build();
        let auth = AuthConfig::BasicProbe {
            credentials: Credentials::new(&config.username, &config.password),
            probes: vec![
                ProbeEndpoint::new("/admin/API/NetworkAccessConfig/ERS", "application/xml"),
                ProbeEndpoint::new("/admin/API/apiService/get", "application/json"),
            ],
        };

        Ok(Self {
            client: HttpClient::with_auth(http, auth)?,
            page_size: config.ise_page_size,
            envelope: Envelope::field_or_single("response"),
            search_envelope: Envelope::path("SearchResult.resources"),
            search_paging: NextUrlPaginator::new("SearchResult.nextPage.href").rebased(),
        })
    }

    /// Every resource of a search, across all pages
    async fn search_resources(&self, first: Value) -> Result<Vec<Value>> {
        let mut state = PaginationState::new();
        let next = self
            .search_paging
            .process_response(&first, &HeaderMap::new(), 0, &mut state);
        let mut resources = self.search_envelope.unwrap_body(first).into_items();

        if let NextPage::Continue { url } = next {
            let rest = collect_pages(
                &self.client,
                &url,
                RequestConfig::new(),
                &self.search_paging,
                &self.search_envelope,
            )
            .await?;
            resources.extend(rest.into_items());
        }
        Ok(resources)
    }

    /// Detail of every linked resource; each value of a detail object is
    /// one item
    async fn resolve_details(&self, resources: Vec<Value>) -> Vec<Value> {
        let mut items = Vec::with_capacity(resources.len());

        for resource in resources {
            let Some(href) = value_at_path(&resource, "link.href").and_then(Value::as_str) else {
                items.push(resource);
                continue;
            };

            let path = path_and_query(href);
            match self.client.get_json(&path).await {
                Ok(Value::Object(detail)) => items.extend(detail.into_iter().map(|(_, v)| v)),
                Ok(other) => debug!(href = %path, body = %other, "Resource detail is not an object"),
                Err(e) => warn!(href = %path, error = %e, "Failed to fetch resource detail"),
            }
        }
        items
    }
}

#[async_trait]
impl ControllerAdapter for IseAdapter {
    fn solution(&self) -> Solution {
        Solution::Ise
    }

    fn client(&self) -> &HttpClient {
        &self.client
    }

    async fn fetch_data(&self, _def: &EndpointDefinition, path: &str) -> Result<Payload> {
        let url = if path.contains(ERS_CONFIG) {
            append_query(path, "size", self.page_size)
        } else {
            path.to_string()
        };

        let body = self.client.get_json(&url).await?;
        if body.get("SearchResult").is_none() {
            return Ok(self.envelope.unwrap_body(body));
        }

        let resources = self.search_resources(body).await?;
        debug!(endpoint = %path, resources = resources.len(), "Resolving search results");
        Ok(Payload::from_items(self.resolve_details(resources).await))
    }

    fn id_fields(&self, def: &EndpointDefinition) -> IdFields {
        IdFields::new(&ID_FIELDS).with_override(def.metadata.id_name.as_deref())
    }
}
