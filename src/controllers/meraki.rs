//! Meraki Dashboard adapter
//!
//! API key on every call, `Link` header pagination, and a concurrent
//! fan-out whose egress is serialized by an admission gate.

use super::{client_config, ControllerAdapter};
use crate::auth::AuthConfig;
use crate::config::{CollectorConfig, MERAKI_BASE_URL};
use crate::decode::{Envelope, Payload};
use crate::engine::{FanOut, TraversalConfig};
use crate::error::Result;
use crate::http::{AdmissionConfig, HttpClient, RequestConfig};
use crate::loader::EndpointDefinition;
use crate::pagination::{collect_pages, LinkHeaderPaginator};
use crate::partition::{get_id_value, IdFields};
use crate::types::Solution;
use async_trait::async_trait;
use tracing::debug;

/// Definition whose items are filtered by the organization allow-list
pub const ORGANIZATION_ENDPOINT_NAME: &str = "organization";

/// Meraki Dashboard adapter
pub struct MerakiAdapter {
    client: HttpClient,
    org_ids: Option<Vec<String>>,
    envelope: Envelope,
    paginator: LinkHeaderPaginator,
}

impl MerakiAdapter {
    /// Create an adapter; an empty base URL selects the public dashboard
    pub fn new(config: &CollectorConfig) -> Result<Self> {
        let base_url = match config.base_url() {
            "" => MERAKI_BASE_URL,
            url => url,
        };

        let http = client_config(config)
            .base_url(base_url)
            .header("Content-Type", "application/json")
            .admission(AdmissionConfig::per_second(config.meraki_requests_per_second))
            .build();
        let auth = AuthConfig::ApiKey {
            key: config.password.clone(),
        };

        Ok(Self {
            client: HttpClient::with_auth(http, auth)?,
            org_ids: config.meraki_org_ids.clone(),
            envelope: Envelope::field_or_single("items"),
            paginator: LinkHeaderPaginator::default(),
        })
    }

    /// Keep only allowed organizations
    fn filter_organizations(&self, def: &EndpointDefinition, payload: Payload) -> Payload {
        let Some(allowed) = &self.org_ids else {
            return payload;
        };
        if def.name != ORGANIZATION_ENDPOINT_NAME || !matches!(payload, Payload::Items(_)) {
            return payload;
        }

        let fields = self.id_fields(def);
        let before = payload.len();
        let filtered = payload.filter(|org| {
            get_id_value(org, &fields).is_some_and(|id| allowed.contains(&id))
        });
        debug!(before, after = filtered.len(), "Filtered organizations");
        filtered
    }
}

#[async_trait]
impl ControllerAdapter for MerakiAdapter {
    fn solution(&self) -> Solution {
        Solution::Meraki
    }

    fn client(&self) -> &HttpClient {
        &self.client
    }

    async fn fetch_data(&self, def: &EndpointDefinition, path: &str) -> Result<Payload> {
        let payload = collect_pages(
            &self.client,
            path,
            RequestConfig::new(),
            &self.paginator,
            &self.envelope,
        )
        .await?;
        Ok(self.filter_organizations(def, payload))
    }

    fn id_fields(&self, def: &EndpointDefinition) -> IdFields {
        IdFields::single(def.metadata.id_name.as_deref().unwrap_or("id"))
    }

    fn appends_id(&self, def: &EndpointDefinition) -> bool {
        def.metadata.has_own_id
    }

    fn traversal_config(&self) -> TraversalConfig {
        TraversalConfig::new()
            .with_fan_out(FanOut::Concurrent)
            .with_import_ids(true)
            .with_keep_singletons(true)
    }
}
