//! Nexus Dashboard Orchestrator adapter

use super::{client_config, ControllerAdapter};
use crate::auth::AuthConfig;
use crate::config::CollectorConfig;
use crate::decode::{Envelope, EnvelopeDecoder, Payload};
use crate::error::Result;
use crate::http::HttpClient;
use crate::loader::EndpointDefinition;
use crate::partition::IdFields;
use crate::types::Solution;
use async_trait::async_trait;
use serde_json::json;

const ID_FIELDS: [&str; 3] = ["id", "templateId", "name"];

/// NDO adapter
///
/// Object responses carry their list under the endpoint's own name, e.g.
/// `GET /mso/api/v1/tenants` returns `{"tenants": [...]}`. Objects without
/// that key are single resources, such as one template.
pub struct NdoAdapter {
    client: HttpClient,
}

impl NdoAdapter {
    /// Create an adapter
    pub fn new(config: &CollectorConfig) -> Result<Self> {
        let http = client_config(config)
            .header("Content-Type", "application/json")
            .build();
        let auth = AuthConfig::JsonLogin {
            login_path: "/login".to_string(),
            body: json!({
                "userName": config.username,
                "userPasswd": config.password,
                "domain": "DefaultAuth",
            }),
        };

        Ok(Self {
            client: HttpClient::with_auth(http, auth)?,
        })
    }
}

#[async_trait]
impl ControllerAdapter for NdoAdapter {
    fn solution(&self) -> Solution {
        Solution::Ndo
    }

    fn client(&self) -> &HttpClient {
        &self.client
    }

    async fn fetch_data(&self, def: &EndpointDefinition, path: &str) -> Result<Payload> {
        let body = self.client.get_json(path).await?;
        Ok(Envelope::field_or_single(def.name.as_str()).unwrap_body(body))
    }

    fn id_fields(&self, def: &EndpointDefinition) -> IdFields {
        IdFields::new(&ID_FIELDS).with_override(def.metadata.id_name.as_deref())
    }
}
