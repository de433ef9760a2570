//! Catalyst Center adapter
//!
//! Payloads come wrapped in `{"response": ...}`. The global credential
//! endpoint answers with one object holding every credential family, so each
//! credential definition picks its own field out of it.

use super::{client_config, ControllerAdapter};
use crate::auth::{AuthConfig, Credentials};
use crate::config::CollectorConfig;
use crate::decode::{Envelope, EnvelopeDecoder, Payload};
use crate::error::Result;
use crate::http::HttpClient;
use crate::loader::EndpointDefinition;
use crate::partition::IdFields;
use crate::types::Solution;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

const ID_FIELDS: [&str; 2] = ["id", "name"];

/// Credential definition name to the response field holding its list
pub const CREDENTIAL_FIELDS: [(&str, &str); 6] = [
    ("credentials_cli", "cliCredential"),
    ("credentials_snmpv2_read", "snmpV2cRead"),
    ("credentials_snmpv2_write", "snmpV2cWrite"),
    ("credentials_snmpv3", "snmpV3"),
    ("credentials_https_read", "httpsRead"),
    ("credentials_https_write", "httpsWrite"),
];

/// Response field for a credential definition name
pub fn credential_field(name: &str) -> Option<&'static str> {
    CREDENTIAL_FIELDS
        .iter()
        .find(|(endpoint, _)| *endpoint == name)
        .map(|(_, field)| *field)
}

/// Catalyst Center adapter
pub struct CatalystCenterAdapter {
    client: HttpClient,
    envelope: Envelope,
}

impl CatalystCenterAdapter {
    /// Create an adapter
    pub fn new(config: &CollectorConfig) -> Result<Self> {
        let http = client_config(config)
            .header("Content-Type", "application/json")
            .build();
        let auth = AuthConfig::TokenBody {
            credentials: Credentials::new(&config.username, &config.password),
            token_path: "/dna/system/api/v1/auth/token".to_string(),
            token_field: "Token".to_string(),
            header_name: "X-Auth-Token".to_string(),
        };

        Ok(Self {
            client: HttpClient::with_auth(http, auth)?,
            envelope: Envelope::field_or_single("response"),
        })
    }

    fn normalize(&self, def: &EndpointDefinition, body: Value) -> Payload {
        let field = credential_field(&def.name);
        match (field, body.get("response")) {
            (Some(field), Some(Value::Object(response))) => {
                debug!(name = %def.name, field, "Selecting credential family");
                match response.get(field) {
                    Some(Value::Array(items)) => Payload::from_items(items.clone()),
                    Some(value @ Value::Object(_)) => Payload::Single(value.clone()),
                    _ => Payload::Empty,
                }
            }
            _ => self.envelope.unwrap_body(body),
        }
    }
}

#[async_trait]
impl ControllerAdapter for CatalystCenterAdapter {
    fn solution(&self) -> Solution {
        Solution::Catalystcenter
    }

    fn client(&self) -> &HttpClient {
        &self.client
    }

    async fn fetch_data(&self, def: &EndpointDefinition, path: &str) -> Result<Payload> {
        let body = self.client.get_json(path).await?;
        Ok(self.normalize(def, body))
    }

    fn id_fields(&self, def: &EndpointDefinition) -> IdFields {
        IdFields::new(&ID_FIELDS).with_override(def.metadata.id_name.as_deref())
    }
}
