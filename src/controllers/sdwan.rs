//! Catalyst SD-WAN Manager adapter
//!
//! Data paths are relative to `/dataservice`. Templates and feature profiles
//! are not exposed as flat lists, so they are collected in several steps:
//!
//! - feature templates: list, then `object/{templateId}` per entry
//! - feature profiles: list, then each profile, then each associated parcel
//! - CLI device templates: attached devices, then the rendered config input

use super::{client_config, ControllerAdapter};
use crate::auth::{AuthConfig, Credentials};
use crate::config::CollectorConfig;
use crate::decode::{Envelope, EnvelopeDecoder, Payload};
use crate::engine::CollectedItem;
use crate::error::Result;
use crate::http::HttpClient;
use crate::loader::{DetailKind, EndpointDefinition, EndpointKind, LOOKUP_ID_TOKEN};
use crate::partition::{get_id_value, IdFields};
use crate::types::Solution;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

const ID_FIELDS: [&str; 7] = [
    "id",
    "definitionId",
    "parcelId",
    "policyId",
    "templateId",
    "deviceId",
    "name",
];

/// Definition collected through attached devices
pub const DEVICE_TEMPLATE_NAME: &str = "cli_device_template";

/// Marker of feature profile endpoints
pub const FEATURE_PROFILE_MARKER: &str = "/v1/feature-profile/";

const CONFIG_INPUT_PATH: &str = "/template/device/config/input/";

/// SD-WAN adapter
pub struct SdwanAdapter {
    client: HttpClient,
    envelope: Envelope,
}

impl SdwanAdapter {
    /// Create an adapter
    pub fn new(config: &CollectorConfig) -> Result<Self> {
        let http = client_config(config)
            .base_url(format!("{}/dataservice", config.base_url()))
            .auth_base_url(config.base_url())
            .header("Content-Type", "application/json")
            .build();
        let auth = AuthConfig::FormSession {
            credentials: Credentials::new(&config.username, &config.password),
            login_path: "/j_security_check".to_string(),
            token_path: "/dataservice/client/token".to_string(),
        };

        Ok(Self {
            client: HttpClient::with_auth(http, auth)?,
            envelope: Envelope::field("data"),
        })
    }

    fn item(&self, def: &EndpointDefinition, data: Value, prefix: &str) -> CollectedItem {
        let endpoint = match self.get_id_value(&data, def) {
            Some(id) => format!("{}/{id}", prefix.trim_end_matches('/')),
            None => prefix.to_string(),
        };
        CollectedItem::new(data, endpoint)
    }

    async fn list(&self, path: &str) -> Result<Vec<Value>> {
        let body = self.client.get_json(path).await?;
        Ok(self.envelope.unwrap_body(body).into_items())
    }

    /// `.../object/%i`: one GET for the list, one per template
    async fn feature_templates(&self, def: &EndpointDefinition) -> Result<Vec<CollectedItem>> {
        let list_path = def.endpoint.replace("/object/%i", "");
        let prefix = lookup_prefix(&def.endpoint);

        let mut items = Vec::new();
        for entry in self.list(&list_path).await? {
            let Some(template_id) = get_id_value(&entry, &IdFields::single("templateId")) else {
                debug!(name = %def.name, "Template entry has no templateId");
                continue;
            };
            let path = format!("{list_path}/object/{template_id}");
            match self.client.get_json(&path).await {
                Ok(detail) => items.push(self.item(def, detail, prefix)),
                Err(e) => warn!(endpoint = %path, error = %e, "Failed to fetch template"),
            }
        }
        Ok(items)
    }

    /// Profiles, then every parcel associated with each profile
    async fn feature_profiles(&self, def: &EndpointDefinition) -> Result<Vec<CollectedItem>> {
        let profiles = match self.client.get_json(&def.endpoint).await? {
            Value::Array(profiles) => profiles,
            other => self.envelope.unwrap_body(other).into_items(),
        };

        let mut items = Vec::new();
        for profile in profiles {
            let Some(profile_id) = get_id_value(&profile, &IdFields::single("profileId")) else {
                continue;
            };
            let profile_path = format!("{}{profile_id}", def.endpoint);
            let detail = match self.client.get_json(&profile_path).await {
                Ok(detail) => detail,
                Err(e) => {
                    warn!(endpoint = %profile_path, error = %e, "Failed to fetch feature profile");
                    continue;
                }
            };

            let parcels = detail
                .get("associatedProfileParcels")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            for parcel in parcels {
                let (Some(parcel_type), Some(parcel_id)) = (
                    parcel.get("parcelType").and_then(Value::as_str),
                    get_id_value(&parcel, &IdFields::single("parcelId")),
                ) else {
                    continue;
                };
                let parcel_path = format!("{profile_path}/{parcel_type}/{parcel_id}");
                match self.client.get_json(&parcel_path).await {
                    Ok(data) => items.push(self.item(def, data, &parcel_path)),
                    Err(e) => warn!(endpoint = %parcel_path, error = %e, "Failed to fetch parcel"),
                }
            }
        }
        Ok(items)
    }

    /// Rendered configuration input of every template with attached devices
    async fn device_templates(&self, def: &EndpointDefinition) -> Result<Vec<CollectedItem>> {
        let prefix = lookup_prefix(&def.endpoint);
        let mut items = Vec::new();

        for template in self.list(&def.endpoint).await? {
            let attached = template.get("devicesAttached").and_then(Value::as_i64);
            if attached.unwrap_or(0) == 0 {
                continue;
            }
            let Some(template_id) = get_id_value(&template, &IdFields::single("templateId")) else {
                continue;
            };

            let attached_path = format!("{}config/attached/{template_id}", def.endpoint);
            let devices = match self.list(&attached_path).await {
                Ok(devices) => devices,
                Err(e) => {
                    warn!(endpoint = %attached_path, error = %e, "Failed to fetch attached devices");
                    continue;
                }
            };
            let device_ids: Vec<Value> = devices
                .iter()
                .filter_map(|device| device.get("uuid").cloned())
                .collect();

            let body = json!({
                "templateId": template_id,
                "deviceIds": device_ids,
                "isEdited": false,
                "isMasterEdited": false,
            });
            let response = match self.client.post_json(CONFIG_INPUT_PATH, body).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(template = %template_id, error = %e, "Failed to fetch config input");
                    continue;
                }
            };
            debug!(template = %template_id, devices = device_ids.len(), "Fetched config input");

            match self.envelope.unwrap_body(response) {
                Payload::Items(rows) => {
                    items.extend(rows.into_iter().map(|row| self.item(def, row, prefix)));
                }
                Payload::Single(data) => items.push(CollectedItem::new(data, &def.endpoint)),
                Payload::Empty => {}
            }
        }
        Ok(items)
    }
}

/// Endpoint up to the lookup token
fn lookup_prefix(endpoint: &str) -> &str {
    endpoint
        .split_once(&format!("/{LOOKUP_ID_TOKEN}"))
        .map_or(endpoint, |(prefix, _)| prefix)
}

#[async_trait]
impl ControllerAdapter for SdwanAdapter {
    fn solution(&self) -> Solution {
        Solution::Sdwan
    }

    fn client(&self) -> &HttpClient {
        &self.client
    }

    fn classify(&self, def: &EndpointDefinition) -> EndpointKind {
        if def.endpoint.contains(FEATURE_PROFILE_MARKER) {
            EndpointKind::MultiStepDetail(DetailKind::FeatureProfile)
        } else if def.name == DEVICE_TEMPLATE_NAME {
            EndpointKind::MultiStepDetail(DetailKind::DeviceTemplate)
        } else if def.has_lookup_placeholder() {
            EndpointKind::MultiStepDetail(DetailKind::FeatureTemplate)
        } else {
            def.default_kind()
        }
    }

    async fn fetch_data(&self, _def: &EndpointDefinition, path: &str) -> Result<Payload> {
        let body = self.client.get_json(path).await?;
        Ok(self.envelope.unwrap_body(body))
    }

    async fn fetch_multi_step(
        &self,
        def: &EndpointDefinition,
        kind: DetailKind,
    ) -> Result<Vec<CollectedItem>> {
        match kind {
            DetailKind::FeatureTemplate => self.feature_templates(def).await,
            DetailKind::FeatureProfile => self.feature_profiles(def).await,
            DetailKind::DeviceTemplate => self.device_templates(def).await,
        }
    }

    fn id_fields(&self, def: &EndpointDefinition) -> IdFields {
        IdFields::new(&ID_FIELDS).with_override(def.metadata.id_name.as_deref())
    }
}
