//! Loader types
//!
//! Declarative endpoint definition types for YAML parsing.

use serde::{Deserialize, Serialize};

/// Token replaced by the parent item's identifier
pub const PARENT_ID_TOKEN: &str = "%v";

/// Token replaced by identifiers from a lookup list fetched first
pub const LOOKUP_ID_TOKEN: &str = "%i";

/// Token replaced by each FMC tenant domain uuid
pub const DOMAIN_TOKEN: &str = "{DOMAIN_UUID}";

// ============================================================================
// Endpoint Definition
// ============================================================================

/// One API resource to collect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDefinition {
    /// Key of this resource in the result tree, unique among siblings
    pub name: String,
    /// URL path template
    pub endpoint: String,
    /// Nested resources fetched per item of this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<EndpointDefinition>,
    /// Adapter-specific flags
    #[serde(flatten)]
    pub metadata: EndpointMetadata,
}

/// Optional, adapter-specific endpoint flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointMetadata {
    /// Items carry their own identifier (appended to the item endpoint)
    #[serde(default, skip_serializing_if = "is_false")]
    pub has_own_id: bool,
    /// Identifier field name, tried before the adapter's candidates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_name: Option<String>,
    /// Children nest under this endpoint instead of the full parent URL
    #[serde(default, skip_serializing_if = "is_false")]
    pub root: bool,
    /// Parent device types this endpoint applies to
    #[serde(
        default,
        alias = "device_type",
        alias = "device_types",
        skip_serializing_if = "Option::is_none"
    )]
    pub allowed_device_types: Option<Vec<String>>,
    /// Parent device model prefixes this endpoint applies to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_device_models: Option<Vec<String>>,
    /// Field used to merge items collected under the same name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

impl EndpointDefinition {
    /// Create a definition without children or metadata
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            children: Vec::new(),
            metadata: EndpointMetadata::default(),
        }
    }

    /// Add a child definition
    #[must_use]
    pub fn with_child(mut self, child: EndpointDefinition) -> Self {
        self.children.push(child);
        self
    }

    /// Set the metadata
    #[must_use]
    pub fn with_metadata(mut self, metadata: EndpointMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// True when this definition has nested children
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// True when the endpoint carries the parent identifier token
    pub fn has_parent_placeholder(&self) -> bool {
        self.endpoint.contains(PARENT_ID_TOKEN)
    }

    /// True when the endpoint carries the lookup identifier token
    pub fn has_lookup_placeholder(&self) -> bool {
        self.endpoint.contains(LOOKUP_ID_TOKEN)
    }

    /// True when the endpoint is expanded per tenant domain
    pub fn is_domain_scoped(&self) -> bool {
        self.endpoint.contains(DOMAIN_TOKEN)
    }

    /// Endpoint path before `/%v`, naming the collection the parent ids
    /// come from
    pub fn placeholder_parent(&self) -> Option<&str> {
        self.endpoint
            .find(&format!("/{PARENT_ID_TOKEN}"))
            .map(|pos| &self.endpoint[..pos])
    }

    /// The kind the traversal engine uses when no adapter refines it
    pub fn default_kind(&self) -> EndpointKind {
        if self.is_domain_scoped() {
            EndpointKind::DomainFanout
        } else if self.has_parent_placeholder() {
            EndpointKind::ParentPlaceholder
        } else if self.has_children() {
            EndpointKind::WithChildren
        } else {
            EndpointKind::Plain
        }
    }
}

// ============================================================================
// Endpoint Kind
// ============================================================================

/// How the traversal engine handles a definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// Single fetch, no children
    Plain,
    /// Fetch, then resolve children per item
    WithChildren,
    /// Expanded once per tenant domain before traversal
    DomainFanout,
    /// Resolved after its parent collection, once per parent item
    ParentPlaceholder,
    /// Summary list followed by per-item detail fetches
    MultiStepDetail(DetailKind),
}

/// Multi-step detail variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailKind {
    /// `/template/feature/object/%i`: template list, then each template
    FeatureTemplate,
    /// `/v1/feature-profile/...`: profiles, then each profile's parcels
    FeatureProfile,
    /// CLI device templates: attached devices, then the rendered config
    DeviceTemplate,
}
