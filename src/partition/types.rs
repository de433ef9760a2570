//! Partition types and traits
//!
//! Identifier candidates, parent-derived conditions and the router trait.

use crate::loader::EndpointDefinition;
use serde_json::Value;

// ============================================================================
// Identifier Fields
// ============================================================================

/// Ordered identifier field candidates; the first one present wins
///
/// Candidates are dot paths, so nested ids such as `rule.id` work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdFields {
    candidates: Vec<String>,
}

impl IdFields {
    /// Create from an ordered candidate list
    pub fn new<S: AsRef<str>>(candidates: &[S]) -> Self {
        Self {
            candidates: candidates.iter().map(|c| c.as_ref().to_string()).collect(),
        }
    }

    /// Exactly one candidate
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            candidates: vec![name.into()],
        }
    }

    /// Try `field` before the other candidates
    #[must_use]
    pub fn with_override(mut self, field: Option<&str>) -> Self {
        if let Some(field) = field {
            self.candidates.retain(|c| c != field);
            self.candidates.insert(0, field.to_string());
        }
        self
    }

    /// Candidates in lookup order
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }
}

// ============================================================================
// Parent Conditions
// ============================================================================

/// Name of the definition whose items describe a device
pub const DEVICE_ENDPOINT_NAME: &str = "device";

/// Attributes observed on ancestor items that gate child fetches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentConditions {
    /// Device product type (e.g. `switch`, `camera`)
    pub device_type: Option<String>,
    /// Device model (e.g. `MS390-24`)
    pub device_model: Option<String>,
}

impl ParentConditions {
    /// Conditions for the children of `item`, collected under `parent`
    ///
    /// Device items replace the device attributes; other items inherit them.
    #[must_use]
    pub fn inherit(&self, parent: &EndpointDefinition, item: &Value) -> Self {
        if parent.name != DEVICE_ENDPOINT_NAME {
            return self.clone();
        }
        Self {
            device_type: item
                .get("productType")
                .and_then(Value::as_str)
                .map(str::to_string),
            device_model: item.get("model").and_then(Value::as_str).map(str::to_string),
        }
    }

    /// Why `child` must not be fetched under these conditions, if it must not
    pub fn skip_reason(&self, child: &EndpointDefinition) -> Option<String> {
        if let (Some(allowed), Some(device_type)) =
            (&child.metadata.allowed_device_types, &self.device_type)
        {
            if !allowed.iter().any(|t| t == device_type) {
                return Some(format!(
                    "the endpoint is not applicable for device type {device_type}"
                ));
            }
        }

        if let (Some(allowed), Some(device_model)) =
            (&child.metadata.allowed_device_models, &self.device_model)
        {
            if !allowed.iter().any(|prefix| device_model.starts_with(prefix.as_str())) {
                return Some(format!(
                    "the endpoint is not applicable for device model {device_model}"
                ));
            }
        }

        None
    }
}

// ============================================================================
// Router Trait
// ============================================================================

/// Trait for routers that expand definitions before traversal
pub trait PartitionRouter: Send + Sync {
    /// Expand the definition list
    fn expand(&self, defs: Vec<EndpointDefinition>) -> Vec<EndpointDefinition>;
}
