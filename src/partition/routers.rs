//! Identifier lookup, child URL resolution and domain expansion

use super::types::{IdFields, PartitionRouter};
use crate::decode::value_at_path;
use crate::loader::{EndpointDefinition, DOMAIN_TOKEN, PARENT_ID_TOKEN};
use serde_json::Value;
use tracing::warn;

// ============================================================================
// Identifier Lookup
// ============================================================================

/// First candidate present on `item` as a string or integer
pub fn get_id_value(item: &Value, fields: &IdFields) -> Option<String> {
    fields
        .candidates()
        .iter()
        .find_map(|field| match value_at_path(item, field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
            _ => None,
        })
}

// ============================================================================
// Child URL Resolution
// ============================================================================

/// Concrete URL of a child under one parent item
///
/// A template containing `%v` gets the id substituted in place; otherwise
/// the result is `{parent_uri}/{parent_id}{template}`.
pub fn resolve_child_url(parent_uri: &str, parent_id: &str, template: &str) -> String {
    if template.contains(PARENT_ID_TOKEN) {
        template.replace(PARENT_ID_TOKEN, parent_id)
    } else {
        format!("{parent_uri}/{parent_id}{template}")
    }
}

// ============================================================================
// Domain Router
// ============================================================================

/// Expands `{DOMAIN_UUID}` definitions once per tenant domain
#[derive(Debug, Clone, Default)]
pub struct DomainRouter {
    domains: Vec<String>,
}

impl DomainRouter {
    /// Create a router for the given domain uuids
    pub fn new(domains: Vec<String>) -> Self {
        Self { domains }
    }

    /// Domains this router expands into
    pub fn domains(&self) -> &[String] {
        &self.domains
    }
}

impl PartitionRouter for DomainRouter {
    fn expand(&self, defs: Vec<EndpointDefinition>) -> Vec<EndpointDefinition> {
        let mut expanded = Vec::with_capacity(defs.len());

        for def in defs {
            if !def.is_domain_scoped() {
                expanded.push(def);
                continue;
            }

            if self.domains.is_empty() {
                warn!(endpoint = %def.endpoint, "No domains known, skipping domain endpoint");
            }
            for domain in &self.domains {
                expanded.push(with_domain(&def, domain));
            }
        }

        expanded
    }
}

fn with_domain(def: &EndpointDefinition, domain: &str) -> EndpointDefinition {
    let mut def = def.clone();
    def.endpoint = def.endpoint.replace(DOMAIN_TOKEN, domain);
    def.children = def.children.iter().map(|c| with_domain(c, domain)).collect();
    def
}
