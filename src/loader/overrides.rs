//! Post-hoc adjustments to a discovered endpoint tree
//!
//! Two kinds of override are supported: moving a named endpoint under a
//! different parent, and adding endpoints discovery cannot infer. Sibling
//! lists touched by an override stay sorted by name.

use crate::error::{Error, Result};
use crate::loader::types::{EndpointDefinition, EndpointMetadata};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Overrides document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointOverrides {
    /// Endpoints to relocate
    #[serde(default)]
    pub moves: Vec<MoveOverride>,
    /// Endpoints to insert
    #[serde(default)]
    pub additions: Vec<AdditionalEndpoint>,
}

/// Relocate the endpoint called `name` under `parent`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOverride {
    /// Name of the endpoint to move (first match, depth-first)
    pub name: String,
    /// Destination as a `/`-separated path of names; empty for the top level
    #[serde(default)]
    pub parent: String,
    /// Replacement endpoint template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Identifier field name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_name: Option<String>,
    /// Items carry their own identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_own_id: Option<bool>,
    /// Children nest under this endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<bool>,
    /// Parent device types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_device_types: Option<Vec<String>>,
    /// Parent device model prefixes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_device_models: Option<Vec<String>>,
}

/// A synthetic endpoint, optionally nested under `parent`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalEndpoint {
    /// Destination as a `/`-separated path of names; absent for the top level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// The endpoint to insert
    #[serde(flatten)]
    pub definition: EndpointDefinition,
}

impl MoveOverride {
    /// Copy the attributes this override sets onto `def`
    fn apply_attributes(&self, def: &mut EndpointDefinition) {
        if let Some(endpoint) = &self.endpoint {
            def.endpoint.clone_from(endpoint);
        }
        self.apply_metadata(&mut def.metadata);
    }

    fn apply_metadata(&self, metadata: &mut EndpointMetadata) {
        if let Some(id_name) = &self.id_name {
            metadata.id_name = Some(id_name.clone());
        }
        if let Some(has_own_id) = self.has_own_id {
            metadata.has_own_id = has_own_id;
        }
        if let Some(root) = self.root {
            metadata.root = root;
        }
        if let Some(types) = &self.allowed_device_types {
            metadata.allowed_device_types = Some(types.clone());
        }
        if let Some(models) = &self.allowed_device_models {
            metadata.allowed_device_models = Some(models.clone());
        }
    }
}

/// Load an overrides document from a YAML file
pub fn load_overrides(path: impl AsRef<Path>) -> Result<EndpointOverrides> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::Io(e)
        }
    })?;
    serde_yaml::from_str(&content)
        .map_err(|e| Error::config(format!("Failed to parse overrides YAML: {e}")))
}

/// Apply moves, then additions, returning the adjusted tree
pub fn apply_overrides(
    mut defs: Vec<EndpointDefinition>,
    overrides: &EndpointOverrides,
) -> Result<Vec<EndpointDefinition>> {
    for mv in &overrides.moves {
        let mut moved = take_endpoint(&mut defs, &mv.name)
            .ok_or_else(|| Error::override_failed(&mv.name, "endpoint not found"))?;
        mv.apply_attributes(&mut moved);

        let siblings = siblings_at(&mut defs, &mv.parent)
            .ok_or_else(|| Error::override_failed(&mv.name, format!("parent '{}' not found", mv.parent)))?;

        if let Some(existing) = siblings.iter_mut().find(|d| d.endpoint == moved.endpoint) {
            debug!(name = %mv.name, into = %existing.name, "Merging moved endpoint");
            merge_into(existing, moved, mv);
        } else {
            debug!(name = %mv.name, parent = %mv.parent, "Moving endpoint");
            insert_sorted(siblings, moved);
        }
    }

    for addition in &overrides.additions {
        let name = &addition.definition.name;
        let parent = addition.parent.as_deref().unwrap_or_default();
        let siblings = siblings_at(&mut defs, parent)
            .ok_or_else(|| Error::override_failed(name, format!("parent '{parent}' not found")))?;

        if siblings.iter().any(|d| &d.name == name) {
            return Err(Error::override_failed(name, "an endpoint with this name already exists"));
        }
        insert_sorted(siblings, addition.definition.clone());
    }

    Ok(defs)
}

/// Merge a moved endpoint into one already at the destination
fn merge_into(existing: &mut EndpointDefinition, moved: EndpointDefinition, mv: &MoveOverride) {
    for child in moved.children {
        if !existing.children.iter().any(|c| c.name == child.name) {
            insert_sorted(&mut existing.children, child);
        }
    }
    if existing.metadata.id_name.is_none() {
        existing.metadata.id_name = moved.metadata.id_name;
    }
    mv.apply_metadata(&mut existing.metadata);
}

/// Remove and return the first endpoint called `name`, depth-first
fn take_endpoint(defs: &mut Vec<EndpointDefinition>, name: &str) -> Option<EndpointDefinition> {
    if let Some(pos) = defs.iter().position(|d| d.name == name) {
        return Some(defs.remove(pos));
    }
    defs.iter_mut().find_map(|d| take_endpoint(&mut d.children, name))
}

/// The sibling list at a `/`-separated name path
fn siblings_at<'a>(
    defs: &'a mut Vec<EndpointDefinition>,
    path: &str,
) -> Option<&'a mut Vec<EndpointDefinition>> {
    let mut current = defs;
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        let level = current;
        current = &mut level.iter_mut().find(|d| d.name == segment)?.children;
    }
    Some(current)
}

/// Insert keeping the list ordered by name
///
/// Discovered lists may arrive unordered, so the list is sorted (stably)
/// before the insert. Equal names keep their relative order and the new
/// definition goes after them.
pub fn insert_sorted(siblings: &mut Vec<EndpointDefinition>, def: EndpointDefinition) {
    siblings.sort_by(|a, b| a.name.cmp(&b.name));
    let pos = siblings.partition_point(|existing| existing.name <= def.name);
    siblings.insert(pos, def);
}
