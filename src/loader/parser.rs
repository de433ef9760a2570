//! YAML parser for endpoint definitions
//!
//! Parses and validates endpoint YAML files.
//! Supports both packaged endpoint sets (by solution) and custom YAML files (by path).

use crate::endpoints;
use crate::error::{Error, Result};
use crate::loader::types::{EndpointDefinition, PARENT_ID_TOKEN};
use crate::types::Solution;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Resolve the endpoint definitions for a run
///
/// An explicit file wins. When it does not exist the packaged set for the
/// solution is used instead, with a warning.
///
/// # Examples
///
/// ```ignore
/// // Packaged definitions
/// let endpoints = resolve_endpoints(Solution::Meraki, None)?;
///
/// // Custom definitions
/// let endpoints = resolve_endpoints(Solution::Ise, Some(Path::new("./ise.yaml")))?;
/// ```
pub fn resolve_endpoints(
    solution: Solution,
    path: Option<&Path>,
) -> Result<Vec<EndpointDefinition>> {
    if let Some(path) = path {
        if path.exists() {
            info!(path = %path.display(), "Loading endpoints from file");
            return load_endpoints(path);
        }
        warn!(
            path = %path.display(),
            solution = %solution,
            "Endpoints file not found, using packaged endpoints"
        );
    }

    let yaml = endpoints::get_builtin(solution).ok_or_else(|| Error::NoEndpoints {
        solution: solution.to_string(),
    })?;
    load_endpoints_from_str(yaml)
}

/// Load endpoint definitions from a YAML file
pub fn load_endpoints(path: impl AsRef<Path>) -> Result<Vec<EndpointDefinition>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::config(format!(
                "Failed to read endpoints file '{}': {}",
                path.display(),
                e
            ))
        }
    })?;
    load_endpoints_from_str(&content)
}

/// Load endpoint definitions from a YAML string
pub fn load_endpoints_from_str(yaml: &str) -> Result<Vec<EndpointDefinition>> {
    let defs: Vec<EndpointDefinition> = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse endpoints YAML: {e}")))?;

    validate_endpoints(&defs)?;
    Ok(defs)
}

/// Validate a definition forest
pub fn validate_endpoints(defs: &[EndpointDefinition]) -> Result<()> {
    validate_siblings(defs)?;

    for def in defs {
        let Some(prefix) = def.placeholder_parent() else {
            continue;
        };
        if find_placeholder_parent(defs, def).is_none() {
            return Err(Error::endpoint(
                &def.name,
                format!("no sibling endpoint provides the parent collection '{prefix}'"),
            ));
        }
    }

    Ok(())
}

/// Validate a sibling list and, recursively, every child list
fn validate_siblings(defs: &[EndpointDefinition]) -> Result<()> {
    let mut names = HashSet::new();

    for def in defs {
        if def.name.is_empty() {
            return Err(Error::config("Endpoint name cannot be empty"));
        }

        if def.endpoint.is_empty() {
            return Err(Error::endpoint(&def.name, "endpoint cannot be empty"));
        }

        // A repeated name is only meaningful when its items merge on a key
        if !names.insert(def.name.as_str()) && def.metadata.key.is_none() {
            return Err(Error::endpoint(&def.name, "duplicate name among siblings"));
        }

        validate_siblings(&def.children)?;
    }

    Ok(())
}

/// The sibling a `%v` definition takes its parent items from: the one whose
/// endpoint equals the path before `/%v`, else the first one nested under it
pub fn find_placeholder_parent<'a>(
    defs: &'a [EndpointDefinition],
    def: &EndpointDefinition,
) -> Option<&'a EndpointDefinition> {
    let prefix = def.placeholder_parent()?;
    let nested = format!("{prefix}/");

    defs.iter()
        .filter(|other| !other.endpoint.contains(PARENT_ID_TOKEN))
        .find(|other| other.endpoint == prefix)
        .or_else(|| {
            defs.iter()
                .filter(|other| !other.endpoint.contains(PARENT_ID_TOKEN))
                .find(|other| other.endpoint.starts_with(&nested))
        })
}
