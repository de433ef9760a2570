//! YAML Loader module
//!
//! Parse endpoint definitions from YAML files.
//!
//! # Overview
//!
//! The loader module provides:
//! - `EndpointDefinition` - Declarative description of one API resource
//! - `EndpointKind` - How the traversal engine treats a definition
//! - YAML parsing with validation, packaged fallbacks and overrides

mod overrides;
mod parser;
mod types;

pub use overrides::{
    apply_overrides, insert_sorted, load_overrides, AdditionalEndpoint, EndpointOverrides,
    MoveOverride,
};
pub use parser::{
    find_placeholder_parent, load_endpoints, load_endpoints_from_str, resolve_endpoints,
    validate_endpoints,
};
pub use types::{
    DetailKind, EndpointDefinition, EndpointKind, EndpointMetadata, DOMAIN_TOKEN,
    LOOKUP_ID_TOKEN, PARENT_ID_TOKEN,
};
