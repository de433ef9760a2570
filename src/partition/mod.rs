//! Partition routing module
//!
//! Supports: identifier lookup, parent conditions, child URLs, tenant domains
//!
//! # Overview
//!
//! Child endpoints are partitioned by their parent's items: each parent item
//! contributes an identifier, used to build the child's concrete URL, and the
//! attributes that decide whether the child applies at all. FMC endpoints are
//! additionally partitioned by tenant domain before traversal begins.

mod routers;
mod types;

pub use routers::{get_id_value, resolve_child_url, DomainRouter};
pub use types::{IdFields, ParentConditions, PartitionRouter, DEVICE_ENDPOINT_NAME};

#[cfg(test)]
mod tests;
