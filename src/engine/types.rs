//! Engine types
//!
//! Result tree types and configuration for the traversal engine.

use crate::decode::merge_values;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

// ============================================================================
// Collected Items
// ============================================================================

/// One fetched resource instance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectedItem {
    /// Raw JSON object of the resource
    pub data: Value,
    /// Concrete URL path the item was fetched from or derived at
    pub endpoint: String,
    /// Child endpoint results, keyed by child name in definition order
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub children: IndexMap<String, ResultEntry>,
    /// Ancestor identifiers plus this item's own identifier
    #[serde(
        rename = "terraform_import_ids",
        skip_serializing_if = "Option::is_none"
    )]
    pub import_ids: Option<Vec<String>>,
}

impl CollectedItem {
    /// Create an item without children
    pub fn new(data: Value, endpoint: impl Into<String>) -> Self {
        Self {
            data,
            endpoint: endpoint.into(),
            children: IndexMap::new(),
            import_ids: None,
        }
    }

    /// Set the import identifiers
    #[must_use]
    pub fn with_import_ids(mut self, ids: Option<Vec<String>>) -> Self {
        self.import_ids = ids;
        self
    }

    /// Attach a child result
    pub fn attach(&mut self, name: impl Into<String>, entry: ResultEntry) {
        self.children.insert(name.into(), entry);
    }
}

/// Error stored in place of data for a failed endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    /// HTTP status, when the failure had one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Failure description
    pub message: String,
}

impl From<&Error> for ErrorRecord {
    fn from(error: &Error) -> Self {
        Self {
            status_code: error.status_code(),
            message: error.to_string(),
        }
    }
}

// ============================================================================
// Result Entries
// ============================================================================

/// What one endpoint name resolves to
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultEntry {
    /// Ordered items
    Items(Vec<CollectedItem>),
    /// A singleton resource kept as one record
    Single(Box<CollectedItem>),
    /// The fetch failed
    Error {
        /// Failure details
        error: ErrorRecord,
        /// URL that failed
        endpoint: String,
    },
}

impl Default for ResultEntry {
    fn default() -> Self {
        ResultEntry::Items(Vec::new())
    }
}

impl ResultEntry {
    /// Error record for a failed fetch of `endpoint`
    pub fn error(error: &Error, endpoint: impl Into<String>) -> Self {
        ResultEntry::Error {
            error: ErrorRecord::from(error),
            endpoint: endpoint.into(),
        }
    }

    /// Number of items carried
    pub fn len(&self) -> usize {
        match self {
            ResultEntry::Items(items) => items.len(),
            ResultEntry::Single(_) => 1,
            ResultEntry::Error { .. } => 0,
        }
    }

    /// True for an empty item list
    pub fn is_empty(&self) -> bool {
        matches!(self, ResultEntry::Items(items) if items.is_empty())
    }

    /// True for an error record
    pub fn is_error(&self) -> bool {
        matches!(self, ResultEntry::Error { .. })
    }

    /// Items, when this entry is a list
    pub fn items(&self) -> Option<&[CollectedItem]> {
        match self {
            ResultEntry::Items(items) => Some(items),
            _ => None,
        }
    }

    /// Mutable items, when this entry is a list
    pub fn items_mut(&mut self) -> Option<&mut Vec<CollectedItem>> {
        match self {
            ResultEntry::Items(items) => Some(items),
            _ => None,
        }
    }

    /// Fold a later result for the same name into this one
    ///
    /// Lists extend, or merge item-wise on `key` when given. Data replaces an
    /// error; an error never replaces data.
    pub fn absorb(&mut self, other: ResultEntry, key: Option<&str>) {
        let current = std::mem::take(self);
        *self = match (current, other) {
            (ResultEntry::Items(mut items), ResultEntry::Items(more)) => {
                match key {
                    Some(key) => merge_on_key(&mut items, more, key),
                    None => items.extend(more),
                }
                ResultEntry::Items(items)
            }
            (ResultEntry::Items(mut items), ResultEntry::Single(item)) => {
                items.push(*item);
                ResultEntry::Items(items)
            }
            (ResultEntry::Single(item), ResultEntry::Items(more)) => {
                let mut items = vec![*item];
                items.extend(more);
                ResultEntry::Items(items)
            }
            (ResultEntry::Single(first), ResultEntry::Single(second)) => {
                ResultEntry::Items(vec![*first, *second])
            }
            (ResultEntry::Error { .. }, data) => data,
            (data, ResultEntry::Error { endpoint, .. }) => {
                debug!(endpoint = %endpoint, "Keeping collected data over a later failure");
                data
            }
        };
    }
}

fn merge_on_key(items: &mut Vec<CollectedItem>, more: Vec<CollectedItem>, key: &str) {
    for item in more {
        let existing = item.data.get(key).and_then(|value| {
            items
                .iter_mut()
                .find(|candidate| candidate.data.get(key) == Some(value))
        });
        match existing {
            Some(existing) => merge_values(&item.data, &mut existing.data),
            None => items.push(item),
        }
    }
}

// ============================================================================
// Result Tree
// ============================================================================

/// Top-level collection result, keyed by root endpoint name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultTree {
    entries: IndexMap<String, ResultEntry>,
}

impl ResultTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a result; a repeated name extends the existing bucket
    pub fn insert(&mut self, name: impl Into<String>, entry: ResultEntry, key: Option<&str>) {
        match self.entries.entry(name.into()) {
            indexmap::map::Entry::Occupied(mut slot) => slot.get_mut().absorb(entry, key),
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(entry);
            }
        }
    }

    /// Get a bucket
    pub fn get(&self, name: &str) -> Option<&ResultEntry> {
        self.entries.get(name)
    }

    /// Get a mutable bucket
    pub fn get_mut(&mut self, name: &str) -> Option<&mut ResultEntry> {
        self.entries.get_mut(name)
    }

    /// Number of buckets
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was collected
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Buckets in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ResultEntry)> {
        self.entries.iter()
    }

    /// Serialize to a JSON value
    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Serialize to pretty-printed JSON text
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ============================================================================
// Configuration and Statistics
// ============================================================================

/// How sibling fetches of one tree level are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FanOut {
    /// One fetch at a time, depth-first
    #[default]
    Sequential,
    /// All (child x parent item) fetches of a level at once
    Concurrent,
}

/// Configuration for a traversal
#[derive(Debug, Clone, Default)]
pub struct TraversalConfig {
    /// Scheduling of child fetches
    pub fan_out: FanOut,
    /// Record ancestor identifiers on every item
    pub import_ids: bool,
    /// Keep singleton responses as one record instead of a one-item list
    pub keep_singletons: bool,
}

impl TraversalConfig {
    /// Create a new traversal config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fan-out mode
    #[must_use]
    pub fn with_fan_out(mut self, fan_out: FanOut) -> Self {
        self.fan_out = fan_out;
        self
    }

    /// Record import identifiers
    #[must_use]
    pub fn with_import_ids(mut self, enabled: bool) -> Self {
        self.import_ids = enabled;
        self
    }

    /// Keep singletons as single records
    #[must_use]
    pub fn with_keep_singletons(mut self, enabled: bool) -> Self {
        self.keep_singletons = enabled;
        self
    }
}

/// A child fetch skipped by a parent condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFetch {
    /// URL that was not fetched
    pub endpoint: String,
    /// Why
    pub reason: String,
}

/// Statistics from a traversal
#[derive(Debug, Clone, Default)]
pub struct CollectStats {
    /// Endpoint fetches attempted
    pub fetches: usize,
    /// Items collected
    pub items: usize,
    /// Failed fetches
    pub failures: usize,
    /// Fetches skipped by parent conditions
    pub skipped: Vec<SkippedFetch>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl CollectStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fetch
    pub fn add_fetch(&mut self) {
        self.fetches += 1;
    }

    /// Add items
    pub fn add_items(&mut self, count: usize) {
        self.items += count;
    }

    /// Add a failure
    pub fn add_failure(&mut self) {
        self.failures += 1;
    }

    /// Record a skipped fetch
    pub fn add_skipped(&mut self, endpoint: impl Into<String>, reason: impl Into<String>) {
        self.skipped.push(SkippedFetch {
            endpoint: endpoint.into(),
            reason: reason.into(),
        });
    }

    /// Fold in the stats of a subtree
    pub fn merge(&mut self, other: CollectStats) {
        self.fetches += other.fetches;
        self.items += other.items;
        self.failures += other.failures;
        self.skipped.extend(other.skipped);
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
