//! Envelope types and traits
//!
//! Defines the normalized payload and the envelope shapes controllers use.

use serde_json::Value;

/// Normalized response content
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Payload {
    /// Ordered list of item objects
    Items(Vec<Value>),
    /// A singleton resource
    Single(Value),
    /// Nothing usable in the response
    #[default]
    Empty,
}

impl Payload {
    /// Build from a list, mapping an empty list to `Empty`
    pub fn from_items(items: Vec<Value>) -> Self {
        if items.is_empty() {
            Payload::Empty
        } else {
            Payload::Items(items)
        }
    }

    /// Number of items carried
    pub fn len(&self) -> usize {
        match self {
            Payload::Items(items) => items.len(),
            Payload::Single(_) => 1,
            Payload::Empty => 0,
        }
    }

    /// True when nothing was returned
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into an item list
    pub fn into_items(self) -> Vec<Value> {
        match self {
            Payload::Items(items) => items,
            Payload::Single(value) => vec![value],
            Payload::Empty => Vec::new(),
        }
    }

    /// Keep only items matching `keep`; a singleton is kept or dropped whole
    #[must_use]
    pub fn filter(self, keep: impl Fn(&Value) -> bool) -> Self {
        match self {
            Payload::Items(items) => Payload::from_items(items.into_iter().filter(|v| keep(v)).collect()),
            Payload::Single(value) if keep(&value) => Payload::Single(value),
            _ => Payload::Empty,
        }
    }
}

/// Where a controller puts its payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    /// No wrapper: lists are items, objects are singletons
    Bare,
    /// `{key: [...]}` or `{key: {...}}`; an object without the key carries
    /// nothing
    Field(String),
    /// Like `Field`, but an object without the key is itself the resource
    FieldOrSingle(String),
    /// List found at a dot path (e.g. `SearchResult.resources`)
    Path(String),
}

impl Envelope {
    /// Strict envelope on `key`
    pub fn field(key: impl Into<String>) -> Self {
        Envelope::Field(key.into())
    }

    /// Lenient envelope on `key`
    pub fn field_or_single(key: impl Into<String>) -> Self {
        Envelope::FieldOrSingle(key.into())
    }

    /// List at a dot path
    pub fn path(path: impl Into<String>) -> Self {
        Envelope::Path(path.into())
    }
}

/// Trait for unwrapping a decoded body into a payload
pub trait EnvelopeDecoder: Send + Sync {
    /// Unwrap the body
    fn unwrap_body(&self, body: Value) -> Payload;
}
