//! Envelope decoding and JSON helpers

use super::types::{Envelope, EnvelopeDecoder, Payload};
use serde_json::{Map, Value};
use tracing::debug;

impl EnvelopeDecoder for Envelope {
    fn unwrap_body(&self, body: Value) -> Payload {
        match (self, body) {
            (_, Value::Null) => Payload::Empty,
            (Envelope::Path(path), body) => match value_at_path(&body, path) {
                Some(Value::Array(items)) => Payload::from_items(items.clone()),
                _ => {
                    debug!(path = %path, "Response has no list at expected path");
                    Payload::Empty
                }
            },
            (_, Value::Array(items)) => Payload::from_items(items),
            (Envelope::Bare, value) => Payload::Single(value),
            (Envelope::Field(key) | Envelope::FieldOrSingle(key), Value::Object(mut map))
                if map.contains_key(key.as_str()) =>
            {
                match map.remove(key.as_str()) {
                    Some(Value::Array(items)) => Payload::from_items(items),
                    Some(value @ Value::Object(_)) => Payload::Single(value),
                    _ => Payload::Empty,
                }
            }
            (Envelope::FieldOrSingle(_), value @ Value::Object(_)) => Payload::Single(value),
            (Envelope::Field(key), _) => {
                debug!(key = %key, "Response has no expected envelope key");
                Payload::Empty
            }
            (Envelope::FieldOrSingle(_), _) => Payload::Empty,
        }
    }
}

/// Look up a value by dot path (`a.b`), with array indices as `a[0]` or `a.0`
pub fn value_at_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        let (name, index) = match part.find('[') {
            Some(pos) if part.ends_with(']') => (&part[..pos], Some(&part[pos + 1..part.len() - 1])),
            _ => (part, None),
        };

        if !name.is_empty() {
            current = match current {
                Value::Object(map) => map.get(name)?,
                Value::Array(items) => items.get(name.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        if let Some(index) = index {
            let index: usize = index.parse().ok()?;
            current = current.as_array()?.get(index)?;
        }
    }
    Some(current)
}

/// Deep-merge `source` into `destination`: objects merge recursively, lists
/// extend, scalars overwrite
pub fn merge_values(source: &Value, destination: &mut Value) {
    let (Value::Object(src), Value::Object(dst)) = (source, &mut *destination) else {
        *destination = source.clone();
        return;
    };
    merge_maps(src, dst);
}

fn merge_maps(source: &Map<String, Value>, destination: &mut Map<String, Value>) {
    for (key, value) in source {
        match value {
            Value::Object(inner) => {
                let node = destination
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                match node {
                    Value::Object(node) => merge_maps(inner, node),
                    other => *other = value.clone(),
                }
            }
            Value::Array(items) => {
                let node = destination
                    .entry(key.clone())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(existing) = node {
                    existing.extend(items.iter().cloned());
                }
            }
            scalar => {
                destination.insert(key.clone(), scalar.clone());
            }
        }
    }
}
