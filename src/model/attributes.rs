//! Attribute bags and the storage-safe flattener.
//!
//! Source documents carry arbitrarily nested fields. Graph stores generally
//! only accept scalar property values, so every node's attributes pass through
//! [`flatten`] before emission: nested mappings and lists become
//! separator-joined keys (`supplier.name`, `hashes.0.alg`).

use indexmap::IndexMap;
use serde_json::{Map, Value};
use thiserror::Error;

/// Ordered attribute mapping carried by a graph node.
pub type Attributes = IndexMap<String, Value>;

/// Keys beginning with this prefix are reserved for record metadata
/// (`__type`, `__component_id`, `__toId`, ...) and never survive flattening.
pub const RESERVED_PREFIX: &str = "__";

/// Default separator between path segments of a flattened key.
pub const DEFAULT_SEPARATOR: &str = ".";

/// Default nesting limit; deeper structures are kept unflattened.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Options controlling [`flatten_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Separator placed between path segments
    pub separator: String,
    /// Maximum nesting depth that will be flattened
    pub max_depth: usize,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Reasons a mapping cannot be flattened.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlattenError {
    #[error("flattened key '{0}' is produced by more than one path")]
    KeyCollision(String),

    #[error("value at '{path}' is nested deeper than {max_depth} levels")]
    TooDeep { path: String, max_depth: usize },
}

/// Build an attribute mapping from `fields`, leaving out every key in `excluded`.
///
/// Used by the projectors to keep edge-bearing collections out of the
/// property bag without copying them in first.
pub fn attributes_excluding(fields: &Map<String, Value>, excluded: &[&str]) -> Attributes {
    fields
        .iter()
        .filter(|(key, _)| !excluded.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Flatten attributes with default options.
///
/// See [`flatten_with`].
pub fn flatten(attributes: &Attributes) -> Attributes {
    flatten_with(attributes, &FlattenOptions::default())
}

/// Prune and flatten an attribute mapping.
///
/// 1. keys whose value is an empty list are dropped;
/// 2. keys starting with [`RESERVED_PREFIX`] are dropped, at any nesting level;
/// 3. nested mappings and lists are flattened into separator-joined keys.
///
/// If step 3 fails (two paths produce the same key, or the nesting exceeds
/// `max_depth`) a warning is logged and the pruned mapping is returned
/// unflattened, so no data is lost. Applying this function to its own output
/// returns the output unchanged.
pub fn flatten_with(attributes: &Attributes, options: &FlattenOptions) -> Attributes {
    let pruned = prune(attributes);

    match try_flatten(&pruned, options) {
        Ok(flat) => flat,
        Err(err) => {
            tracing::warn!("Keeping attributes unflattened: {}", err);
            pruned
        }
    }
}

/// Drop empty-list values at the top level and reserved keys everywhere.
fn prune(attributes: &Attributes) -> Attributes {
    attributes
        .iter()
        .filter(|(key, value)| !key.starts_with(RESERVED_PREFIX) && !is_empty_list(value))
        .map(|(key, value)| (key.clone(), without_reserved(value)))
        .collect()
}

fn without_reserved(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| !key.starts_with(RESERVED_PREFIX))
                .map(|(key, child)| (key.clone(), without_reserved(child)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(without_reserved).collect()),
        leaf => leaf.clone(),
    }
}

fn is_empty_list(value: &Value) -> bool {
    matches!(value, Value::Array(items) if items.is_empty())
}

/// Flatten every value of an already-pruned mapping.
pub fn try_flatten(
    attributes: &Attributes,
    options: &FlattenOptions,
) -> Result<Attributes, FlattenError> {
    let mut out = Attributes::with_capacity(attributes.len());
    for (key, value) in attributes {
        flatten_value(key.clone(), value, 0, options, &mut out)?;
    }
    Ok(out)
}

fn flatten_value(
    path: String,
    value: &Value,
    depth: usize,
    options: &FlattenOptions,
    out: &mut Attributes,
) -> Result<(), FlattenError> {
    match value {
        Value::Object(map) if !map.is_empty() => {
            check_depth(&path, depth, options)?;
            for (key, child) in map.iter().filter(|(key, _)| !key.starts_with(RESERVED_PREFIX)) {
                let child_path = join(&path, key, &options.separator);
                flatten_value(child_path, child, depth + 1, options, out)?;
            }
            Ok(())
        }
        Value::Array(items) => {
            // Empty nested lists carry nothing and are pruned like top-level ones.
            if !items.is_empty() {
                check_depth(&path, depth, options)?;
            }
            for (index, child) in items.iter().enumerate() {
                let child_path = join(&path, &index.to_string(), &options.separator);
                flatten_value(child_path, child, depth + 1, options, out)?;
            }
            Ok(())
        }
        leaf => {
            // A separator could glue a reserved prefix together from shorter keys.
            if path.starts_with(RESERVED_PREFIX) {
                return Ok(());
            }
            if out.insert(path.clone(), leaf.clone()).is_some() {
                return Err(FlattenError::KeyCollision(path));
            }
            Ok(())
        }
    }
}

fn check_depth(path: &str, depth: usize, options: &FlattenOptions) -> Result<(), FlattenError> {
    if depth >= options.max_depth {
        return Err(FlattenError::TooDeep {
            path: path.to_string(),
            max_depth: options.max_depth,
        });
    }
    Ok(())
}

fn join(prefix: &str, key: &str, separator: &str) -> String {
    let mut path = String::with_capacity(prefix.len() + separator.len() + key.len());
    path.push_str(prefix);
    path.push_str(separator);
    path.push_str(key);
    path
}
