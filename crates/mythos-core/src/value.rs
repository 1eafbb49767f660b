//! Field values and the map shapes every layer passes around.
//!
//! Raw content is untyped: a definition is a mapping of field name to an
//! arbitrary nested value. `serde_json`'s map keeps keys sorted, which gives
//! deterministic iteration and structural equality for free.

use std::collections::BTreeMap;

use crate::error::ResolveError;
use crate::id::EntityKey;

pub use serde_json::Value;

/// A single definition's fields.
pub type DataMap = serde_json::Map<String, Value>;

/// kind -> key -> T.
pub type KindMap<T> = BTreeMap<String, BTreeMap<String, T>>;

/// Reserved field listing an abstract's parents.
pub const PARENTS_FIELD: &str = "parents";

/// Reserved field naming the abstract a concrete definition inherits from.
pub const ABSTRACT_FIELD: &str = "abstract";

/// Reserved field holding a class path.
pub const CLASS_FIELD: &str = "class";

/// Copy every top-level field of `source` into `target`, overwriting on
/// collision. Nested maps are replaced, not merged.
pub fn overlay(target: &mut DataMap, source: &DataMap) {
    for (field, value) in source {
        target.insert(field.clone(), value.clone());
    }
}

/// Count the entries of a [`KindMap`] across all kinds.
pub fn kind_map_len<T>(map: &KindMap<T>) -> usize {
    map.values().map(BTreeMap::len).sum()
}

/// Read an optional string field. Absent and `null` are both `None`.
pub fn optional_str<'a>(
    fields: &'a DataMap,
    field: &'static str,
    entry: &EntityKey,
) -> Result<Option<&'a str>, ResolveError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(ResolveError::InvalidField {
            entry: entry.clone(),
            field,
            detail: format!("expected a string, found {}", type_name(other)),
        }),
    }
}

/// Read a field that may be either a single string or a list of strings.
pub fn string_list(
    fields: &DataMap,
    field: &'static str,
    entry: &EntityKey,
) -> Result<Vec<String>, ResolveError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(vec![s.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(ResolveError::InvalidField {
                    entry: entry.clone(),
                    field,
                    detail: format!("expected a list of strings, found {}", type_name(other)),
                }),
            })
            .collect(),
        Some(other) => Err(ResolveError::InvalidField {
            entry: entry.clone(),
            field,
            detail: format!("expected a list of strings, found {}", type_name(other)),
        }),
    }
}

/// Short human name of a value's JSON type, for error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
