//! Deep merge of API responses with default shapes.
//!
//! Sailthru leaves keys out of a response whenever it has nothing to say
//! about them, and the set of missing keys varies per endpoint. Merging the
//! response with a hand-written default shape gives callers every key, every
//! time.

use serde_json::{Map, Value};

/// Python-style truthiness: null, false, zero, and empty strings, arrays and
/// objects are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Merges `raw` with `defaults`, recursing through nested objects.
///
/// * Object defaults: a truthy raw object is merged with a non-empty default;
///   any other truthy raw value is kept as-is; a falsy or missing raw value
///   takes the default.
/// * Scalar defaults: the raw value wins whenever the key is present and not
///   null, so `0` and `""` survive.
/// * Raw keys the defaults know nothing about are copied through.
pub fn merge_results(raw: &Map<String, Value>, defaults: &Map<String, Value>) -> Map<String, Value> {
    let mut results = Map::new();

    for (key, default) in defaults {
        let merged = match default {
            Value::Object(default_map) => match raw.get(key) {
                Some(Value::Object(raw_map)) if !raw_map.is_empty() && !default_map.is_empty() => {
                    Value::Object(merge_results(raw_map, default_map))
                }
                Some(old) if is_truthy(old) => old.clone(),
                _ => default.clone(),
            },
            _ => match raw.get(key) {
                Some(Value::Null) | None => default.clone(),
                Some(old) => old.clone(),
            },
        };
        results.insert(key.clone(), merged);
    }

    // Anything the defaults missed passes through untouched.
    for (key, value) in raw {
        if !results.contains_key(key) {
            results.insert(key.clone(), value.clone());
        }
    }

    results
}

/// [`merge_results`] lifted to arbitrary JSON values.
///
/// Two objects are merged; an empty raw value yields the defaults; anything
/// else is returned unchanged.
pub fn merge_value(raw: &Value, defaults: &Value) -> Value {
    match (raw, defaults) {
        (Value::Object(r), Value::Object(d)) => Value::Object(merge_results(r, d)),
        (r, d) if !is_truthy(r) => d.clone(),
        (r, _) => r.clone(),
    }
}
