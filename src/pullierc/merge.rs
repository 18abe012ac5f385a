//! JSON merge primitives used when layering configuration.

use serde_json::{Map, Value};

/// Deep-merges `overrides` on top of `base`.
///
/// Objects merge key by key, recursing into nested objects. Any other value
/// in `overrides` (arrays included) replaces the value in `base`.
pub fn deep_merge(base: &Value, overrides: &Value) -> Value {
    match (base, overrides) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            Value::Object(deep_merge_maps(base_map, override_map))
        }
        (_, overrides) => overrides.clone(),
    }
}

/// Object-level form of [`deep_merge`].
pub fn deep_merge_maps(base: &Map<String, Value>, overrides: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();
    for (key, value) in overrides {
        let next = match merged.get(key) {
            Some(existing) => deep_merge(existing, value),
            None => value.clone(),
        };
        merged.insert(key.clone(), next);
    }
    merged
}

/// Shallow-merges `overrides` over `base`: top-level keys of `overrides`
/// overwrite those of `base`.
///
/// Non-object operands (including `null`) count as empty objects, so the
/// result is always an object.
pub fn shallow_merge(base: &Value, overrides: &Value) -> Value {
    let mut merged = base.as_object().cloned().unwrap_or_default();
    if let Some(override_map) = overrides.as_object() {
        for (key, value) in override_map {
            merged.insert(key.clone(), value.clone());
        }
    }
    Value::Object(merged)
}
