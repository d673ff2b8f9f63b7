//! Structural merge used to materialize model variants.

use serde_json::Value;

/// Overlays `overrides` onto `base`.
///
/// Objects merge key by key, recursively. Arrays and scalars (including
/// `null`) in `overrides` replace the base value wholesale.
pub fn deep_merge(base: &Value, overrides: &Value) -> Value {
    match (base, overrides) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            let mut merged = base_map.clone();
            for (key, value) in override_map {
                let next = match base_map.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        (_, replacement) => replacement.clone(),
    }
}
