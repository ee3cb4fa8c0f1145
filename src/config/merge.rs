// src/config/merge.rs — Deep merge of JSON configuration values

use serde_json::Value;

/// Recursively merge `source` into `target`.
///
/// Objects merge key by key with `source` winning on conflict; arrays and
/// scalars (including explicit nulls) replace the target value wholesale.
pub fn deep_merge(target: &mut Value, source: &Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, value) in source_map {
                match target_map.get_mut(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_merge(existing, value);
                    }
                    _ => {
                        target_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, source) => *target = source.clone(),
    }
}
