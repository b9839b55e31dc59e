//! Configuration deep merge

use serde_json::{Map, Value};

/// Overlay `overrides` onto a copy of `base`.
///
/// Object values merge key by key; anything else in `overrides` (scalars,
/// arrays, null) replaces the target value wholesale. Keys only present in
/// `base` keep their value and position, new keys are appended.
pub fn merge(base: &Value, overrides: &Value) -> Value {
    let mut merged = base.clone();
    overlay(&mut merged, overrides);
    merged
}

fn overlay(target: &mut Value, overrides: &Value) {
    let Value::Object(source) = overrides else {
        *target = overrides.clone();
        return;
    };

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    let Value::Object(target) = target else {
        return;
    };

    for (key, value) in source {
        if value.is_object() {
            let slot = target
                .entry(key.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            overlay(slot, value);
        } else {
            target.insert(key.clone(), value.clone());
        }
    }
}
