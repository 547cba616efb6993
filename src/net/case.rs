//! Response key-case transform for the `/api` channel.
//!
//! The backend speaks snake_case; client DTOs on the authenticated channel
//! are camelCase. Keys are rewritten recursively, values are left alone.

#[cfg(test)]
#[path = "case_test.rs"]
mod case_test;

use serde_json::{Map, Value};

/// Rewrite every object key in `value` from snake_case to camelCase.
#[must_use]
pub fn camelize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (to_camel_case(&k), camelize_keys(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(camelize_keys).collect()),
        other => other,
    }
}

/// `created_at` -> `createdAt`. Leading underscores (e.g. `_id`) are kept.
#[must_use]
pub fn to_camel_case(key: &str) -> String {
    let prefix_len = key.len() - key.trim_start_matches('_').len();
    let (prefix, rest) = key.split_at(prefix_len);

    let mut out = String::with_capacity(key.len());
    out.push_str(prefix);
    let mut upper_next = false;
    for ch in rest.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}
