//! Helpers for search result bundles

use serde_json::Value;

/// The `entry` list of a bundle. A missing or non-array `entry` counts as no entries.
pub fn entries(bundle: &Value) -> &[Value] {
    bundle
        .get("entry")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// True when the bundle matched nothing.
pub fn is_empty(bundle: &Value) -> bool {
    entries(bundle).is_empty()
}

/// The `resource` of every entry that carries one.
pub fn resources(bundle: &Value) -> impl Iterator<Item = &Value> {
    entries(bundle).iter().filter_map(|entry| entry.get("resource"))
}
