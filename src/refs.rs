//! `$ref` presence probes.
//!
//! These only detect that a node is an indirection; they never follow the
//! reference. Probing a path that does not exist is not an error.

use serde_json::Value;

use crate::path::JsonPath;

/// Returns true if the value at `path` is a map containing `$ref`.
///
/// `path` may be a [`JsonPath`] or a `.`-joined display string; either is
/// normalized to a structured path before lookup.
pub fn has_ref_property(document: &Value, path: impl Into<JsonPath>) -> bool {
    let path = path.into();
    path.lookup(document).map(is_ref).unwrap_or(false)
}

/// Returns true if `child` of the node at `path` is a `$ref`.
///
/// Used for an operation's `requestBody` or a Swagger 2.0 response's
/// `schema`, where the interesting indirection sits one level down.
pub fn has_ref_child(document: &Value, path: impl Into<JsonPath>, child: &str) -> bool {
    has_ref_property(document, path.into().concat(child))
}

/// Returns true if `node` is a map containing `$ref`.
pub fn is_ref(node: &Value) -> bool {
    node.as_object()
        .map(|map| map.contains_key("$ref"))
        .unwrap_or(false)
}

/// The `$ref` target string of `node`, if it is a reference.
pub fn ref_target(node: &Value) -> Option<&str> {
    node.get("$ref").and_then(Value::as_str)
}
