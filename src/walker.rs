//! Depth-first document traversal.

use serde_json::Value;

use crate::classify::{is_operation_path, is_schema_object};
use crate::path::JsonPath;
use crate::types::{is_extension_key, HTTP_METHODS};

/// Visit `node` and every node reachable from it, depth-first.
///
/// `visit` receives each node with its path, the root first. Object keys are
/// visited in document order. Scalars are visited but have no children.
/// Subtrees rooted at a top-level vendor extension (`x-...`) are skipped.
pub fn walk<'a, F>(node: &'a Value, path: &JsonPath, visit: &mut F)
where
    F: FnMut(&'a Value, &JsonPath),
{
    visit(node, path);

    match node {
        Value::Object(map) => {
            for (key, child) in map {
                if path.is_empty() && is_extension_key(key) {
                    continue;
                }
                let child_path = path.concat(key);
                walk(child, &child_path, visit);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                let child_path = path.concat(index);
                walk(child, &child_path, visit);
            }
        }
        _ => {}
    }
}

/// Walk a whole document from its root.
pub fn walk_document<'a, F>(document: &'a Value, visit: &mut F)
where
    F: FnMut(&'a Value, &JsonPath),
{
    walk(document, &JsonPath::root(), visit);
}

/// Collect every schema object in the document, in traversal order.
pub fn collect_schemas(document: &Value) -> Vec<(&Value, JsonPath)> {
    let mut schemas = Vec::new();
    walk_document(document, &mut |node, path| {
        if node.is_object() && is_schema_object(path) {
            schemas.push((node, path.clone()));
        }
    });
    schemas
}

/// Collect every operation object under `paths` (and, for OpenAPI 3.1,
/// `webhooks`), in document order.
pub fn collect_operations(document: &Value, is_oas3: bool) -> Vec<(&Value, JsonPath)> {
    let mut operations = Vec::new();
    for root in ["paths", "webhooks"] {
        let Some(items) = document.get(root).and_then(Value::as_object) else {
            continue;
        };
        let root_path = JsonPath::root().concat(root);
        for (item_key, item) in items {
            let Some(item_map) = item.as_object() else {
                continue;
            };
            let item_path = root_path.concat(item_key);
            for (method, operation) in item_map {
                if !HTTP_METHODS.contains(&method.as_str()) || !operation.is_object() {
                    continue;
                }
                let op_path = item_path.concat(method);
                if is_operation_path(&op_path, is_oas3) {
                    operations.push((operation, op_path));
                }
            }
        }
    }
    operations
}
