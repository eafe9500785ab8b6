//! Path-shape classification of document nodes.
//!
//! These predicates look only at where a node sits, never at its value, so
//! they can be evaluated while walking either the raw or the resolved
//! document. Each one anchors on the surrounding OpenAPI structure so that a
//! schema property that happens to be named `responses`, `parameters` or
//! `properties` is not mistaken for the real thing.

use crate::path::{JsonPath, Segment};
use crate::types::is_http_method;

/// Composition keywords, in the order they are expanded.
pub const COMPOSITION_KEYWORDS: &[&str] = &["allOf", "oneOf", "anyOf"];

/// Returns true if the node at `path` is a parameter object.
///
/// Parameters live in a path item's or operation's `parameters` list, in
/// the top-level `parameters` map (Swagger 2.0) or in
/// `components.parameters` (OpenAPI 3).
pub fn is_parameter_object(path: &JsonPath, is_oas3: bool) -> bool {
    let segs = path.segments();
    let n = segs.len();
    if n < 2 || !segs[n - 2].is_key("parameters") {
        return false;
    }
    let container = &segs[..n - 2];

    if is_path_item(container, is_oas3) || is_operation(container, is_oas3) {
        return true;
    }

    if is_oas3 {
        n == 3 && segs[0].is_key("components")
    } else {
        n == 2
    }
}

/// Returns true if the node at `path` is a `responses` map.
///
/// Matches an operation's `responses`, `components.responses` (OpenAPI 3
/// only) and the top-level `responses` (Swagger 2.0 only).
pub fn is_response_object(path: &JsonPath, is_oas3: bool) -> bool {
    let segs = path.segments();
    let n = segs.len();
    if n == 0 || !segs[n - 1].is_key("responses") {
        return false;
    }

    if is_oas3 && n == 2 && segs[0].is_key("components") {
        return true;
    }
    if !is_oas3 && n == 1 {
        return true;
    }

    is_operation(&segs[..n - 1], is_oas3)
}

/// Returns true if `path` addresses an operation's `responses` map.
///
/// Unlike [`is_response_object`] this excludes the reusable containers.
pub fn is_operation_responses(path: &JsonPath, is_oas3: bool) -> bool {
    let segs = path.segments();
    let n = segs.len();
    n >= 2 && segs[n - 1].is_key("responses") && is_operation(&segs[..n - 1], is_oas3)
}

/// Returns true if `path` addresses an operation object.
pub fn is_operation_path(path: &JsonPath, is_oas3: bool) -> bool {
    is_operation(path.segments(), is_oas3)
}

/// Returns true if the node at `path` holds a schema.
///
/// Schema nodes sit under `schema` or `items`, in `definitions` (Swagger
/// 2.0) or `components.schemas` (OpenAPI 3), under a schema's
/// `properties`/`patternProperties`, `additionalProperties` or `not`, in a
/// composition array of a schema, or are parameter objects (which carry
/// `type`/`format` directly in Swagger 2.0).
pub fn is_schema_object(path: &JsonPath) -> bool {
    is_schema(path.segments())
}

/// Returns true if the node at `path` is one element of an
/// `allOf`/`oneOf`/`anyOf` array.
pub fn is_composition_branch(path: &JsonPath) -> bool {
    let segs = path.segments();
    let n = segs.len();
    n >= 2
        && segs[n - 1].is_index()
        && segs[n - 2]
            .as_key()
            .map(|k| COMPOSITION_KEYWORDS.contains(&k))
            .unwrap_or(false)
}

fn is_schema(segs: &[Segment]) -> bool {
    let n = segs.len();
    if n == 0 {
        return false;
    }
    let last = &segs[n - 1];

    if last.is_key("schema") || last.is_key("items") {
        return true;
    }

    if n == 2 && segs[0].is_key("definitions") {
        return true;
    }
    if n == 3 && segs[0].is_key("components") && segs[1].is_key("schemas") {
        return true;
    }

    if n >= 2 {
        let container = &segs[n - 2];
        let owner = &segs[..n - 2];
        if (container.is_key("properties") || container.is_key("patternProperties"))
            && is_schema(owner)
        {
            return true;
        }
        if last.is_index()
            && container
                .as_key()
                .map(|k| COMPOSITION_KEYWORDS.contains(&k))
                .unwrap_or(false)
            && is_schema(owner)
        {
            return true;
        }
    }

    if (last.is_key("additionalProperties") || last.is_key("not")) && is_schema(&segs[..n - 1]) {
        return true;
    }

    let path = JsonPath::new(segs.to_vec());
    is_parameter_object(&path, true) || is_parameter_object(&path, false)
}

/// `paths.<p>`, `webhooks.<w>`, `components.pathItems.<p>` or a callback's
/// `<name>.<expression>`.
fn is_path_item(segs: &[Segment], is_oas3: bool) -> bool {
    let n = segs.len();
    if n == 2 && segs[0].is_key("paths") {
        return true;
    }
    if !is_oas3 {
        return false;
    }
    if n == 2 && segs[0].is_key("webhooks") {
        return true;
    }
    if n == 3 && segs[0].is_key("components") && segs[1].is_key("pathItems") {
        return true;
    }
    if n == 4 && segs[0].is_key("components") && segs[1].is_key("callbacks") {
        return true;
    }
    n >= 3 && segs[n - 3].is_key("callbacks") && is_operation(&segs[..n - 3], is_oas3)
}

fn is_operation(segs: &[Segment], is_oas3: bool) -> bool {
    match segs.split_last() {
        Some((last, item)) => {
            last.as_key().map(is_http_method).unwrap_or(false) && is_path_item(item, is_oas3)
        }
        None => false,
    }
}
