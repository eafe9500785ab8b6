//! Example rules.
//!
//! Body schemas are walked in the resolved document. For every scalar schema
//! the effective example (its own, or the part of an enclosing example that
//! describes it) is validated against the schema's value constraints.

use serde_json::{Map, Value};
use tracing::debug;

use super::RuleContext;
use crate::config::RuleFamily;
use crate::example::{resolve_example, visit_body_schemas};
use crate::message::MessageCarrier;

pub const INVALID_EXAMPLE: &str = "invalid_example";

const SCALAR_TYPES: &[&str] = &["string", "integer", "number", "boolean"];

/// Keywords copied into the schema an example is validated against.
const VALUE_KEYWORDS: &[&str] = &[
    "type",
    "format",
    "enum",
    "const",
    "minimum",
    "maximum",
    "minLength",
    "maxLength",
    "pattern",
    "multipleOf",
];

pub fn check(ctx: &RuleContext) -> MessageCarrier {
    let mut carrier = MessageCarrier::new();
    if !ctx.enabled(RuleFamily::Examples, INVALID_EXAMPLE) {
        return carrier;
    }
    let severity = ctx.severity(RuleFamily::Examples, INVALID_EXAMPLE);

    visit_body_schemas(ctx.resolved, ctx.is_oas3, &mut |schema, path, chain| {
        if !is_scalar_schema(schema) {
            return;
        }
        let Some(example) = resolve_example(schema, chain) else {
            return;
        };
        if example.is_null() && is_nullable(schema) {
            return;
        }

        let constraints = value_constraints(schema);
        let validator = match jsonschema::validator_for(&constraints) {
            Ok(validator) => validator,
            Err(err) => {
                debug!(path = %path, error = %err, "skipping example check for unusable schema");
                return;
            }
        };
        for err in validator.iter_errors(example) {
            carrier.add_message(
                path,
                format!("Example does not match its schema: {}", err),
                severity,
                Some(INVALID_EXAMPLE),
            );
        }
    });

    carrier
}

fn declared_types(schema: &Value) -> Vec<&str> {
    match schema.get("type") {
        Some(Value::String(ty)) => vec![ty.as_str()],
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn is_scalar_schema(schema: &Value) -> bool {
    let types = declared_types(schema);
    !types.is_empty()
        && types
            .iter()
            .all(|ty| SCALAR_TYPES.contains(ty) || *ty == "null")
}

/// OpenAPI 3.0 `nullable: true`, or a 3.1 type list that includes `null`.
fn is_nullable(schema: &Value) -> bool {
    schema.get("nullable").and_then(Value::as_bool) == Some(true)
        || declared_types(schema).contains(&"null")
}

/// The value-level keywords of `schema` as a standalone JSON Schema.
///
/// OpenAPI 3.0 writes exclusive bounds as booleans next to
/// `minimum`/`maximum`; they are rewritten to the numeric form.
fn value_constraints(schema: &Value) -> Value {
    let mut out = Map::new();
    for keyword in VALUE_KEYWORDS {
        if let Some(value) = schema.get(*keyword) {
            out.insert((*keyword).to_string(), value.clone());
        }
    }

    for (exclusive, bound) in [("exclusiveMinimum", "minimum"), ("exclusiveMaximum", "maximum")] {
        match schema.get(exclusive) {
            Some(Value::Number(n)) => {
                out.insert(exclusive.to_string(), Value::Number(n.clone()));
            }
            Some(Value::Bool(true)) => {
                if let Some(limit) = out.remove(bound) {
                    out.insert(exclusive.to_string(), limit);
                }
            }
            _ => {}
        }
    }

    if is_nullable(schema) {
        if let Some(Value::String(ty)) = out.get("type").cloned() {
            out.insert(
                "type".to_string(),
                Value::Array(vec![Value::String(ty), Value::String("null".to_string())]),
            );
        }
    }

    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LintConfig;
    use serde_json::json;

    fn run(doc: &Value, is_oas3: bool) -> MessageCarrier {
        let config = LintConfig::default();
        let ctx = RuleContext {
            raw: doc,
            resolved: doc,
            is_oas3,
            config: &config,
        };
        check(&ctx)
    }

    fn json_body(schema: Value, media: Value) -> Value {
        let mut media_type = media;
        media_type["schema"] = schema;
        json!({
            "openapi": "3.0.0",
            "paths": {
                "/pets": {
                    "post": {
                        "requestBody": { "content": { "application/json": media_type } },
                        "responses": {}
                    }
                }
            }
        })
    }

    #[test]
    fn own_example_with_wrong_type() {
        let doc = json_body(json!({ "type": "integer", "example": "ten" }), json!({}));
        let carrier = run(&doc, true);
        assert_eq!(carrier.warnings().len(), 1);
        assert_eq!(
            carrier.warnings()[0].display_path(),
            "paths./pets.post.requestBody.content.application/json.schema"
        );
        assert_eq!(carrier.warnings()[0].rule.as_deref(), Some(INVALID_EXAMPLE));
    }

    #[test]
    fn object_example_is_narrowed_to_property() {
        let schema = json!({
            "type": "object",
            "example": { "age": -1, "name": "rex" },
            "properties": {
                "age": { "type": "integer", "minimum": 0 },
                "name": { "type": "string" }
            }
        });
        let carrier = run(&json_body(schema, json!({})), true);
        assert_eq!(carrier.warnings().len(), 1);
        assert_eq!(
            carrier.warnings()[0].display_path(),
            "paths./pets.post.requestBody.content.application/json.schema.properties.age"
        );
    }

    #[test]
    fn media_type_example_is_used() {
        let schema = json!({
            "type": "object",
            "properties": { "tag": { "type": "string", "enum": ["cat", "dog"] } }
        });
        let media = json!({ "examples": { "first": { "value": { "tag": "fish" } } } });
        let carrier = run(&json_body(schema, media), true);
        assert_eq!(carrier.warnings().len(), 1);
    }

    #[test]
    fn nullable_allows_null() {
        let schema = json!({ "type": "string", "nullable": true, "example": null });
        assert!(run(&json_body(schema, json!({})), true).is_empty());

        let schema = json!({ "type": "string", "example": null });
        assert_eq!(run(&json_body(schema, json!({})), true).warnings().len(), 1);
    }

    #[test]
    fn boolean_exclusive_bounds() {
        let schema = json!({
            "type": "number",
            "minimum": 0,
            "exclusiveMinimum": true,
            "example": 0
        });
        assert_eq!(run(&json_body(schema, json!({})), true).warnings().len(), 1);
    }

    #[test]
    fn no_example_no_finding() {
        let schema = json!({ "type": "integer", "maximum": 3 });
        assert!(run(&json_body(schema, json!({})), true).is_empty());
    }

    #[test]
    fn swagger2_body_parameter() {
        let doc = json!({
            "swagger": "2.0",
            "paths": {
                "/pets": {
                    "post": {
                        "parameters": [{
                            "in": "body",
                            "name": "body",
                            "schema": {
                                "type": "array",
                                "items": { "type": "string", "maxLength": 3 },
                                "example": ["toolong"]
                            }
                        }],
                        "responses": { "200": { "description": "ok" } }
                    }
                }
            }
        });
        let carrier = run(&doc, false);
        assert_eq!(carrier.warnings().len(), 1);
        assert_eq!(
            carrier.warnings()[0].display_path(),
            "paths./pets.post.parameters.0.schema.items"
        );
    }

    #[test]
    fn path_item_body_parameter_is_reported_once() {
        let doc = json!({
            "swagger": "2.0",
            "paths": {
                "/pets": {
                    "parameters": [{
                        "in": "body",
                        "name": "count",
                        "schema": { "type": "integer", "example": "ten" }
                    }],
                    "get": { "responses": { "200": { "description": "ok" } } },
                    "post": { "responses": { "200": { "description": "ok" } } }
                }
            }
        });
        let carrier = run(&doc, false);
        let paths: Vec<String> = carrier.warnings().iter().map(|m| m.display_path()).collect();
        assert_eq!(paths, vec!["paths./pets.parameters.0.schema"]);
    }

    #[test]
    fn off_skips_the_walk() {
        let doc = json_body(json!({ "type": "integer", "example": "ten" }), json!({}));
        let config = LintConfig::from_value(&json!({ "examples": { "invalid_example": "off" } }))
            .unwrap();
        let ctx = RuleContext {
            raw: &doc,
            resolved: &doc,
            is_oas3: true,
            config: &config,
        };
        assert!(check(&ctx).is_empty());
    }
}
