//! Operation rules.

use std::collections::HashMap;

use serde_json::Value;

use super::RuleContext;
use crate::config::RuleFamily;
use crate::message::MessageCarrier;
use crate::path::JsonPath;
use crate::refs::has_ref_child;
use crate::walker::collect_operations;

pub const NO_REQUEST_BODY_CONTENT: &str = "no_request_body_content";
pub const NO_OPERATION_ID: &str = "no_operation_id";

pub fn check(ctx: &RuleContext) -> MessageCarrier {
    let mut carrier = MessageCarrier::new();
    let operations = collect_operations(ctx.raw, ctx.is_oas3);

    if ctx.is_oas3 {
        for (operation, path) in &operations {
            no_request_body_content(ctx, operation, path, &mut carrier);
        }
    }
    operation_ids(ctx, &operations, &mut carrier);

    carrier
}

fn no_request_body_content(
    ctx: &RuleContext,
    operation: &Value,
    path: &JsonPath,
    carrier: &mut MessageCarrier,
) {
    let Some(body) = operation.get("requestBody") else {
        return;
    };
    // The body is defined elsewhere; it is checked there.
    if has_ref_child(ctx.raw, path, "requestBody") {
        return;
    }
    if body.get("content").is_none() {
        carrier.add_message(
            path.concat("requestBody"),
            "Request bodies must specify `content`",
            ctx.severity(RuleFamily::Operations, NO_REQUEST_BODY_CONTENT),
            Some(NO_REQUEST_BODY_CONTENT),
        );
    }
}

fn operation_ids(ctx: &RuleContext, operations: &[(&Value, JsonPath)], carrier: &mut MessageCarrier) {
    let severity = ctx.severity(RuleFamily::Operations, NO_OPERATION_ID);
    let mut seen: HashMap<&str, &JsonPath> = HashMap::new();

    for (operation, path) in operations {
        let id = operation
            .get("operationId")
            .and_then(Value::as_str)
            .filter(|id| !id.trim().is_empty());
        let Some(id) = id else {
            carrier.add_message(
                path,
                "Operations must have a non-empty `operationId`",
                severity,
                Some(NO_OPERATION_ID),
            );
            continue;
        };
        if let Some(first) = seen.get(id) {
            carrier.add_message(
                path.concat("operationId"),
                format!("operationId `{}` is already used at {}", id, first),
                severity,
                Some(NO_OPERATION_ID),
            );
        } else {
            seen.insert(id, path);
        }
    }
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

    fn found(carrier: &MessageCarrier, rule: &str) -> Vec<String> {
        carrier
            .iter()
            .filter(|(_, m)| m.rule.as_deref() == Some(rule))
            .map(|(_, m)| m.display_path())
            .collect()
    }

    #[test]
    fn inline_body_without_content() {
        let doc = json!({
            "openapi": "3.0.0",
            "paths": {
                "/pets": {
                    "post": { "operationId": "create", "requestBody": { "description": "pet" } },
                    "put": { "operationId": "replace", "requestBody": { "$ref": "#/components/requestBodies/Pet" } },
                    "patch": {
                        "operationId": "update",
                        "requestBody": { "content": { "application/json": {} } }
                    }
                }
            }
        });
        let carrier = run(&doc, true);
        assert_eq!(
            found(&carrier, NO_REQUEST_BODY_CONTENT),
            vec!["paths./pets.post.requestBody"]
        );
        assert_eq!(carrier.errors().len(), 1);
    }

    #[test]
    fn request_body_rule_is_oas3_only() {
        let doc = json!({
            "swagger": "2.0",
            "paths": { "/pets": { "post": { "operationId": "create", "requestBody": {} } } }
        });
        let carrier = run(&doc, false);
        assert!(found(&carrier, NO_REQUEST_BODY_CONTENT).is_empty());
    }

    #[test]
    fn missing_and_duplicate_operation_ids() {
        let doc = json!({
            "openapi": "3.0.0",
            "paths": {
                "/pets": { "get": { "operationId": "list" }, "post": {} },
                "/cats": { "get": { "operationId": "list" } }
            }
        });
        let carrier = run(&doc, true);
        assert_eq!(
            found(&carrier, NO_OPERATION_ID),
            vec!["paths./pets.post", "paths./cats.get.operationId"]
        );
        assert_eq!(
            carrier.warnings()[1].message,
            "operationId `list` is already used at paths./pets.get"
        );
    }
}
