//! Parameter rules.

use serde_json::Value;

use super::RuleContext;
use crate::classify::is_parameter_object;
use crate::config::RuleFamily;
use crate::message::MessageCarrier;
use crate::path::JsonPath;
use crate::refs::is_ref;
use crate::walker::walk_document;

pub const NO_PARAMETER_DESCRIPTION: &str = "no_parameter_description";
pub const PARAM_NAME_CASE_CONVENTION: &str = "param_name_case_convention";

pub fn check(ctx: &RuleContext) -> MessageCarrier {
    let mut carrier = MessageCarrier::new();

    // Inline parameters only: a `$ref` is checked where its target is defined.
    let mut parameters: Vec<(&Value, JsonPath)> = Vec::new();
    walk_document(ctx.raw, &mut |node, path| {
        if node.is_object() && !is_ref(node) && is_parameter_object(path, ctx.is_oas3) {
            parameters.push((node, path.clone()));
        }
    });

    for (parameter, path) in &parameters {
        no_parameter_description(ctx, parameter, path, &mut carrier);
        param_name_case_convention(ctx, parameter, path, &mut carrier);
    }

    carrier
}

fn no_parameter_description(
    ctx: &RuleContext,
    parameter: &Value,
    path: &JsonPath,
    carrier: &mut MessageCarrier,
) {
    let described = parameter
        .get("description")
        .and_then(Value::as_str)
        .map(|d| !d.trim().is_empty())
        .unwrap_or(false);
    if !described {
        carrier.add_message(
            path,
            "Parameter objects must have a description",
            ctx.severity(RuleFamily::Parameters, NO_PARAMETER_DESCRIPTION),
            Some(NO_PARAMETER_DESCRIPTION),
        );
    }
}

fn param_name_case_convention(
    ctx: &RuleContext,
    parameter: &Value,
    path: &JsonPath,
    carrier: &mut MessageCarrier,
) {
    if parameter.get("in").and_then(Value::as_str) != Some("query") {
        return;
    }
    let Some(name) = parameter.get("name").and_then(Value::as_str) else {
        return;
    };
    let Some(convention) =
        ctx.case_convention(RuleFamily::Parameters, PARAM_NAME_CASE_CONVENTION)
    else {
        return;
    };
    if !convention.matches(name) {
        carrier.add_message(
            path.concat("name"),
            format!(
                "Query parameter names must follow case convention: {}",
                convention.as_str()
            ),
            ctx.severity(RuleFamily::Parameters, PARAM_NAME_CASE_CONVENTION),
            Some(PARAM_NAME_CASE_CONVENTION),
        );
    }
}
