//! Response rules.

use serde_json::{Map, Value};

use super::RuleContext;
use crate::classify::{is_operation_responses, is_response_object};
use crate::config::RuleFamily;
use crate::message::MessageCarrier;
use crate::path::JsonPath;
use crate::refs::is_ref;
use crate::types::is_extension_key;
use crate::walker::walk_document;

pub const NO_RESPONSE_CODES: &str = "no_response_codes";
pub const NO_SUCCESS_RESPONSE_CODES: &str = "no_success_response_codes";
pub const NO_RESPONSE_DESCRIPTION: &str = "no_response_description";

pub fn check(ctx: &RuleContext) -> MessageCarrier {
    let mut carrier = MessageCarrier::new();

    let mut containers: Vec<(&Map<String, Value>, JsonPath)> = Vec::new();
    walk_document(ctx.raw, &mut |node, path| {
        if let Some(map) = node.as_object() {
            if is_response_object(path, ctx.is_oas3) {
                containers.push((map, path.clone()));
            }
        }
    });

    for (responses, path) in &containers {
        if is_operation_responses(path, ctx.is_oas3) {
            response_codes(ctx, responses, path, &mut carrier);
        }
        no_response_description(ctx, responses, path, &mut carrier);
    }

    carrier
}

fn response_codes(
    ctx: &RuleContext,
    responses: &Map<String, Value>,
    path: &JsonPath,
    carrier: &mut MessageCarrier,
) {
    let codes: Vec<&str> = responses
        .keys()
        .map(String::as_str)
        .filter(|key| !is_extension_key(key))
        .collect();

    if codes.is_empty() {
        carrier.add_message(
            path,
            "Each `responses` object must have at least one response code",
            ctx.severity(RuleFamily::Responses, NO_RESPONSE_CODES),
            Some(NO_RESPONSE_CODES),
        );
        return;
    }

    if !codes.iter().any(|code| is_success_code(code)) {
        carrier.add_message(
            path,
            "Each `responses` object should have at least one code for a successful response",
            ctx.severity(RuleFamily::Responses, NO_SUCCESS_RESPONSE_CODES),
            Some(NO_SUCCESS_RESPONSE_CODES),
        );
    }
}

/// 2xx, 3xx and `101 Switching Protocols`, including `2XX` ranges.
fn is_success_code(code: &str) -> bool {
    code == "101" || (code.len() == 3 && (code.starts_with('2') || code.starts_with('3')))
}

fn no_response_description(
    ctx: &RuleContext,
    responses: &Map<String, Value>,
    path: &JsonPath,
    carrier: &mut MessageCarrier,
) {
    for (code, response) in responses {
        if is_extension_key(code) || !response.is_object() || is_ref(response) {
            continue;
        }
        if response.get("description").and_then(Value::as_str).is_none() {
            carrier.add_message(
                path.concat(code),
                "Response objects must have a description",
                ctx.severity(RuleFamily::Responses, NO_RESPONSE_DESCRIPTION),
                Some(NO_RESPONSE_DESCRIPTION),
            );
        }
    }
}
