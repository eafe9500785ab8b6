//! Security rules.
//!
//! Requirements (the top-level `security` list and each operation's,
//! callback operations included) are checked against the declared schemes: `components.securitySchemes` in
//! OpenAPI 3, `securityDefinitions` in Swagger 2.0. Every finding carries
//! the scheme name as its `authId`.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use super::RuleContext;
use crate::config::RuleFamily;
use crate::message::MessageCarrier;
use crate::path::JsonPath;
use crate::classify::is_operation_path;
use crate::walker::walk_document;

pub const UNDEFINED_SECURITY_SCHEME: &str = "undefined_security_scheme";
pub const UNDEFINED_SCOPE: &str = "undefined_scope";
pub const UNUSED_SECURITY_SCHEME: &str = "unused_security_scheme";

/// A `security` list and where it sits.
struct Requirements<'a> {
    list: &'a [Value],
    path: JsonPath,
}

pub fn check(ctx: &RuleContext) -> MessageCarrier {
    let mut carrier = MessageCarrier::new();

    let (schemes, schemes_path) = declared_schemes(ctx);
    let mut used: BTreeSet<&str> = BTreeSet::new();

    for requirements in requirement_lists(ctx) {
        for (index, requirement) in requirements.list.iter().enumerate() {
            let Some(requirement) = requirement.as_object() else {
                continue;
            };
            let requirement_path = requirements.path.concat(index);
            for (name, scopes) in requirement {
                used.insert(name.as_str());
                let name_path = requirement_path.concat(name);
                match schemes.and_then(|s| s.get(name)) {
                    Some(scheme) => {
                        undefined_scopes(ctx, name, scheme, scopes, &name_path, &mut carrier)
                    }
                    None => carrier.add_message_with_auth_id(
                        name_path,
                        format!("Security scheme `{}` is used but never defined", name),
                        ctx.severity(RuleFamily::Security, UNDEFINED_SECURITY_SCHEME),
                        name.as_str(),
                        Some(UNDEFINED_SECURITY_SCHEME),
                    ),
                }
            }
        }
    }

    if let Some(schemes) = schemes {
        for name in schemes.keys() {
            if !used.contains(name.as_str()) {
                carrier.add_message_with_auth_id(
                    schemes_path.concat(name),
                    format!("Security scheme `{}` is defined but never used", name),
                    ctx.severity(RuleFamily::Security, UNUSED_SECURITY_SCHEME),
                    name.as_str(),
                    Some(UNUSED_SECURITY_SCHEME),
                );
            }
        }
    }

    carrier
}

fn declared_schemes<'a>(ctx: &RuleContext<'a>) -> (Option<&'a Map<String, Value>>, JsonPath) {
    let path = if ctx.is_oas3 {
        JsonPath::from(["components", "securitySchemes"])
    } else {
        JsonPath::from(["securityDefinitions"])
    };
    let schemes = path.lookup(ctx.resolved).and_then(Value::as_object);
    (schemes, path)
}

fn requirement_lists<'a>(ctx: &RuleContext<'a>) -> Vec<Requirements<'a>> {
    let mut lists = Vec::new();
    if let Some(list) = ctx.raw.get("security").and_then(Value::as_array) {
        lists.push(Requirements {
            list,
            path: JsonPath::from(["security"]),
        });
    }
    walk_document(ctx.raw, &mut |node, path| {
        if !node.is_object() || !is_operation_path(path, ctx.is_oas3) {
            return;
        }
        if let Some(list) = node.get("security").and_then(Value::as_array) {
            lists.push(Requirements {
                list,
                path: path.concat("security"),
            });
        }
    });
    lists
}

/// Scopes an OAuth2 scheme declares. `None` when the scheme does not
/// restrict scope names.
fn declared_scopes(scheme: &Value) -> Option<BTreeSet<&str>> {
    if scheme.get("type").and_then(Value::as_str) != Some("oauth2") {
        return None;
    }
    let mut scopes = BTreeSet::new();
    // Swagger 2.0
    if let Some(map) = scheme.get("scopes").and_then(Value::as_object) {
        scopes.extend(map.keys().map(String::as_str));
    }
    // OpenAPI 3
    if let Some(flows) = scheme.get("flows").and_then(Value::as_object) {
        for flow in flows.values() {
            if let Some(map) = flow.get("scopes").and_then(Value::as_object) {
                scopes.extend(map.keys().map(String::as_str));
            }
        }
    }
    Some(scopes)
}

fn undefined_scopes(
    ctx: &RuleContext,
    name: &str,
    scheme: &Value,
    scopes: &Value,
    path: &JsonPath,
    carrier: &mut MessageCarrier,
) {
    let Some(declared) = declared_scopes(scheme) else {
        return;
    };
    let Some(requested) = scopes.as_array() else {
        return;
    };
    for (index, scope) in requested.iter().enumerate() {
        let Some(scope) = scope.as_str() else {
            continue;
        };
        if !declared.contains(scope) {
            carrier.add_message_with_auth_id(
                path.concat(index),
                format!("Scope `{}` is not defined for security scheme `{}`", scope, name),
                ctx.severity(RuleFamily::Security, UNDEFINED_SCOPE),
                name,
                Some(UNDEFINED_SCOPE),
            );
        }
    }
}
