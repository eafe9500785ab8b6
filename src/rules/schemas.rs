//! Schema rules.
//!
//! Schemas are collected from the raw document so each one is reported once
//! where it is written. Rules that need to see through `$ref` look up the
//! same path in the resolved document.

use serde_json::Value;

use super::RuleContext;
use crate::classify::is_composition_branch;
use crate::compose::{flatten, KeywordUnion};
use crate::config::RuleFamily;
use crate::message::MessageCarrier;
use crate::path::JsonPath;
use crate::refs::is_ref;
use crate::walker::collect_schemas;

pub const COMPOSITION_ARRAY: &str = "composition_array";
pub const INTEGER_LIMITS: &str = "integer_limits";
pub const ARRAY_OF_ARRAYS: &str = "array_of_arrays";
pub const PROPERTY_CASE_CONVENTION: &str = "property_case_convention";

pub fn check(ctx: &RuleContext) -> MessageCarrier {
    let mut carrier = MessageCarrier::new();

    for (schema, path) in collect_schemas(ctx.raw) {
        if is_ref(schema) {
            continue;
        }
        property_case_convention(ctx, schema, &path, &mut carrier);

        // Branches are covered by flattening the schema that owns them.
        if is_composition_branch(&path) {
            continue;
        }
        composition_array(ctx, schema, &path, &mut carrier);

        let resolved = path.lookup(ctx.resolved).unwrap_or(schema);
        integer_limits(ctx, resolved, &path, &mut carrier);
        array_of_arrays(ctx, resolved, &path, &mut carrier);
    }

    carrier
}

fn composition_array(ctx: &RuleContext, schema: &Value, path: &JsonPath, carrier: &mut MessageCarrier) {
    let severity = ctx.severity(RuleFamily::Schemas, COMPOSITION_ARRAY);
    flatten(schema, path, ctx.is_oas3).report(carrier, severity, COMPOSITION_ARRAY);
}

fn integer_limits(ctx: &RuleContext, schema: &Value, path: &JsonPath, carrier: &mut MessageCarrier) {
    if !ctx.enabled(RuleFamily::Schemas, INTEGER_LIMITS) {
        return;
    }
    let severity = ctx.severity(RuleFamily::Schemas, INTEGER_LIMITS);

    let flat = flatten(schema, path, ctx.is_oas3);
    let union = KeywordUnion::new(schema, &flat.leaves);
    if !union.has_type("integer") {
        return;
    }

    if !union.defines("minimum") && !defines_numeric(&union, "exclusiveMinimum") {
        carrier.add_message(
            path,
            "Integer schema should define a minimum",
            severity,
            Some(INTEGER_LIMITS),
        );
    }
    if !union.defines("maximum") && !defines_numeric(&union, "exclusiveMaximum") {
        carrier.add_message(
            path,
            "Integer schema should define a maximum",
            severity,
            Some(INTEGER_LIMITS),
        );
    }

    let minimums = union.scoped_lower_bounds("minimum");
    let maximums = union.scoped_upper_bounds("maximum");
    let inverted = minimums
        .iter()
        .zip(&maximums)
        .any(|(min, max)| matches!((min, max), (Some(min), Some(max)) if min > max));
    if inverted {
        carrier.add_message(
            path,
            "minimum cannot be greater than maximum",
            severity,
            Some(INTEGER_LIMITS),
        );
    }
}

/// OpenAPI 3.1 writes exclusive bounds as numbers rather than flags.
fn defines_numeric(union: &KeywordUnion, keyword: &str) -> bool {
    union
        .scoped_values(keyword)
        .into_iter()
        .flatten()
        .any(Value::is_number)
}

fn array_of_arrays(ctx: &RuleContext, schema: &Value, path: &JsonPath, carrier: &mut MessageCarrier) {
    let is_array = |node: &Value| node.get("type").and_then(Value::as_str) == Some("array");
    if !is_array(schema) {
        return;
    }
    if schema.get("items").map(is_array).unwrap_or(false) {
        carrier.add_message(
            path.concat("items"),
            "Array items should not themselves be arrays",
            ctx.severity(RuleFamily::Schemas, ARRAY_OF_ARRAYS),
            Some(ARRAY_OF_ARRAYS),
        );
    }
}

fn property_case_convention(
    ctx: &RuleContext,
    schema: &Value,
    path: &JsonPath,
    carrier: &mut MessageCarrier,
) {
    if !ctx.enabled(RuleFamily::Schemas, PROPERTY_CASE_CONVENTION) {
        return;
    }
    let Some(convention) = ctx.case_convention(RuleFamily::Schemas, PROPERTY_CASE_CONVENTION) else {
        return;
    };
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return;
    };

    let properties_path = path.concat("properties");
    for name in properties.keys() {
        if !convention.matches(name) {
            carrier.add_message(
                properties_path.concat(name),
                format!("Property names must follow case convention: {}", convention.as_str()),
                ctx.severity(RuleFamily::Schemas, PROPERTY_CASE_CONVENTION),
                Some(PROPERTY_CASE_CONVENTION),
            );
        }
    }
}
