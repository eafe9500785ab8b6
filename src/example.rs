//! Effective example resolution.
//!
//! A schema's example can be written on the schema itself or on any
//! enclosing container: a parent object schema, the media type, or the
//! request/response body. [`resolve_example`] searches those candidates
//! from the nearest outward and narrows an ancestor's example down to the
//! part that describes the target schema.
//!
//! The enclosing containers are recorded in an [`AncestorChain`] while the
//! document is walked; [`visit_body_schemas`] does this for every body
//! schema of every operation.

use std::collections::HashSet;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::compose::Composition;
use crate::path::JsonPath;
use crate::refs::is_ref;
use crate::walker::collect_operations;

/// How a child was reached from its enclosing container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// `properties.<name>` of an object schema.
    Property(String),
    /// `items` of an array schema.
    Items,
    /// `additionalProperties` of a dictionary schema.
    AdditionalProperties,
    /// `patternProperties.<pattern>` of a dictionary schema.
    PatternProperties(String),
    /// One branch of `allOf`/`oneOf`/`anyOf`.
    Branch,
    /// `schema` of a media type, parameter or Swagger 2.0 response.
    Schema,
    /// `content.<media type>` of an OpenAPI 3 body.
    MediaType(String),
}

/// The kind of container an ancestor is, which decides how its own example
/// is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AncestorKind {
    Schema,
    MediaType,
    Body,
}

/// One enclosing container of the schema being resolved.
#[derive(Debug, Clone)]
pub struct Ancestor<'a> {
    pub node: &'a Value,
    pub kind: AncestorKind,
    /// Step taken from `node` towards the target.
    pub step: Step,
}

/// The enclosing containers of a schema, stored outermost first.
#[derive(Debug, Clone, Default)]
pub struct AncestorChain<'a> {
    links: Vec<Ancestor<'a>>,
}

impl<'a> AncestorChain<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a chain from links listed nearest first.
    pub fn from_nearest(mut links: Vec<Ancestor<'a>>) -> Self {
        links.reverse();
        Self { links }
    }

    /// Descend one level: `node` becomes the nearest ancestor.
    pub fn push(&mut self, node: &'a Value, kind: AncestorKind, step: Step) {
        self.links.push(Ancestor { node, kind, step });
    }

    pub fn pop(&mut self) -> Option<Ancestor<'a>> {
        self.links.pop()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Ancestors from the nearest to the outermost.
    pub fn outward(&self) -> impl Iterator<Item = &Ancestor<'a>> {
        self.links.iter().rev()
    }
}

/// Resolve the example that applies to `schema`.
///
/// Returns `None` when no candidate provides one; an explicit `null`
/// example is `Some(Value::Null)`. Candidates are tried nearest first: the
/// schema's own `example`/`examples`, then each ancestor's, narrowed along
/// the recorded steps (property name, first array element, matching
/// dictionary entry). The first candidate that survives narrowing wins.
pub fn resolve_example<'a>(schema: &'a Value, chain: &AncestorChain<'a>) -> Option<&'a Value> {
    if let Some(own) = own_example(schema, AncestorKind::Schema) {
        return Some(own);
    }

    let mut climbed: Vec<&Ancestor<'a>> = Vec::new();
    for ancestor in chain.outward() {
        climbed.push(ancestor);
        let Some(candidate) = own_example(ancestor.node, ancestor.kind) else {
            continue;
        };
        if let Some(narrowed) = narrow(candidate, &climbed) {
            return Some(narrowed);
        }
    }
    None
}

/// The example written directly on `node`.
fn own_example(node: &Value, kind: AncestorKind) -> Option<&Value> {
    let map = node.as_object()?;
    if let Some(example) = map.get("example") {
        return Some(example);
    }
    match map.get("examples")? {
        // JSON Schema `examples` is a list.
        Value::Array(items) => items.first(),
        Value::Object(entries) => {
            let (_, first) = entries.iter().next()?;
            match kind {
                // Example Objects carry the payload under `value`; an
                // `externalValue`-only entry provides nothing inline.
                AncestorKind::MediaType => first.get("value"),
                AncestorKind::Schema | AncestorKind::Body => Some(first),
            }
        }
        _ => None,
    }
}

/// Narrow `example`, found on the outermost of `climbed`, down to the
/// target. `climbed` is ordered nearest first.
fn narrow<'a>(example: &'a Value, climbed: &[&Ancestor<'a>]) -> Option<&'a Value> {
    let mut current = example;
    for ancestor in climbed.iter().rev() {
        current = narrow_step(current, ancestor)?;
    }
    Some(current)
}

fn narrow_step<'a>(value: &'a Value, ancestor: &Ancestor<'a>) -> Option<&'a Value> {
    match &ancestor.step {
        Step::Property(name) => value.as_object()?.get(name),
        Step::Items => value.as_array()?.first(),
        Step::AdditionalProperties => {
            let declared = ancestor.node.get("properties").and_then(Value::as_object);
            value
                .as_object()?
                .iter()
                .find(|(key, _)| declared.map(|d| !d.contains_key(*key)).unwrap_or(true))
                .map(|(_, v)| v)
        }
        Step::PatternProperties(pattern) => {
            let matcher = match Regex::new(pattern) {
                Ok(matcher) => matcher,
                Err(err) => {
                    debug!(pattern = %pattern, error = %err, "unusable patternProperties key");
                    return None;
                }
            };
            value
                .as_object()?
                .iter()
                .find(|(key, _)| matcher.is_match(key))
                .map(|(_, v)| v)
        }
        Step::Branch | Step::Schema => Some(value),
        // A body-level example may be keyed by media type.
        Step::MediaType(media_type) => Some(
            value
                .as_object()
                .and_then(|map| map.get(media_type))
                .unwrap_or(value),
        ),
    }
}

/// Visit every schema inside the request and response bodies of every
/// operation, together with the chain of containers enclosing it.
///
/// OpenAPI 3 bodies are reached through `requestBody.content.<type>.schema`
/// and `responses.<code>.content.<type>.schema`; Swagger 2.0 bodies through
/// `in: body` parameters and `responses.<code>.schema`. Below a body schema
/// the walk follows `properties`, `items`, `additionalProperties`,
/// `patternProperties` and composition branches. `$ref` nodes are visited
/// but not descended into.
pub fn visit_body_schemas<'a, F>(document: &'a Value, is_oas3: bool, visit: &mut F)
where
    F: FnMut(&'a Value, &JsonPath, &AncestorChain<'a>),
{
    let mut chain = AncestorChain::new();
    let mut visited_items = HashSet::new();

    for (operation, op_path) in collect_operations(document, is_oas3) {
        if is_oas3 {
            if let Some(body) = operation.get("requestBody") {
                visit_oas3_body(body, &op_path.concat("requestBody"), &mut chain, visit);
            }
        } else {
            // Path item parameters are shared by its operations.
            let item_params = op_path
                .parent()
                .filter(|item_path| visited_items.insert(item_path.clone()))
                .and_then(|item_path| {
                    let params = item_path.lookup(document)?.get("parameters")?;
                    Some((params, item_path.concat("parameters")))
                });
            let own_params = operation
                .get("parameters")
                .map(|params| (params, op_path.concat("parameters")));
            for (params, params_path) in item_params.into_iter().chain(own_params) {
                visit_swagger_body_parameters(params, &params_path, &mut chain, visit);
            }
        }

        let Some(responses) = operation.get("responses").and_then(Value::as_object) else {
            continue;
        };
        let responses_path = op_path.concat("responses");
        for (code, response) in responses {
            let response_path = responses_path.concat(code);
            if is_oas3 {
                visit_oas3_body(response, &response_path, &mut chain, visit);
            } else if let Some(schema) = response.get("schema") {
                if is_ref(response) {
                    continue;
                }
                chain.push(response, AncestorKind::Body, Step::Schema);
                descend(schema, &response_path.concat("schema"), &mut chain, visit);
                chain.pop();
            }
        }
    }
}

fn visit_oas3_body<'a, F>(
    body: &'a Value,
    body_path: &JsonPath,
    chain: &mut AncestorChain<'a>,
    visit: &mut F,
) where
    F: FnMut(&'a Value, &JsonPath, &AncestorChain<'a>),
{
    if is_ref(body) {
        return;
    }
    let Some(content) = body.get("content").and_then(Value::as_object) else {
        return;
    };
    let content_path = body_path.concat("content");
    for (media_type, media) in content {
        let Some(schema) = media.get("schema") else {
            continue;
        };
        let media_path = content_path.concat(media_type);
        chain.push(body, AncestorKind::Body, Step::MediaType(media_type.clone()));
        chain.push(media, AncestorKind::MediaType, Step::Schema);
        descend(schema, &media_path.concat("schema"), chain, visit);
        chain.pop();
        chain.pop();
    }
}

fn visit_swagger_body_parameters<'a, F>(
    params: &'a Value,
    params_path: &JsonPath,
    chain: &mut AncestorChain<'a>,
    visit: &mut F,
) where
    F: FnMut(&'a Value, &JsonPath, &AncestorChain<'a>),
{
    let Some(params) = params.as_array() else {
        return;
    };
    for (index, param) in params.iter().enumerate() {
        if param.get("in").and_then(Value::as_str) != Some("body") {
            continue;
        }
        let Some(schema) = param.get("schema") else {
            continue;
        };
        chain.push(param, AncestorKind::Body, Step::Schema);
        descend(
            schema,
            &params_path.concat(index).concat("schema"),
            chain,
            visit,
        );
        chain.pop();
    }
}

fn descend<'a, F>(schema: &'a Value, path: &JsonPath, chain: &mut AncestorChain<'a>, visit: &mut F)
where
    F: FnMut(&'a Value, &JsonPath, &AncestorChain<'a>),
{
    visit(schema, path, chain);

    let Some(map) = schema.as_object() else {
        return;
    };
    if map.contains_key("$ref") {
        return;
    }

    if let Some(properties) = map.get("properties").and_then(Value::as_object) {
        let properties_path = path.concat("properties");
        for (name, property) in properties {
            chain.push(schema, AncestorKind::Schema, Step::Property(name.clone()));
            descend(property, &properties_path.concat(name), chain, visit);
            chain.pop();
        }
    }

    if let Some(items) = map.get("items").filter(|items| items.is_object()) {
        chain.push(schema, AncestorKind::Schema, Step::Items);
        descend(items, &path.concat("items"), chain, visit);
        chain.pop();
    }

    if let Some(additional) = map
        .get("additionalProperties")
        .filter(|additional| additional.is_object())
    {
        chain.push(schema, AncestorKind::Schema, Step::AdditionalProperties);
        descend(additional, &path.concat("additionalProperties"), chain, visit);
        chain.pop();
    }

    if let Some(patterns) = map.get("patternProperties").and_then(Value::as_object) {
        let patterns_path = path.concat("patternProperties");
        for (pattern, value_schema) in patterns {
            chain.push(
                schema,
                AncestorKind::Schema,
                Step::PatternProperties(pattern.clone()),
            );
            descend(value_schema, &patterns_path.concat(pattern), chain, visit);
            chain.pop();
        }
    }

    for composition in Composition::ALL {
        let Some(branches) = map.get(composition.keyword()).and_then(Value::as_array) else {
            continue;
        };
        let keyword_path = path.concat(composition.keyword());
        for (index, branch) in branches.iter().enumerate() {
            chain.push(schema, AncestorKind::Schema, Step::Branch);
            descend(branch, &keyword_path.concat(index), chain, visit);
            chain.pop();
        }
    }
}
