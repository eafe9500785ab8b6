//! Schema composition flattening.
//!
//! Under `allOf`/`oneOf`/`anyOf` the keywords that constrain a value are
//! spread across branches. [`flatten`] expands a schema into the leaf
//! schemas that actually carry keywords, and [`KeywordUnion`] answers
//! keyword questions across all of them at once.

use serde_json::Value;

use crate::message::MessageCarrier;
use crate::path::JsonPath;
use crate::types::{json_type_name, Severity};

/// A composition keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Composition {
    AllOf,
    OneOf,
    AnyOf,
}

impl Composition {
    /// Expansion order.
    pub const ALL: [Composition; 3] = [Composition::AllOf, Composition::OneOf, Composition::AnyOf];

    pub fn keyword(&self) -> &'static str {
        match self {
            Composition::AllOf => "allOf",
            Composition::OneOf => "oneOf",
            Composition::AnyOf => "anyOf",
        }
    }

    /// `oneOf`/`anyOf` branches are alternatives rather than simultaneous
    /// constraints.
    pub fn is_alternative(&self) -> bool {
        !matches!(self, Composition::AllOf)
    }

    /// Swagger 2.0 only knows `allOf`.
    pub fn applies_to(&self, is_oas3: bool) -> bool {
        is_oas3 || matches!(self, Composition::AllOf)
    }
}

/// A schema with no composition left to expand.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafSchema<'a> {
    pub schema: &'a Value,
    /// Where the leaf itself lives (e.g. `P.allOf.1`).
    pub path: JsonPath,
    /// The outermost composed schema the leaf was reached from. Findings
    /// about the composed schema as a whole are reported here.
    pub root_path: JsonPath,
    /// True if a `oneOf`/`anyOf` branch was crossed on the way down.
    pub alternative: bool,
}

/// A composition keyword whose value is not an array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionError {
    /// Path of the offending keyword (`<schema>.allOf`).
    pub path: JsonPath,
    pub keyword: Composition,
    /// JSON type that was found instead of an array.
    pub found: &'static str,
}

impl CompositionError {
    pub fn message(&self) -> String {
        format!("{} value should be an array", self.keyword.keyword())
    }
}

/// Result of flattening one schema.
#[derive(Debug, Clone, Default)]
pub struct Flattened<'a> {
    pub leaves: Vec<LeafSchema<'a>>,
    pub errors: Vec<CompositionError>,
}

impl<'a> Flattened<'a> {
    /// Write every composition error into `carrier`.
    pub fn report(&self, carrier: &mut MessageCarrier, severity: Severity, rule: &str) {
        for error in &self.errors {
            carrier.add_message(&error.path, error.message(), severity, Some(rule));
        }
    }
}

/// Expand `schema` (found at `path`) into its leaf schemas.
///
/// `allOf` is always expanded; `oneOf` and `anyOf` only when `is_oas3`. A
/// composition keyword that is not an array is recorded as an error and not
/// descended into, while the remaining keywords are still expanded. A node
/// that expanded no keyword is itself a leaf. `$ref` nodes are leaves and
/// are not followed; composition keywords written next to a `$ref` are
/// ignored, malformed or not.
pub fn flatten<'a>(schema: &'a Value, path: &JsonPath, is_oas3: bool) -> Flattened<'a> {
    let mut out = Flattened::default();
    flatten_into(schema, path, path, false, is_oas3, &mut out);
    out
}

fn flatten_into<'a>(
    schema: &'a Value,
    path: &JsonPath,
    root_path: &JsonPath,
    alternative: bool,
    is_oas3: bool,
    out: &mut Flattened<'a>,
) {
    if let Some(map) = schema.as_object().filter(|map| !map.contains_key("$ref")) {
        let mut expanded = false;

        for composition in Composition::ALL {
            if !composition.applies_to(is_oas3) {
                continue;
            }
            let Some(value) = map.get(composition.keyword()) else {
                continue;
            };
            let keyword_path = path.concat(composition.keyword());

            match value {
                Value::Array(branches) => {
                    expanded = true;
                    for (index, branch) in branches.iter().enumerate() {
                        flatten_into(
                            branch,
                            &keyword_path.concat(index),
                            root_path,
                            alternative || composition.is_alternative(),
                            is_oas3,
                            out,
                        );
                    }
                }
                other => out.errors.push(CompositionError {
                    path: keyword_path,
                    keyword: composition,
                    found: json_type_name(other),
                }),
            }
        }

        if expanded {
            return;
        }
    }

    out.leaves.push(LeafSchema {
        schema,
        path: path.clone(),
        root_path: root_path.clone(),
        alternative,
    });
}

/// Keyword lookups across a composed schema and its leaves.
///
/// Presence is a union: a keyword is defined if the outer schema or any
/// leaf defines it. Values are scoped: the outer schema and the `allOf`
/// leaves are in force together, and each `oneOf`/`anyOf` leaf adds its
/// own alternative scope on top of them.
#[derive(Debug, Clone)]
pub struct KeywordUnion<'a> {
    merged: Vec<&'a Value>,
    alternatives: Vec<&'a Value>,
}

impl<'a> KeywordUnion<'a> {
    pub fn new(outer: &'a Value, leaves: &[LeafSchema<'a>]) -> Self {
        let mut merged = vec![outer];
        let mut alternatives = Vec::new();
        for leaf in leaves {
            if std::ptr::eq(leaf.schema, outer) {
                continue;
            }
            if leaf.alternative {
                alternatives.push(leaf.schema);
            } else {
                merged.push(leaf.schema);
            }
        }
        Self {
            merged,
            alternatives,
        }
    }

    /// Returns true if any schema in the union defines `keyword`.
    pub fn defines(&self, keyword: &str) -> bool {
        self.merged
            .iter()
            .chain(&self.alternatives)
            .any(|schema| schema.get(keyword).is_some())
    }

    /// The value of `keyword` among the simultaneously applied schemas.
    pub fn merged_value(&self, keyword: &str) -> Option<&'a Value> {
        self.merged.iter().find_map(|schema| schema.get(keyword))
    }

    /// The value of `keyword` in each constraint scope.
    ///
    /// One entry without alternatives; otherwise one per alternative, where
    /// the alternative's own value wins over the merged one.
    pub fn scoped_values(&self, keyword: &str) -> Vec<Option<&'a Value>> {
        let merged = self.merged_value(keyword);
        if self.alternatives.is_empty() {
            return vec![merged];
        }
        self.alternatives
            .iter()
            .map(|alt| alt.get(keyword).or(merged))
            .collect()
    }

    /// The lower bound in force in each constraint scope: the largest
    /// numeric `keyword` value among the schemas applied together.
    pub fn scoped_lower_bounds(&self, keyword: &str) -> Vec<Option<f64>> {
        self.scoped_numbers(keyword, f64::max)
    }

    /// The upper bound in force in each constraint scope: the smallest
    /// numeric `keyword` value among the schemas applied together.
    pub fn scoped_upper_bounds(&self, keyword: &str) -> Vec<Option<f64>> {
        self.scoped_numbers(keyword, f64::min)
    }

    fn scoped_numbers(&self, keyword: &str, tightest: fn(f64, f64) -> f64) -> Vec<Option<f64>> {
        let number = |schema: &&'a Value| schema.get(keyword).and_then(Value::as_f64);
        let merged = self.merged.iter().filter_map(number).reduce(tightest);
        if self.alternatives.is_empty() {
            return vec![merged];
        }
        self.alternatives
            .iter()
            .map(|alt| match (number(alt), merged) {
                (Some(own), Some(merged)) => Some(tightest(own, merged)),
                (own, merged) => own.or(merged),
            })
            .collect()
    }

    /// Returns true if any schema declares `type` as `ty` (directly or in a
    /// type array).
    pub fn has_type(&self, ty: &str) -> bool {
        self.merged
            .iter()
            .chain(&self.alternatives)
            .filter_map(|schema| schema.get("type"))
            .any(|declared| match declared {
                Value::String(s) => s == ty,
                Value::Array(types) => types.iter().any(|t| t.as_str() == Some(ty)),
                _ => false,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn root() -> JsonPath {
        JsonPath::from(["components", "schemas", "Limit"])
    }

    #[test]
    fn malformed_all_of_reports_and_skips() {
        let schema = json!({ "allOf": "not-an-array" });
        let flat = flatten(&schema, &root(), true);

        assert_eq!(flat.errors.len(), 1);
        assert_eq!(flat.errors[0].message(), "allOf value should be an array");
        assert_eq!(flat.errors[0].path, root().concat("allOf"));
        assert_eq!(flat.errors[0].found, "string");
        // Nothing came from inside the keyword; the node stands alone.
        assert_eq!(flat.leaves.len(), 1);
        assert_eq!(flat.leaves[0].path, root());
    }

    #[test]
    fn leaves_keep_branch_paths_and_root() {
        let schema = json!({ "allOf": [{ "minimum": 0 }, { "maximum": 10 }] });
        let flat = flatten(&schema, &root(), true);

        assert!(flat.errors.is_empty());
        let paths: Vec<String> = flat
            .leaves
            .iter()
            .map(|l| l.path.to_display_string())
            .collect();
        assert_eq!(
            paths,
            vec![
                "components.schemas.Limit.allOf.0",
                "components.schemas.Limit.allOf.1"
            ]
        );
        assert!(flat.leaves.iter().all(|l| l.root_path == root()));

        let union = KeywordUnion::new(&schema, &flat.leaves);
        assert!(union.defines("minimum"));
        assert!(union.defines("maximum"));
        assert_eq!(union.scoped_values("minimum"), vec![Some(&json!(0))]);
        assert_eq!(union.scoped_values("maximum"), vec![Some(&json!(10))]);
    }

    #[test]
    fn nested_composition_flattens_recursively() {
        let schema = json!({
            "allOf": [
                { "oneOf": [{ "type": "integer" }, { "type": "string" }] },
                { "description": "x" }
            ]
        });
        let flat = flatten(&schema, &root(), true);
        let paths: Vec<String> = flat
            .leaves
            .iter()
            .map(|l| l.path.to_display_string())
            .collect();
        assert_eq!(
            paths,
            vec![
                "components.schemas.Limit.allOf.0.oneOf.0",
                "components.schemas.Limit.allOf.0.oneOf.1",
                "components.schemas.Limit.allOf.1",
            ]
        );
        assert!(flat.leaves[0].alternative);
        assert!(flat.leaves[1].alternative);
        assert!(!flat.leaves[2].alternative);
    }

    #[test]
    fn one_of_is_ignored_for_swagger2() {
        let schema = json!({ "oneOf": "bad", "type": "string" });
        let flat = flatten(&schema, &root(), false);
        assert!(flat.errors.is_empty());
        assert_eq!(flat.leaves.len(), 1);
    }

    #[test]
    fn malformed_keyword_does_not_stop_siblings() {
        let schema = json!({
            "allOf": { "type": "string" },
            "anyOf": [{ "type": "string" }, { "type": "null" }]
        });
        let flat = flatten(&schema, &root(), true);
        assert_eq!(flat.errors.len(), 1);
        assert_eq!(flat.errors[0].keyword, Composition::AllOf);
        assert_eq!(flat.leaves.len(), 2);
        assert_eq!(flat.leaves[1].path, root().concat("anyOf").concat(1usize));
    }

    #[test]
    fn ref_nodes_are_leaves() {
        let schema = json!({ "$ref": "#/components/schemas/Other", "allOf": "ignored" });
        let flat = flatten(&schema, &root(), true);
        assert!(flat.errors.is_empty());
        assert_eq!(flat.leaves.len(), 1);
    }

    #[test]
    fn report_writes_errors() {
        let schema = json!({ "allOf": 3, "oneOf": {} });
        let flat = flatten(&schema, &root(), true);
        let mut carrier = MessageCarrier::new();
        flat.report(&mut carrier, Severity::Error, "composition_array");

        assert_eq!(carrier.errors().len(), 2);
        assert_eq!(carrier.errors()[1].message, "oneOf value should be an array");
        assert_eq!(carrier.errors()[1].rule.as_deref(), Some("composition_array"));
    }

    #[test]
    fn merged_bounds_take_the_tightest_value() {
        let schema = json!({
            "type": "integer",
            "minimum": 0,
            "allOf": [{ "minimum": 20 }, { "maximum": 10 }, { "maximum": 50 }]
        });
        let flat = flatten(&schema, &root(), true);
        let union = KeywordUnion::new(&schema, &flat.leaves);

        assert_eq!(union.scoped_lower_bounds("minimum"), vec![Some(20.0)]);
        assert_eq!(union.scoped_upper_bounds("maximum"), vec![Some(10.0)]);
    }

    #[test]
    fn alternative_bounds_combine_with_merged_ones() {
        let schema = json!({
            "minimum": 5,
            "allOf": [{ "maximum": 100 }],
            "oneOf": [{ "minimum": 1 }, { "minimum": 8, "maximum": 200 }, {}]
        });
        let flat = flatten(&schema, &root(), true);
        let union = KeywordUnion::new(&schema, &flat.leaves);

        assert_eq!(
            union.scoped_lower_bounds("minimum"),
            vec![Some(5.0), Some(8.0), Some(5.0)]
        );
        assert_eq!(
            union.scoped_upper_bounds("maximum"),
            vec![Some(100.0), Some(100.0), Some(100.0)]
        );
    }

    #[test]
    fn alternatives_form_separate_scopes() {
        let schema = json!({
            "type": "integer",
            "minimum": 5,
            "oneOf": [{ "maximum": 10 }, { "maximum": 1, "minimum": 0 }]
        });
        let flat = flatten(&schema, &root(), true);
        let union = KeywordUnion::new(&schema, &flat.leaves);

        assert!(union.has_type("integer"));
        assert_eq!(
            union.scoped_values("minimum"),
            vec![Some(&json!(5)), Some(&json!(0))]
        );
        assert_eq!(
            union.scoped_values("maximum"),
            vec![Some(&json!(10)), Some(&json!(1))]
        );
    }
}
