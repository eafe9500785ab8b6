//! Core types shared by the traversal engine and the rules.

use heck::{ToKebabCase, ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Operation keys of an OpenAPI path item.
pub const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Returns the JSON type name for messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Returns true if `key` names an HTTP operation.
pub fn is_http_method(key: &str) -> bool {
    HTTP_METHODS.contains(&key)
}

/// Returns true if `key` is a vendor extension (`x-...`).
pub fn is_extension_key(key: &str) -> bool {
    key.starts_with("x-")
}

/// Detect whether a document is OpenAPI 3.x (as opposed to Swagger 2.0).
///
/// Documents without an `openapi` field are treated as Swagger 2.0.
pub fn is_oas3_document(document: &Value) -> bool {
    document
        .get("openapi")
        .and_then(Value::as_str)
        .map(|version| version.trim_start().starts_with('3'))
        .unwrap_or(false)
}

/// Severity assigned to a rule, and the bucket a finding lands in.
///
/// `Off` disables a rule: findings reported at `Off` are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Off,
    Hint,
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Parse a severity from its configuration spelling.
    ///
    /// Returns `None` for unknown values (caller should error).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "off" => Some(Severity::Off),
            "hint" => Some(Severity::Hint),
            "info" => Some(Severity::Info),
            "warning" => Some(Severity::Warning),
            "error" => Some(Severity::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Off => "off",
            Severity::Hint => "hint",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Naming convention enforced by the case-convention rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseConvention {
    Snake,
    Camel,
    Pascal,
    Kebab,
    ScreamingSnake,
}

impl CaseConvention {
    pub const NAMES: &'static [&'static str] = &[
        "snake_case",
        "camelCase",
        "PascalCase",
        "kebab-case",
        "SCREAMING_SNAKE_CASE",
    ];

    /// Parse a convention name as written in configuration.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "snake_case" | "lower_snake_case" => Some(CaseConvention::Snake),
            "camelCase" | "lowerCamelCase" => Some(CaseConvention::Camel),
            "PascalCase" | "UpperCamelCase" => Some(CaseConvention::Pascal),
            "kebab-case" | "lower_dash_case" => Some(CaseConvention::Kebab),
            "SCREAMING_SNAKE_CASE" | "upper_snake_case" => Some(CaseConvention::ScreamingSnake),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseConvention::Snake => "snake_case",
            CaseConvention::Camel => "camelCase",
            CaseConvention::Pascal => "PascalCase",
            CaseConvention::Kebab => "kebab-case",
            CaseConvention::ScreamingSnake => "SCREAMING_SNAKE_CASE",
        }
    }

    /// Returns true if `name` is already written in this convention.
    pub fn matches(&self, name: &str) -> bool {
        let converted = match self {
            CaseConvention::Snake => name.to_snake_case(),
            CaseConvention::Camel => name.to_lower_camel_case(),
            CaseConvention::Pascal => name.to_upper_camel_case(),
            CaseConvention::Kebab => name.to_kebab_case(),
            CaseConvention::ScreamingSnake => name.to_shouty_snake_case(),
        };
        converted == name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn severity_parse_valid() {
        assert_eq!(Severity::parse("off"), Some(Severity::Off));
        assert_eq!(Severity::parse("hint"), Some(Severity::Hint));
        assert_eq!(Severity::parse("info"), Some(Severity::Info));
        assert_eq!(Severity::parse("warning"), Some(Severity::Warning));
        assert_eq!(Severity::parse("error"), Some(Severity::Error));
    }

    #[test]
    fn severity_parse_invalid() {
        assert_eq!(Severity::parse("warn"), None);
        assert_eq!(Severity::parse("ERROR"), None);
        assert_eq!(Severity::parse(""), None);
    }

    #[test]
    fn detects_oas3_documents() {
        assert!(is_oas3_document(&json!({ "openapi": "3.0.3" })));
        assert!(is_oas3_document(&json!({ "openapi": "3.1.0" })));
        assert!(!is_oas3_document(&json!({ "swagger": "2.0" })));
        assert!(!is_oas3_document(&json!({})));
    }

    #[test]
    fn case_convention_matches() {
        assert!(CaseConvention::Snake.matches("user_id"));
        assert!(!CaseConvention::Snake.matches("userId"));
        assert!(CaseConvention::Camel.matches("userId"));
        assert!(!CaseConvention::Camel.matches("user_id"));
        assert!(CaseConvention::Pascal.matches("UserId"));
        assert!(CaseConvention::Kebab.matches("user-id"));
        assert!(CaseConvention::ScreamingSnake.matches("USER_ID"));
    }

    #[test]
    fn case_convention_parse() {
        assert_eq!(CaseConvention::parse("snake_case"), Some(CaseConvention::Snake));
        assert_eq!(
            CaseConvention::parse("lower_dash_case"),
            Some(CaseConvention::Kebab)
        );
        assert_eq!(CaseConvention::parse("Title Case"), None);
    }
}
