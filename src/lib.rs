//! OpenAPI Lint
//!
//! Style and correctness checks for OpenAPI 3 and Swagger 2.0 documents.
//!
//! Documents are plain JSON trees. Rules walk them with structured paths,
//! classify nodes by where they sit, flatten `allOf`/`oneOf`/`anyOf`
//! compositions, and resolve the example that applies to a nested schema.
//! Findings are collected by severity; a document is never rejected.
//!
//! # Example
//!
//! ```
//! use openapi_lint::{lint_document, LintOptions};
//! use serde_json::json;
//!
//! let doc = json!({
//!     "openapi": "3.0.0",
//!     "paths": {
//!         "/pets": { "get": { "operationId": "list_pets", "responses": {} } }
//!     }
//! });
//!
//! let report = lint_document(&doc, &LintOptions::new());
//! assert_eq!(report.errors().len(), 1);
//! assert_eq!(report.errors()[0].display_path(), "paths./pets.get.responses");
//! ```
//!
//! # Configuration
//!
//! | Setting | Meaning |
//! |---------|---------|
//! | `"error"`, `"warning"`, `"info"`, `"hint"` | Report at that severity |
//! | `"off"` | Disable the rule |
//! | `["warning", "camelCase"]` | Severity plus the rule's option |
//!
//! ```yaml
//! schemas:
//!   integer_limits: error
//! parameters:
//!   param_name_case_convention: [warning, camelCase]
//! ```

mod classify;
mod compose;
mod config;
mod error;
mod example;
mod linter;
mod loader;
mod message;
mod path;
mod refs;
pub mod rules;
mod types;
mod walker;

pub use classify::{
    is_composition_branch, is_operation_path, is_operation_responses, is_parameter_object,
    is_response_object, is_schema_object,
};
pub use compose::{flatten, Composition, CompositionError, Flattened, KeywordUnion, LeafSchema};
pub use config::{LintConfig, RuleFamily, RuleSetting, DEFAULT_RULES};
pub use error::{ConfigError, LintError, LoadError};
pub use example::{
    resolve_example, visit_body_schemas, Ancestor, AncestorChain, AncestorKind, Step,
};
pub use linter::{
    lint, lint_document, lint_file, validate, FileResult, FileStatus, LintOptions, LintResult,
};
pub use loader::{
    is_url, load_document, load_document_auto, load_document_str, navigate_pointer,
    resolve_local_refs, unresolved_local_refs,
};
pub use message::{Message, MessageCarrier, ValidationReport};
pub use path::{JsonPath, Segment};
pub use refs::{has_ref_child, has_ref_property, is_ref, ref_target};
pub use types::{is_oas3_document, CaseConvention, Severity};
pub use walker::{collect_operations, collect_schemas, walk, walk_document};

#[cfg(feature = "remote")]
pub use loader::load_document_url;
