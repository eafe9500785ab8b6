//! Rule families.
//!
//! Each family module exposes `check(&RuleContext) -> MessageCarrier`.
//! Rules never fail: anything they object to becomes a message.

pub mod examples;
pub mod operations;
pub mod parameters;
pub mod responses;
pub mod schemas;
pub mod security;

use serde_json::Value;
use tracing::debug;

use crate::config::{LintConfig, RuleFamily};
use crate::message::MessageCarrier;
use crate::types::{CaseConvention, Severity};

/// Everything a rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// The document as written. Used by rules about `$ref` placement.
    pub raw: &'a Value,
    /// The document with local references inlined.
    pub resolved: &'a Value,
    pub is_oas3: bool,
    pub config: &'a LintConfig,
}

impl<'a> RuleContext<'a> {
    pub fn severity(&self, family: RuleFamily, key: &str) -> Severity {
        self.config.severity(family, key)
    }

    pub fn enabled(&self, family: RuleFamily, key: &str) -> bool {
        self.severity(family, key) != Severity::Off
    }

    pub fn case_convention(&self, family: RuleFamily, key: &str) -> Option<CaseConvention> {
        self.config.case_convention(family, key)
    }
}

type FamilyCheck = fn(&RuleContext) -> MessageCarrier;

const FAMILIES: &[(RuleFamily, FamilyCheck)] = &[
    (RuleFamily::Schemas, schemas::check),
    (RuleFamily::Parameters, parameters::check),
    (RuleFamily::Responses, responses::check),
    (RuleFamily::Operations, operations::check),
    (RuleFamily::Security, security::check),
    (RuleFamily::Examples, examples::check),
];

/// Run every rule family and merge the findings.
pub fn run_all(ctx: &RuleContext) -> MessageCarrier {
    let mut carrier = MessageCarrier::new();
    for (family, check) in FAMILIES {
        let found = check(ctx);
        debug!(family = %family, findings = found.len(), "ran rule family");
        carrier.extend(found);
    }
    carrier
}
