//! Rule configuration.
//!
//! A configuration is a map of rule families to rule settings:
//!
//! ```yaml
//! schemas:
//!   integer_limits: error
//!   property_case_convention: [warning, camelCase]
//! security:
//!   unused_security_scheme: off
//! ```
//!
//! Files are merged over [`LintConfig::default`], so they only need to
//! mention the rules they change.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ConfigError;
use crate::loader::load_document;
use crate::types::{json_type_name, CaseConvention, Severity};

/// A group of related rules, named as in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleFamily {
    Schemas,
    Parameters,
    Responses,
    Operations,
    Security,
    Examples,
}

impl RuleFamily {
    pub const ALL: [RuleFamily; 6] = [
        RuleFamily::Schemas,
        RuleFamily::Parameters,
        RuleFamily::Responses,
        RuleFamily::Operations,
        RuleFamily::Security,
        RuleFamily::Examples,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleFamily::Schemas => "schemas",
            RuleFamily::Parameters => "parameters",
            RuleFamily::Responses => "responses",
            RuleFamily::Operations => "operations",
            RuleFamily::Security => "security",
            RuleFamily::Examples => "examples",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|family| family.as_str() == s)
    }
}

impl std::fmt::Display for RuleFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of one rule plus its option, if the rule takes one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSetting {
    pub severity: Severity,
    pub option: Option<String>,
}

/// Built-in rules with their default severity and option.
pub const DEFAULT_RULES: &[(RuleFamily, &str, Severity, Option<&str>)] = &[
    (RuleFamily::Schemas, "composition_array", Severity::Error, None),
    (RuleFamily::Schemas, "integer_limits", Severity::Off, None),
    (RuleFamily::Schemas, "array_of_arrays", Severity::Warning, None),
    (
        RuleFamily::Schemas,
        "property_case_convention",
        Severity::Warning,
        Some("snake_case"),
    ),
    (
        RuleFamily::Parameters,
        "no_parameter_description",
        Severity::Warning,
        None,
    ),
    (
        RuleFamily::Parameters,
        "param_name_case_convention",
        Severity::Warning,
        Some("snake_case"),
    ),
    (RuleFamily::Responses, "no_response_codes", Severity::Error, None),
    (
        RuleFamily::Responses,
        "no_success_response_codes",
        Severity::Warning,
        None,
    ),
    (
        RuleFamily::Responses,
        "no_response_description",
        Severity::Error,
        None,
    ),
    (
        RuleFamily::Operations,
        "no_request_body_content",
        Severity::Error,
        None,
    ),
    (RuleFamily::Operations, "no_operation_id", Severity::Warning, None),
    (RuleFamily::Examples, "invalid_example", Severity::Warning, None),
    (
        RuleFamily::Security,
        "undefined_security_scheme",
        Severity::Error,
        None,
    ),
    (RuleFamily::Security, "undefined_scope", Severity::Error, None),
    (
        RuleFamily::Security,
        "unused_security_scheme",
        Severity::Warning,
        None,
    ),
];

/// A setting as written in a file: `"error"` or `["warning", "camelCase"]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSetting {
    Severity(String),
    WithOption(String, Value),
}

/// Severities and options for every known rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintConfig {
    rules: BTreeMap<RuleFamily, BTreeMap<String, RuleSetting>>,
}

impl Default for LintConfig {
    fn default() -> Self {
        let mut rules: BTreeMap<RuleFamily, BTreeMap<String, RuleSetting>> = BTreeMap::new();
        for &(family, key, severity, option) in DEFAULT_RULES {
            let setting = RuleSetting {
                severity,
                option: option.map(str::to_string),
            };
            rules.entry(family).or_default().insert(key.to_string(), setting);
        }
        Self { rules }
    }
}

impl LintConfig {
    /// Read a JSON or YAML configuration file and merge it over the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let value = load_document(path)?;
        debug!(path = %path.display(), "loaded lint configuration");
        Self::from_value(&value)
    }

    /// Build a configuration from an already parsed value, merged over the
    /// defaults.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.merge_value(value)?;
        Ok(config)
    }

    /// Overlay the settings in `value` onto this configuration.
    ///
    /// Unknown families, rules and severities are rejected, as are options
    /// on rules that take none. Nothing is changed when an error is returned.
    pub fn merge_value(&mut self, value: &Value) -> Result<(), ConfigError> {
        let families = match value {
            Value::Object(map) => map,
            Value::Null => return Ok(()),
            other => {
                return Err(ConfigError::NotAnObject {
                    actual: json_type_name(other).to_string(),
                })
            }
        };

        let mut updates = Vec::new();
        for (family_name, rules) in families {
            let family = RuleFamily::parse(family_name).ok_or_else(|| {
                ConfigError::UnknownFamily {
                    family: family_name.clone(),
                }
            })?;
            let rules = match rules {
                Value::Object(map) => map,
                Value::Null => continue,
                other => {
                    return Err(ConfigError::InvalidSetting {
                        rule: family_name.clone(),
                        message: format!("expected a map of rules, got {}", json_type_name(other)),
                    })
                }
            };
            for (key, raw) in rules {
                let setting = self.parse_setting(family, key, raw)?;
                updates.push((family, key.clone(), setting));
            }
        }

        for (family, key, setting) in updates {
            self.set(family, &key, setting);
        }
        Ok(())
    }

    fn parse_setting(
        &self,
        family: RuleFamily,
        key: &str,
        raw: &Value,
    ) -> Result<RuleSetting, ConfigError> {
        let rule = format!("{}.{}", family, key);
        let current = self
            .setting(family, key)
            .ok_or_else(|| ConfigError::UnknownRule {
                family: family.to_string(),
                rule: key.to_string(),
            })?;

        let raw: RawSetting =
            serde_json::from_value(raw.clone()).map_err(|_| ConfigError::InvalidSetting {
                rule: rule.clone(),
                message: "expected a severity or a [severity, option] pair".to_string(),
            })?;

        let (severity, option) = match raw {
            RawSetting::Severity(severity) => (severity, None),
            RawSetting::WithOption(severity, option) => (severity, Some(option)),
        };
        let severity = Severity::parse(&severity).ok_or_else(|| ConfigError::UnknownSeverity {
            rule: rule.clone(),
            value: severity.clone(),
        })?;

        let option = match (option, &current.option) {
            (None, existing) => existing.clone(),
            (Some(_), None) => {
                return Err(ConfigError::InvalidSetting {
                    rule,
                    message: "rule takes no option".to_string(),
                })
            }
            (Some(option), Some(_)) => {
                let name = option.as_str().unwrap_or_default();
                if CaseConvention::parse(name).is_none() {
                    return Err(ConfigError::InvalidSetting {
                        rule,
                        message: format!(
                            "unknown case convention {}: expected one of {}",
                            option,
                            CaseConvention::NAMES.join(", ")
                        ),
                    });
                }
                Some(name.to_string())
            }
        };

        Ok(RuleSetting { severity, option })
    }

    /// The setting of a rule, or `None` for an unknown rule.
    pub fn setting(&self, family: RuleFamily, key: &str) -> Option<&RuleSetting> {
        self.rules.get(&family).and_then(|rules| rules.get(key))
    }

    /// The severity of a rule. Unknown rules are `Off`.
    pub fn severity(&self, family: RuleFamily, key: &str) -> Severity {
        self.setting(family, key)
            .map(|setting| setting.severity)
            .unwrap_or(Severity::Off)
    }

    /// The case convention option of a rule, if it has one.
    pub fn case_convention(&self, family: RuleFamily, key: &str) -> Option<CaseConvention> {
        self.setting(family, key)
            .and_then(|setting| setting.option.as_deref())
            .and_then(CaseConvention::parse)
    }

    /// Replace a rule's setting.
    pub fn set(&mut self, family: RuleFamily, key: &str, setting: RuleSetting) {
        self.rules
            .entry(family)
            .or_default()
            .insert(key.to_string(), setting);
    }

    /// Shorthand for changing only a rule's severity.
    pub fn set_severity(&mut self, family: RuleFamily, key: &str, severity: Severity) {
        let option = self.setting(family, key).and_then(|s| s.option.clone());
        self.set(family, key, RuleSetting { severity, option });
    }

    /// Every configured rule, by family then key.
    pub fn iter(&self) -> impl Iterator<Item = (RuleFamily, &str, &RuleSetting)> {
        self.rules.iter().flat_map(|(family, rules)| {
            rules
                .iter()
                .map(move |(key, setting)| (*family, key.as_str(), setting))
        })
    }
}
