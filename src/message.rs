//! Finding accumulation.

use serde::Serialize;

use crate::path::JsonPath;
use crate::types::Severity;

/// A single finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub path: JsonPath,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    /// Security scheme a security finding is about.
    #[serde(rename = "authId", skip_serializing_if = "Option::is_none")]
    pub auth_id: Option<String>,
}

impl Message {
    /// The path joined with `.` for display.
    pub fn display_path(&self) -> String {
        self.path.to_display_string()
    }
}

/// Findings partitioned by severity.
///
/// Adding a message at [`Severity::Off`] does nothing, so rules never need
/// their own suppression check. Within a bucket messages keep the order they
/// were added in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessageCarrier {
    errors: Vec<Message>,
    warnings: Vec<Message>,
    infos: Vec<Message>,
    hints: Vec<Message>,
}

/// The serialized form of a finished lint run.
pub type ValidationReport = MessageCarrier;

impl MessageCarrier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finding in the bucket for `severity`.
    pub fn add_message(
        &mut self,
        path: impl Into<JsonPath>,
        message: impl Into<String>,
        severity: Severity,
        rule: Option<&str>,
    ) {
        self.push(severity, path.into(), message.into(), rule, None);
    }

    /// Record a finding that names the security scheme it concerns.
    pub fn add_message_with_auth_id(
        &mut self,
        path: impl Into<JsonPath>,
        message: impl Into<String>,
        severity: Severity,
        auth_id: impl Into<String>,
        rule: Option<&str>,
    ) {
        self.push(
            severity,
            path.into(),
            message.into(),
            rule,
            Some(auth_id.into()),
        );
    }

    fn push(
        &mut self,
        severity: Severity,
        path: JsonPath,
        message: String,
        rule: Option<&str>,
        auth_id: Option<String>,
    ) {
        let Some(bucket) = self.bucket_mut(severity) else {
            return;
        };
        bucket.push(Message {
            path,
            message,
            rule: rule.map(str::to_string),
            auth_id,
        });
    }

    fn bucket_mut(&mut self, severity: Severity) -> Option<&mut Vec<Message>> {
        match severity {
            Severity::Off => None,
            Severity::Error => Some(&mut self.errors),
            Severity::Warning => Some(&mut self.warnings),
            Severity::Info => Some(&mut self.infos),
            Severity::Hint => Some(&mut self.hints),
        }
    }

    pub fn errors(&self) -> &[Message] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Message] {
        &self.warnings
    }

    pub fn infos(&self) -> &[Message] {
        &self.infos
    }

    pub fn hints(&self) -> &[Message] {
        &self.hints
    }

    /// Messages of one severity. Empty for [`Severity::Off`].
    pub fn messages(&self, severity: Severity) -> &[Message] {
        match severity {
            Severity::Off => &[],
            Severity::Error => &self.errors,
            Severity::Warning => &self.warnings,
            Severity::Info => &self.infos,
            Severity::Hint => &self.hints,
        }
    }

    /// All messages, most severe bucket first.
    pub fn iter(&self) -> impl Iterator<Item = (Severity, &Message)> {
        [
            Severity::Error,
            Severity::Warning,
            Severity::Info,
            Severity::Hint,
        ]
        .into_iter()
        .flat_map(move |severity| self.messages(severity).iter().map(move |m| (severity, m)))
    }

    /// Append every message of `other`, bucket by bucket.
    pub fn extend(&mut self, other: MessageCarrier) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.infos.extend(other.infos);
        self.hints.extend(other.hints);
    }

    pub fn len(&self) -> usize {
        self.errors.len() + self.warnings.len() + self.infos.len() + self.hints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
