//! Lint orchestration.
//!
//! Runs every rule family over a document, and collects per-file results
//! when linting a file or a directory of documents.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::LintConfig;
use crate::loader::{load_document, resolve_local_refs, unresolved_local_refs, DOCUMENT_EXTENSIONS};
use crate::message::MessageCarrier;
use crate::rules::{run_all, RuleContext};
use crate::types::{is_oas3_document, Severity};

/// Options for a lint run.
#[derive(Debug, Clone, Default)]
pub struct LintOptions {
    pub config: LintConfig,
    /// Treat warnings as failures.
    pub strict: bool,
    /// Force OpenAPI 3 (`Some(true)`) or Swagger 2.0 (`Some(false)`) rules
    /// instead of detecting the version from the document.
    pub oas3: Option<bool>,
}

impl LintOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: LintConfig) -> Self {
        self.config = config;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn oas3(mut self, oas3: Option<bool>) -> Self {
        self.oas3 = oas3;
        self
    }

    fn is_oas3(&self, document: &Value) -> bool {
        self.oas3.unwrap_or_else(|| is_oas3_document(document))
    }
}

/// Run every rule over an already loaded and resolved document.
pub fn validate(raw: &Value, resolved: &Value, is_oas3: bool, config: &LintConfig) -> MessageCarrier {
    let ctx = RuleContext {
        raw,
        resolved,
        is_oas3,
        config,
    };
    run_all(&ctx)
}

/// Resolve local references in `raw` and lint it.
///
/// A local `$ref` with no target is reported as an error at the `$ref` and
/// left in place; every rule still runs over the rest of the document.
pub fn lint_document(raw: &Value, options: &LintOptions) -> MessageCarrier {
    let is_oas3 = options.is_oas3(raw);
    let resolved = resolve_local_refs(raw);
    debug!(is_oas3, "linting document");

    let mut report = MessageCarrier::new();
    for (path, reference) in unresolved_local_refs(raw) {
        report.add_message(
            path,
            format!("Cannot resolve reference `{}`", reference),
            Severity::Error,
            None,
        );
    }
    report.extend(validate(raw, &resolved, is_oas3, &options.config));
    report
}

/// Result of linting a single file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub file: PathBuf,
    pub status: FileStatus,
    /// Why the file could not be linted at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub error_exit_code: Option<i32>,
    #[serde(flatten)]
    pub report: MessageCarrier,
}

/// Status of a linted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ok,
    Error,
    Warning,
}

/// Result of linting a file or directory.
#[derive(Debug, Clone, Serialize)]
pub struct LintResult {
    pub path: PathBuf,
    pub files_checked: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub hints: usize,
    pub results: Vec<FileResult>,
}

impl LintResult {
    /// Returns true if no file had errors or failed to load.
    pub fn is_ok(&self) -> bool {
        self.errors == 0 && self.results.iter().all(|r| r.error.is_none())
    }

    /// Process exit code for this result.
    ///
    /// A file that could not be loaded wins (2 for parse, 3 for I/O), then
    /// 1 for findings at error level (or warnings when `strict`), else 0.
    pub fn exit_code(&self, strict: bool) -> i32 {
        if let Some(code) = self.results.iter().filter_map(|r| r.error_exit_code).max() {
            return code;
        }
        if self.errors > 0 || (strict && self.warnings > 0) {
            1
        } else {
            0
        }
    }
}

/// Lint a file or directory.
///
/// A directory is searched recursively for `.json`, `.yaml` and `.yml`
/// files, which are linted in sorted order.
pub fn lint(path: &Path, options: &LintOptions) -> LintResult {
    let files = collect_document_files(path);
    let base = if path.is_dir() {
        path
    } else {
        path.parent().unwrap_or(path)
    };
    info!(path = %path.display(), files = files.len(), "linting");

    let results: Vec<FileResult> = files.iter().map(|file| lint_file(file, base, options)).collect();

    let count = |pick: fn(&MessageCarrier) -> usize| -> usize {
        results.iter().map(|r| pick(&r.report)).sum()
    };
    let errors = count(|c| c.errors().len());
    let warnings = count(|c| c.warnings().len());
    let infos = count(|c| c.infos().len());
    let hints = count(|c| c.hints().len());

    let failed = results
        .iter()
        .filter(|r| {
            if options.strict {
                r.status != FileStatus::Ok
            } else {
                r.status == FileStatus::Error
            }
        })
        .count();

    LintResult {
        path: path.to_path_buf(),
        files_checked: files.len(),
        passed: files.len() - failed,
        failed,
        errors,
        warnings,
        infos,
        hints,
        results,
    }
}

/// Lint a single document file. `file` is reported relative to `base_path`.
pub fn lint_file(file: &Path, base_path: &Path, options: &LintOptions) -> FileResult {
    let display = file.strip_prefix(base_path).unwrap_or(file).to_path_buf();

    let report = match load_document(file).map(|raw| lint_document(&raw, options)) {
        Ok(report) => report,
        Err(e) => {
            debug!(file = %file.display(), error = %e, "cannot lint file");
            return FileResult {
                file: display,
                status: FileStatus::Error,
                error: Some(e.to_string()),
                error_exit_code: Some(e.exit_code()),
                report: MessageCarrier::new(),
            };
        }
    };

    let status = if !report.errors().is_empty() {
        FileStatus::Error
    } else if !report.warnings().is_empty() {
        FileStatus::Warning
    } else {
        FileStatus::Ok
    };

    FileResult {
        file: display,
        status,
        error: None,
        error_exit_code: None,
        report,
    }
}

fn is_document_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| DOCUMENT_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn collect_document_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }

    let mut files = Vec::new();
    collect_files_recursive(path, &mut files);
    files.sort();
    files
}

fn collect_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files_recursive(&path, files);
        } else if is_document_file(&path) {
            files.push(path);
        }
    }
}
