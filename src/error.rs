//! Error types for document loading and configuration.
//!
//! Problems found *in* a document are never errors; they are reported as
//! messages. These types cover failing to obtain a document or a
//! configuration in the first place.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading or resolving an API document.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML: {source}")]
    InvalidYaml {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unsupported YAML content at {path}: {message}")]
    UnsupportedYaml { path: String, message: String },

    #[error("unsupported file extension: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("cannot resolve reference {reference}")]
    RefResolution { reference: String },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors in a lint configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("configuration must be an object, got {actual}")]
    NotAnObject { actual: String },

    #[error("unknown rule family \"{family}\"")]
    UnknownFamily { family: String },

    #[error("unknown rule \"{rule}\" in family \"{family}\"")]
    UnknownRule { family: String, rule: String },

    #[error("unknown severity \"{value}\" for {rule}: expected off, hint, info, warning, or error")]
    UnknownSeverity { rule: String, value: String },

    #[error("invalid setting for {rule}: {message}")]
    InvalidSetting { rule: String, message: String },
}

impl ConfigError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConfigError::Load(e) => e.exit_code(),
            _ => 2,
        }
    }
}

/// Errors that stop a lint run before any rule executes.
#[derive(Debug, Error)]
pub enum LintError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl LintError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LintError::Load(e) => e.exit_code(),
            LintError::Config(e) => e.exit_code(),
        }
    }
}
