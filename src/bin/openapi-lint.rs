//! OpenAPI Lint CLI
//!
//! Command-line interface for linting OpenAPI and Swagger documents.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use openapi_lint::{
    lint, load_document_auto, resolve_local_refs, unresolved_local_refs, FileStatus, LintConfig,
    LintError, LintOptions, LoadError, Severity,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "openapi-lint")]
#[command(about = "Lint OpenAPI and Swagger documents for style and correctness")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint a document, or every document under a directory
    Lint {
        /// File or directory to lint
        path: PathBuf,

        /// Rule configuration file (JSON or YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Suppress progress output, only show errors
        #[arg(long, short)]
        quiet: bool,

        /// Apply OpenAPI 3 (true) or Swagger 2.0 (false) rules instead of
        /// detecting the version
        #[arg(long, action = clap::ArgAction::Set)]
        oas3: Option<bool>,
    },

    /// Print a document with its local $ref pointers inlined
    Resolve {
        /// Document source: file path or URL (http:// or https://)
        source: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Lint {
            path,
            config,
            format,
            strict,
            quiet,
            oas3,
        } => run_lint(&path, config.as_deref(), &format, strict, quiet, oas3),

        Commands::Resolve {
            source,
            output,
            pretty,
        } => run_resolve(&source, output, pretty),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run_resolve(source: &str, output: Option<PathBuf>, pretty: bool) -> Result<(), u8> {
    let document = load_document_auto(source).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    if let Some((_, reference)) = unresolved_local_refs(&document).into_iter().next() {
        let e = LoadError::RefResolution { reference };
        eprintln!("Error: {}", e);
        return Err(e.exit_code() as u8);
    }
    let resolved = resolve_local_refs(&document);

    let json_output = if pretty {
        serde_json::to_string_pretty(&resolved)
    } else {
        serde_json::to_string(&resolved)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<LintConfig, LintError> {
    match path {
        Some(path) => Ok(LintConfig::load(path)?),
        None => Ok(LintConfig::default()),
    }
}

fn run_lint(
    path: &Path,
    config: Option<&Path>,
    format: &str,
    strict: bool,
    quiet: bool,
    oas3: Option<bool>,
) -> Result<(), u8> {
    if !path.exists() {
        eprintln!("Error: path not found: {}", path.display());
        return Err(3);
    }

    let config = load_config(config).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    let options = LintOptions::new().config(config).strict(strict).oas3(oas3);

    let result = lint(path, &options);

    if format == "json" {
        let rendered = serde_json::to_string_pretty(&result).map_err(|e| {
            eprintln!("Error serializing output: {}", e);
            2u8
        })?;
        println!("{}", rendered);
    } else {
        if !quiet {
            println!("Linting {} ...\n", path.display());
        }

        for file_result in &result.results {
            let status_icon = match file_result.status {
                FileStatus::Ok => "\x1b[32m✓\x1b[0m",
                FileStatus::Warning => "\x1b[33m⚠\x1b[0m",
                FileStatus::Error => "\x1b[31m✗\x1b[0m",
            };

            if !quiet || file_result.status != FileStatus::Ok {
                println!("  {} {}", status_icon, file_result.file.display());
            }

            if let Some(error) = &file_result.error {
                println!("    \x1b[31merror\x1b[0m: {}", error);
            }

            for (severity, message) in file_result.report.iter() {
                if quiet && severity != Severity::Error {
                    continue;
                }
                let color = match severity {
                    Severity::Error => "\x1b[31m",
                    Severity::Warning => "\x1b[33m",
                    _ => "\x1b[36m",
                };
                println!(
                    "    {}{}[{}]\x1b[0m: {} - {}",
                    color,
                    severity,
                    message.rule.as_deref().unwrap_or("-"),
                    message.display_path(),
                    message.message
                );
            }
        }

        println!();
        if result.exit_code(strict) == 0 {
            println!(
                "\x1b[32m✓ {} files checked, all passed\x1b[0m",
                result.files_checked
            );
        } else {
            println!(
                "\x1b[31m✗ {} files checked: {} passed, {} failed ({} errors, {} warnings)\x1b[0m",
                result.files_checked, result.passed, result.failed, result.errors, result.warnings
            );
        }
    }

    match result.exit_code(strict) {
        0 => Ok(()),
        code => Err(code as u8),
    }
}
