//! Corpus audit tool for the Homestead unlock engine.
//!
//! Loads a JSON corpus and an optional YAML rules file, runs every corpus
//! check and prints the report as JSON on stdout. Logs go to stderr.
//!
//! # Exit Codes
//!
//! - `0` -- the corpus has no error findings
//! - `1` -- the corpus has at least one error finding
//! - `2` -- the audit could not run (bad arguments, unreadable input)
//!
//! # Startup Sequence
//!
//! 1. Parse arguments
//! 2. Load rules from the given file, or defaults
//! 3. Initialize structured logging (tracing)
//! 4. Load the corpus
//! 5. Run the audit and log the graph summary
//! 6. Print the report

mod error;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use homestead_audit::{AuditReport, CorpusAuditor};
use homestead_core::RulesConfig;
use homestead_types::Corpus;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

/// Parsed command-line arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    corpus: PathBuf,
    rules: Option<PathBuf>,
}

/// The JSON document written to stdout.
#[derive(Debug, Serialize)]
struct AuditOutput<'a> {
    generated_at: DateTime<Utc>,
    corpus: String,
    shippable: bool,
    error_count: usize,
    warning_count: usize,
    duplicate_ids: &'a [String],
    report: &'a AuditReport,
}

fn main() -> ExitCode {
    match run(std::env::args().skip(1)) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("homestead-audit: {e}");
            ExitCode::from(2)
        }
    }
}

/// Run one audit. Returns whether the corpus is shippable.
fn run(args: impl Iterator<Item = String>) -> Result<bool, CliError> {
    // 1. Parse arguments.
    let args = parse_args(args)?;

    // 2. Load rules.
    let config = load_config(args.rules.as_deref())?;

    // 3. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(
        corpus = %args.corpus.display(),
        starting_gold = config.audit.starting_gold,
        bootstrap_entity = %config.audit.bootstrap_entity,
        "homestead-audit starting"
    );

    // 4. Load the corpus.
    let corpus = Arc::new(load_corpus(&args.corpus)?);
    info!(entities = corpus.len(), "Corpus loaded");

    // 5. Run the audit.
    let report = CorpusAuditor::from_config(Arc::clone(&corpus), &config).audit();
    info!(
        nodes = report.graph.node_count,
        edges = report.graph.edge_count,
        roots = report.graph.root_count,
        undepthed = report.graph.undepthed_count,
        max_depth = ?report.graph.max_depth,
        "Dependency graph summary"
    );

    // 6. Print the report.
    let output = AuditOutput {
        generated_at: Utc::now(),
        corpus: args.corpus.display().to_string(),
        shippable: report.is_shippable(),
        error_count: report.error_count(),
        warning_count: report.warning_count(),
        duplicate_ids: corpus.duplicate_ids(),
        report: &report,
    };
    let json = serde_json::to_string_pretty(&output)?;
    writeln!(std::io::stdout().lock(), "{json}")?;

    Ok(output.shippable)
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, CliError> {
    let corpus = args.next().ok_or_else(|| CliError::Usage {
        message: String::from("missing corpus path"),
    })?;
    let rules = args.next().map(PathBuf::from);
    if let Some(extra) = args.next() {
        return Err(CliError::Usage {
            message: format!("unexpected argument {extra:?}"),
        });
    }
    Ok(Args {
        corpus: PathBuf::from(corpus),
        rules,
    })
}

/// Load rules from the given file, or defaults when none is given.
///
/// Environment overrides apply either way.
fn load_config(path: Option<&Path>) -> Result<RulesConfig, CliError> {
    let config = match path {
        Some(path) => RulesConfig::from_file(path)?,
        None => {
            info!("No rules file given, using defaults");
            RulesConfig::parse("")?
        }
    };
    Ok(config)
}

fn load_corpus(path: &Path) -> Result<Corpus, CliError> {
    let json = std::fs::read_to_string(path).map_err(|source| CliError::CorpusRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Corpus::from_json(&json)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
