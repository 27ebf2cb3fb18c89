//! Error types for the `homestead-audit` binary.
//!
//! [`CliError`] wraps every failure that can stop an audit run before a
//! report is produced. Audit findings are not errors; they are the report.

use std::path::PathBuf;

/// Top-level error for the `homestead-audit` binary.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The command line could not be understood.
    #[error("{message}\nusage: homestead-audit <corpus.json> [rules.yaml]")]
    Usage {
        /// What was wrong with the arguments.
        message: String,
    },

    /// Rules configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: homestead_core::ConfigError,
    },

    /// The corpus file could not be read.
    #[error("failed to read corpus {}: {source}", path.display())]
    CorpusRead {
        /// Path of the corpus file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Corpus parsing or report serialization failed.
    #[error("JSON error: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// Writing the report failed.
    #[error("failed to write report: {source}")]
    Output {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
