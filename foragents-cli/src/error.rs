//! Error types emitted by the forAgents CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use foragents_core::CounterSourceError;
use foragents_trending::TrendingConfigError;
use thiserror::Error;

/// Errors emitted by the forAgents CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// Neither a counters file nor a counters database was configured.
    #[error("no engagement counters configured (set --{json} and/or --{db})")]
    MissingCounterSource {
        json: &'static str,
        db: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The `--now` override is not an RFC 3339 instant.
    #[error("invalid --now value {value:?}: {source}")]
    InvalidNow {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// Decay overrides or weights were rejected.
    #[error("invalid trending configuration: {0}")]
    InvalidTrendingConfig(#[from] TrendingConfigError),
    /// Opening the entities file failed.
    #[error("failed to open entities at {path:?}: {source}")]
    OpenEntities {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Entities JSON could not be decoded.
    #[error("failed to parse entities JSON at {path:?}: {source}")]
    ParseEntities {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Fetching engagement counters failed.
    #[error("failed to load engagement counters: {0}")]
    Counters(#[from] CounterSourceError),
    /// Serializing the trending report failed.
    #[error("failed to serialize trending report: {0}")]
    SerialiseReport(#[source] serde_json::Error),
    /// Writing the trending report to the output stream failed.
    #[error("failed to write trending report: {0}")]
    WriteReport(#[source] std::io::Error),
    /// Writing the trending report to a file failed.
    #[error("failed to write trending report to {path:?}: {source}")]
    WriteReportFile {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}
