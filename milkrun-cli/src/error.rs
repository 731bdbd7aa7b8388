//! Error types emitted by the Milkrun CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use milkrun_core::SqliteOrderStoreError;
use milkrun_data::EstimatorBuildError;
use milkrun_sequencer::RouteQueryError;
use thiserror::Error;

/// Errors emitted by the Milkrun CLI.
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
    /// A referenced input path does not exist on disk or is not a file.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// Opening the stops fixture failed.
    #[error("failed to open stops fixture at {path:?}: {source}")]
    OpenStopsFile {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Stops fixture JSON could not be decoded.
    #[error("failed to parse stops fixture JSON at {path:?}: {source}")]
    ParseStopsFile {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Opening or writing the stops database failed.
    #[error(transparent)]
    Store(#[from] SqliteOrderStoreError),
    /// Constructing the HTTP distance estimator failed.
    #[error("failed to build distance estimator for {base_url:?}: {source}")]
    BuildEstimator {
        base_url: String,
        #[source]
        source: EstimatorBuildError,
    },
    /// The route query was rejected or sequencing failed.
    #[error(transparent)]
    Query(#[from] RouteQueryError),
    /// Serialising the route view failed.
    #[error("failed to serialise route view: {0}")]
    SerialiseRouteView(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
