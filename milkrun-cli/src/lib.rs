//! Command-line interface for the Milkrun delivery engine.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod import;
mod route;

pub use error::CliError;
use import::ImportArgs;
use route::RouteArgs;

const ARG_IMPORT_STOPS: &str = "stops";
const ARG_IMPORT_DATABASE: &str = "database";
const ARG_ROUTE_DATABASE: &str = "database";
const ARG_ROUTE_DRIVER: &str = "driver";
const ARG_ROUTE_AS_DRIVER: &str = "as-driver";
const ARG_ROUTE_AS_OPERATOR: &str = "as-operator";
const ARG_ROUTE_DATE: &str = "date";
const ARG_ROUTE_STATUS: &str = "status";
const ARG_ROUTE_ESTIMATE_BASE_URL: &str = "estimate-base-url";
const ENV_IMPORT_STOPS: &str = "MILKRUN_CMDS_IMPORT_STOPS_PATH";
const ENV_ROUTE_DRIVER: &str = "MILKRUN_CMDS_ROUTE_DRIVER";

const DEFAULT_DATABASE: &str = "stops.db";

/// Run the Milkrun CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns a [`CliError`] when argument parsing, configuration merging, or
/// the dispatched command fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Import(args) => import::run_import(args),
        Command::Route(args) => route::run_route(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "milkrun",
    about = "Dispatcher tooling for the Milkrun delivery engine",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load stops from a JSON fixture into a stops database.
    Import(ImportArgs),
    /// Sequence a driver's stops and print the route as JSON.
    Route(RouteArgs),
}

#[cfg(test)]
mod tests;
