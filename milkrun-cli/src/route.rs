//! Route command implementation for the Milkrun CLI.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDate;
use clap::Parser;
use milkrun_core::{DistanceEstimator, DriverId, SqliteOrderStore};
use milkrun_data::{HttpDistanceEstimator, ZipPrefixEstimator};
use milkrun_sequencer::{Caller, RouteQuery, RouteService, RouteView, StatusFilter};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::{
    ARG_ROUTE_AS_DRIVER, ARG_ROUTE_AS_OPERATOR, ARG_ROUTE_DATABASE, ARG_ROUTE_DATE,
    ARG_ROUTE_DRIVER, ARG_ROUTE_ESTIMATE_BASE_URL, ARG_ROUTE_STATUS, CliError, DEFAULT_DATABASE,
    ENV_ROUTE_DRIVER,
};

/// CLI arguments for the `route` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Sequence a driver's stops and print the route as JSON. \
                 The caller identity decides access: pass --as-operator for \
                 dispatcher access, or --as-driver with the authenticated \
                 driver's id; with neither the query is anonymous and is \
                 rejected. Distances come from the offline zip heuristic \
                 unless --estimate-base-url points at an estimate service.",
    about = "Sequence and print a driver's route"
)]
#[ortho_config(prefix = "MILKRUN")]
pub(crate) struct RouteArgs {
    /// Path to the stops database.
    #[arg(long = ARG_ROUTE_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Driver whose route to sequence.
    #[arg(long = ARG_ROUTE_DRIVER, value_name = "id")]
    #[serde(default)]
    pub(crate) driver: Option<u64>,
    /// Query as this authenticated driver.
    #[arg(long = ARG_ROUTE_AS_DRIVER, value_name = "id")]
    #[serde(default)]
    pub(crate) as_driver: Option<u64>,
    /// Query with operator privileges.
    #[arg(
        long = ARG_ROUTE_AS_OPERATOR,
        num_args = 0..=1,
        default_missing_value = "true",
        value_name = "bool"
    )]
    #[serde(default)]
    pub(crate) as_operator: Option<bool>,
    /// Delivery date to list (ISO-8601, e.g. 2025-06-02).
    #[arg(long = ARG_ROUTE_DATE, value_name = "date")]
    #[serde(default)]
    pub(crate) date: Option<NaiveDate>,
    /// Status filter for the rendered view ("pending", "delivered", or a
    /// status wire name).
    #[arg(long = ARG_ROUTE_STATUS, value_name = "name")]
    #[serde(default)]
    pub(crate) status: Option<String>,
    /// Base URL for the estimate service (e.g. "http://localhost:8080").
    #[arg(long = ARG_ROUTE_ESTIMATE_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) estimate_base_url: Option<String>,
}

impl RouteArgs {
    pub(crate) fn into_config(self) -> Result<RouteConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RouteConfig::try_from(merged)
    }
}

/// Resolved `route` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RouteConfig {
    /// Path to the stops database.
    pub(crate) database: Utf8PathBuf,
    /// Driver whose route to sequence.
    pub(crate) driver: DriverId,
    /// Identity the query runs under.
    pub(crate) caller: Caller,
    /// Delivery date filter, when set.
    pub(crate) date: Option<NaiveDate>,
    /// Status filter for the rendered view, when set.
    pub(crate) status: Option<StatusFilter>,
    /// Base URL for the estimate service, when set.
    pub(crate) estimate_base_url: Option<String>,
}

impl RouteConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.database, ARG_ROUTE_DATABASE)
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        if path.is_file() {
            Ok(())
        } else {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
    }
}

impl TryFrom<RouteArgs> for RouteConfig {
    type Error = CliError;

    fn try_from(args: RouteArgs) -> Result<Self, Self::Error> {
        let driver = args.driver.map(DriverId).ok_or(CliError::MissingArgument {
            field: ARG_ROUTE_DRIVER,
            env: ENV_ROUTE_DRIVER,
        })?;

        let database = args
            .database
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE));

        // Operator access wins when both identities are supplied.
        let caller = if args.as_operator.unwrap_or(false) {
            Caller::Operator
        } else if let Some(id) = args.as_driver {
            Caller::Driver(DriverId(id))
        } else {
            Caller::Anonymous
        };

        let status = args.status.map(|value| StatusFilter::parse(&value));

        Ok(Self {
            database,
            driver,
            caller,
            date: args.date,
            status,
            estimate_base_url: args.estimate_base_url,
        })
    }
}

pub(super) fn run_route(args: RouteArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_route_with(args, &mut stdout)
}

pub(super) fn run_route_with(args: RouteArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let view = execute_route(args)?;
    write_route_view(writer, &view)
}

fn execute_route(args: RouteArgs) -> Result<RouteView, CliError> {
    let config = resolve_route_config(args)?;
    let store = SqliteOrderStore::open(config.database.as_std_path())?;
    match config.estimate_base_url.clone() {
        Some(base_url) => {
            let estimator = HttpDistanceEstimator::new(base_url.clone())
                .map_err(|source| CliError::BuildEstimator { base_url, source })?;
            query_route(store, estimator, &config)
        }
        None => query_route(store, ZipPrefixEstimator::new(), &config),
    }
}

fn query_route<E: DistanceEstimator>(
    store: SqliteOrderStore,
    estimator: E,
    config: &RouteConfig,
) -> Result<RouteView, CliError> {
    let service = RouteService::new(store, estimator);
    let mut query = RouteQuery::new();
    if let Some(date) = config.date {
        query = query.with_date(date);
    }
    if let Some(status) = config.status.clone() {
        query = query.with_status(status);
    }
    let view = service.driver_route(&config.caller, config.driver, &query)?;
    Ok(view)
}

fn resolve_route_config(args: RouteArgs) -> Result<RouteConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

fn write_route_view(writer: &mut dyn Write, view: &RouteView) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(view).map_err(CliError::SerialiseRouteView)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RouteConfig, CliError> {
    let merged = RouteArgs::merge_from_layers(layers).map_err(CliError::from)?;
    RouteConfig::try_from(merged)
}
