//! Import command implementation for the Milkrun CLI.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use milkrun_core::{SqliteOrderStore, Stop};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Write};

use crate::{ARG_IMPORT_DATABASE, ARG_IMPORT_STOPS, CliError, DEFAULT_DATABASE, ENV_IMPORT_STOPS};

/// CLI arguments for the `import` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Load a JSON stops fixture into a SQLite stops database. \
                 The fixture is an array of stop records; rows with \
                 matching ids are replaced, so re-importing a fixture is \
                 safe.",
    about = "Load a stops fixture into a stops database"
)]
#[ortho_config(prefix = "MILKRUN")]
pub(crate) struct ImportArgs {
    /// Path to a JSON file containing an array of stops.
    #[arg(long = ARG_IMPORT_STOPS, value_name = "path")]
    #[serde(default)]
    pub(crate) stops_path: Option<Utf8PathBuf>,
    /// Path to the stops database to create or extend.
    #[arg(long = ARG_IMPORT_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl ImportArgs {
    pub(crate) fn into_config(self) -> Result<ImportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ImportConfig::try_from(merged)
    }
}

/// Resolved `import` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportConfig {
    /// Path to the JSON stops fixture.
    pub(crate) stops_path: Utf8PathBuf,
    /// Path to the stops database.
    pub(crate) database: Utf8PathBuf,
}

impl ImportConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.stops_path, ARG_IMPORT_STOPS)
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

impl TryFrom<ImportArgs> for ImportConfig {
    type Error = CliError;

    fn try_from(args: ImportArgs) -> Result<Self, Self::Error> {
        let stops_path = args.stops_path.ok_or(CliError::MissingArgument {
            field: ARG_IMPORT_STOPS,
            env: ENV_IMPORT_STOPS,
        })?;
        let database = args
            .database
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE));
        Ok(Self {
            stops_path,
            database,
        })
    }
}

pub(super) fn run_import(args: ImportArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_import_with(args, &mut stdout)
}

pub(super) fn run_import_with(args: ImportArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = resolve_import_config(args)?;
    let stops = load_stops(&config.stops_path)?;
    let store = SqliteOrderStore::create(config.database.as_std_path())?;
    store.insert_stops(&stops)?;
    write_import_summary(writer, stops.len(), &config.database)
}

fn resolve_import_config(args: ImportArgs) -> Result<ImportConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Loads a JSON-encoded array of [`Stop`]s from disk.
pub(super) fn load_stops(path: &Utf8Path) -> Result<Vec<Stop>, CliError> {
    let file = File::open(path.as_std_path()).map_err(|source| CliError::OpenStopsFile {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseStopsFile {
        path: path.to_path_buf(),
        source,
    })
}

fn write_import_summary(
    writer: &mut dyn Write,
    count: usize,
    database: &Utf8Path,
) -> Result<(), CliError> {
    let summary = format!("imported {count} stops into {database}\n");
    writer
        .write_all(summary.as_bytes())
        .map_err(CliError::WriteOutput)?;
    Ok(())
}
