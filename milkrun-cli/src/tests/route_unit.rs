//! Focused unit tests covering route CLI configuration and execution.

use super::helpers::{Workspace, assigned_stop, delivered_stop};
use super::*;
use crate::route::{RouteConfig, config_from_layers_for_test, run_route_with};
use camino::Utf8PathBuf;
use chrono::NaiveDate;
use clap::Parser;
use milkrun_core::{DriverId, SqliteOrderStore, Stop, StopId};
use milkrun_sequencer::{Caller, RouteQueryError, RouteView, StatusFilter};
use rstest::rstest;

fn seeded_database(workspace: &Workspace, stops: &[Stop]) -> Utf8PathBuf {
    let database = workspace.path("stops.db");
    let store = SqliteOrderStore::create(database.as_std_path()).expect("create database");
    store.insert_stops(stops).expect("seed stops");
    database
}

fn route_view(args: RouteArgs) -> RouteView {
    let mut output = Vec::new();
    run_route_with(args, &mut output).expect("route should succeed");
    serde_json::from_slice(&output).expect("decode route view JSON")
}

#[rstest]
fn converting_without_driver_errors() {
    let args = RouteArgs {
        driver: None,
        ..RouteArgs::default()
    };

    let err = RouteConfig::try_from(args).expect_err("missing driver should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_ROUTE_DRIVER);
            assert_eq!(env, ENV_ROUTE_DRIVER);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
#[case::operator(Some(true), None, Caller::Operator)]
#[case::driver(None, Some(9), Caller::Driver(DriverId(9)))]
#[case::operator_wins(Some(true), Some(9), Caller::Operator)]
#[case::anonymous(None, None, Caller::Anonymous)]
fn caller_resolution_matrix(
    #[case] as_operator: Option<bool>,
    #[case] as_driver: Option<u64>,
    #[case] expected: Caller,
) {
    let args = RouteArgs {
        driver: Some(7),
        as_driver,
        as_operator,
        ..RouteArgs::default()
    };

    let config = RouteConfig::try_from(args).expect("config should build");
    assert_eq!(config.caller, expected);
}

#[rstest]
#[case("pending", StatusFilter::Pending)]
#[case("delivered", StatusFilter::Delivered)]
#[case("preparing", StatusFilter::Literal("preparing".to_owned()))]
fn status_literals_parse_into_filters(#[case] literal: &str, #[case] expected: StatusFilter) {
    let args = RouteArgs {
        driver: Some(7),
        status: Some(literal.to_owned()),
        ..RouteArgs::default()
    };

    let config = RouteConfig::try_from(args).expect("config should build");
    assert_eq!(config.status, Some(expected));
}

#[rstest]
fn validate_sources_reports_missing_database() {
    let workspace = Workspace::new();
    let args = RouteArgs {
        database: Some(workspace.path("absent.db")),
        driver: Some(7),
        ..RouteArgs::default()
    };
    let config = RouteConfig::try_from(args).expect("config should build");

    let err = config.validate_sources().expect_err("expected failure");
    match err {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, ARG_ROUTE_DATABASE),
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn cli_parses_route_flags() {
    let cli = Cli::try_parse_from([
        "milkrun",
        "route",
        "--driver",
        "7",
        "--as-operator",
        "--date",
        "2025-06-02",
        "--status",
        "pending",
    ])
    .expect("arguments should parse");

    match cli.command {
        Command::Route(args) => {
            assert_eq!(args.driver, Some(7));
            assert_eq!(args.as_operator, Some(true));
            assert_eq!(args.date, NaiveDate::from_ymd_opt(2025, 6, 2));
            assert_eq!(args.status.as_deref(), Some("pending"));
        }
        other => panic!("expected route command, found {other:?}"),
    }
}

#[rstest]
fn route_sequences_stops_nearest_first() {
    let workspace = Workspace::new();
    let database = seeded_database(
        &workspace,
        &[
            assigned_stop(1, "10001"),
            assigned_stop(2, "06901"),
            assigned_stop(3, "06905"),
        ],
    );

    let view = route_view(RouteArgs {
        database: Some(database),
        driver: Some(7),
        as_operator: Some(true),
        ..RouteArgs::default()
    });

    let ids: Vec<_> = view.deliveries.iter().map(|d| d.stop.id).collect();
    assert_eq!(ids, vec![StopId(1), StopId(3), StopId(2)]);
    let numbers: Vec<_> = view.deliveries.iter().map(|d| d.stop_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert_eq!(view.route_meta.driver_zip, "10001");
}

#[rstest]
fn route_without_identity_is_rejected() {
    let workspace = Workspace::new();
    let database = seeded_database(&workspace, &[assigned_stop(1, "06901")]);

    let args = RouteArgs {
        database: Some(database),
        driver: Some(7),
        ..RouteArgs::default()
    };

    let err = run_route_with(args, &mut Vec::<u8>::new()).expect_err("anonymous query");
    match err {
        CliError::Query(RouteQueryError::Unauthorized) => {}
        other => panic!("expected Unauthorized, found {other:?}"),
    }
}

#[rstest]
fn foreign_driver_identity_is_rejected() {
    let workspace = Workspace::new();
    let database = seeded_database(&workspace, &[assigned_stop(1, "06901")]);

    let args = RouteArgs {
        database: Some(database),
        driver: Some(7),
        as_driver: Some(8),
        ..RouteArgs::default()
    };

    let err = run_route_with(args, &mut Vec::<u8>::new()).expect_err("foreign driver");
    match err {
        CliError::Query(RouteQueryError::Unauthorized) => {}
        other => panic!("expected Unauthorized, found {other:?}"),
    }
}

#[rstest]
fn driver_views_their_own_route() {
    let workspace = Workspace::new();
    let database = seeded_database(&workspace, &[assigned_stop(1, "06901")]);

    let view = route_view(RouteArgs {
        database: Some(database),
        driver: Some(7),
        as_driver: Some(7),
        ..RouteArgs::default()
    });

    assert_eq!(view.deliveries.len(), 1);
    assert_eq!(view.route_meta.total_stops, 1);
}

#[rstest]
fn status_filter_narrows_the_printed_view() {
    let workspace = Workspace::new();
    let database = seeded_database(
        &workspace,
        &[delivered_stop(1, "06901", 1), assigned_stop(2, "06905")],
    );

    let view = route_view(RouteArgs {
        database: Some(database),
        driver: Some(7),
        as_operator: Some(true),
        status: Some("pending".to_owned()),
        ..RouteArgs::default()
    });

    let ids: Vec<_> = view.deliveries.iter().map(|d| d.stop.id).collect();
    assert_eq!(ids, vec![StopId(2)]);
    assert_eq!(
        view.deliveries.first().map(|d| d.stop_number),
        Some(2),
        "numbering covers the whole route, not the filtered view"
    );
    assert_eq!(view.route_meta.total_stops, 2);
    assert_eq!(view.route_meta.completed_stops, 1);
}

#[rstest]
fn date_filter_excludes_other_days() {
    let monday = NaiveDate::from_ymd_opt(2025, 6, 2).expect("valid date");
    let tuesday = NaiveDate::from_ymd_opt(2025, 6, 3).expect("valid date");
    let workspace = Workspace::new();
    let database = seeded_database(
        &workspace,
        &[
            assigned_stop(1, "06901").with_delivery_date(monday),
            assigned_stop(2, "06905").with_delivery_date(tuesday),
        ],
    );

    let view = route_view(RouteArgs {
        database: Some(database),
        driver: Some(7),
        as_operator: Some(true),
        date: Some(monday),
        ..RouteArgs::default()
    });

    let ids: Vec<_> = view.deliveries.iter().map(|d| d.stop.id).collect();
    assert_eq!(ids, vec![StopId(1)]);
    assert_eq!(view.route_meta.total_stops, 1);
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "driver": "not-a-number" }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "database": "from-file.db",
            "driver": 3,
        }),
        None,
    );
    composer.push_environment(json!({ "driver": 7 }));
    composer.push_cli(json!({ "database": "from-cli.db" }));

    let config = config_from_layers_for_test(composer.layers()).expect("merged config builds");
    assert_eq!(config.database, Utf8PathBuf::from("from-cli.db"));
    assert_eq!(config.driver, DriverId(7));
    assert_eq!(config.caller, Caller::Anonymous);
}
