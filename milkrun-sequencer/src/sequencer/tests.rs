//! Tests for the `RouteSequencer`.

use super::*;
use rstest::rstest;

use milkrun_core::test_support::{FailingStore, MemoryOrderStore, ScriptedEstimator, UnitEstimator};
use milkrun_core::{DriverRoute, RoutePosition};

use crate::test_support::{delivered, pinned, positioned, stop};

fn ordered_ids(route: &DriverRoute) -> Vec<u64> {
    route.stops.iter().map(|r| r.stop.id.0).collect()
}

fn ordered_positions(route: &DriverRoute) -> Vec<Option<u32>> {
    route
        .stops
        .iter()
        .map(|r| r.stop.route_position.map(RoutePosition::get))
        .collect()
}

#[rstest]
fn empty_input_yields_empty_route() {
    let sequencer = RouteSequencer::new(MemoryOrderStore::default(), UnitEstimator);

    let route = sequencer.sequence(Vec::new()).expect("empty input is valid");

    assert!(route.stops.is_empty());
    assert_eq!(route.metadata.total_stops, 0);
    assert_eq!(route.metadata.completed_stops, 0);
    assert_eq!(route.metadata.current_stop_index, 0);
    assert_eq!(route.metadata.driver_zip, UNKNOWN_ZIP);
}

#[rstest]
fn saved_order_is_reused_without_writes() {
    let stops = vec![
        positioned(1, "06901", 3),
        positioned(2, "06905", 1),
        positioned(3, "10001", 2),
    ];
    let store = MemoryOrderStore::with_stops(stops.clone());
    let sequencer = RouteSequencer::new(store.clone(), UnitEstimator);

    let route = sequencer.sequence(stops).expect("sequencing succeeds");

    assert_eq!(ordered_ids(&route), vec![2, 3, 1]);
    assert_eq!(store.write_count(), 0);
    assert!(
        route
            .stops
            .iter()
            .all(|r| matches!(r.leg, LegInfo::Estimated { .. }))
    );
}

#[rstest]
fn recompute_assigns_contiguous_positions_and_persists() {
    let stops = vec![delivered(1, "06901", 1), stop(2, "06905"), stop(3, "10001")];
    let store = MemoryOrderStore::with_stops(stops.clone());
    let sequencer = RouteSequencer::new(store.clone(), UnitEstimator);

    let route = sequencer.sequence(stops).expect("sequencing succeeds");

    assert_eq!(ordered_ids(&route), vec![1, 2, 3]);
    assert_eq!(ordered_positions(&route), vec![Some(1), Some(2), Some(3)]);
    assert_eq!(store.write_count(), 2);

    let persisted: Vec<_> = store
        .stops()
        .iter()
        .map(|s| (s.id.0, s.route_position.map(RoutePosition::get)))
        .collect();
    assert_eq!(persisted, vec![(1, Some(1)), (2, Some(2)), (3, Some(3))]);
}

#[rstest]
fn pinned_stops_lead_in_saved_position_order() {
    let stops = vec![
        stop(1, "06901"),
        pinned(9, "10001", 5),
        stop(2, "06905"),
        pinned(8, "20001", 2),
    ];
    let store = MemoryOrderStore::with_stops(stops.clone());
    let sequencer = RouteSequencer::new(store.clone(), UnitEstimator);

    let route = sequencer.sequence(stops).expect("sequencing succeeds");

    assert_eq!(ordered_ids(&route), vec![8, 9, 1, 2]);
    assert_eq!(
        ordered_positions(&route),
        vec![Some(1), Some(2), Some(3), Some(4)]
    );
    assert_eq!(store.write_count(), 4);
}

#[rstest]
fn override_without_position_joins_the_auto_remainder() {
    let flagged = stop(1, "06901").with_override();
    let stops = vec![flagged, pinned(2, "06905", 1), stop(3, "10001")];
    let store = MemoryOrderStore::with_stops(stops.clone());
    let sequencer = RouteSequencer::new(store, UnitEstimator);

    let route = sequencer.sequence(stops).expect("sequencing succeeds");

    // The pin holds only with a saved position; the flagged stop is routed
    // with the rest, in listing order under equal scores.
    assert_eq!(ordered_ids(&route), vec![2, 1, 3]);
}

#[rstest]
fn override_leads_then_nearest_neighbour_orders_remainder() {
    let stops = vec![stop(1, "06901"), stop(2, "06905"), pinned(3, "10001", 1)];
    let store = MemoryOrderStore::with_stops(stops.clone());
    let estimator = ScriptedEstimator::new()
        .with_score("06901", "06901", 0.5)
        .with_score("06901", "06905", 2.0)
        .with_score("06901", "10001", 8.0)
        .with_score("10001", "06901", 7.0);
    let sequencer = RouteSequencer::new(store.clone(), estimator);

    let route = sequencer.sequence(stops).expect("sequencing succeeds");

    assert_eq!(ordered_ids(&route), vec![3, 1, 2]);
    assert_eq!(ordered_positions(&route), vec![Some(1), Some(2), Some(3)]);
    // The pinned stop already held position 1; only the two routed stops
    // needed writes.
    assert_eq!(store.write_count(), 2);
    assert_eq!(
        route.stops.first().map(|r| &r.leg),
        Some(&LegInfo::estimated("8.0 mi", "8 min")),
    );
}

#[rstest]
fn missing_zip_routes_via_sentinel_without_moving_the_origin() {
    let unzipped = Stop::new(StopId(2), None).with_status(
        milkrun_core::FulfillmentStatus::DriverAssigned,
    );
    let stops = vec![stop(1, "06901"), unzipped, stop(3, "06905")];
    let store = MemoryOrderStore::with_stops(stops.clone());
    // The sentinel leg is nearest, so the zipless stop is visited first; the
    // origin must then stay at 06901 for the remaining picks, and only the
    // leg annotations route through the sentinel.
    let estimator = ScriptedEstimator::new()
        .with_score("06901", "06901", 5.0)
        .with_score("06901", UNKNOWN_ZIP, 1.0)
        .with_score("06901", "06905", 9.0)
        .with_score(UNKNOWN_ZIP, "06901", 4.0);
    let sequencer = RouteSequencer::new(store, estimator);

    let route = sequencer.sequence(stops).expect("sequencing succeeds");

    assert_eq!(ordered_ids(&route), vec![2, 1, 3]);
    let legs: Vec<_> = route.stops.iter().map(|r| r.leg.clone()).collect();
    assert_eq!(
        legs,
        vec![
            LegInfo::estimated("1.0 mi", "1 min"),
            LegInfo::estimated("4.0 mi", "4 min"),
            LegInfo::estimated("9.0 mi", "9 min"),
        ]
    );
}

#[rstest]
fn write_failures_are_swallowed_and_the_route_still_returned() {
    let stops = vec![stop(1, "06901"), stop(2, "06905")];
    let inner = MemoryOrderStore::with_stops(stops.clone());
    let sequencer = RouteSequencer::new(
        FailingStore::failing_writes(inner.clone()),
        UnitEstimator,
    );

    let route = sequencer.sequence(stops).expect("writes fail open");

    assert_eq!(ordered_positions(&route), vec![Some(1), Some(2)]);
    // Nothing reached the wrapped store, and nothing was rolled back.
    assert_eq!(inner.write_count(), 0);
    assert!(inner.stops().iter().all(|s| s.route_position.is_none()));
}

#[rstest]
fn listing_failure_surfaces_as_a_store_error() {
    let sequencer = RouteSequencer::new(
        FailingStore::failing_reads(MemoryOrderStore::default()),
        UnitEstimator,
    );

    let err = sequencer
        .route_for_driver(DriverId(7), &StopFilter::new())
        .expect_err("injected read failure");

    assert!(matches!(err, SequenceError::Store { .. }));
}

#[rstest]
fn estimator_failure_surfaces_as_an_estimate_error() {
    let stops = vec![stop(1, "06901")];
    let sequencer = RouteSequencer::new(
        MemoryOrderStore::with_stops(stops.clone()),
        ScriptedEstimator::new(),
    );

    let err = sequencer.sequence(stops).expect_err("nothing is scripted");

    assert!(matches!(err, SequenceError::Estimate { .. }));
}

#[rstest]
fn all_completed_route_keeps_saved_order_without_estimates() {
    let stops = vec![
        delivered(1, "06901", 3),
        delivered(2, "06905", 1),
        delivered(3, "10001", 2),
    ];
    let estimator = ScriptedEstimator::new();
    let sequencer = RouteSequencer::new(MemoryOrderStore::with_stops(stops.clone()), estimator.clone());

    let route = sequencer.sequence(stops).expect("no estimates are needed");

    assert_eq!(ordered_ids(&route), vec![2, 3, 1]);
    assert!(route.stops.iter().all(|r| r.leg == LegInfo::Completed));
    assert_eq!(estimator.call_count(), 0);
    assert_eq!(route.metadata.completed_stops, 3);
    assert_eq!(route.metadata.total_stops, 3);
    assert_eq!(route.metadata.current_stop_index, 0);
    assert_eq!(route.metadata.driver_zip, UNKNOWN_ZIP);
}

#[rstest]
fn completed_positions_survive_resequencing() {
    let stops = vec![
        delivered(1, "06901", 1),
        positioned(2, "06905", 2),
        stop(3, "10001"),
    ];
    let store = MemoryOrderStore::with_stops(stops.clone());
    let sequencer = RouteSequencer::new(store.clone(), UnitEstimator);

    let route = sequencer.sequence(stops).expect("sequencing succeeds");

    assert_eq!(ordered_ids(&route), vec![1, 2, 3]);
    assert_eq!(ordered_positions(&route), vec![Some(1), Some(2), Some(3)]);
    // Only the fresh stop needed a write; the completed stop kept its
    // position untouched.
    assert_eq!(store.write_count(), 1);
    let completed_position = store
        .stops()
        .iter()
        .find(|s| s.id == StopId(1))
        .and_then(|s| s.route_position.map(RoutePosition::get));
    assert_eq!(completed_position, Some(1));
}

#[rstest]
fn second_run_reuses_persisted_positions_without_writes() {
    let stops = vec![stop(1, "06901"), stop(2, "06905"), stop(3, "10001")];
    let store = MemoryOrderStore::with_stops(stops.clone());
    let sequencer = RouteSequencer::new(store.clone(), UnitEstimator);

    let first = sequencer.sequence(stops).expect("first run succeeds");
    let writes_after_first = store.write_count();

    let second = sequencer
        .sequence(store.stops())
        .expect("second run succeeds");

    assert_eq!(ordered_ids(&first), ordered_ids(&second));
    assert_eq!(ordered_positions(&first), ordered_positions(&second));
    assert_eq!(store.write_count(), writes_after_first);
}

#[rstest]
fn listing_feeds_assigned_and_unassigned_stops_to_the_sequencer() {
    let mine = stop(1, "06901").with_driver(DriverId(7));
    let unassigned = stop(2, "06905");
    let foreign = stop(3, "10001").with_driver(DriverId(8));
    let store = MemoryOrderStore::with_stops([mine, unassigned, foreign]);
    let sequencer = RouteSequencer::new(store.clone(), UnitEstimator);

    let route = sequencer
        .route_for_driver(DriverId(7), &StopFilter::new())
        .expect("listing succeeds");

    assert_eq!(ordered_ids(&route), vec![1, 2]);
    // The foreign driver's stop was never listed, so it was never numbered.
    let foreign_position = store
        .stops()
        .iter()
        .find(|s| s.id == StopId(3))
        .and_then(|s| s.route_position);
    assert_eq!(foreign_position, None);
}

#[rstest]
fn nearest_neighbour_prefers_the_lower_score_from_the_origin() {
    let estimator = ScriptedEstimator::new()
        .with_score("06902", "06901", 1.0)
        .with_score("06902", "06905", 3.0)
        .with_score("06901", "06905", 2.0);

    let ordered =
        heuristic::nearest_neighbor_order(&estimator, "06902", vec![stop(1, "06901"), stop(2, "06905")])
            .expect("all pairs scripted");

    assert_eq!(ordered.iter().map(|s| s.id.0).collect::<Vec<_>>(), vec![1, 2]);
}

#[rstest]
fn nearest_neighbour_advances_the_origin_to_the_chosen_stop() {
    let estimator = ScriptedEstimator::new()
        .with_score("06902", "06901", 4.0)
        .with_score("06902", "06905", 3.0)
        .with_score("06905", "06901", 1.0);

    let ordered =
        heuristic::nearest_neighbor_order(&estimator, "06902", vec![stop(1, "06901"), stop(2, "06905")])
            .expect("all pairs scripted");

    assert_eq!(ordered.iter().map(|s| s.id.0).collect::<Vec<_>>(), vec![2, 1]);
}

#[rstest]
fn score_ties_keep_listing_order() {
    let ordered = heuristic::nearest_neighbor_order(
        &UnitEstimator,
        "06902",
        vec![stop(5, "06901"), stop(4, "06905"), stop(3, "10001")],
    )
    .expect("unit estimator never fails");

    assert_eq!(
        ordered.iter().map(|s| s.id.0).collect::<Vec<_>>(),
        vec![5, 4, 3]
    );
}
