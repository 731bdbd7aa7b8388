//! Greedy nearest-neighbour ordering over a distance estimator.

use milkrun_core::{DistanceEstimator, EstimateError, Stop};

/// Order `stops` by repeated nearest-neighbour selection from `origin_zip`.
///
/// Each round scores every remaining stop from the current zip and takes
/// the lowest score; on a tie the earliest-listed stop wins, so the result
/// is deterministic for a fixed input order. The current zip advances only
/// when the chosen stop has a recorded destination zip; a stop routed via
/// the sentinel leaves the origin where it was.
pub(crate) fn nearest_neighbor_order<E: DistanceEstimator>(
    estimator: &E,
    origin_zip: &str,
    stops: Vec<Stop>,
) -> Result<Vec<Stop>, EstimateError> {
    let mut remaining = stops;
    let mut ordered = Vec::with_capacity(remaining.len());
    let mut current_zip = origin_zip.to_owned();

    while !remaining.is_empty() {
        let index = nearest_index(estimator, &current_zip, &remaining)?;
        let chosen = remaining.remove(index);
        if let Some(zip) = chosen.destination_zip.as_deref() {
            current_zip = zip.to_owned();
        }
        ordered.push(chosen);
    }

    Ok(ordered)
}

/// Index of the stop nearest to `current_zip`.
///
/// Ties keep the earliest index. `stops` must not be empty.
fn nearest_index<E: DistanceEstimator>(
    estimator: &E,
    current_zip: &str,
    stops: &[Stop],
) -> Result<usize, EstimateError> {
    let mut best_index = 0;
    let mut best_score = f64::INFINITY;
    for (index, stop) in stops.iter().enumerate() {
        let estimate = estimator.estimate(current_zip, stop.routing_zip())?;
        if estimate.score < best_score {
            best_index = index;
            best_score = estimate.score;
        }
    }
    Ok(best_index)
}
