//! # Aircraft conjunctions
//!
//! Two aircraft are in conjunction when, seen from the observer, they appear closer than
//! the configured margin on the sky **and** fly within `conjunction_vertical_limit` meters
//! of each other. Aircraft flying lower than `min_height_above_observer` above the site are
//! treated as ground traffic and ignored.
//!
//! Pairs are enumerated exhaustively for small traffic. Above
//! `conjunction_bucketing_threshold` aircraft, candidates are grouped into elevation bands
//! of width `margin`; since the angular separation is never smaller than the elevation
//! difference, a matching pair always lies in the same or in adjacent bands, and both paths
//! return the same matches.
use std::collections::HashMap;

use itertools::Itertools;
use tracing::{debug, trace};

use crate::aircraft::AircraftState;
use crate::constants::Degree;
use crate::detection::separation::angular_separation;
use crate::detection::{ConjunctionMatch, DetectionParams};
use crate::observers::Observer;
use crate::ref_system::{azimuth_elevation, HorizontalCoord};
use crate::transit_errors::TransitError;

/// An aircraft kept for pairing, with its index in the input slice.
struct Candidate<'a> {
    index: usize,
    aircraft: &'a AircraftState,
    direction: HorizontalCoord,
}

fn collect_candidates<'a>(
    flights: &'a [AircraftState],
    observer: &Observer,
    params: &DetectionParams,
) -> Vec<Candidate<'a>> {
    flights
        .iter()
        .enumerate()
        .filter_map(|(index, aircraft)| {
            if !aircraft.is_locatable() {
                trace!(id = %aircraft.id, "skipping aircraft without a usable position");
                return None;
            }
            if aircraft.altitude - observer.height() < params.min_height_above_observer {
                return None;
            }
            let direction = azimuth_elevation(observer, &aircraft.position())?;
            Some(Candidate {
                index,
                aircraft,
                direction,
            })
        })
        .collect()
}

fn pair_match(a: &Candidate, b: &Candidate, params: &DetectionParams) -> Option<ConjunctionMatch> {
    let vertical_separation = (a.aircraft.altitude - b.aircraft.altitude).abs();
    if vertical_separation >= params.conjunction_vertical_limit {
        return None;
    }
    let separation = angular_separation(&a.direction, &b.direction);
    if separation >= params.margin {
        return None;
    }
    Some(ConjunctionMatch {
        first: a.aircraft.id.clone(),
        second: b.aircraft.id.clone(),
        first_index: a.index,
        second_index: b.index,
        first_position: a.direction,
        second_position: b.direction,
        angular_separation: separation,
        vertical_separation,
    })
}

fn elevation_band(elevation: Degree, width: Degree) -> i64 {
    ((elevation + 90.0) / width).floor() as i64
}

fn banded_pairs(candidates: &[Candidate], params: &DetectionParams) -> Vec<ConjunctionMatch> {
    let mut bands: HashMap<i64, Vec<usize>> = HashMap::new();
    for (slot, candidate) in candidates.iter().enumerate() {
        bands
            .entry(elevation_band(candidate.direction.altitude, params.margin))
            .or_default()
            .push(slot);
    }

    let mut matches = Vec::new();
    for (i, a) in candidates.iter().enumerate() {
        let band = elevation_band(a.direction.altitude, params.margin);
        for neighbour in band - 1..=band + 1 {
            let Some(slots) = bands.get(&neighbour) else {
                continue;
            };
            for &j in slots.iter().filter(|&&j| j > i) {
                if let Some(m) = pair_match(a, &candidates[j], params) {
                    matches.push(m);
                }
            }
        }
    }
    matches
}

/// Find pairs of aircraft that appear close to each other from the observer.
///
/// Arguments
/// -----------------
/// * `flights`: normalized aircraft states. Non-locatable records are skipped.
/// * `observer`: the ground site.
/// * `params`: uses `margin`, `conjunction_vertical_limit`, `min_height_above_observer`
///   and `conjunction_bucketing_threshold`.
///
/// Return
/// ----------
/// * One [`ConjunctionMatch`] per matching unordered pair, `first_index < second_index`,
///   sorted by `(first_index, second_index)`.
pub fn detect_conjunctions(
    flights: &[AircraftState],
    observer: &Observer,
    params: &DetectionParams,
) -> Result<Vec<ConjunctionMatch>, TransitError> {
    params.validate()?;

    let candidates = collect_candidates(flights, observer, params);
    let bucketed = candidates.len() > params.conjunction_bucketing_threshold;

    let mut matches = if bucketed {
        banded_pairs(&candidates, params)
    } else {
        candidates
            .iter()
            .tuple_combinations()
            .filter_map(|(a, b)| pair_match(a, b, params))
            .collect()
    };
    matches.sort_by_key(|m| (m.first_index, m.second_index));

    debug!(
        aircraft = flights.len(),
        candidates = candidates.len(),
        bucketed,
        conjunctions = matches.len(),
        "conjunction pass done"
    );
    Ok(matches)
}
