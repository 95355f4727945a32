//! # Temporal sweep
//!
//! Runs the classification over `t = 0, step, 2·step, …, horizon` seconds from "now".
//!
//! At each step the body is queried once, every aircraft is dead-reckoned to the step
//! instant (when projection is enabled) and compared with the body. Across steps the sweep
//! keeps, per aircraft, the previous separation and a streak of consecutive closing steps.
//!
//! ## Match policy
//!
//! * A `Transit` reading yields a [`MatchKind::Confirmed`] match. Later readings of the same
//!   aircraft ([`AircraftState::batch_key`]) are ignored for the rest of the sweep.
//! * A `NearMiss` reading at `t = 0` is a present close pass and yields an
//!   [`MatchKind::EarlyWarning`].
//! * A `NearMiss` reading at `t > 0` yields an early warning only when the aircraft has been
//!   closing for at least `min_closing_streak` steps, and when the body is higher than
//!   `early_warning_min_body_altitude` (if set). Isolated predicted near-misses are noise.
//! * At most one early warning per aircraft is kept (the earliest), and it is dropped when
//!   the aircraft is confirmed later in the sweep.
use std::collections::{HashMap, HashSet};

use hifitime::Epoch;
use tracing::{debug, trace};

use crate::aircraft::{AircraftState, TrackKey};
use crate::constants::{DISK_RADIUS_DEG, EARTH_MEAN_RADIUS};
use crate::detection::separation::{box_prefilter_rejects, classify_aircraft, EventKind};
use crate::detection::{DetectionParams, MatchKind, TransitMatch};
use crate::ephemeris::EphemerisProvider;
use crate::observers::Observer;
use crate::ref_system::{
    azimuth_elevation, flat_azimuth_elevation, haversine_distance, HorizontalCoord,
};
use crate::refraction::apply_refraction;
use crate::time::epoch_after;
use crate::tracking::TrackHistory;
use crate::transit_errors::TransitError;

/// Closing trend of one aircraft across sweep steps.
#[derive(Debug, Clone, Copy)]
struct ClosingTrend {
    previous: f64,
    streak: u32,
}

impl ClosingTrend {
    fn new() -> Self {
        ClosingTrend {
            previous: f64::INFINITY,
            streak: 0,
        }
    }

    fn record(&mut self, separation: f64) {
        let closing = separation.is_finite() && self.previous.is_finite() && separation < self.previous;
        self.streak = if closing { self.streak + 1 } else { 0 };
        self.previous = separation;
    }

    fn reset(&mut self) {
        *self = ClosingTrend::new();
    }
}

fn apparent(direction: HorizontalCoord, params: &DetectionParams) -> HorizontalCoord {
    if params.apply_refraction {
        HorizontalCoord::new(direction.azimuth, apply_refraction(direction.altitude))
    } else {
        direction
    }
}

/// Detect aircraft crossing or passing close to the selected body.
///
/// Arguments
/// -----------------
/// * `flights`: normalized aircraft states. Non-locatable records are skipped.
/// * `observer`: the ground site.
/// * `now`: reference instant, `t = 0` of the sweep.
/// * `ephemeris`: source of the body position, queried once per step.
/// * `params`: detection parameters (validated here).
///
/// Return
/// ----------
/// * The matches, in no particular order. An empty vector is the normal "nothing seen"
///   result.
///
/// Errors
/// ----------
/// * [`TransitError::InvalidDetectionParameter`] for
///   invalid parameters, or the error of the ephemeris provider.
pub fn detect_transits<E>(
    flights: &[AircraftState],
    observer: &Observer,
    now: &Epoch,
    ephemeris: &E,
    params: &DetectionParams,
) -> Result<Vec<TransitMatch>, TransitError>
where
    E: EphemerisProvider + ?Sized,
{
    params.validate()?;

    let located: Vec<(&AircraftState, TrackKey)> = flights
        .iter()
        .enumerate()
        .filter(|(_, flight)| {
            let ok = flight.is_locatable();
            if !ok {
                trace!(id = %flight.id, "skipping aircraft without a usable position");
            }
            ok
        })
        .map(|(index, flight)| (flight, flight.batch_key(index)))
        .collect();

    let mut trends = vec![ClosingTrend::new(); located.len()];
    let mut confirmed_keys: HashSet<TrackKey> = HashSet::new();
    let mut confirmed: Vec<TransitMatch> = Vec::new();
    let mut warnings: HashMap<TrackKey, TransitMatch> = HashMap::new();

    let body = params.body;
    let steps = params.step_count();

    for step in 0..=steps {
        let t = step as f64 * params.step_seconds;
        let instant = epoch_after(now, t);
        let body_raw = ephemeris.position(body, &instant, observer.latitude(), observer.longitude())?;
        let body_dir = apparent(body_raw.horizontal(), params);

        if body_dir.altitude < params.min_body_altitude {
            trace!(t, altitude = body_dir.altitude, "body below minimum altitude, step skipped");
            continue;
        }
        let warnings_allowed = params
            .early_warning_min_body_altitude
            .map_or(true, |min| body_dir.altitude >= min);

        // widest pre-filter bound any aircraft can reach at this step
        let dynamic = if params.use_dynamic_margin {
            params.max_dynamic_relaxation
        } else {
            0.0
        };
        let rescue = if params.use_heading_alignment {
            params.heading_rescue_band
        } else {
            0.0
        };
        let widest = params.margin + dynamic + DISK_RADIUS_DEG + params.box_padding.max(rescue);

        for ((flight, key), trend) in located.iter().zip(trends.iter_mut()) {
            if confirmed_keys.contains(key) {
                continue;
            }

            let position = if t > 0.0 && params.use_projection {
                flight.projected(t)
            } else {
                flight.position()
            };

            let ground_distance = haversine_distance(
                observer.latitude(),
                observer.longitude(),
                position.latitude,
                position.longitude,
            );

            // the flat elevation ignores the curvature drop of about d / 2R
            if let Some(flat) = flat_azimuth_elevation(observer, &position) {
                let slack = params.flat_prefilter_padding
                    + (ground_distance / (2.0 * EARTH_MEAN_RADIUS)).to_degrees();
                if box_prefilter_rejects(&flat, &body_raw.horizontal(), widest + slack) {
                    trend.reset();
                    continue;
                }
            }

            let Some(geometric) = azimuth_elevation(observer, &position) else {
                trace!(%key, "aircraft coincides with the observer, skipped");
                continue;
            };
            let aircraft_dir = apparent(geometric, params);

            let classification =
                classify_aircraft(&aircraft_dir, &body_dir, flight, position.altitude, params);
            trend.record(classification.separation);

            let make_match = |kind: MatchKind| TransitMatch {
                aircraft_id: flight.id.clone(),
                track_key: key.clone(),
                body,
                azimuth: aircraft_dir.azimuth,
                altitude: aircraft_dir.altitude,
                body_azimuth: body_dir.azimuth,
                body_altitude: body_dir.altitude,
                separation: classification.separation,
                ground_distance,
                time_offset: t,
                kind,
                heading_aligned: classification.heading_aligned,
            };

            match classification.kind {
                EventKind::Transit => {
                    trace!(%key, t, separation = classification.separation, "confirmed transit");
                    warnings.remove(key);
                    confirmed_keys.insert(key.clone());
                    confirmed.push(make_match(MatchKind::Confirmed));
                }
                EventKind::NearMiss => {
                    if warnings.contains_key(key) || !warnings_allowed {
                        continue;
                    }
                    let qualifies = step == 0 || trend.streak >= params.min_closing_streak;
                    if qualifies {
                        trace!(%key, t, separation = classification.separation, "early warning");
                        warnings.insert(key.clone(), make_match(MatchKind::EarlyWarning));
                    }
                }
                EventKind::NoEvent => {}
            }
        }
    }

    debug!(
        aircraft = flights.len(),
        located = located.len(),
        steps = steps + 1,
        confirmed = confirmed.len(),
        early_warnings = warnings.len(),
        %body,
        "transit sweep done"
    );

    confirmed.extend(warnings.into_values());
    Ok(confirmed)
}

/// [`detect_transits`] on positions smoothed through a caller-owned [`TrackHistory`].
///
/// Every aircraft is first fed to its track filter with a fix taken at `now`; the filtered
/// latitude/longitude replace the raw ones before the sweep. The history is updated even
/// when the sweep returns an error.
pub fn detect_transits_smoothed<E>(
    flights: &[AircraftState],
    observer: &Observer,
    now: &Epoch,
    ephemeris: &E,
    params: &DetectionParams,
    history: &mut TrackHistory,
) -> Result<Vec<TransitMatch>, TransitError>
where
    E: EphemerisProvider + ?Sized,
{
    let smoothed: Vec<AircraftState> = flights
        .iter()
        .map(|flight| history.update(flight, *now))
        .collect();
    detect_transits(&smoothed, observer, now, ephemeris, params)
}
