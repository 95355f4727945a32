#![allow(dead_code)]

use approx::assert_abs_diff_eq;
use hifitime::Epoch;
use transit_chaser::aircraft::AircraftState;
use transit_chaser::observers::Observer;
use transit_chaser::ref_system::{position_along, HorizontalCoord};

pub fn equator_observer() -> Observer {
    Observer::new(0.0, 0.0, 0.0).expect("equator observer")
}

pub fn reference_epoch() -> Epoch {
    Epoch::from_gregorian_utc_hms(2025, 3, 20, 12, 0, 0)
}

/// Stationary aircraft seen from `observer` exactly in direction `(azimuth, elevation)`.
pub fn aircraft_along(
    observer: &Observer,
    id: &str,
    azimuth: f64,
    elevation: f64,
    range: f64,
) -> AircraftState {
    let p = position_along(observer, &HorizontalCoord::new(azimuth, elevation), range);
    AircraftState::new(id, p.latitude, p.longitude, p.altitude, 0.0, 0.0, 0.0)
}

pub fn assert_direction_close(actual: &HorizontalCoord, azimuth: f64, altitude: f64, epsilon: f64) {
    assert_abs_diff_eq!(actual.azimuth, azimuth, epsilon = epsilon);
    assert_abs_diff_eq!(actual.altitude, altitude, epsilon = epsilon);
}
