mod common;

use approx::assert_abs_diff_eq;
use hifitime::Epoch;

use common::{aircraft_along, equator_observer, reference_epoch};
use transit_chaser::aircraft::AircraftState;
use transit_chaser::motion::project;
use transit_chaser::prelude::*;
use transit_chaser::ref_system::{azimuth_elevation, position_along, HorizontalCoord};

fn geometric_params() -> DetectionParamsBuilder {
    DetectionParams::builder().apply_refraction(false)
}

#[test]
fn scenario_a_aircraft_on_body_is_confirmed() {
    let observer = equator_observer();
    let flights = vec![aircraft_along(&observer, "ON-DISK", 180.0, 45.0, 15_000.0)];
    let params = DetectionParams::default();

    let matches = detect_transits(
        &flights,
        &observer,
        &reference_epoch(),
        &FixedEphemeris::new(180.0, 45.0),
        &params,
    )
    .unwrap();

    assert_eq!(matches.len(), 1);
    let m = &matches[0];
    assert_eq!(m.kind, MatchKind::Confirmed);
    assert_eq!(m.aircraft_id, "ON-DISK");
    assert_eq!(m.time_offset, 0.0);
    assert!(m.separation < 1e-4, "separation {}", m.separation);
    assert_abs_diff_eq!(m.azimuth, 180.0, epsilon = 1e-6);
    assert!(m.ground_distance > 0.0);
}

#[test]
fn scenario_b_opposite_azimuth_is_no_match() {
    let observer = equator_observer();
    let flights = vec![aircraft_along(&observer, "NORTH", 0.0, 45.0, 15_000.0)];
    let params = DetectionParams::builder().margin(2.5).build().unwrap();

    let matches = detect_transits(
        &flights,
        &observer,
        &reference_epoch(),
        &FixedEphemeris::new(180.0, 45.0),
        &params,
    )
    .unwrap();
    assert!(matches.is_empty());
}

#[test]
fn disk_radius_boundary_through_the_pipeline() {
    let observer = equator_observer();
    let body = FixedEphemeris::new(180.0, 45.0);
    let params = geometric_params().build().unwrap();

    let inside = vec![aircraft_along(&observer, "IN", 180.0, 45.24, 15_000.0)];
    let matches = detect_transits(&inside, &observer, &reference_epoch(), &body, &params).unwrap();
    assert_eq!(matches[0].kind, MatchKind::Confirmed);

    let outside = vec![aircraft_along(&observer, "OUT", 180.0, 45.26, 15_000.0)];
    let matches = detect_transits(&outside, &observer, &reference_epoch(), &body, &params).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].kind, MatchKind::EarlyWarning);
}

#[test]
fn larger_margin_keeps_confirmed_match() {
    let observer = equator_observer();
    let body = FixedEphemeris::new(180.0, 45.0);
    let flights = vec![aircraft_along(&observer, "A", 180.1, 45.1, 15_000.0)];

    for margin in [0.1, 0.5, 2.5, 10.0, 30.0] {
        let params = geometric_params().margin(margin).build().unwrap();
        let matches =
            detect_transits(&flights, &observer, &reference_epoch(), &body, &params).unwrap();
        assert_eq!(matches.len(), 1, "margin {margin}");
        assert_eq!(matches[0].kind, MatchKind::Confirmed, "margin {margin}");
    }
}

/// Aircraft flying east that reaches the body direction after `seconds`.
fn crossing_aircraft(observer: &Observer, seconds: f64) -> AircraftState {
    let meeting = position_along(observer, &HorizontalCoord::new(180.0, 45.0), 12_000.0);
    let start = project(&meeting, 90.0, 150.0, 0.0, -seconds);
    AircraftState::new(
        "EAST1",
        start.latitude,
        start.longitude,
        start.altitude,
        90.0,
        150.0,
        0.0,
    )
}

#[test]
fn projected_crossing_is_confirmed_in_the_future() {
    let observer = equator_observer();
    let flights = vec![crossing_aircraft(&observer, 10.0)];
    let params = geometric_params().prediction_horizon(20.0).build().unwrap();

    let matches = detect_transits(
        &flights,
        &observer,
        &reference_epoch(),
        &FixedEphemeris::new(180.0, 45.0),
        &params,
    )
    .unwrap();

    // the early warning raised while closing in is superseded by the confirmation
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].kind, MatchKind::Confirmed);
    assert_abs_diff_eq!(matches[0].time_offset, 10.0);
}

#[test]
fn projection_disabled_keeps_aircraft_in_place() {
    let observer = equator_observer();
    let flights = vec![crossing_aircraft(&observer, 10.0)];
    let params = geometric_params()
        .prediction_horizon(20.0)
        .use_projection(false)
        .build()
        .unwrap();

    let matches = detect_transits(
        &flights,
        &observer,
        &reference_epoch(),
        &FixedEphemeris::new(180.0, 45.0),
        &params,
    )
    .unwrap();
    assert!(matches.is_empty());
}

/// Body rising 0.3° per second under a stationary aircraft at (180°, 45°).
fn rising_body(_: CelestialBody, epoch: &Epoch, _: f64, _: f64) -> BodyPosition {
    let t = (*epoch - reference_epoch()).to_seconds();
    BodyPosition::new(180.0, 40.0 + 0.3 * t)
}

#[test]
fn closing_near_miss_becomes_early_warning() {
    let observer = equator_observer();
    let flights = vec![aircraft_along(&observer, "STILL", 180.0, 45.0, 15_000.0)];
    let params = geometric_params().prediction_horizon(10.0).build().unwrap();

    let matches =
        detect_transits(&flights, &observer, &reference_epoch(), &rising_body, &params).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].kind, MatchKind::EarlyWarning);
    assert_abs_diff_eq!(matches[0].time_offset, 8.0);
}

#[test]
fn isolated_near_miss_needs_a_closing_streak() {
    let observer = equator_observer();
    let flights = vec![aircraft_along(&observer, "STILL", 180.0, 45.0, 15_000.0)];
    let params = geometric_params()
        .prediction_horizon(9.0)
        .min_closing_streak(5)
        .build()
        .unwrap();

    let matches =
        detect_transits(&flights, &observer, &reference_epoch(), &rising_body, &params).unwrap();
    assert!(matches.is_empty());
}

#[test]
fn low_body_suppresses_early_warnings() {
    let observer = equator_observer();
    let flights = vec![aircraft_along(&observer, "STILL", 180.0, 45.0, 15_000.0)];
    let params = geometric_params()
        .prediction_horizon(10.0)
        .early_warning_min_body_altitude(Some(50.0))
        .build()
        .unwrap();

    let matches =
        detect_transits(&flights, &observer, &reference_epoch(), &rising_body, &params).unwrap();
    assert!(matches.is_empty());
}

#[test]
fn blank_identifiers_stay_distinct() {
    let observer = equator_observer();
    let flights = vec![
        aircraft_along(&observer, "", 180.0, 45.0, 10_000.0),
        aircraft_along(&observer, "  ", 180.0, 45.0, 20_000.0),
    ];
    let params = geometric_params().prediction_horizon(5.0).build().unwrap();

    let matches = detect_transits(
        &flights,
        &observer,
        &reference_epoch(),
        &FixedEphemeris::new(180.0, 45.0),
        &params,
    )
    .unwrap();
    assert_eq!(matches.len(), 2);
    assert_ne!(matches[0].track_key, matches[1].track_key);
}

#[test]
fn stacked_anonymous_aircraft_are_confirmed_separately() {
    let observer = equator_observer();
    let upper = aircraft_along(&observer, "", 180.0, 45.0, 15_000.0);
    // same ground point, 500 m lower and climbing onto the upper one's position at t = 10
    let mut climber = upper.clone();
    climber.altitude -= 500.0;
    climber.vertical_rate = 50.0;
    assert_eq!(upper.track_key(), climber.track_key());

    let params = geometric_params().prediction_horizon(20.0).build().unwrap();
    let matches = detect_transits(
        &[upper, climber],
        &observer,
        &reference_epoch(),
        &FixedEphemeris::new(180.0, 45.0),
        &params,
    )
    .unwrap();

    assert_eq!(matches.len(), 2);
    assert!(matches.iter().all(|m| m.kind == MatchKind::Confirmed));
    assert_ne!(matches[0].track_key, matches[1].track_key);
    let mut offsets: Vec<f64> = matches.iter().map(|m| m.time_offset).collect();
    offsets.sort_by(|a, b| a.total_cmp(b));
    assert_eq!(offsets[0], 0.0);
    assert!(offsets[1] > 0.0 && offsets[1] <= 10.0, "offset {}", offsets[1]);
}

#[test]
fn same_identifier_is_confirmed_once() {
    let observer = equator_observer();
    let flights = vec![
        aircraft_along(&observer, "DUP", 180.0, 45.0, 10_000.0),
        aircraft_along(&observer, "DUP", 180.0, 45.0, 20_000.0),
    ];
    let params = geometric_params().build().unwrap();

    let matches = detect_transits(
        &flights,
        &observer,
        &reference_epoch(),
        &FixedEphemeris::new(180.0, 45.0),
        &params,
    )
    .unwrap();
    assert_eq!(matches.len(), 1);
}

#[test]
fn malformed_records_do_not_abort_the_batch() {
    let observer = equator_observer();
    let mut broken = aircraft_along(&observer, "BROKEN", 180.0, 45.0, 10_000.0);
    broken.altitude = f64::NAN;
    let flights = vec![
        broken,
        AircraftState::new("ON-SITE", 0.0, 0.0, 0.0, 0.0, 0.0, 0.0),
        aircraft_along(&observer, "GOOD", 180.0, 45.0, 10_000.0),
    ];

    let matches = detect_transits(
        &flights,
        &observer,
        &reference_epoch(),
        &FixedEphemeris::new(180.0, 45.0),
        &DetectionParams::default(),
    )
    .unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].aircraft_id, "GOOD");
}

#[test]
fn aircraft_in_front_of_the_computed_sun() {
    let observer = Observer::new(48.85, 2.35, 35.0).unwrap();
    let now = Epoch::from_gregorian_utc_hms(2025, 6, 21, 12, 0, 0);
    let ephemeris = LowPrecisionEphemeris::new();
    let sun = ephemeris
        .position(CelestialBody::Sun, &now, observer.latitude(), observer.longitude())
        .unwrap();
    assert!(sun.altitude > 50.0);

    let flights = vec![aircraft_along(
        &observer,
        "AFR1",
        sun.azimuth,
        sun.altitude,
        11_000.0,
    )];
    let params = DetectionParams::builder()
        .body(CelestialBody::Sun)
        .build()
        .unwrap();

    let matches = detect_transits(&flights, &observer, &now, &ephemeris, &params).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].kind, MatchKind::Confirmed);
    assert_eq!(matches[0].body, CelestialBody::Sun);

    let direction = azimuth_elevation(&observer, &flights[0].position()).unwrap();
    common::assert_direction_close(&direction, sun.azimuth, sun.altitude, 1e-6);
}

#[test]
fn smoothed_detection_uses_the_track_history() {
    let observer = equator_observer();
    let flights = vec![aircraft_along(&observer, "SMOOTH", 180.0, 45.0, 15_000.0)];
    let params = DetectionParams::default();
    let mut history = TrackHistory::new();

    let matches = detect_transits_smoothed(
        &flights,
        &observer,
        &reference_epoch(),
        &FixedEphemeris::new(180.0, 45.0),
        &params,
        &mut history,
    )
    .unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].kind, MatchKind::Confirmed);
    assert_eq!(history.len(), 1);
    assert!(history.get(&TrackKey::Id("SMOOTH".into())).is_some());
}
