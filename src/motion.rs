//! # Motion projector
//!
//! Dead-reckoning of an aircraft along its current track.
//!
//! The horizontal motion follows the great circle leaving the current position with
//! initial bearing `heading`, over a distance `d = speed · Δt` on a sphere of radius
//! [`EARTH_MEAN_RADIUS`]:
//!
//! ```text
//! φ2 = asin( sinφ1·cos δ + cosφ1·sin δ·cos θ )
//! λ2 = λ1 + atan2( sin θ·sin δ·cosφ1 , cos δ − sinφ1·sinφ2 )      with δ = d / R
//! ```
//!
//! The altitude is extrapolated linearly with the vertical rate.
use crate::aircraft::AircraftState;
use crate::constants::{Degree, MetersPerSecond, Second, EARTH_MEAN_RADIUS, EPS};
use crate::ref_system::{normalize_longitude, GeoPosition};

/// Project a position forward in time.
///
/// Arguments
/// -----------------
/// * `position`: current geodetic position (altitude in meters).
/// * `heading`: true track in **degrees**.
/// * `speed`: ground speed in **m/s**.
/// * `vertical_rate`: climb rate in **m/s** (negative when descending).
/// * `seconds`: time offset; may be negative to look backwards.
///
/// Return
/// ----------
/// * The projected position. At `seconds = 0` the input is returned unchanged, and a
///   stationary aircraft keeps its latitude/longitude bit for bit.
pub fn project(
    position: &GeoPosition,
    heading: Degree,
    speed: MetersPerSecond,
    vertical_rate: MetersPerSecond,
    seconds: Second,
) -> GeoPosition {
    if seconds == 0.0 {
        return *position;
    }

    let altitude = position.altitude + vertical_rate * seconds;
    let distance = speed * seconds;
    if !distance.is_finite() || distance.abs() < EPS || !heading.is_finite() {
        return GeoPosition::new(position.latitude, position.longitude, altitude);
    }

    let delta = distance / EARTH_MEAN_RADIUS;
    let theta = heading.to_radians();
    let phi1 = position.latitude.to_radians();
    let lambda1 = position.longitude.to_radians();

    let (sin_phi1, cos_phi1) = phi1.sin_cos();
    let (sin_delta, cos_delta) = delta.sin_cos();

    let sin_phi2 = (sin_phi1 * cos_delta + cos_phi1 * sin_delta * theta.cos()).clamp(-1.0, 1.0);
    let phi2 = sin_phi2.asin();
    let lambda2 = lambda1
        + (theta.sin() * sin_delta * cos_phi1).atan2(cos_delta - sin_phi1 * sin_phi2);

    GeoPosition::new(
        phi2.to_degrees(),
        normalize_longitude(lambda2.to_degrees()),
        altitude,
    )
}

impl AircraftState {
    /// Position of this aircraft `seconds` from now, assuming constant track, speed and climb.
    pub fn projected(&self, seconds: Second) -> GeoPosition {
        project(
            &self.position(),
            self.heading,
            self.ground_speed,
            self.vertical_rate,
            seconds,
        )
    }
}

#[cfg(test)]
mod motion_test {
    use super::*;
    use crate::ref_system::{haversine_distance, initial_bearing};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_identity_at_zero() {
        let p = GeoPosition::new(51.4706, -0.461941, 10_668.0);
        assert_eq!(project(&p, 273.0, 230.0, -5.0, 0.0), p);
    }

    #[test]
    fn test_stationary_keeps_position() {
        let p = GeoPosition::new(-43.5, 172.5, 300.0);
        let q = project(&p, 90.0, 0.0, 0.0, 60.0);
        assert_eq!(q, p);
        assert!(q.is_finite());
    }

    #[test]
    fn test_due_north_along_meridian() {
        let p = GeoPosition::new(10.0, 20.0, 1000.0);
        let q = project(&p, 0.0, 100.0, 2.0, 100.0);
        let expected_dlat = (10_000.0 / EARTH_MEAN_RADIUS).to_degrees();
        assert_abs_diff_eq!(q.latitude, 10.0 + expected_dlat, epsilon = 1e-9);
        assert_abs_diff_eq!(q.longitude, 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(q.altitude, 1200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_distance_and_bearing_preserved() {
        let p = GeoPosition::new(45.0, 7.0, 9000.0);
        let q = project(&p, 135.0, 250.0, 0.0, 120.0);
        let d = haversine_distance(p.latitude, p.longitude, q.latitude, q.longitude);
        assert_abs_diff_eq!(d, 30_000.0, epsilon = 1e-3);
        let b = initial_bearing(p.latitude, p.longitude, q.latitude, q.longitude);
        assert_abs_diff_eq!(b, 135.0, epsilon = 1e-6);
    }

    #[test]
    fn test_crossing_antimeridian() {
        let p = GeoPosition::new(0.0, 179.99, 10_000.0);
        let q = project(&p, 90.0, 250.0, 0.0, 60.0);
        assert!(q.longitude < -179.0);
    }
}
