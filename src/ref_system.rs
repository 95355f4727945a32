//! # Geodetic frame transform
//!
//! Conversions between the frames used to locate an aircraft in the observer's sky:
//!
//! ```text
//! geodetic (lat, lon, h) --(WGS84)--> ECEF --(observer rotation)--> ENU --> (azimuth, altitude)
//! ```
//!
//! Two paths are provided:
//!
//! - **Exact**: [`azimuth_elevation`] converts both points to ECEF on the WGS84 ellipsoid,
//!   rotates the difference vector into the observer's East-North-Up frame and reads the
//!   horizontal coordinates from it. Every match decision is taken on this path.
//! - **Flat-Earth**: [`flat_azimuth_elevation`] combines a haversine ground distance,
//!   the initial great-circle bearing and `atan2(Δh, d)`. It ignores Earth curvature and is
//!   only used to discard aircraft that are obviously far from the body before the exact
//!   transform is evaluated.
//!
//! ## Conventions
//!
//! - Azimuth: degrees in `[0, 360)`, 0° = north, increasing clockwise (east = 90°).
//! - Altitude/elevation: degrees in `[-90, 90]`, positive above the local horizon.
//! - Heights: meters above the ellipsoid.
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::constants::{
    Degree, Meter, EARTH_MEAN_RADIUS, EPS, WGS84_ECCENTRICITY_SQUARED, WGS84_SEMI_MAJOR_AXIS,
};
use crate::observers::Observer;

/// A point given by geodetic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    /// Geodetic latitude in **degrees**.
    pub latitude: Degree,
    /// Longitude in **degrees**, east positive.
    pub longitude: Degree,
    /// Height above the WGS84 ellipsoid in **meters**.
    pub altitude: Meter,
}

impl GeoPosition {
    pub fn new(latitude: Degree, longitude: Degree, altitude: Meter) -> Self {
        GeoPosition {
            latitude,
            longitude,
            altitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite() && self.altitude.is_finite()
    }
}

/// A direction in the observer's sky.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizontalCoord {
    /// Azimuth in **degrees**, `[0, 360)`, clockwise from true north.
    pub azimuth: Degree,
    /// Altitude angle in **degrees**, positive above the horizon.
    pub altitude: Degree,
}

impl HorizontalCoord {
    pub fn new(azimuth: Degree, altitude: Degree) -> Self {
        HorizontalCoord {
            azimuth: normalize_azimuth(azimuth),
            altitude,
        }
    }

    /// Unit vector of this direction in the local ENU frame.
    pub fn to_enu_unit(&self) -> Vector3<f64> {
        let (sin_az, cos_az) = self.azimuth.to_radians().sin_cos();
        let (sin_alt, cos_alt) = self.altitude.to_radians().sin_cos();
        Vector3::new(cos_alt * sin_az, cos_alt * cos_az, sin_alt)
    }
}

/// Wrap an azimuth into `[0, 360)`.
pub fn normalize_azimuth(azimuth: Degree) -> Degree {
    let wrapped = azimuth.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Wrap a longitude into `[-180, 180)`.
pub fn normalize_longitude(longitude: Degree) -> Degree {
    (longitude + 180.0).rem_euclid(360.0) - 180.0
}

/// Shorter-arc difference between two azimuths, in `[0, 180]`.
pub fn azimuth_difference(a: Degree, b: Degree) -> Degree {
    let d = (a - b).rem_euclid(360.0);
    if d > 180.0 {
        360.0 - d
    } else {
        d
    }
}

/// Convert geodetic coordinates to Earth-Centered-Earth-Fixed coordinates.
///
/// Arguments
/// -----------------
/// * `latitude`: geodetic latitude in **degrees**.
/// * `longitude`: longitude in **degrees**.
/// * `height`: height above the WGS84 ellipsoid in **meters**.
///
/// Return
/// ----------
/// * ECEF position `[X, Y, Z]` in **meters**.
pub fn geodetic_to_ecef(latitude: Degree, longitude: Degree, height: Meter) -> Vector3<f64> {
    let (sin_phi, cos_phi) = latitude.to_radians().sin_cos();
    let (sin_lambda, cos_lambda) = longitude.to_radians().sin_cos();

    // prime vertical radius of curvature
    let n = WGS84_SEMI_MAJOR_AXIS / (1.0 - WGS84_ECCENTRICITY_SQUARED * sin_phi * sin_phi).sqrt();

    Vector3::new(
        (n + height) * cos_phi * cos_lambda,
        (n + height) * cos_phi * sin_lambda,
        (n * (1.0 - WGS84_ECCENTRICITY_SQUARED) + height) * sin_phi,
    )
}

/// Rotation matrix taking an ECEF difference vector into the local ENU frame of a site.
///
/// ```text
///     | -sinλ        cosλ        0    |
/// R = | -cosλ·sinφ  -sinλ·sinφ   cosφ |
///     |  cosλ·cosφ   sinλ·cosφ   sinφ |
/// ```
pub fn ecef_to_enu_matrix(latitude: Degree, longitude: Degree) -> Matrix3<f64> {
    let (sin_phi, cos_phi) = latitude.to_radians().sin_cos();
    let (sin_lambda, cos_lambda) = longitude.to_radians().sin_cos();

    Matrix3::new(
        -sin_lambda,
        cos_lambda,
        0.0,
        -cos_lambda * sin_phi,
        -sin_lambda * sin_phi,
        cos_phi,
        cos_lambda * cos_phi,
        sin_lambda * cos_phi,
        sin_phi,
    )
}

/// Read azimuth and elevation from an ENU vector.
///
/// Returns `None` for a (near) zero vector, where the direction is undefined.
pub fn enu_to_horizontal(enu: &Vector3<f64>) -> Option<HorizontalCoord> {
    let norm = enu.norm();
    if !norm.is_finite() || norm < EPS {
        return None;
    }

    let azimuth = enu.x.atan2(enu.y).to_degrees();
    let elevation = (enu.z / norm).clamp(-1.0, 1.0).asin().to_degrees();
    Some(HorizontalCoord::new(azimuth, elevation))
}

/// Exact azimuth/elevation of a target seen from an observer.
///
/// Arguments
/// -----------------
/// * `observer`: the ground site (its ECEF position and ENU rotation are precomputed).
/// * `target`: geodetic position of the target.
///
/// Return
/// ----------
/// * `Some(HorizontalCoord)` with the geometric (unrefracted) direction, or `None` when the
///   target coincides with the observer or carries non-finite coordinates.
///
/// See also
/// ------------
/// * [`flat_azimuth_elevation`] – cheap approximation used as a pre-filter.
/// * [`crate::refraction::apply_refraction`] – apparent elevation.
pub fn azimuth_elevation(observer: &Observer, target: &GeoPosition) -> Option<HorizontalCoord> {
    if !target.is_finite() {
        return None;
    }
    let target_ecef = geodetic_to_ecef(target.latitude, target.longitude, target.altitude);
    let enu = observer.enu_rotation() * (target_ecef - observer.ecef_position());
    enu_to_horizontal(&enu)
}

/// Great-circle ground distance between two points on the mean-radius sphere, in meters.
pub fn haversine_distance(lat1: Degree, lon1: Degree, lat2: Degree, lon2: Degree) -> Meter {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_MEAN_RADIUS * a.clamp(0.0, 1.0).sqrt().asin()
}

/// Initial great-circle bearing from point 1 to point 2, in `[0, 360)`.
pub fn initial_bearing(lat1: Degree, lon1: Degree, lat2: Degree, lon2: Degree) -> Degree {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let y = dlambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();
    normalize_azimuth(y.atan2(x).to_degrees())
}

/// Flat-Earth approximation of [`azimuth_elevation`].
///
/// The elevation is `atan2(target height − observer height, ground distance)`, which
/// overestimates the elevation of distant targets because curvature is ignored.
/// Never use the result to accept a match.
pub fn flat_azimuth_elevation(
    observer: &Observer,
    target: &GeoPosition,
) -> Option<HorizontalCoord> {
    if !target.is_finite() {
        return None;
    }
    let (lat0, lon0) = (observer.latitude(), observer.longitude());
    let distance = haversine_distance(lat0, lon0, target.latitude, target.longitude);
    let dh = target.altitude - observer.height();
    if distance < EPS && dh.abs() < EPS {
        return None;
    }

    let azimuth = initial_bearing(lat0, lon0, target.latitude, target.longitude);
    let elevation = dh.atan2(distance).to_degrees();
    Some(HorizontalCoord::new(azimuth, elevation))
}

/// Convert an ECEF position back to geodetic coordinates.
///
/// Fixed-point iteration on the latitude; converges to sub-millimeter height for any
/// point outside a few kilometers of the Earth's center.
pub fn ecef_to_geodetic(ecef: &Vector3<f64>) -> GeoPosition {
    let p = ecef.x.hypot(ecef.y);
    let longitude = ecef.y.atan2(ecef.x);

    let mut latitude = ecef.z.atan2(p * (1.0 - WGS84_ECCENTRICITY_SQUARED));
    let mut height = 0.0;
    for _ in 0..8 {
        let sin_phi = latitude.sin();
        let n = WGS84_SEMI_MAJOR_AXIS / (1.0 - WGS84_ECCENTRICITY_SQUARED * sin_phi * sin_phi).sqrt();
        height = if latitude.cos().abs() > EPS {
            p / latitude.cos() - n
        } else {
            ecef.z.abs() - n * (1.0 - WGS84_ECCENTRICITY_SQUARED)
        };
        latitude = ecef
            .z
            .atan2(p * (1.0 - WGS84_ECCENTRICITY_SQUARED * n / (n + height)));
    }

    GeoPosition::new(latitude.to_degrees(), longitude.to_degrees(), height)
}

/// Geodetic position of the point seen from `observer` in `direction` at `range` meters.
///
/// Inverse of [`azimuth_elevation`]: placing a target with this function and reading it back
/// returns `direction`.
pub fn position_along(observer: &Observer, direction: &HorizontalCoord, range: Meter) -> GeoPosition {
    let enu = direction.to_enu_unit() * range;
    let ecef = observer.ecef_position() + observer.enu_rotation().transpose() * enu;
    ecef_to_geodetic(&ecef)
}

#[cfg(test)]
mod ref_system_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn origin() -> Observer {
        Observer::new(0.0, 0.0, 0.0).unwrap()
    }

    #[test]
    fn test_geodetic_to_ecef_equator() {
        let ecef = geodetic_to_ecef(0.0, 0.0, 0.0);
        assert_abs_diff_eq!(ecef.x, WGS84_SEMI_MAJOR_AXIS, epsilon = 1e-6);
        assert_abs_diff_eq!(ecef.y, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(ecef.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_geodetic_to_ecef_pole() {
        let ecef = geodetic_to_ecef(90.0, 0.0, 0.0);
        // polar radius b = a(1 - f)
        assert_abs_diff_eq!(ecef.z, 6_356_752.314_245, epsilon = 1e-3);
        assert_abs_diff_eq!(ecef.x, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_enu_rotation_is_orthonormal() {
        let r = ecef_to_enu_matrix(-43.15, 172.74);
        let id = r * r.transpose();
        assert_abs_diff_eq!(id, Matrix3::identity(), epsilon = 1e-12);
    }

    #[test]
    fn test_zenith_target() {
        let obs = origin();
        let target = GeoPosition::new(0.0, 0.0, 10_000.0);
        let dir = azimuth_elevation(&obs, &target).unwrap();
        assert_abs_diff_eq!(dir.altitude, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cardinal_azimuths() {
        let obs = origin();
        let north = azimuth_elevation(&obs, &GeoPosition::new(0.1, 0.0, 5000.0)).unwrap();
        let east = azimuth_elevation(&obs, &GeoPosition::new(0.0, 0.1, 5000.0)).unwrap();
        let south = azimuth_elevation(&obs, &GeoPosition::new(-0.1, 0.0, 5000.0)).unwrap();
        let west = azimuth_elevation(&obs, &GeoPosition::new(0.0, -0.1, 5000.0)).unwrap();

        assert_abs_diff_eq!(north.azimuth, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(east.azimuth, 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(south.azimuth, 180.0, epsilon = 1e-9);
        assert_abs_diff_eq!(west.azimuth, 270.0, epsilon = 1e-9);
        assert!(north.altitude > 0.0);
    }

    #[test]
    fn test_coincident_target_is_skipped() {
        let obs = origin();
        assert!(azimuth_elevation(&obs, &GeoPosition::new(0.0, 0.0, 0.0)).is_none());
        assert!(flat_azimuth_elevation(&obs, &GeoPosition::new(0.0, 0.0, 0.0)).is_none());
        assert!(azimuth_elevation(&obs, &GeoPosition::new(f64::NAN, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_flat_path_close_to_exact_nearby() {
        let obs = Observer::new(48.85, 2.35, 35.0).unwrap();
        let target = GeoPosition::new(48.90, 2.40, 3000.0);
        let exact = azimuth_elevation(&obs, &target).unwrap();
        let flat = flat_azimuth_elevation(&obs, &target).unwrap();
        assert!(azimuth_difference(exact.azimuth, flat.azimuth) < 0.5);
        assert!((exact.altitude - flat.altitude).abs() < 0.5);
    }

    #[test]
    fn test_haversine_one_degree_meridian() {
        let d = haversine_distance(0.0, 0.0, 1.0, 0.0);
        assert_abs_diff_eq!(d, EARTH_MEAN_RADIUS * 1.0_f64.to_radians(), epsilon = 1e-6);
    }

    #[test]
    fn test_angle_helpers() {
        assert_abs_diff_eq!(normalize_azimuth(-90.0), 270.0);
        assert_abs_diff_eq!(normalize_azimuth(720.0), 0.0);
        assert_abs_diff_eq!(normalize_longitude(190.0), -170.0);
        assert_abs_diff_eq!(azimuth_difference(359.0, 1.0), 2.0);
        assert_abs_diff_eq!(azimuth_difference(0.0, 180.0), 180.0);
    }

    #[test]
    fn test_position_along_round_trip() {
        let obs = Observer::new(-43.15, 172.74, 120.0).unwrap();
        let direction = HorizontalCoord::new(233.0, 38.5);
        let target = position_along(&obs, &direction, 25_000.0);
        let back = azimuth_elevation(&obs, &target).unwrap();
        assert_abs_diff_eq!(back.azimuth, 233.0, epsilon = 1e-7);
        assert_abs_diff_eq!(back.altitude, 38.5, epsilon = 1e-7);
    }

    #[test]
    fn test_ecef_to_geodetic_inverts() {
        let ecef = geodetic_to_ecef(52.1, -3.3, 10_500.0);
        let geo = ecef_to_geodetic(&ecef);
        assert_abs_diff_eq!(geo.latitude, 52.1, epsilon = 1e-9);
        assert_abs_diff_eq!(geo.longitude, -3.3, epsilon = 1e-9);
        assert_abs_diff_eq!(geo.altitude, 10_500.0, epsilon = 1e-4);
    }
}
