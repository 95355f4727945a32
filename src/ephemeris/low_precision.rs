//! Low precision solar and lunar positions.
//!
//! The series are the short analytical theories used by most lightweight sky calculators:
//!
//! - **Sun**: mean anomaly, equation of center and perihelion longitude give the ecliptic
//!   longitude; latitude is taken as zero.
//! - **Moon**: mean longitude, mean anomaly and argument of latitude with the leading
//!   periodic terms (6.289° in longitude, 5.128° in latitude); distance from the leading
//!   term of the radius series.
//!
//! Both are rotated to equatorial coordinates with the mean obliquity of J2000, then to the
//! horizontal frame with the local sidereal time. The Moon is corrected for topocentric
//! parallax (up to ~1°, far larger than the disk). Accuracy is a few arcminutes for the Sun
//! and ~0.1–0.3° for the Moon, enough to drive alerts but not to replace a JPL ephemeris.
use hifitime::Epoch;

use crate::constants::{Degree, Radian, EARTH_EQUATORIAL_RADIUS_KM};
use crate::ephemeris::{BodyPosition, CelestialBody, EphemerisProvider};
use crate::ref_system::normalize_azimuth;
use crate::time::days_since_j2000;
use crate::transit_errors::TransitError;

/// Mean obliquity of the ecliptic at J2000, in degrees.
const OBLIQUITY_J2000: Degree = 23.4397;

/// Equatorial coordinates of a body.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Equatorial {
    right_ascension: Radian,
    declination: Radian,
}

fn ecliptic_to_equatorial(longitude: Radian, latitude: Radian) -> Equatorial {
    let e = OBLIQUITY_J2000.to_radians();
    let right_ascension = (longitude.sin() * e.cos() - latitude.tan() * e.sin()).atan2(longitude.cos());
    let declination = (latitude.sin() * e.cos() + latitude.cos() * e.sin() * longitude.sin())
        .clamp(-1.0, 1.0)
        .asin();
    Equatorial {
        right_ascension,
        declination,
    }
}

/// Local sidereal time in radians, `lw` being the west longitude in radians.
fn sidereal_time(days: f64, lw: Radian) -> Radian {
    (280.16 + 360.985_623_5 * days).to_radians() - lw
}

fn solar_mean_anomaly(days: f64) -> Radian {
    (357.5291 + 0.985_600_28 * days).to_radians()
}

fn solar_ecliptic_longitude(mean_anomaly: Radian) -> Radian {
    let m = mean_anomaly;
    let center = (1.9148 * m.sin() + 0.02 * (2.0 * m).sin() + 0.0003 * (3.0 * m).sin()).to_radians();
    let perihelion = 102.9372_f64.to_radians();
    m + center + perihelion + std::f64::consts::PI
}

fn sun_coordinates(days: f64) -> Equatorial {
    let longitude = solar_ecliptic_longitude(solar_mean_anomaly(days));
    ecliptic_to_equatorial(longitude, 0.0)
}

/// Geocentric lunar coordinates and distance in kilometers.
fn moon_coordinates(days: f64) -> (Equatorial, f64) {
    let mean_longitude = (218.316 + 13.176_396 * days).to_radians();
    let mean_anomaly = (134.963 + 13.064_993 * days).to_radians();
    let argument_of_latitude = (93.272 + 13.229_350 * days).to_radians();

    let longitude = mean_longitude + 6.289_f64.to_radians() * mean_anomaly.sin();
    let latitude = 5.128_f64.to_radians() * argument_of_latitude.sin();
    let distance_km = 385_001.0 - 20_905.0 * mean_anomaly.cos();

    (ecliptic_to_equatorial(longitude, latitude), distance_km)
}

/// Horizontal coordinates from equatorial ones.
///
/// Return
/// ----------
/// * `(azimuth, altitude)` in radians, azimuth measured from **north**, clockwise.
fn equatorial_to_horizontal(
    coords: &Equatorial,
    days: f64,
    latitude: Degree,
    longitude: Degree,
) -> (Radian, Radian) {
    let phi = latitude.to_radians();
    let lw = (-longitude).to_radians();
    let hour_angle = sidereal_time(days, lw) - coords.right_ascension;
    let dec = coords.declination;

    // measured from south, westward
    let azimuth_south = hour_angle
        .sin()
        .atan2(hour_angle.cos() * phi.sin() - dec.tan() * phi.cos());
    let altitude = (phi.sin() * dec.sin() + phi.cos() * dec.cos() * hour_angle.cos())
        .clamp(-1.0, 1.0)
        .asin();

    (azimuth_south + std::f64::consts::PI, altitude)
}

/// Self-contained Sun/Moon ephemeris.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LowPrecisionEphemeris;

impl LowPrecisionEphemeris {
    pub fn new() -> Self {
        LowPrecisionEphemeris
    }

    /// Geocentric Earth–Moon distance in kilometers at `epoch`.
    pub fn moon_distance_km(&self, epoch: &Epoch) -> f64 {
        moon_coordinates(days_since_j2000(epoch)).1
    }

    fn sun_position(&self, epoch: &Epoch, latitude: Degree, longitude: Degree) -> BodyPosition {
        let days = days_since_j2000(epoch);
        let coords = sun_coordinates(days);
        let (azimuth, altitude) = equatorial_to_horizontal(&coords, days, latitude, longitude);
        BodyPosition::new(normalize_azimuth(azimuth.to_degrees()), altitude.to_degrees())
    }

    fn moon_position(&self, epoch: &Epoch, latitude: Degree, longitude: Degree) -> BodyPosition {
        let days = days_since_j2000(epoch);
        let (coords, distance_km) = moon_coordinates(days);
        let (azimuth, geocentric_altitude) =
            equatorial_to_horizontal(&coords, days, latitude, longitude);

        // topocentric parallax lowers the Moon by up to ~57'
        let parallax = ((EARTH_EQUATORIAL_RADIUS_KM / distance_km) * geocentric_altitude.cos())
            .clamp(-1.0, 1.0)
            .asin();

        BodyPosition::new(
            normalize_azimuth(azimuth.to_degrees()),
            (geocentric_altitude - parallax).to_degrees(),
        )
    }
}

impl EphemerisProvider for LowPrecisionEphemeris {
    fn position(
        &self,
        body: CelestialBody,
        epoch: &Epoch,
        latitude: Degree,
        longitude: Degree,
    ) -> Result<BodyPosition, TransitError> {
        if !(latitude.is_finite() && longitude.is_finite()) {
            return Err(TransitError::EphemerisUnavailable(format!(
                "non-finite site ({latitude}, {longitude})"
            )));
        }
        Ok(match body {
            CelestialBody::Sun => self.sun_position(epoch, latitude, longitude),
            CelestialBody::Moon => self.moon_position(epoch, latitude, longitude),
        })
    }
}

#[cfg(test)]
mod low_precision_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_equinox_noon_sun_is_high() {
        let eph = LowPrecisionEphemeris::new();
        let noon = Epoch::from_gregorian_utc_hms(2024, 3, 20, 12, 0, 0);
        let sun = eph.position(CelestialBody::Sun, &noon, 0.0, 0.0).unwrap();
        assert!(sun.altitude > 80.0, "sun altitude {}", sun.altitude);
    }

    #[test]
    fn test_equinox_midnight_sun_is_below_horizon() {
        let eph = LowPrecisionEphemeris::new();
        let midnight = Epoch::from_gregorian_utc_hms(2024, 3, 20, 0, 0, 0);
        let sun = eph.position(CelestialBody::Sun, &midnight, 0.0, 0.0).unwrap();
        assert!(sun.altitude < -80.0, "sun altitude {}", sun.altitude);
    }

    #[test]
    fn test_morning_sun_rises_in_the_east() {
        let eph = LowPrecisionEphemeris::new();
        // about 09:00 local solar time on the equinox at longitude 0
        let morning = Epoch::from_gregorian_utc_hms(2024, 3, 20, 9, 0, 0);
        let sun = eph.position(CelestialBody::Sun, &morning, 0.0, 0.0).unwrap();
        assert!(sun.altitude > 30.0 && sun.altitude < 60.0);
        assert!((sun.azimuth - 90.0).abs() < 5.0, "sun azimuth {}", sun.azimuth);
    }

    #[test]
    fn test_moon_distance_range() {
        let eph = LowPrecisionEphemeris::new();
        let mut epoch = Epoch::from_gregorian_utc_at_midnight(2025, 1, 1);
        for _ in 0..30 {
            let d = eph.moon_distance_km(&epoch);
            assert!((364_000.0..=406_000.0).contains(&d), "moon distance {d}");
            epoch = crate::time::epoch_after(&epoch, 86_400.0);
        }
    }

    #[test]
    fn test_moon_parallax_lowers_altitude() {
        let eph = LowPrecisionEphemeris::new();
        let epoch = Epoch::from_gregorian_utc_hms(2025, 2, 10, 22, 0, 0);
        let days = days_since_j2000(&epoch);
        let (coords, _) = moon_coordinates(days);
        let (_, geocentric) = equatorial_to_horizontal(&coords, days, 45.0, 5.0);
        let moon = eph.position(CelestialBody::Moon, &epoch, 45.0, 5.0).unwrap();
        let drop = geocentric.to_degrees() - moon.altitude;
        assert!(drop > 0.0 && drop < 1.1, "parallax {drop}");
    }

    #[test]
    fn test_azimuth_range() {
        let eph = LowPrecisionEphemeris::new();
        let mut epoch = Epoch::from_gregorian_utc_at_midnight(2025, 7, 1);
        for _ in 0..48 {
            for body in [CelestialBody::Sun, CelestialBody::Moon] {
                let p = eph.position(body, &epoch, -43.15, 172.74).unwrap();
                assert!((0.0..360.0).contains(&p.azimuth));
                assert!((-90.0..=90.0).contains(&p.altitude));
            }
            epoch = crate::time::epoch_after(&epoch, 1800.0);
        }
    }

    #[test]
    fn test_ecliptic_origin_maps_to_equatorial_origin() {
        let eq = ecliptic_to_equatorial(0.0, 0.0);
        assert_abs_diff_eq!(eq.right_ascension, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(eq.declination, 0.0, epsilon = 1e-12);
    }
}
