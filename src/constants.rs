//! # Constants and type definitions for transit detection
//!
//! This module centralizes the **geodetic constants**, **detection thresholds**, **unit
//! conversion factors**, and **type aliases** used throughout the crate.
//!
//! ## Overview
//!
//! - WGS84 ellipsoid parameters for the exact geodetic frame transform
//! - Spherical Earth radius used by the motion projector and the flat-Earth fast path
//! - Apparent disk radius of the Sun/Moon, the confirmed-transit threshold
//! - Aviation unit conversions (feet, knots, ft/min → SI)
//!
//! Every quantity handled by the detection core is in SI units and degrees.
//! Provider records expressed in aviation units must be converted with the factors
//! below before they reach the pipeline (see [`crate::aircraft::flight_record`]).

// -------------------------------------------------------------------------------------------------
// Geodetic constants
// -------------------------------------------------------------------------------------------------

/// WGS84 semi-major axis in meters
pub const WGS84_SEMI_MAJOR_AXIS: f64 = 6_378_137.0;

/// WGS84 flattening
pub const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;

/// WGS84 first eccentricity squared, e² = f(2 − f)
pub const WGS84_ECCENTRICITY_SQUARED: f64 = WGS84_FLATTENING * (2.0 - WGS84_FLATTENING);

/// Mean Earth radius in meters, used for great-circle propagation and haversine distances
pub const EARTH_MEAN_RADIUS: f64 = 6_371_000.0;

/// Earth equatorial radius in kilometers, used for lunar parallax
pub const EARTH_EQUATORIAL_RADIUS_KM: f64 = WGS84_SEMI_MAJOR_AXIS / 1000.0;

/// Length of one degree of latitude in meters (local scaling of the track filter)
pub const METERS_PER_DEGREE: f64 = 111_319.9;

// -------------------------------------------------------------------------------------------------
// Detection constants
// -------------------------------------------------------------------------------------------------

/// Apparent angular radius of the Sun and the Moon, in degrees.
///
/// A separation strictly below this value puts the aircraft silhouette on the disk.
pub const DISK_RADIUS_DEG: f64 = 0.25;

/// Upper bound accepted for the heading-alignment cap, in degrees
pub const MAX_HEADING_ALIGNMENT_CAP_DEG: f64 = 6.0;

/// 4000 ft, the vertical limit for two aircraft to count as a conjunction
pub const CONJUNCTION_VERTICAL_LIMIT_M: f64 = 4000.0 * FEET_TO_METERS;

/// Aircraft lower than this above the observer are treated as ground traffic
pub const MIN_HEIGHT_ABOVE_OBSERVER_M: f64 = 100.0;

/// Numerical epsilon used for degenerate-vector checks
pub const EPS: f64 = 1e-9;

// -------------------------------------------------------------------------------------------------
// Unit conversions
// -------------------------------------------------------------------------------------------------

/// Feet → meters
pub const FEET_TO_METERS: f64 = 0.3048;

/// Knots → meters per second
pub const KNOTS_TO_MPS: f64 = 1852.0 / 3600.0;

/// Kilometers per hour → meters per second
pub const KMH_TO_MPS: f64 = 1000.0 / 3600.0;

/// Feet per minute → meters per second
pub const FPM_TO_MPS: f64 = FEET_TO_METERS / 60.0;

/// Arcminutes → degrees
pub const ARCMIN_TO_DEG: f64 = 1.0 / 60.0;

/// Julian date of the J2000.0 epoch
pub const J2000_JD: f64 = 2_451_545.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in meters
pub type Meter = f64;
/// Speed in meters per second
pub type MetersPerSecond = f64;
/// Duration in seconds
pub type Second = f64;
