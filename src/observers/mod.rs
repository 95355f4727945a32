//! # Ground observer
//!
//! This module defines [`Observer`](crate::observers::Observer), the ground site from which the
//! sky is watched. An observer is immutable for the duration of a detection call.
//!
//! ## Design & invariants
//!
//! - Coordinates are validated once at construction and stored as `NotNan<f64>`, so the
//!   detection pipeline never has to re-check them.
//! - Longitude is normalized into `[-180, 180)`.
//! - The observer's **ECEF position** and the **ECEF → ENU rotation** are precomputed, because
//!   [`azimuth_elevation`](crate::ref_system::azimuth_elevation) is evaluated for every aircraft
//!   at every sweep step.
//!
//! ## Units
//!
//! - Latitude/longitude: **degrees**.
//! - Height: **meters** above the WGS84 ellipsoid.
//!
//! ## See also
//! ------------
//! * [`geodetic_to_ecef`](crate::ref_system::geodetic_to_ecef) – WGS84 conversion.
//! * [`ecef_to_enu_matrix`](crate::ref_system::ecef_to_enu_matrix) – Local frame rotation.
use nalgebra::{Matrix3, Vector3};
use ordered_float::NotNan;

use crate::constants::{Degree, Meter};
use crate::ref_system::{ecef_to_enu_matrix, geodetic_to_ecef, normalize_longitude, GeoPosition};
use crate::transit_errors::TransitError;

/// Ground observer with its precomputed Earth-fixed geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Observer {
    latitude: NotNan<f64>,
    longitude: NotNan<f64>,
    height: NotNan<f64>,

    /// ECEF position of the site in **meters**.
    ecef_position: Vector3<f64>,

    /// Rotation from ECEF difference vectors to the site's ENU frame.
    enu_rotation: Matrix3<f64>,
}

impl Observer {
    /// Create a new observer from geodetic coordinates.
    ///
    /// Arguments
    /// -----------------
    /// * `latitude`: geodetic latitude in **degrees**, within `[-90, 90]`.
    /// * `longitude`: longitude in **degrees**, any finite value (normalized to `[-180, 180)`).
    /// * `height`: height above the ellipsoid in **meters**.
    ///
    /// Return
    /// ----------
    /// * The observer, or [`TransitError::InvalidObserver`] for non-finite or out-of-range input.
    pub fn new(latitude: Degree, longitude: Degree, height: Meter) -> Result<Self, TransitError> {
        if !(latitude.is_finite() && longitude.is_finite() && height.is_finite()) {
            return Err(TransitError::InvalidObserver(format!(
                "non-finite coordinates ({latitude}, {longitude}, {height})"
            )));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(TransitError::InvalidObserver(format!(
                "latitude {latitude} outside [-90, 90]"
            )));
        }

        let longitude = normalize_longitude(longitude);

        Ok(Observer {
            latitude: NotNan::new(latitude)?,
            longitude: NotNan::new(longitude)?,
            height: NotNan::new(height)?,
            ecef_position: geodetic_to_ecef(latitude, longitude, height),
            enu_rotation: ecef_to_enu_matrix(latitude, longitude),
        })
    }

    pub fn latitude(&self) -> Degree {
        self.latitude.into_inner()
    }

    pub fn longitude(&self) -> Degree {
        self.longitude.into_inner()
    }

    pub fn height(&self) -> Meter {
        self.height.into_inner()
    }

    pub fn position(&self) -> GeoPosition {
        GeoPosition::new(self.latitude(), self.longitude(), self.height())
    }

    pub fn ecef_position(&self) -> Vector3<f64> {
        self.ecef_position
    }

    pub fn enu_rotation(&self) -> &Matrix3<f64> {
        &self.enu_rotation
    }
}
