//! # Celestial ephemeris seam
//!
//! The detection core never computes where the Sun or the Moon is: it asks an
//! [`EphemerisProvider`] once per sweep step. This module defines that seam and a few
//! providers:
//!
//! - [`FixedEphemeris`] – a constant position, for callers that already know the body
//!   direction (single-instant detection, tests).
//! - Any closure `Fn(CelestialBody, &Epoch, f64, f64) -> BodyPosition`.
//! - [`low_precision::LowPrecisionEphemeris`] – self-contained low precision solar and lunar
//!   positions, good to a few arcminutes, for offline use.
//!
//! ## Conventions
//!
//! - Azimuth: degrees, 0° = north, increasing clockwise (east = 90°).
//! - Altitude: degrees, **geometric** (no refraction). The pipeline applies
//!   [`apply_refraction`](crate::refraction::apply_refraction) itself.
//! - A provider must be pure with respect to `(instant, latitude, longitude)`.
pub mod low_precision;

use std::fmt;
use std::str::FromStr;

use hifitime::Epoch;
use serde::{Deserialize, Serialize};

use crate::constants::Degree;
use crate::ref_system::HorizontalCoord;
use crate::transit_errors::TransitError;

/// The bodies an aircraft can be seen against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CelestialBody {
    Sun,
    #[default]
    Moon,
}

impl fmt::Display for CelestialBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CelestialBody::Sun => write!(f, "sun"),
            CelestialBody::Moon => write!(f, "moon"),
        }
    }
}

impl FromStr for CelestialBody {
    type Err = TransitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sun" => Ok(CelestialBody::Sun),
            "moon" => Ok(CelestialBody::Moon),
            other => Err(TransitError::UnknownCelestialBody(other.to_string())),
        }
    }
}

/// Apparent direction of a body at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyPosition {
    /// Azimuth in degrees, clockwise from north.
    pub azimuth: Degree,
    /// Geometric altitude in degrees.
    pub altitude: Degree,
}

impl BodyPosition {
    pub fn new(azimuth: Degree, altitude: Degree) -> Self {
        BodyPosition { azimuth, altitude }
    }

    pub fn horizontal(&self) -> HorizontalCoord {
        HorizontalCoord::new(self.azimuth, self.altitude)
    }
}

/// Source of Sun/Moon positions for an observer.
pub trait EphemerisProvider {
    /// Position of `body` at `epoch` (UTC) seen from geodetic `(latitude, longitude)` in degrees.
    fn position(
        &self,
        body: CelestialBody,
        epoch: &Epoch,
        latitude: Degree,
        longitude: Degree,
    ) -> Result<BodyPosition, TransitError>;
}

impl<F> EphemerisProvider for F
where
    F: Fn(CelestialBody, &Epoch, Degree, Degree) -> BodyPosition,
{
    fn position(
        &self,
        body: CelestialBody,
        epoch: &Epoch,
        latitude: Degree,
        longitude: Degree,
    ) -> Result<BodyPosition, TransitError> {
        Ok(self(body, epoch, latitude, longitude))
    }
}

/// A body that does not move: the same position is returned for every instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedEphemeris {
    pub position: BodyPosition,
}

impl FixedEphemeris {
    pub fn new(azimuth: Degree, altitude: Degree) -> Self {
        FixedEphemeris {
            position: BodyPosition::new(azimuth, altitude),
        }
    }
}

impl EphemerisProvider for FixedEphemeris {
    fn position(
        &self,
        _body: CelestialBody,
        _epoch: &Epoch,
        _latitude: Degree,
        _longitude: Degree,
    ) -> Result<BodyPosition, TransitError> {
        if !(self.position.azimuth.is_finite() && self.position.altitude.is_finite()) {
            return Err(TransitError::EphemerisUnavailable(
                "fixed body position is not finite".into(),
            ));
        }
        Ok(self.position)
    }
}
