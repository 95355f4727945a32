use std::fmt;

use serde::{Deserialize, Serialize};

use crate::aircraft::TrackKey;
use crate::constants::{Degree, Meter, Second};
use crate::ephemeris::CelestialBody;
use crate::ref_system::HorizontalCoord;

/// How certain a transit match is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchKind {
    /// The aircraft silhouette crosses the disk.
    Confirmed,
    /// The aircraft passes close to the body, now or soon, without a confirmed crossing.
    EarlyWarning,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKind::Confirmed => write!(f, "confirmed"),
            MatchKind::EarlyWarning => write!(f, "early-warning"),
        }
    }
}

/// One aircraft seen against the Sun or the Moon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitMatch {
    /// Provider identifier, possibly empty.
    pub aircraft_id: String,
    pub track_key: TrackKey,
    pub body: CelestialBody,
    /// Apparent azimuth of the aircraft, degrees.
    pub azimuth: Degree,
    /// Apparent altitude angle of the aircraft, degrees.
    pub altitude: Degree,
    pub body_azimuth: Degree,
    pub body_altitude: Degree,
    /// Angular separation between aircraft and body centre, degrees.
    pub separation: Degree,
    /// Great-circle ground distance from the observer to the aircraft, meters.
    pub ground_distance: Meter,
    /// Seconds from "now" at which the reading occurred.
    pub time_offset: Second,
    pub kind: MatchKind,
    pub heading_aligned: bool,
}

impl fmt::Display for TransitMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} of the {} at t+{:.0}s: az={:.2}° alt={:.2}° sep={:.3}° dist={:.1} km",
            self.track_key,
            self.kind,
            self.body,
            self.time_offset,
            self.azimuth,
            self.altitude,
            self.separation,
            self.ground_distance / 1000.0,
        )
    }
}

/// Two aircraft appearing close to each other in the observer's sky.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConjunctionMatch {
    /// Identifier of the first aircraft of the pair (lower input index).
    pub first: String,
    pub second: String,
    /// Indices of the two aircraft in the input slice.
    pub first_index: usize,
    pub second_index: usize,
    /// Geometric direction of each aircraft from the observer.
    pub first_position: HorizontalCoord,
    pub second_position: HorizontalCoord,
    pub angular_separation: Degree,
    /// Absolute altitude difference, meters.
    pub vertical_separation: Meter,
}

impl fmt::Display for ConjunctionMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {}: sep={:.3}° Δh={:.0} m",
            self.first, self.second, self.angular_separation, self.vertical_separation
        )
    }
}
