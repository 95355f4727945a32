//! # Aircraft state
//!
//! Canonical, unit-normalized aircraft records consumed by the detection pipeline.
//!
//! The pipeline only ever sees [`AircraftState`]: provider-specific records are mapped to it
//! through [`flight_record::RawFlightRecord::normalize`], which converts aviation units and
//! drops records that cannot be located.
//!
//! ## Identity
//!
//! Aircraft are identified by [`TrackKey`]. A non-blank identifier (callsign, ICAO24 hex…)
//! is used verbatim after trimming. A blank identifier falls back to the position rounded to
//! 1e-4° (~11 m) in [`AircraftState::track_key`]. Inside one detection batch,
//! [`AircraftState::batch_key`] keys anonymous records by their input index instead, so
//! aircraft stacked above the same point are never merged into one entity.
pub mod flight_record;

use serde::{Deserialize, Serialize};

use crate::constants::{Degree, Meter, MetersPerSecond};
use crate::ref_system::GeoPosition;

/// Scale used to round positions into a [`TrackKey::Position`].
const POSITION_KEY_SCALE: f64 = 1e4;

/// Identity of an aircraft across sweep steps and across detection calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrackKey {
    /// Non-blank identifier, trimmed.
    Id(String),
    /// Latitude and longitude rounded to 1e-4°, stored as scaled integers.
    Position(i64, i64),
    /// Anonymous record, by its index in the input batch.
    Record(usize),
}

impl std::fmt::Display for TrackKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackKey::Id(id) => write!(f, "{id}"),
            TrackKey::Position(lat, lon) => write!(
                f,
                "@{:.4},{:.4}",
                *lat as f64 / POSITION_KEY_SCALE,
                *lon as f64 / POSITION_KEY_SCALE
            ),
            TrackKey::Record(index) => write!(f, "#{index}"),
        }
    }
}

/// Normalized aircraft state.
///
/// Units
/// -----
/// * `latitude`, `longitude`, `heading`: degrees (heading is the true track, `[0, 360)`).
/// * `altitude`: meters, geometric height above the ellipsoid.
/// * `ground_speed`, `vertical_rate`: meters per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftState {
    /// Provider identifier, possibly empty.
    pub id: String,
    pub latitude: Degree,
    pub longitude: Degree,
    pub altitude: Meter,
    pub heading: Degree,
    pub ground_speed: MetersPerSecond,
    pub vertical_rate: MetersPerSecond,
}

impl AircraftState {
    pub fn new(
        id: impl Into<String>,
        latitude: Degree,
        longitude: Degree,
        altitude: Meter,
        heading: Degree,
        ground_speed: MetersPerSecond,
        vertical_rate: MetersPerSecond,
    ) -> Self {
        AircraftState {
            id: id.into(),
            latitude,
            longitude,
            altitude,
            heading,
            ground_speed,
            vertical_rate,
        }
    }

    pub fn position(&self) -> GeoPosition {
        GeoPosition::new(self.latitude, self.longitude, self.altitude)
    }

    /// Whether the record can be placed in the sky at all.
    pub fn is_locatable(&self) -> bool {
        self.position().is_finite() && (-90.0..=90.0).contains(&self.latitude)
    }

    /// Identity used for deduplication and track history lookups.
    pub fn track_key(&self) -> TrackKey {
        let id = self.id.trim();
        if id.is_empty() {
            TrackKey::Position(
                (self.latitude * POSITION_KEY_SCALE).round() as i64,
                (self.longitude * POSITION_KEY_SCALE).round() as i64,
            )
        } else {
            TrackKey::Id(id.to_string())
        }
    }

    /// Identity within one batch: the trimmed identifier, or `index` for anonymous records.
    pub fn batch_key(&self, index: usize) -> TrackKey {
        match self.track_key() {
            TrackKey::Id(id) => TrackKey::Id(id),
            _ => TrackKey::Record(index),
        }
    }

    /// Human-readable label: the identifier, or the position key for anonymous aircraft.
    pub fn label(&self) -> String {
        self.track_key().to_string()
    }
}
