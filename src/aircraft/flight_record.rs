//! Provider-agnostic flight records and their unit normalization.
//!
//! Flight feeds disagree on units: some report barometric feet, knots and ft/min, others
//! meters and m/s. A unit mismatch shifts every downstream angle without raising any error,
//! so the unit of each quantity is carried explicitly on the record and converted once in
//! [`RawFlightRecord::normalize`].
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::aircraft::AircraftState;
use crate::constants::{FEET_TO_METERS, FPM_TO_MPS, KMH_TO_MPS, KNOTS_TO_MPS};
use crate::ref_system::{normalize_azimuth, normalize_longitude};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AltitudeUnit {
    #[default]
    Meters,
    Feet,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedUnit {
    #[default]
    MetersPerSecond,
    Knots,
    KilometersPerHour,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalRateUnit {
    #[default]
    MetersPerSecond,
    FeetPerMinute,
}

impl AltitudeUnit {
    pub fn to_meters(self, value: f64) -> f64 {
        match self {
            AltitudeUnit::Meters => value,
            AltitudeUnit::Feet => value * FEET_TO_METERS,
        }
    }
}

impl SpeedUnit {
    pub fn to_mps(self, value: f64) -> f64 {
        match self {
            SpeedUnit::MetersPerSecond => value,
            SpeedUnit::Knots => value * KNOTS_TO_MPS,
            SpeedUnit::KilometersPerHour => value * KMH_TO_MPS,
        }
    }
}

impl VerticalRateUnit {
    pub fn to_mps(self, value: f64) -> f64 {
        match self {
            VerticalRateUnit::MetersPerSecond => value,
            VerticalRateUnit::FeetPerMinute => value * FPM_TO_MPS,
        }
    }
}

/// A flight record as handed over by a data source, before validation.
///
/// Every field is optional; the unit tags default to SI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFlightRecord {
    #[serde(alias = "callsign", alias = "icao24", alias = "flight")]
    pub id: Option<String>,
    #[serde(alias = "lat")]
    pub latitude: Option<f64>,
    #[serde(alias = "lon", alias = "lng")]
    pub longitude: Option<f64>,
    #[serde(alias = "alt", alias = "geo_altitude")]
    pub altitude: Option<f64>,
    #[serde(alias = "track", alias = "true_track")]
    pub heading: Option<f64>,
    #[serde(alias = "gs", alias = "velocity")]
    pub speed: Option<f64>,
    #[serde(alias = "baro_rate", alias = "geom_rate")]
    pub vertical_rate: Option<f64>,

    pub altitude_unit: AltitudeUnit,
    pub speed_unit: SpeedUnit,
    pub vertical_rate_unit: VerticalRateUnit,
}

impl RawFlightRecord {
    /// Convert the record into a canonical [`AircraftState`].
    ///
    /// Return
    /// ----------
    /// * `None` when latitude, longitude or altitude is missing or non-finite, or when the
    ///   latitude lies outside `[-90, 90]`.
    /// * Otherwise the SI state. A missing heading or speed makes the aircraft stationary
    ///   (no projection), a missing vertical rate is level flight.
    pub fn normalize(&self) -> Option<AircraftState> {
        let latitude = self.latitude.filter(|v| v.is_finite())?;
        let longitude = self.longitude.filter(|v| v.is_finite())?;
        let altitude = self.altitude.filter(|v| v.is_finite())?;
        if !(-90.0..=90.0).contains(&latitude) {
            return None;
        }

        let finite_or_zero = |v: Option<f64>| v.filter(|x| x.is_finite()).unwrap_or(0.0);

        Some(AircraftState {
            id: self.id.clone().unwrap_or_default(),
            latitude,
            longitude: normalize_longitude(longitude),
            altitude: self.altitude_unit.to_meters(altitude),
            heading: normalize_azimuth(finite_or_zero(self.heading)),
            ground_speed: self.speed_unit.to_mps(finite_or_zero(self.speed)),
            vertical_rate: self
                .vertical_rate_unit
                .to_mps(finite_or_zero(self.vertical_rate)),
        })
    }
}

/// Normalize a batch of records, silently dropping the ones that cannot be located.
pub fn normalize_batch(records: &[RawFlightRecord]) -> Vec<AircraftState> {
    records
        .iter()
        .filter_map(|record| {
            let state = record.normalize();
            if state.is_none() {
                trace!(id = ?record.id, "skipping flight record without a usable position");
            }
            state
        })
        .collect()
}
