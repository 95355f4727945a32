//! # Track smoothing
//!
//! Optional jitter reduction for noisy flight feeds.
//!
//! [`TrackHistory`] holds one [`TrackFilter`] per identified aircraft and is owned by the
//! caller, who keeps it across detection calls. Nothing is stored globally: two histories
//! never interfere and dropping a history forgets every track.
//!
//! Anonymous aircraft (blank identifier) are never tracked. Their [`TrackKey`] is derived
//! from their position, which changes at every fix.
//!
//! ## Example
//!
//! ```rust,no_run
//! use hifitime::Epoch;
//! use transit_chaser::aircraft::AircraftState;
//! use transit_chaser::tracking::TrackHistory;
//!
//! let mut history = TrackHistory::with_capacity_limit(500);
//! let now = Epoch::from_gregorian_utc_hms(2025, 5, 1, 12, 0, 0);
//! let raw = AircraftState::new("QFA12", -33.9, 151.2, 3000.0, 90.0, 120.0, 0.0);
//! let smoothed = history.update(&raw, now);
//! ```
pub mod kalman;

use std::cmp::Ordering;
use std::collections::HashMap;

use hifitime::{Duration, Epoch};
use tracing::trace;

use crate::aircraft::{AircraftState, TrackKey};
use crate::constants::Degree;
pub use kalman::{TrackFilter, TrackMeasurement};

/// Caller-owned per-aircraft filter store.
#[derive(Debug, Clone, Default)]
pub struct TrackHistory {
    tracks: HashMap<TrackKey, TrackFilter>,
    capacity: Option<usize>,
}

impl TrackHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A history holding at most `capacity` tracks; the least recently updated track is
    /// dropped to make room for a new one.
    pub fn with_capacity_limit(capacity: usize) -> Self {
        TrackHistory {
            tracks: HashMap::with_capacity(capacity),
            capacity: Some(capacity),
        }
    }

    /// Feed a fix and return the aircraft with its smoothed latitude/longitude.
    ///
    /// Kinematics (altitude, track, speed, vertical rate) are passed through unchanged.
    /// Anonymous or non-locatable aircraft are returned as is.
    pub fn update(&mut self, aircraft: &AircraftState, epoch: Epoch) -> AircraftState {
        let key = aircraft.track_key();
        if matches!(key, TrackKey::Position(..)) || !aircraft.is_locatable() {
            return aircraft.clone();
        }

        let measurement = TrackMeasurement {
            latitude: aircraft.latitude,
            longitude: aircraft.longitude,
            ground_speed: Some(aircraft.ground_speed),
            heading: Some(aircraft.heading),
        };

        let (latitude, longitude) = match self.tracks.get_mut(&key) {
            Some(filter) => {
                filter.correct(&measurement, epoch);
                filter.position()
            }
            None => {
                self.make_room();
                let filter = TrackFilter::new(&measurement, epoch);
                let position = filter.position();
                self.tracks.insert(key, filter);
                position
            }
        };

        AircraftState {
            latitude,
            longitude,
            ..aircraft.clone()
        }
    }

    fn make_room(&mut self) {
        let Some(capacity) = self.capacity else {
            return;
        };
        while self.tracks.len() >= capacity.max(1) {
            let oldest = self
                .tracks
                .iter()
                .min_by(|a, b| {
                    a.1.last_update()
                        .partial_cmp(&b.1.last_update())
                        .unwrap_or(Ordering::Equal)
                })
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    trace!(%key, "track history full, dropping oldest track");
                    self.tracks.remove(&key);
                }
                None => break,
            }
        }
    }

    pub fn get(&self, key: &TrackKey) -> Option<&TrackFilter> {
        self.tracks.get(key)
    }

    /// Position of a track extrapolated to `epoch`, without updating it.
    pub fn predicted_position(&self, key: &TrackKey, epoch: Epoch) -> Option<(Degree, Degree)> {
        self.tracks.get(key).map(|filter| filter.position_at(epoch))
    }

    pub fn remove(&mut self, key: &TrackKey) -> Option<TrackFilter> {
        self.tracks.remove(key)
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Drop every track whose last fix is older than `max_age` at `now`.
    ///
    /// Return
    /// ----------
    /// * The number of evicted tracks.
    pub fn evict_stale(&mut self, now: Epoch, max_age: Duration) -> usize {
        let before = self.tracks.len();
        self.tracks
            .retain(|_, filter| now - filter.last_update() <= max_age);
        before - self.tracks.len()
    }
}
