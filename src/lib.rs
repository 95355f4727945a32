//! # transit_chaser
//!
//! Predicts when aircraft will be seen crossing the Sun or the Moon from a ground site, and
//! when two aircraft will appear next to each other in the observer's sky.
//!
//! The crate is a pure computation core: callers hand over normalized flight states, an
//! [`Observer`], an instant and an [`EphemerisProvider`]; they get back match records.
//! Fetching flights or ephemerides and presenting results are left to the caller.
//!
//! ```rust,no_run
//! use hifitime::Epoch;
//! use transit_chaser::prelude::*;
//!
//! let observer = Observer::new(-33.86, 151.21, 40.0).unwrap();
//! let now = Epoch::from_gregorian_utc_hms(2025, 6, 1, 2, 30, 0);
//! let flights = vec![AircraftState::new("QFA1", -33.80, 151.30, 9_000.0, 230.0, 240.0, 0.0)];
//! let params = DetectionParams::builder()
//!     .body(CelestialBody::Sun)
//!     .prediction_horizon(60.0)
//!     .build()
//!     .unwrap();
//!
//! let matches = detect_transits(&flights, &observer, &now, &LowPrecisionEphemeris::new(), &params).unwrap();
//! for m in &matches {
//!     println!("{m}");
//! }
//! ```
pub mod aircraft;
pub mod constants;
pub mod detection;
pub mod ephemeris;
pub mod motion;
pub mod observers;
pub mod ref_system;
pub mod refraction;
pub mod time;
pub mod tracking;
pub mod transit_errors;

pub use detection::conjunction::detect_conjunctions;
pub use detection::sweep::{detect_transits, detect_transits_smoothed};

pub mod prelude {
    pub use crate::aircraft::flight_record::{normalize_batch, RawFlightRecord};
    pub use crate::aircraft::{AircraftState, TrackKey};
    pub use crate::detection::{
        ConjunctionMatch, DetectionParams, DetectionParamsBuilder, MatchKind, TransitMatch,
    };
    pub use crate::ephemeris::low_precision::LowPrecisionEphemeris;
    pub use crate::ephemeris::{BodyPosition, CelestialBody, EphemerisProvider, FixedEphemeris};
    pub use crate::observers::Observer;
    pub use crate::tracking::TrackHistory;
    pub use crate::transit_errors::TransitError;
    pub use crate::{detect_conjunctions, detect_transits, detect_transits_smoothed};
}
