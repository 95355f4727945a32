//! # Atmospheric refraction
//!
//! Bennett's empirical formula for the refraction `R` (arcminutes) of a ray whose true
//! altitude is `h` (degrees):
//!
//! ```text
//! R = 1.02 / tan(h + 10.3 / (h + 5.11))
//! ```
//!
//! The apparent altitude is `h + R / 60`. The formula diverges a little under the
//! horizon, so the input is clamped to `h ≥ -1°` before evaluation.
use crate::constants::{Degree, ARCMIN_TO_DEG};

/// Lowest true altitude at which the formula is evaluated.
const MIN_REFRACTION_ALTITUDE: Degree = -1.0;

/// Refraction at a true altitude, in degrees.
pub fn refraction_deg(true_altitude: Degree) -> Degree {
    let h = true_altitude.max(MIN_REFRACTION_ALTITUDE);
    let arcmin = 1.02 / (h + 10.3 / (h + 5.11)).to_radians().tan();
    arcmin * ARCMIN_TO_DEG
}

/// Apparent altitude seen by the observer for a given true (geometric) altitude.
pub fn apply_refraction(true_altitude: Degree) -> Degree {
    if !true_altitude.is_finite() {
        return true_altitude;
    }
    true_altitude + refraction_deg(true_altitude)
}
