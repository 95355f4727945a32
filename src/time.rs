use hifitime::{Duration, Epoch};

use crate::constants::{Second, J2000_JD};

/// Instant located `seconds` after `epoch`.
///
/// Argument
/// --------
/// * `epoch`: reference instant
/// * `seconds`: offset in seconds, may be fractional or negative
///
/// Return
/// ------
/// * the shifted epoch
pub fn epoch_after(epoch: &Epoch, seconds: Second) -> Epoch {
    *epoch + Duration::from_seconds(seconds)
}

/// Days elapsed since J2000.0 (JD 2451545.0), in the UTC scale.
///
/// This is the time argument of the low precision solar/lunar series.
pub fn days_since_j2000(epoch: &Epoch) -> f64 {
    epoch.to_jde_utc_days() - J2000_JD
}

/// Seconds elapsed from `earlier` to `later` (negative if `later` precedes `earlier`).
pub fn seconds_between(earlier: &Epoch, later: &Epoch) -> Second {
    (*later - *earlier).to_seconds()
}
