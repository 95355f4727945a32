//! # Angular separation and classification
//!
//! Compares one apparent aircraft direction with the apparent body direction and decides
//! whether the reading is a transit, a near-miss or nothing.
//!
//! ## Thresholds
//!
//! ```text
//!   0 ──── DISK_RADIUS_DEG ──────────── margin + DISK_RADIUS_DEG ────────►  separation
//!   │   Transit   │          NearMiss            │          NoEvent
//! ```
//!
//! The near-miss threshold uses the *effective* margin:
//!
//! * dynamic margin (low/slow aircraft) adds a bounded, non-negative relaxation,
//! * zenith correction multiplies the margin by `zenith_margin_factor` when the body is
//!   higher than `zenith_altitude`, where azimuth differences are meaningless.
//!
//! The transit threshold never depends on the margin, so a larger margin can never remove
//! a transit.
use crate::aircraft::AircraftState;
use crate::constants::{Degree, Meter, DISK_RADIUS_DEG, EPS};
use crate::detection::DetectionParams;
use crate::ref_system::{azimuth_difference, HorizontalCoord};

/// Outcome of one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    NoEvent,
    NearMiss,
    Transit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub kind: EventKind,
    /// Angular separation in degrees. `f64::INFINITY` when the box pre-filter rejected the
    /// reading before the separation was computed.
    pub separation: Degree,
    /// Set when the reading was promoted to a near-miss by the heading-alignment test.
    pub heading_aligned: bool,
}

impl Classification {
    fn rejected() -> Self {
        Classification {
            kind: EventKind::NoEvent,
            separation: f64::INFINITY,
            heading_aligned: false,
        }
    }
}

/// Great-circle distance between two sky directions, in degrees.
///
/// Spherical law of cosines, with the cosine clamped into `[-1, 1]` before `acos`.
///
/// ```
/// use transit_chaser::detection::separation::angular_separation;
/// use transit_chaser::ref_system::HorizontalCoord;
///
/// let a = HorizontalCoord::new(10.0, 30.0);
/// let b = HorizontalCoord::new(10.0, 32.0);
/// assert!((angular_separation(&a, &b) - 2.0).abs() < 1e-9);
/// ```
pub fn angular_separation(a: &HorizontalCoord, b: &HorizontalCoord) -> Degree {
    let (sin1, cos1) = a.altitude.to_radians().sin_cos();
    let (sin2, cos2) = b.altitude.to_radians().sin_cos();
    let daz = (a.azimuth - b.azimuth).to_radians();

    (sin1 * sin2 + cos1 * cos2 * daz.cos())
        .clamp(-1.0, 1.0)
        .acos()
        .to_degrees()
}

/// Coarse test telling whether two directions are certainly farther apart than `bound`.
///
/// The altitude test is exact since the separation is never smaller than the altitude
/// difference. The azimuth test uses the haversine form
/// `sin²(s/2) = sin²(Δalt/2) + cos alt₁ · cos alt₂ · sin²(Δaz/2)`, so scaling the azimuth
/// difference by `sqrt(cos alt₁ · cos alt₂)` keeps the test conservative even near the
/// zenith. A `true` result therefore implies `angular_separation(a, b) > bound`.
pub fn box_prefilter_rejects(a: &HorizontalCoord, b: &HorizontalCoord, bound: Degree) -> bool {
    if bound >= 180.0 {
        return false;
    }
    if (a.altitude - b.altitude).abs() > bound {
        return true;
    }

    let scale = (a.altitude.to_radians().cos() * b.altitude.to_radians().cos())
        .max(0.0)
        .sqrt();
    let half_daz = (azimuth_difference(a.azimuth, b.azimuth) / 2.0).to_radians();
    scale * half_daz.sin() > (bound / 2.0).to_radians().sin()
}

/// Additive margin relaxation for slow, low-flying aircraft.
///
/// Each condition independently adds its relaxation; the sum is capped by
/// `max_dynamic_relaxation`. Returns `0` when the dynamic margin is disabled.
pub fn dynamic_relaxation(params: &DetectionParams, altitude: Meter, ground_speed: f64) -> Degree {
    if !params.use_dynamic_margin {
        return 0.0;
    }
    let mut relaxation = 0.0;
    if altitude < params.low_altitude_threshold {
        relaxation += params.low_altitude_relaxation;
    }
    if ground_speed < params.slow_speed_threshold {
        relaxation += params.slow_speed_relaxation;
    }
    relaxation.clamp(0.0, params.max_dynamic_relaxation)
}

/// Whether the zenith correction applies for a body at `body_altitude`.
pub fn zenith_correction_active(params: &DetectionParams, body_altitude: Degree) -> bool {
    params.use_zenith_correction && body_altitude > params.zenith_altitude
}

/// Near-miss margin after the zenith correction, `base_margin` being the configured margin
/// plus any dynamic relaxation.
pub fn effective_margin(params: &DetectionParams, base_margin: Degree, body_altitude: Degree) -> Degree {
    if zenith_correction_active(params, body_altitude) {
        base_margin * params.zenith_margin_factor
    } else {
        base_margin
    }
}

/// Angle between the aircraft's 3D velocity and the body direction, in degrees.
///
/// The velocity direction is built in the local ENU frame from the track (`heading`) and
/// the climb angle `atan2(vertical_rate, ground_speed)`.
///
/// Return
/// ----------
/// * `None` when the velocity is (near) zero or not finite.
pub fn heading_alignment_angle(
    heading: Degree,
    ground_speed: f64,
    vertical_rate: f64,
    body: &HorizontalCoord,
) -> Option<Degree> {
    let speed = ground_speed.hypot(vertical_rate);
    if !speed.is_finite() || speed < EPS || !heading.is_finite() {
        return None;
    }
    let climb = vertical_rate.atan2(ground_speed).to_degrees();
    let velocity = HorizontalCoord::new(heading, climb);
    Some(angular_separation(&velocity, body))
}

/// Classify a pair of directions against an explicit near-miss margin.
///
/// `bypass_box` disables the box pre-filter (zenith correction); `box_padding` is added to
/// the near-miss threshold to form the pre-filter bound.
pub fn classify_with_margin(
    aircraft: &HorizontalCoord,
    body: &HorizontalCoord,
    margin: Degree,
    box_padding: Degree,
    bypass_box: bool,
) -> Classification {
    let near_miss_threshold = margin + DISK_RADIUS_DEG;
    if !bypass_box && box_prefilter_rejects(aircraft, body, near_miss_threshold + box_padding) {
        return Classification::rejected();
    }

    let separation = angular_separation(aircraft, body);
    let kind = if separation < DISK_RADIUS_DEG {
        EventKind::Transit
    } else if separation < near_miss_threshold {
        EventKind::NearMiss
    } else {
        EventKind::NoEvent
    };
    Classification {
        kind,
        separation,
        heading_aligned: false,
    }
}

/// Classify an aircraft direction against the body direction with the configured margin.
///
/// The zenith correction is applied when enabled; there is no dynamic margin nor heading
/// test since no aircraft kinematics are available here.
pub fn classify(aircraft: &HorizontalCoord, body: &HorizontalCoord, params: &DetectionParams) -> Classification {
    let zenith = zenith_correction_active(params, body.altitude);
    classify_with_margin(
        aircraft,
        body,
        effective_margin(params, params.margin, body.altitude),
        params.box_padding,
        zenith,
    )
}

/// Full classification of one aircraft reading.
///
/// Arguments
/// -----------------
/// * `aircraft_dir`: apparent direction of the aircraft.
/// * `body_dir`: apparent direction of the body.
/// * `aircraft`: the aircraft, for its kinematics (track, ground speed, vertical rate).
/// * `altitude`: aircraft altitude at the reading instant (projected when sweeping).
/// * `params`: detection parameters.
///
/// Return
/// ----------
/// * The [`Classification`], with `heading_aligned` set when a `NoEvent` reading was
///   promoted to `NearMiss` by the heading-alignment test.
pub fn classify_aircraft(
    aircraft_dir: &HorizontalCoord,
    body_dir: &HorizontalCoord,
    aircraft: &AircraftState,
    altitude: Meter,
    params: &DetectionParams,
) -> Classification {
    let base = params.margin + dynamic_relaxation(params, altitude, aircraft.ground_speed);
    let margin = effective_margin(params, base, body_dir.altitude);
    let zenith = zenith_correction_active(params, body_dir.altitude);

    let padding = if params.use_heading_alignment {
        params.box_padding.max(params.heading_rescue_band)
    } else {
        params.box_padding
    };

    let mut classification = classify_with_margin(aircraft_dir, body_dir, margin, padding, zenith);

    if params.use_heading_alignment
        && classification.kind == EventKind::NoEvent
        && classification.separation < margin + DISK_RADIUS_DEG + params.heading_rescue_band
    {
        let aligned = heading_alignment_angle(
            aircraft.heading,
            aircraft.ground_speed,
            aircraft.vertical_rate,
            body_dir,
        )
        .is_some_and(|angle| angle < params.heading_alignment_cap);

        if aligned {
            classification.kind = EventKind::NearMiss;
            classification.heading_aligned = true;
        }
    }
    classification
}
