//! # Detection parameters
//!
//! This module defines [`DetectionParams`](crate::detection::DetectionParams) and its builder,
//! which control how the transit sweep and the conjunction detector classify what an observer
//! sees, and hosts the detection pipeline itself:
//!
//! - [`separation`] – angular separation, box pre-filter, margins and classification,
//! - [`sweep`] – the temporal sweep producing [`TransitMatch`] records,
//! - [`conjunction`] – aircraft-vs-aircraft conjunctions producing [`ConjunctionMatch`] records,
//! - [`matches`] – the match records.
//!
//! ## Pipeline overview
//!
//! ```text
//! flights ──► motion projector (t > 0) ──► ECEF/ENU ──► refraction ──┐
//!                                                                    ├──► classification ──► matches
//! ephemeris(now + t) ─────────────────────────────────► refraction ──┘
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use transit_chaser::detection::DetectionParams;
//! use transit_chaser::ephemeris::CelestialBody;
//!
//! let params = DetectionParams::builder()
//!     .margin(2.5)
//!     .prediction_horizon(30.0)
//!     .body(CelestialBody::Sun)
//!     .use_zenith_correction(true)
//!     .use_dynamic_margin(true)
//!     .build()
//!     .unwrap();
//! ```
use std::cmp::Ordering::{Equal, Greater, Less};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    Degree, Meter, MetersPerSecond, Second, CONJUNCTION_VERTICAL_LIMIT_M,
    MAX_HEADING_ALIGNMENT_CAP_DEG, MIN_HEIGHT_ABOVE_OBSERVER_M,
};
use crate::ephemeris::CelestialBody;
use crate::transit_errors::TransitError;

pub mod conjunction;
pub mod matches;
pub mod separation;
pub mod sweep;

pub use matches::{ConjunctionMatch, MatchKind, TransitMatch};

/// Configuration of a detection call.
///
/// Fields
/// -----------------
/// **Core**
/// * `margin` – angular tolerance (degrees, > 0). A reading closer than
///   `margin + disk radius` to the body is a near-miss; for conjunctions, the maximal
///   angular separation of the two aircraft.
/// * `prediction_horizon` – how far ahead the sweep looks (seconds, ≥ 0). `0` evaluates "now" only.
/// * `step_seconds` – sweep step (seconds, > 0).
/// * `body` – the selected body, resolved once per call.
///
/// **Flags**
/// * `use_heading_alignment` – promote marginal readings of aircraft flying toward the body.
/// * `use_zenith_correction` – tighten the margin and classify on separation only when the
///   body is close to the zenith.
/// * `use_dynamic_margin` – relax the margin for low and slow aircraft.
/// * `use_projection` – dead-reckon aircraft to each sweep instant.
/// * `apply_refraction` – compare apparent rather than geometric altitudes.
///
/// **Heuristics** (see [`separation`])
/// * `zenith_altitude`, `zenith_margin_factor`
/// * `box_padding`, `flat_prefilter_padding`
/// * `low_altitude_threshold`, `low_altitude_relaxation`, `slow_speed_threshold`,
///   `slow_speed_relaxation`, `max_dynamic_relaxation`
/// * `heading_alignment_cap` (≤ 6°), `heading_rescue_band`
///
/// **Sweep policy**
/// * `min_closing_streak` – consecutive closing steps required before a predicted near-miss
///   becomes an early warning.
/// * `min_body_altitude` – steps where the body is lower than this are skipped.
/// * `early_warning_min_body_altitude` – when set, no early warning is raised while the body
///   is lower than this (a low Sun makes predictions unreliable).
///
/// **Conjunctions**
/// * `conjunction_vertical_limit` – maximal vertical separation (meters, default 4000 ft).
/// * `min_height_above_observer` – aircraft lower than this above the observer are ignored.
/// * `conjunction_bucketing_threshold` – flight count above which the elevation-band
///   pre-pass replaces the brute-force pair scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionParams {
    pub margin: Degree,
    pub prediction_horizon: Second,
    pub step_seconds: Second,
    pub body: CelestialBody,

    pub use_heading_alignment: bool,
    pub use_zenith_correction: bool,
    pub use_dynamic_margin: bool,
    pub use_projection: bool,
    pub apply_refraction: bool,

    pub zenith_altitude: Degree,
    pub zenith_margin_factor: f64,
    pub box_padding: Degree,
    pub flat_prefilter_padding: Degree,

    pub low_altitude_threshold: Meter,
    pub low_altitude_relaxation: Degree,
    pub slow_speed_threshold: MetersPerSecond,
    pub slow_speed_relaxation: Degree,
    pub max_dynamic_relaxation: Degree,

    pub heading_alignment_cap: Degree,
    pub heading_rescue_band: Degree,

    pub min_closing_streak: u32,
    pub min_body_altitude: Degree,
    pub early_warning_min_body_altitude: Option<Degree>,

    pub conjunction_vertical_limit: Meter,
    pub min_height_above_observer: Meter,
    pub conjunction_bucketing_threshold: usize,
}

impl DetectionParams {
    /// Construct a new [`DetectionParams`] with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new [`DetectionParamsBuilder`] starting from the defaults.
    pub fn builder() -> DetectionParamsBuilder {
        DetectionParamsBuilder::new()
    }

    /// Number of sweep steps after `t = 0`.
    pub fn step_count(&self) -> u64 {
        (self.prediction_horizon / self.step_seconds + 1e-9).floor() as u64
    }

    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    #[inline]
    fn ge0(x: f64) -> bool {
        matches!(x.partial_cmp(&0.0), Some(Greater) | Some(Equal))
    }

    #[inline]
    fn le(a: f64, b: f64) -> bool {
        matches!(a.partial_cmp(&b), Some(Less) | Some(Equal))
    }

    /// Check every rule of [`DetectionParamsBuilder::build`].
    ///
    /// Parameters loaded with serde bypass the builder; detection entry points call this
    /// before doing any work.
    pub fn validate(&self) -> Result<(), TransitError> {
        let invalid = |msg: &str| Err(TransitError::InvalidDetectionParameter(msg.into()));

        if !(Self::gt0(self.margin) && self.margin.is_finite()) {
            return invalid("margin must be finite and > 0");
        }
        if !(Self::ge0(self.prediction_horizon) && self.prediction_horizon.is_finite()) {
            return invalid("prediction_horizon must be finite and >= 0");
        }
        if !(Self::gt0(self.step_seconds) && self.step_seconds.is_finite()) {
            return invalid("step_seconds must be finite and > 0");
        }
        if !(Self::gt0(self.zenith_margin_factor) && Self::le(self.zenith_margin_factor, 1.0)) {
            return invalid("zenith_margin_factor must be in (0, 1]");
        }
        if !(Self::ge0(self.zenith_altitude) && Self::le(self.zenith_altitude, 90.0)) {
            return invalid("zenith_altitude must be in [0, 90]");
        }
        if !(Self::ge0(self.box_padding) && Self::ge0(self.flat_prefilter_padding)) {
            return invalid("pre-filter paddings must be >= 0");
        }
        if !(Self::ge0(self.low_altitude_relaxation)
            && Self::ge0(self.slow_speed_relaxation)
            && Self::ge0(self.max_dynamic_relaxation))
        {
            return invalid("dynamic margin relaxations must be >= 0");
        }
        if !(self.low_altitude_threshold.is_finite() && self.slow_speed_threshold.is_finite()) {
            return invalid("dynamic margin thresholds must be finite");
        }
        if !(Self::gt0(self.heading_alignment_cap)
            && Self::le(self.heading_alignment_cap, MAX_HEADING_ALIGNMENT_CAP_DEG))
        {
            return invalid("heading_alignment_cap must be in (0, 6]");
        }
        if !Self::ge0(self.heading_rescue_band) {
            return invalid("heading_rescue_band must be >= 0");
        }
        if !(-90.0..=90.0).contains(&self.min_body_altitude) {
            return invalid("min_body_altitude must be in [-90, 90]");
        }
        if let Some(min) = self.early_warning_min_body_altitude {
            if !(-90.0..=90.0).contains(&min) {
                return invalid("early_warning_min_body_altitude must be in [-90, 90]");
            }
        }
        if !(Self::gt0(self.conjunction_vertical_limit) && self.conjunction_vertical_limit.is_finite())
        {
            return invalid("conjunction_vertical_limit must be finite and > 0");
        }
        if !self.min_height_above_observer.is_finite() {
            return invalid("min_height_above_observer must be finite");
        }
        Ok(())
    }
}

impl Default for DetectionParams {
    fn default() -> Self {
        DetectionParams {
            margin: 2.5,
            prediction_horizon: 0.0,
            step_seconds: 1.0,
            body: CelestialBody::Moon,

            use_heading_alignment: false,
            use_zenith_correction: false,
            use_dynamic_margin: false,
            use_projection: true,
            apply_refraction: true,

            zenith_altitude: 80.0,
            zenith_margin_factor: 0.8,
            box_padding: 1.0,
            flat_prefilter_padding: 3.0,

            low_altitude_threshold: 3000.0,
            low_altitude_relaxation: 0.5,
            slow_speed_threshold: 120.0,
            slow_speed_relaxation: 0.5,
            max_dynamic_relaxation: 1.0,

            heading_alignment_cap: 5.0,
            heading_rescue_band: 1.0,

            min_closing_streak: 2,
            min_body_altitude: 0.0,
            early_warning_min_body_altitude: None,

            conjunction_vertical_limit: CONJUNCTION_VERTICAL_LIMIT_M,
            min_height_above_observer: MIN_HEIGHT_ABOVE_OBSERVER_M,
            conjunction_bucketing_threshold: 64,
        }
    }
}

/// Builder for [`DetectionParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct DetectionParamsBuilder {
    params: DetectionParams,
}

impl DetectionParamsBuilder {
    pub fn new() -> Self {
        DetectionParamsBuilder {
            params: DetectionParams::default(),
        }
    }

    pub fn margin(mut self, v: Degree) -> Self {
        self.params.margin = v;
        self
    }
    pub fn prediction_horizon(mut self, v: Second) -> Self {
        self.params.prediction_horizon = v;
        self
    }
    pub fn step_seconds(mut self, v: Second) -> Self {
        self.params.step_seconds = v;
        self
    }
    pub fn body(mut self, v: CelestialBody) -> Self {
        self.params.body = v;
        self
    }
    pub fn use_heading_alignment(mut self, v: bool) -> Self {
        self.params.use_heading_alignment = v;
        self
    }
    pub fn use_zenith_correction(mut self, v: bool) -> Self {
        self.params.use_zenith_correction = v;
        self
    }
    pub fn use_dynamic_margin(mut self, v: bool) -> Self {
        self.params.use_dynamic_margin = v;
        self
    }
    /// Turn on heading alignment, zenith correction and the dynamic margin together.
    ///
    /// `false` leaves the individual switches as they are.
    pub fn enhanced_prediction(mut self, v: bool) -> Self {
        if v {
            self.params.use_heading_alignment = true;
            self.params.use_zenith_correction = true;
            self.params.use_dynamic_margin = true;
        }
        self
    }
    pub fn use_projection(mut self, v: bool) -> Self {
        self.params.use_projection = v;
        self
    }
    pub fn apply_refraction(mut self, v: bool) -> Self {
        self.params.apply_refraction = v;
        self
    }
    pub fn zenith_altitude(mut self, v: Degree) -> Self {
        self.params.zenith_altitude = v;
        self
    }
    pub fn zenith_margin_factor(mut self, v: f64) -> Self {
        self.params.zenith_margin_factor = v;
        self
    }
    pub fn box_padding(mut self, v: Degree) -> Self {
        self.params.box_padding = v;
        self
    }
    pub fn flat_prefilter_padding(mut self, v: Degree) -> Self {
        self.params.flat_prefilter_padding = v;
        self
    }
    pub fn low_altitude_threshold(mut self, v: Meter) -> Self {
        self.params.low_altitude_threshold = v;
        self
    }
    pub fn low_altitude_relaxation(mut self, v: Degree) -> Self {
        self.params.low_altitude_relaxation = v;
        self
    }
    pub fn slow_speed_threshold(mut self, v: MetersPerSecond) -> Self {
        self.params.slow_speed_threshold = v;
        self
    }
    pub fn slow_speed_relaxation(mut self, v: Degree) -> Self {
        self.params.slow_speed_relaxation = v;
        self
    }
    pub fn max_dynamic_relaxation(mut self, v: Degree) -> Self {
        self.params.max_dynamic_relaxation = v;
        self
    }
    pub fn heading_alignment_cap(mut self, v: Degree) -> Self {
        self.params.heading_alignment_cap = v;
        self
    }
    pub fn heading_rescue_band(mut self, v: Degree) -> Self {
        self.params.heading_rescue_band = v;
        self
    }
    pub fn min_closing_streak(mut self, v: u32) -> Self {
        self.params.min_closing_streak = v;
        self
    }
    pub fn min_body_altitude(mut self, v: Degree) -> Self {
        self.params.min_body_altitude = v;
        self
    }
    pub fn early_warning_min_body_altitude(mut self, v: Option<Degree>) -> Self {
        self.params.early_warning_min_body_altitude = v;
        self
    }
    pub fn conjunction_vertical_limit(mut self, v: Meter) -> Self {
        self.params.conjunction_vertical_limit = v;
        self
    }
    pub fn min_height_above_observer(mut self, v: Meter) -> Self {
        self.params.min_height_above_observer = v;
        self
    }
    pub fn conjunction_bucketing_threshold(mut self, v: usize) -> Self {
        self.params.conjunction_bucketing_threshold = v;
        self
    }

    /// Finalize the builder and produce a [`DetectionParams`] instance.
    ///
    /// Validation rules
    /// -----------------
    /// * `margin > 0` and finite. A zero margin is rejected here rather than special-cased later.
    /// * `prediction_horizon >= 0`, `step_seconds > 0`.
    /// * `zenith_margin_factor ∈ (0, 1]`, `zenith_altitude ∈ [0, 90]`.
    /// * paddings and dynamic relaxations `>= 0` (the dynamic margin can only widen).
    /// * `heading_alignment_cap ∈ (0, 6]`, `heading_rescue_band >= 0`.
    /// * body altitude cut-offs within `[-90, 90]`.
    /// * `conjunction_vertical_limit > 0`.
    ///
    /// Returns
    /// -----------------
    /// * `Ok(DetectionParams)` or [`TransitError::InvalidDetectionParameter`].
    pub fn build(self) -> Result<DetectionParams, TransitError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

impl fmt::Display for DetectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let on_off = |b: bool| if b { "on" } else { "off" };

        if f.alternate() {
            const PARAM_COL: usize = 44;
            writeln!(f, "Detection Parameters")?;
            writeln!(f, "--------------------")?;

            macro_rules! row {
                ($fmt:expr, $val:expr, $comment:expr) => {{
                    let s = format!($fmt, $val);
                    let pad = if s.len() < PARAM_COL {
                        " ".repeat(PARAM_COL - s.len())
                    } else {
                        " ".to_string()
                    };
                    writeln!(f, "  {}{}# {}", s, pad, $comment)
                }};
            }

            writeln!(f, "[Core]")?;
            row!("margin               = {:.2}°", self.margin, "Near-miss tolerance")?;
            row!(
                "prediction_horizon   = {:.1} s",
                self.prediction_horizon,
                "Sweep look-ahead"
            )?;
            row!("step_seconds         = {:.1} s", self.step_seconds, "Sweep step")?;
            row!("body                 = {}", self.body, "Selected body")?;

            writeln!(f, "\n[Flags]")?;
            row!(
                "heading_alignment    = {}",
                on_off(self.use_heading_alignment),
                "3D heading rescue"
            )?;
            row!(
                "zenith_correction    = {}",
                on_off(self.use_zenith_correction),
                "Tighter margin near zenith"
            )?;
            row!(
                "dynamic_margin       = {}",
                on_off(self.use_dynamic_margin),
                "Looser margin for low/slow aircraft"
            )?;
            row!(
                "projection           = {}",
                on_off(self.use_projection),
                "Dead-reckon aircraft"
            )?;
            row!(
                "refraction           = {}",
                on_off(self.apply_refraction),
                "Compare apparent altitudes"
            )?;

            writeln!(f, "\n[Sweep policy]")?;
            row!(
                "min_closing_streak   = {}",
                self.min_closing_streak,
                "Closing steps before early warning"
            )?;
            row!(
                "min_body_altitude    = {:.1}°",
                self.min_body_altitude,
                "Body lower than this is ignored"
            )?;
            match self.early_warning_min_body_altitude {
                Some(v) => row!("early_warning_min_alt= {:.1}°", v, "Early-warning cut-off")?,
                None => row!("early_warning_min_alt= {}", "none", "Early-warning cut-off")?,
            }

            writeln!(f, "\n[Conjunctions]")?;
            row!(
                "vertical_limit       = {:.1} m",
                self.conjunction_vertical_limit,
                "Max vertical separation"
            )?;
            row!(
                "min_height           = {:.1} m",
                self.min_height_above_observer,
                "Ground traffic floor"
            )?;

            Ok(())
        } else {
            write!(
                f,
                "DetectionParams(body={}, margin={:.2}°, horizon={:.0}s, step={:.1}s, heading={}, zenith={}, dynamic={})",
                self.body,
                self.margin,
                self.prediction_horizon,
                self.step_seconds,
                on_off(self.use_heading_alignment),
                on_off(self.use_zenith_correction),
                on_off(self.use_dynamic_margin),
            )
        }
    }
}

#[cfg(test)]
mod detection_params_test {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(DetectionParams::default().validate().is_ok());
        assert_eq!(DetectionParams::new().step_count(), 0);
    }

    #[test]
    fn test_enhanced_prediction_enables_refinements() {
        let params = DetectionParams::builder()
            .enhanced_prediction(true)
            .build()
            .unwrap();
        assert!(params.use_heading_alignment);
        assert!(params.use_zenith_correction);
        assert!(params.use_dynamic_margin);

        let params = DetectionParams::builder()
            .use_zenith_correction(true)
            .enhanced_prediction(false)
            .build()
            .unwrap();
        assert!(params.use_zenith_correction);
        assert!(!params.use_heading_alignment);
        assert!(!params.use_dynamic_margin);
    }

    #[test]
    fn test_zero_margin_is_rejected() {
        let err = DetectionParams::builder().margin(0.0).build().unwrap_err();
        assert_eq!(
            err,
            TransitError::InvalidDetectionParameter("margin must be finite and > 0".into())
        );
        assert!(DetectionParams::builder().margin(f64::NAN).build().is_err());
    }

    #[test]
    fn test_heading_cap_bounded() {
        assert!(DetectionParams::builder()
            .heading_alignment_cap(6.0)
            .build()
            .is_ok());
        assert!(DetectionParams::builder()
            .heading_alignment_cap(6.5)
            .build()
            .is_err());
    }

    #[test]
    fn test_negative_relaxation_rejected() {
        assert!(DetectionParams::builder()
            .low_altitude_relaxation(-0.1)
            .build()
            .is_err());
    }

    #[test]
    fn test_step_count() {
        let p = DetectionParams::builder()
            .prediction_horizon(10.0)
            .step_seconds(3.0)
            .build()
            .unwrap();
        assert_eq!(p.step_count(), 3);

        let p = DetectionParams::builder().prediction_horizon(30.0).build().unwrap();
        assert_eq!(p.step_count(), 30);
    }

    #[test]
    fn test_display() {
        let p = DetectionParams::default();
        let compact = format!("{p}");
        assert!(compact.starts_with("DetectionParams(body=moon, margin=2.50°"));
        let pretty = format!("{p:#}");
        assert!(pretty.contains("[Conjunctions]"));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let p: DetectionParams =
            serde_json::from_str(r#"{"margin": 1.5, "body": "sun", "use_dynamic_margin": true}"#)
                .unwrap();
        assert_eq!(p.margin, 1.5);
        assert_eq!(p.body, CelestialBody::Sun);
        assert!(p.use_dynamic_margin);
        assert_eq!(p.step_seconds, 1.0);
        assert!(p.validate().is_ok());
    }
}
