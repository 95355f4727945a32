//! Constant-velocity Kalman filter on latitude/longitude.
//!
//! State `x = [lat, lon, v_lat, v_lon]` in degrees and degrees per second. The model is
//!
//! ```text
//!     | 1 0 dt 0  |            | 1 0 0 0 |
//! F = | 0 1 0  dt |        H = | 0 1 0 0 |
//!     | 0 0 1  0  |
//!     | 0 0 0  1  |
//! ```
//!
//! Measurements are direct position fixes. When a fix also carries ground speed and track,
//! the velocity part of the state is overwritten with them after the correction: provider
//! velocities are far better than anything differentiated from noisy positions.
use hifitime::Epoch;
use nalgebra::{Matrix2, Matrix2x4, Matrix4, Vector2, Vector4};

use crate::constants::{Degree, MetersPerSecond, Second, METERS_PER_DEGREE};
use crate::ref_system::normalize_longitude;
use crate::time::seconds_between;

/// Smallest time step used by [`TrackFilter::correct`].
const MIN_DT: Second = 1e-3;

/// Determinant below which the innovation covariance is regularized.
const MIN_INNOVATION_DET: f64 = 1e-18;

/// Variance added on the diagonal of a near-singular innovation covariance.
const INNOVATION_VARIANCE_FLOOR: f64 = 1e-9;

/// Smallest `cos(latitude)` used to convert east velocities, keeps the poles finite.
const MIN_COS_LATITUDE: f64 = 1e-6;

/// One position fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackMeasurement {
    pub latitude: Degree,
    pub longitude: Degree,
    pub ground_speed: Option<MetersPerSecond>,
    /// True track in degrees.
    pub heading: Option<Degree>,
}

impl TrackMeasurement {
    pub fn position(latitude: Degree, longitude: Degree) -> Self {
        TrackMeasurement {
            latitude,
            longitude,
            ground_speed: None,
            heading: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackFilter {
    state: Vector4<f64>,
    covariance: Matrix4<f64>,
    process_noise: Matrix4<f64>,
    measurement_noise: Matrix2<f64>,
    last_update: Epoch,
}

impl TrackFilter {
    /// Start a track at a first fix.
    pub fn new(measurement: &TrackMeasurement, epoch: Epoch) -> Self {
        let mut filter = TrackFilter {
            state: Vector4::new(measurement.latitude, measurement.longitude, 0.0, 0.0),
            covariance: Matrix4::from_diagonal(&Vector4::new(1e-3, 1e-3, 1e-6, 1e-6)),
            process_noise: Matrix4::from_diagonal(&Vector4::new(0.0, 0.0, 5e-6, 5e-6)),
            measurement_noise: Matrix2::from_diagonal(&Vector2::new(5e-5, 5e-5)),
            last_update: epoch,
        };
        filter.overwrite_velocity(measurement);
        filter
    }

    /// Replace the measurement noise with `variance` (deg²) on both axes.
    ///
    /// A zero variance trusts every fix completely.
    pub fn with_measurement_noise(mut self, variance: f64) -> Self {
        self.measurement_noise = Matrix2::from_diagonal(&Vector2::new(variance, variance));
        self
    }

    /// Advance the state by `dt` seconds and inflate the covariance.
    pub fn predict(&mut self, dt: Second) {
        let mut f = Matrix4::identity();
        f[(0, 2)] = dt;
        f[(1, 3)] = dt;

        self.state = f * self.state;
        self.state[1] = normalize_longitude(self.state[1]);
        self.covariance = f * self.covariance * f.transpose() + self.process_noise;
    }

    /// Predict up to `epoch`, then fuse the fix.
    ///
    /// The time step is derived from the epochs and floored at 1 ms, so repeated or
    /// out-of-order fixes never produce a zero or negative step.
    pub fn correct(&mut self, measurement: &TrackMeasurement, epoch: Epoch) {
        let dt = seconds_between(&self.last_update, &epoch).max(MIN_DT);
        self.predict(dt);

        let h = Matrix2x4::new(1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        let predicted = h * self.state;
        let innovation = Vector2::new(
            measurement.latitude - predicted[0],
            normalize_longitude(measurement.longitude - predicted[1]),
        );

        let s = h * self.covariance * h.transpose() + self.measurement_noise;
        let s_inv = guarded_inverse(s);

        let gain = self.covariance * h.transpose() * s_inv;
        self.state += gain * innovation;
        self.state[1] = normalize_longitude(self.state[1]);
        self.covariance = (Matrix4::identity() - gain * h) * self.covariance;

        self.overwrite_velocity(measurement);
        self.last_update = epoch;
    }

    fn overwrite_velocity(&mut self, measurement: &TrackMeasurement) {
        let (Some(speed), Some(heading)) = (measurement.ground_speed, measurement.heading) else {
            return;
        };
        if !(speed.is_finite() && heading.is_finite()) {
            return;
        }
        let (sin_h, cos_h) = heading.to_radians().sin_cos();
        let cos_lat = self.state[0].to_radians().cos().max(MIN_COS_LATITUDE);
        self.state[2] = speed * cos_h / METERS_PER_DEGREE;
        self.state[3] = speed * sin_h / (METERS_PER_DEGREE * cos_lat);
    }

    /// Estimated `(latitude, longitude)` in degrees.
    pub fn position(&self) -> (Degree, Degree) {
        (self.state[0], self.state[1])
    }

    /// Estimated `(north, east)` velocity in degrees per second.
    pub fn velocity(&self) -> (f64, f64) {
        (self.state[2], self.state[3])
    }

    pub fn covariance(&self) -> &Matrix4<f64> {
        &self.covariance
    }

    /// Epoch of the last fix.
    pub fn last_update(&self) -> Epoch {
        self.last_update
    }

    /// Position extrapolated to `epoch` without touching the filter.
    pub fn position_at(&self, epoch: Epoch) -> (Degree, Degree) {
        let dt = seconds_between(&self.last_update, &epoch);
        let (lat, lon) = self.position();
        let (v_lat, v_lon) = self.velocity();
        ((lat + v_lat * dt).clamp(-90.0, 90.0), normalize_longitude(lon + v_lon * dt))
    }
}

/// Inverse of the innovation covariance.
///
/// A near-singular matrix gets a variance floor on its diagonal first. If it is still not
/// invertible, the inverse of its (floored) diagonal is used.
fn guarded_inverse(mut s: Matrix2<f64>) -> Matrix2<f64> {
    if s.determinant().abs() < MIN_INNOVATION_DET {
        s += Matrix2::identity() * INNOVATION_VARIANCE_FLOOR;
    }
    s.try_inverse().unwrap_or_else(|| {
        Matrix2::from_diagonal(&s.diagonal().map(|v| 1.0 / v.max(INNOVATION_VARIANCE_FLOOR)))
    })
}
