use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitError {
    #[error("Invalid detection parameter: {0}")]
    InvalidDetectionParameter(String),

    #[error("Invalid observer: {0}")]
    InvalidObserver(String),

    #[error("Unknown celestial body: {0}")]
    UnknownCelestialBody(String),

    #[error("Ephemeris unavailable: {0}")]
    EphemerisUnavailable(String),

    #[error("Non-finite value encountered: {0}")]
    NonFiniteValue(String),
}

impl From<ordered_float::FloatIsNan> for TransitError {
    fn from(_: ordered_float::FloatIsNan) -> Self {
        TransitError::NonFiniteValue("NaN".into())
    }
}
