use thiserror::Error;

/// Failures reported by a device location source.
///
/// Mirrors the browser's `GeolocationPositionError` codes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Permission denied")]
    PermissionDenied,

    #[error("Position unavailable")]
    PositionUnavailable,

    #[error("Timed out waiting for a position")]
    Timeout,

    #[error("Geolocation not supported")]
    Unsupported,
}

impl SourceError {
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => SourceError::PermissionDenied,
            2 => SourceError::PositionUnavailable,
            3 => SourceError::Timeout,
            _ => SourceError::Unsupported,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AcquireError {
    #[error("Location unavailable: {0}")]
    LocationUnavailable(SourceError),

    #[error("No location fix before the deadline")]
    NoFix,

    #[error("A location request is already pending")]
    AlreadyPending,

    #[error("Accuracy must be a non-negative number, got {0}")]
    InvalidAccuracy(f64),
}
