use serde::Serialize;

use crate::error::AcquireError;

/// One fix reported by a location source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocationSample {
    latitude: f64,
    longitude: f64,
    accuracy_meters: f64,
    captured_at_epoch_ms: i64,
}

impl LocationSample {
    pub fn new(
        latitude: f64,
        longitude: f64,
        accuracy_meters: f64,
        captured_at_epoch_ms: i64,
    ) -> Result<Self, AcquireError> {
        // NaN fails this comparison too
        if !(accuracy_meters >= 0.0) {
            return Err(AcquireError::InvalidAccuracy(accuracy_meters));
        }

        Ok(Self {
            latitude,
            longitude,
            accuracy_meters,
            captured_at_epoch_ms,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn accuracy_meters(&self) -> f64 {
        self.accuracy_meters
    }

    pub fn captured_at_epoch_ms(&self) -> i64 {
        self.captured_at_epoch_ms
    }

    /// Strictly smaller radius. Ties keep the sample already retained.
    pub fn is_more_accurate_than(&self, other: &LocationSample) -> bool {
        self.accuracy_meters < other.accuracy_meters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_negative_accuracy() {
        assert_eq!(
            LocationSample::new(1.0, 2.0, -1.0, 0),
            Err(AcquireError::InvalidAccuracy(-1.0))
        );
        assert!(LocationSample::new(1.0, 2.0, f64::NAN, 0).is_err());
        assert!(LocationSample::new(1.0, 2.0, 0.0, 0).is_ok());
    }

    #[test]
    fn test_ties_are_not_more_accurate() {
        let a = LocationSample::new(0.0, 0.0, 20.0, 0).unwrap();
        let b = LocationSample::new(1.0, 1.0, 20.0, 1).unwrap();
        let c = LocationSample::new(1.0, 1.0, 19.5, 2).unwrap();

        assert!(!b.is_more_accurate_than(&a));
        assert!(c.is_more_accurate_than(&a));
        assert!(!a.is_more_accurate_than(&c));
    }
}
