use serde::{Serialize, Serializer};

use crate::sample::LocationSample;

/// What the page posts to `/api/location` once a fix is in hand.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSubmission {
    pub token: String,
    pub sample: LocationSample,
}

#[derive(Serialize)]
struct WireSubmission<'a> {
    token: &'a str,
    lat: f64,
    lon: f64,
    acc: f64,
    ts: i64,
}

impl LocationSubmission {
    pub fn new(token: impl Into<String>, sample: LocationSample) -> Self {
        Self {
            token: token.into(),
            sample,
        }
    }
}

impl Serialize for LocationSubmission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireSubmission {
            token: &self.token,
            lat: self.sample.latitude(),
            lon: self.sample.longitude(),
            acc: self.sample.accuracy_meters(),
            ts: self.sample.captured_at_epoch_ms(),
        }
        .serialize(serializer)
    }
}
