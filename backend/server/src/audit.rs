use serde::Serialize;
use tracing::info;

/// What gets recorded for every accepted submission, before delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    pub token: String,
    pub lat: f64,
    pub lon: f64,
    pub acc: Option<f64>,
    pub when: String,
}

/// The only durable record of a submission, there is no storage layer.
#[cfg_attr(test, mockall::automock)]
pub trait AuditTrail: Send + Sync {
    fn record(&self, entry: &AuditEntry);
}

/// Emits one structured `location_received` event per entry.
pub struct TracingAuditTrail;

impl AuditTrail for TracingAuditTrail {
    fn record(&self, entry: &AuditEntry) {
        info!(
            target: "audit",
            token = %entry.token,
            lat = entry.lat,
            lon = entry.lon,
            acc = ?entry.acc,
            when = %entry.when,
            "location_received"
        );
    }
}
