//! # Report
//!
//! Plain-text email built from a validated submission. Same input, same
//! report: the only clock involved is the receipt time handed in by the
//! gateway.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{audit::AuditEntry, utils::format_number};

pub const MAPS_URL: &str = "https://www.google.com/maps?q=";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// A submission that passed the token and coordinate checks.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidSubmission {
    pub token: String,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: Option<f64>,
    pub captured_at: DateTime<Utc>,
}

impl ValidSubmission {
    pub fn when(&self) -> String {
        self.captured_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn maps_link(&self) -> String {
        format!(
            "{MAPS_URL}{},{}",
            format_number(self.latitude),
            format_number(self.longitude)
        )
    }

    pub fn audit_entry(&self) -> AuditEntry {
        AuditEntry {
            token: self.token.clone(),
            lat: self.latitude,
            lon: self.longitude,
            acc: self.accuracy_meters,
            when: self.when(),
        }
    }

    pub fn report(&self, recipient: &str) -> DeliveryReport {
        let accuracy = self
            .accuracy_meters
            .map(format_number)
            .unwrap_or_else(|| "n/a".to_string());

        let body = [
            format!("Token: {}", self.token),
            format!("Quando: {}", self.when()),
            format!("Latitude: {}", format_number(self.latitude)),
            format!("Longitude: {}", format_number(self.longitude)),
            format!("Precisão: {accuracy} m"),
            format!("Maps: {}", self.maps_link()),
        ]
        .join("\n");

        DeliveryReport {
            recipient: recipient.to_string(),
            subject: format!("📍 Localização recebida ({})", self.token),
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(accuracy_meters: Option<f64>) -> ValidSubmission {
        ValidSubmission {
            token: "ABC123".to_string(),
            latitude: 10.0,
            longitude: 20.0,
            accuracy_meters,
            captured_at: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
        }
    }

    #[test]
    fn test_report_layout() {
        let report = submission(Some(5.0)).report("operator@example.com");

        assert_eq!(report.recipient, "operator@example.com");
        assert_eq!(report.subject, "📍 Localização recebida (ABC123)");
        assert_eq!(
            report.body,
            "Token: ABC123\n\
             Quando: 2023-11-14T22:13:20.000Z\n\
             Latitude: 10\n\
             Longitude: 20\n\
             Precisão: 5 m\n\
             Maps: https://www.google.com/maps?q=10,20"
        );
    }

    #[test]
    fn test_missing_accuracy_is_na() {
        let report = submission(None).report("operator@example.com");

        assert!(report.body.contains("Precisão: n/a m"));
    }

    #[test]
    fn test_fractional_coordinates() {
        let mut submission = submission(Some(12.75));
        submission.latitude = -23.55052;
        submission.longitude = -46.633308;

        assert_eq!(
            submission.maps_link(),
            "https://www.google.com/maps?q=-23.55052,-46.633308"
        );
        assert!(submission.report("x").body.contains("Precisão: 12.75 m"));
    }

    #[test]
    fn test_deterministic() {
        let a = submission(Some(5.0)).report("r");
        let b = submission(Some(5.0)).report("r");

        assert_eq!(a, b);
    }
}
