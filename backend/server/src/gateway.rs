//! # Submission Gateway
//!
//! Validate, record, deliver. In that order, once per request.
//!
//! ## Validation
//! 1. `token` is a string in the allow-list, else [`AppError::InvalidToken`]
//! 2. `lat` and `lon` are JSON numbers, else [`AppError::MalformedCoordinates`]
//!
//! `acc` and `ts` are optional. A missing or non-numeric `acc` is reported as
//! `n/a`; a missing or unusable `ts` becomes the receipt time.
//!
//! ## Side effects
//! Nothing happens before validation passes. After it passes the audit entry
//! is written first, so a failed delivery is never an unrecorded submission.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::{
    audit::AuditTrail, error::AppError, notifier::Notifier, report::ValidSubmission,
    tokens::AccessTokens,
};

pub struct Gateway {
    tokens: Arc<AccessTokens>,
    recipient: String,
    notifier: Arc<dyn Notifier>,
    audit: Arc<dyn AuditTrail>,
}

impl Gateway {
    pub fn new(
        tokens: Arc<AccessTokens>,
        recipient: String,
        notifier: Arc<dyn Notifier>,
        audit: Arc<dyn AuditTrail>,
    ) -> Self {
        Self {
            tokens,
            recipient,
            notifier,
            audit,
        }
    }

    pub async fn handle_submission(&self, raw: &Value) -> Result<(), AppError> {
        let submission = self.validate(raw, Utc::now())?;

        self.audit.record(&submission.audit_entry());

        let report = submission.report(&self.recipient);
        self.notifier.deliver(report).await?;

        debug!(token = %submission.token, "Report delivered");

        Ok(())
    }

    pub fn validate(
        &self,
        raw: &Value,
        received_at: DateTime<Utc>,
    ) -> Result<ValidSubmission, AppError> {
        let token = raw
            .get("token")
            .and_then(Value::as_str)
            .filter(|token| self.tokens.contains(token))
            .ok_or(AppError::InvalidToken)?;

        let (Some(latitude), Some(longitude)) = (number(raw, "lat"), number(raw, "lon")) else {
            return Err(AppError::MalformedCoordinates);
        };

        let captured_at = number(raw, "ts")
            .filter(|ms| ms.is_finite())
            .and_then(|ms| DateTime::from_timestamp_millis(ms.trunc() as i64))
            .unwrap_or(received_at);

        Ok(ValidSubmission {
            token: token.to_string(),
            latitude,
            longitude,
            accuracy_meters: number(raw, "acc"),
            captured_at,
        })
    }
}

fn number(raw: &Value, key: &str) -> Option<f64> {
    raw.get(key).and_then(Value::as_f64)
}

#[cfg(test)]
mod tests {
    use mockall::Sequence;
    use serde_json::json;

    use super::*;
    use crate::{
        audit::{AuditEntry, MockAuditTrail},
        notifier::{DeliveryError, MockNotifier},
        report::DeliveryReport,
    };

    fn gateway(notifier: MockNotifier, audit: MockAuditTrail) -> Gateway {
        Gateway::new(
            Arc::new(AccessTokens::new(["ABC123"])),
            "operator@example.com".to_string(),
            Arc::new(notifier),
            Arc::new(audit),
        )
    }

    fn untouched() -> (MockNotifier, MockAuditTrail) {
        let mut notifier = MockNotifier::new();
        notifier.expect_deliver().never();

        let mut audit = MockAuditTrail::new();
        audit.expect_record().never();

        (notifier, audit)
    }

    fn received_at() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_800_000_000_000).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_token_never_delivers() {
        for raw in [
            json!({ "token": "NOPE", "lat": 10.0, "lon": 20.0 }),
            json!({ "lat": 10.0, "lon": 20.0 }),
            json!({ "token": 123, "lat": 10.0, "lon": 20.0 }),
            json!({ "token": null, "lat": 10.0, "lon": 20.0 }),
            json!([1, 2, 3]),
            json!(null),
        ] {
            let (notifier, audit) = untouched();
            let gateway = gateway(notifier, audit);

            let result = gateway.handle_submission(&raw).await;
            assert!(matches!(result, Err(AppError::InvalidToken)), "{raw}");
        }
    }

    #[tokio::test]
    async fn test_token_checked_before_coordinates() {
        let (notifier, audit) = untouched();
        let gateway = gateway(notifier, audit);

        let raw = json!({ "token": "NOPE", "lat": "x", "lon": null });
        let result = gateway.handle_submission(&raw).await;

        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_non_numeric_coordinates_never_deliver() {
        for raw in [
            json!({ "token": "ABC123", "lat": "10.0", "lon": 20.0 }),
            json!({ "token": "ABC123", "lat": 10.0, "lon": "20.0" }),
            json!({ "token": "ABC123", "lat": 10.0 }),
            json!({ "token": "ABC123", "lon": 20.0 }),
            json!({ "token": "ABC123", "lat": null, "lon": 20.0 }),
            json!({ "token": "ABC123", "lat": [10.0], "lon": { "v": 20.0 } }),
            json!({ "token": "ABC123", "lat": true, "lon": 20.0 }),
        ] {
            let (notifier, audit) = untouched();
            let gateway = gateway(notifier, audit);

            let result = gateway.handle_submission(&raw).await;
            assert!(matches!(result, Err(AppError::MalformedCoordinates)), "{raw}");
        }
    }

    #[tokio::test]
    async fn test_audit_before_delivery() {
        let mut seq = Sequence::new();

        let mut audit = MockAuditTrail::new();
        audit
            .expect_record()
            .withf(|entry: &AuditEntry| {
                entry.token == "ABC123" && entry.lat == 10.0 && entry.acc == Some(5.0)
            })
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let mut notifier = MockNotifier::new();
        notifier
            .expect_deliver()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let gateway = gateway(notifier, audit);
        let raw = json!({ "token": "ABC123", "lat": 10.0, "lon": 20.0, "acc": 5 });

        gateway.handle_submission(&raw).await.unwrap();
    }

    #[tokio::test]
    async fn test_audit_kept_when_delivery_fails() {
        let mut seq = Sequence::new();

        let mut audit = MockAuditTrail::new();
        audit
            .expect_record()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let mut notifier = MockNotifier::new();
        notifier
            .expect_deliver()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Err(DeliveryError::Provider {
                    status: 503,
                    message: "unavailable".to_string(),
                })
            });

        let gateway = gateway(notifier, audit);
        let raw = json!({ "token": "ABC123", "lat": 10.0, "lon": 20.0 });

        let result = gateway.handle_submission(&raw).await;
        assert!(matches!(
            result,
            Err(AppError::Delivery(DeliveryError::Provider { status: 503, .. }))
        ));
    }

    #[tokio::test]
    async fn test_report_handed_to_notifier() {
        let mut audit = MockAuditTrail::new();
        audit.expect_record().return_const(());

        let mut notifier = MockNotifier::new();
        notifier
            .expect_deliver()
            .withf(|report: &DeliveryReport| {
                report.recipient == "operator@example.com"
                    && report.subject == "📍 Localização recebida (ABC123)"
                    && report.body.contains("Quando: 2023-11-14T22:13:20.000Z")
                    && report.body.contains("Precisão: 5 m")
            })
            .times(1)
            .returning(|_| Ok(()));

        let gateway = gateway(notifier, audit);
        let raw = json!({
            "token": "ABC123",
            "lat": 10.0,
            "lon": 20.0,
            "acc": 5,
            "ts": 1_700_000_000_000i64,
        });

        gateway.handle_submission(&raw).await.unwrap();
    }

    #[test]
    fn test_optional_fields() {
        let (notifier, audit) = untouched();
        let gateway = gateway(notifier, audit);

        let raw = json!({ "token": "ABC123", "lat": 1, "lon": -2.5 });
        let submission = gateway.validate(&raw, received_at()).unwrap();

        assert_eq!(submission.latitude, 1.0);
        assert_eq!(submission.longitude, -2.5);
        assert_eq!(submission.accuracy_meters, None);
        assert_eq!(submission.captured_at, received_at());
    }

    #[test]
    fn test_non_numeric_accuracy_is_missing() {
        let (notifier, audit) = untouched();
        let gateway = gateway(notifier, audit);

        let raw = json!({ "token": "ABC123", "lat": 1, "lon": 2, "acc": "5" });
        let submission = gateway.validate(&raw, received_at()).unwrap();

        assert_eq!(submission.accuracy_meters, None);
    }

    #[test]
    fn test_unusable_timestamp_falls_back_to_receipt() {
        let (notifier, audit) = untouched();
        let gateway = gateway(notifier, audit);

        for ts in [json!("yesterday"), json!(1e30), json!(null), json!({})] {
            let raw = json!({ "token": "ABC123", "lat": 1, "lon": 2, "ts": ts });
            let submission = gateway.validate(&raw, received_at()).unwrap();

            assert_eq!(submission.captured_at, received_at(), "{ts}");
        }
    }

    #[test]
    fn test_timestamp_used_when_valid() {
        let (notifier, audit) = untouched();
        let gateway = gateway(notifier, audit);

        let raw = json!({ "token": "ABC123", "lat": 1, "lon": 2, "ts": 1_700_000_000_000.9 });
        let submission = gateway.validate(&raw, received_at()).unwrap();

        assert_eq!(submission.when(), "2023-11-14T22:13:20.000Z");
    }
}
