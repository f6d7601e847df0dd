use async_trait::async_trait;
use thiserror::Error;

use crate::report::DeliveryReport;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Provider error {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Send one report, once. Implementations never retry and never let a
/// transport error escape unconverted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, report: DeliveryReport) -> Result<(), DeliveryError>;
}
