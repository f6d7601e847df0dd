use std::time::Duration;

use tracing::info;

use crate::{
    best_fix::FixConfig,
    error::{AcquireError, SourceError},
    sample::LocationSample,
    source::{LocationSource, PositionOptions},
};

/// One-off variant of [`acquire_best_fix`](crate::acquire_best_fix).
///
/// Half the budget goes to a precise request. If that times out, the rest goes
/// to a single request with high accuracy off. No best tracking.
pub async fn acquire_single_shot<S>(
    source: &S,
    config: &FixConfig,
) -> Result<LocationSample, AcquireError>
where
    S: LocationSource + ?Sized,
{
    let precise_budget = config.max_wait / 2;

    let precise = PositionOptions {
        high_accuracy: true,
        maximum_age: Duration::ZERO,
        timeout: precise_budget,
    };

    match source.current_position(precise).await {
        Ok(sample) => Ok(sample),
        Err(SourceError::Timeout) => {
            info!("Precise fix timed out, retrying with degraded accuracy");

            let coarse = PositionOptions {
                high_accuracy: false,
                maximum_age: Duration::ZERO,
                timeout: config.max_wait.saturating_sub(precise_budget),
            };

            source
                .current_position(coarse)
                .await
                .map_err(|error| match error {
                    SourceError::Timeout => AcquireError::NoFix,
                    other => AcquireError::LocationUnavailable(other),
                })
        }
        Err(error) => Err(AcquireError::LocationUnavailable(error)),
    }
}
