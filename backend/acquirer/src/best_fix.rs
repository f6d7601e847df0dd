use std::time::Duration;

use futures::StreamExt;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::{
    error::AcquireError,
    sample::LocationSample,
    source::{LocationSource, PositionOptions},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixConfig {
    /// Hard deadline for the whole acquisition.
    pub max_wait: Duration,
    /// Stop early once a sample is at least this accurate.
    pub min_accuracy_meters: f64,
    /// How often the deadline is checked.
    pub check_interval: Duration,
}

impl Default for FixConfig {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_millis(20_000),
            min_accuracy_meters: 30.0,
            check_interval: Duration::from_millis(250),
        }
    }
}

/// Sample `source` until a good enough fix arrives or `config.max_wait` runs
/// out, whichever comes first.
///
/// Returning from either branch drops the watch, which releases the device
/// subscription, and the ticker with it.
pub async fn acquire_best_fix<S>(source: &S, config: &FixConfig) -> Result<LocationSample, AcquireError>
where
    S: LocationSource + ?Sized,
{
    let started = Instant::now();
    let mut updates = source.watch(PositionOptions::fresh_high_accuracy());

    let mut deadline = interval(config.check_interval);
    deadline.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut best: Option<LocationSample> = None;

    loop {
        tokio::select! {
            update = updates.next() => match update {
                Some(Ok(sample)) => {
                    if best.is_none_or(|retained| sample.is_more_accurate_than(&retained)) {
                        best = Some(sample);
                    }

                    debug!(
                        accuracy = sample.accuracy_meters(),
                        best = best.map(|b| b.accuracy_meters()),
                        "Location update"
                    );

                    if sample.accuracy_meters() <= config.min_accuracy_meters {
                        info!(accuracy = sample.accuracy_meters(), "Target accuracy reached");
                        return Ok(sample);
                    }
                }
                Some(Err(error)) => {
                    return match best {
                        Some(retained) => {
                            warn!(%error, "Location source failed, keeping best fix");
                            Ok(retained)
                        }
                        None => Err(AcquireError::LocationUnavailable(error)),
                    };
                }
                None => {
                    debug!("Location source closed");
                    return best.ok_or(AcquireError::NoFix);
                }
            },
            _ = deadline.tick() => {
                if started.elapsed() >= config.max_wait {
                    info!(
                        best = best.map(|b| b.accuracy_meters()),
                        "Deadline reached"
                    );
                    return best.ok_or(AcquireError::NoFix);
                }
            }
        }
    }
}
