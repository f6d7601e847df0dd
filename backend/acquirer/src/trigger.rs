use tokio::sync::Semaphore;

use crate::{
    best_fix::{FixConfig, acquire_best_fix},
    error::AcquireError,
    sample::LocationSample,
    source::LocationSource,
};

/// Allows one acquisition at a time, like a button disabled while pending.
pub struct FixTrigger {
    slot: Semaphore,
}

impl Default for FixTrigger {
    fn default() -> Self {
        Self::new()
    }
}

impl FixTrigger {
    pub fn new() -> Self {
        Self {
            slot: Semaphore::new(1),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.slot.available_permits() == 0
    }

    /// Fails with [`AcquireError::AlreadyPending`] instead of starting a second
    /// acquisition. The slot frees up again whatever the outcome.
    pub async fn fire<S>(&self, source: &S, config: &FixConfig) -> Result<LocationSample, AcquireError>
    where
        S: LocationSource + ?Sized,
    {
        let _permit = self
            .slot
            .try_acquire()
            .map_err(|_| AcquireError::AlreadyPending)?;

        acquire_best_fix(source, config).await
    }
}
