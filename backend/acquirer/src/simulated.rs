//! Replayable location sources for the tester and for tests.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use futures::{StreamExt, stream};
use tokio::time::sleep;

use crate::source::{LocationSource, PositionOptions, Update, Watch};

/// Counters shared between a [`ScriptedSource`] and its watches.
#[derive(Debug, Default)]
pub struct WatchStats {
    opened: AtomicUsize,
    delivered: AtomicUsize,
    cancelled: AtomicUsize,
}

impl WatchStats {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::SeqCst)
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Replays a fixed list of updates, each after a delay relative to the
/// previous one, then stays silent like a device that never reports again.
pub struct ScriptedSource {
    script: Vec<(Duration, Update)>,
    stats: Arc<WatchStats>,
}

impl ScriptedSource {
    pub fn new(script: Vec<(Duration, Update)>) -> Self {
        Self {
            script,
            stats: Arc::new(WatchStats::default()),
        }
    }

    pub fn silent() -> Self {
        Self::new(Vec::new())
    }

    pub fn stats(&self) -> Arc<WatchStats> {
        self.stats.clone()
    }
}

#[async_trait]
impl LocationSource for ScriptedSource {
    fn watch(&self, _options: PositionOptions) -> Watch {
        self.stats.opened.fetch_add(1, Ordering::SeqCst);

        let delivered = self.stats.clone();
        let cancelled = self.stats.clone();

        let updates = stream::iter(self.script.clone())
            .then(|(delay, update)| async move {
                sleep(delay).await;
                update
            })
            .inspect(move |_| {
                delivered.delivered.fetch_add(1, Ordering::SeqCst);
            })
            .chain(stream::pending());

        Watch::new(updates).on_cancel(move || {
            cancelled.cancelled.fetch_add(1, Ordering::SeqCst);
        })
    }
}
