use std::{
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};

use async_trait::async_trait;
use futures::{
    Stream, StreamExt,
    stream::{BoxStream, once},
};
use tokio::{sync::mpsc, time::timeout};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::{error::SourceError, sample::LocationSample};

pub type Update = Result<LocationSample, SourceError>;

/// Per-request knobs, named after the browser's `PositionOptions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub maximum_age: Duration,
    pub timeout: Duration,
}

impl PositionOptions {
    /// High accuracy, every update freshly measured.
    pub fn fresh_high_accuracy() -> Self {
        Self {
            high_accuracy: true,
            maximum_age: Duration::ZERO,
            timeout: Duration::from_secs(10),
        }
    }
}

/// A live location subscription.
///
/// Dropping the watch ends the subscription and runs the cancel hook, the
/// equivalent of `clearWatch`.
pub struct Watch {
    updates: BoxStream<'static, Update>,
    on_cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Watch {
    pub fn new<S>(updates: S) -> Self
    where
        S: Stream<Item = Update> + Send + 'static,
    {
        Self {
            updates: updates.boxed(),
            on_cancel: None,
        }
    }

    /// A watch that immediately reports `error` once.
    pub fn failed(error: SourceError) -> Self {
        Self::new(once(async move { Err(error) }))
    }

    pub fn on_cancel<F>(mut self, cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_cancel = Some(Box::new(cancel));
        self
    }
}

impl Stream for Watch {
    type Item = Update;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.updates.poll_next_unpin(cx)
    }
}

impl Drop for Watch {
    fn drop(&mut self) {
        if let Some(cancel) = self.on_cancel.take() {
            cancel();
        }
    }
}

#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Start a continuous subscription.
    fn watch(&self, options: PositionOptions) -> Watch;

    /// One-off request, bounded by `options.timeout`.
    ///
    /// Defaults to the first update of a fresh watch.
    async fn current_position(&self, options: PositionOptions) -> Update {
        let mut watch = self.watch(options);

        match timeout(options.timeout, watch.next()).await {
            Ok(Some(update)) => update,
            Ok(None) => Err(SourceError::PositionUnavailable),
            Err(_) => Err(SourceError::Timeout),
        }
    }
}

/// Sending half of a callback-driven watch.
///
/// Device APIs that report through success/error callbacks hand these to the
/// platform; everything past [`callback_watch`] only sees a [`Watch`].
#[derive(Clone)]
pub struct WatchCallbacks {
    sender: mpsc::UnboundedSender<Update>,
}

impl WatchCallbacks {
    /// Returns false once the watch is gone.
    pub fn success(&self, sample: LocationSample) -> bool {
        self.sender.send(Ok(sample)).is_ok()
    }

    pub fn error(&self, error: SourceError) -> bool {
        self.sender.send(Err(error)).is_ok()
    }

    pub fn is_cancelled(&self) -> bool {
        self.sender.is_closed()
    }
}

pub fn callback_watch() -> (WatchCallbacks, Watch) {
    let (sender, receiver) = mpsc::unbounded_channel();

    (
        WatchCallbacks { sender },
        Watch::new(UnboundedReceiverStream::new(receiver)),
    )
}
