use std::pin::Pin;

use futures_core::Stream;
use tokio::sync::watch;

use crate::Document;

/// A stream of collection snapshots.
pub type SnapshotStream = Pin<Box<dyn Stream<Item = Vec<Document>> + Send>>;

/// A cancellable subscription to collection snapshots.
///
/// The first call to [`next`](Self::next) yields the snapshot current at
/// subscribe time; later calls wait for the next change. Cancellation is
/// explicit via [`cancel`](Self::cancel) and implicit on drop; a cancelled
/// subscription yields nothing.
pub struct Subscription {
    rx: Option<watch::Receiver<Vec<Document>>>,
    pending_initial: bool,
}

impl Subscription {
    pub(crate) fn new(rx: watch::Receiver<Vec<Document>>) -> Self {
        Self {
            rx: Some(rx),
            pending_initial: true,
        }
    }

    /// Waits for the next snapshot.
    ///
    /// Returns None once the subscription is cancelled or the store has been
    /// dropped.
    pub async fn next(&mut self) -> Option<Vec<Document>> {
        let rx = self.rx.as_mut()?;

        if self.pending_initial {
            self.pending_initial = false;
            return Some(rx.borrow().clone());
        }

        match rx.changed().await {
            Ok(()) => Some(rx.borrow_and_update().clone()),
            Err(_) => {
                self.rx = None;
                None
            }
        }
    }

    /// Returns the latest snapshot without waiting, or None if cancelled.
    pub fn current(&self) -> Option<Vec<Document>> {
        self.rx.as_ref().map(|rx| rx.borrow().clone())
    }

    /// Cancels the subscription. Subsequent `next` calls return None.
    pub fn cancel(&mut self) {
        self.rx = None;
    }

    /// Returns true if the subscription has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.rx.is_none()
    }

    /// Converts the subscription into a [`SnapshotStream`].
    pub fn into_stream(self) -> SnapshotStream {
        Box::pin(futures_util::stream::unfold(self, |mut sub| async move {
            sub.next().await.map(|snapshot| (snapshot, sub))
        }))
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
