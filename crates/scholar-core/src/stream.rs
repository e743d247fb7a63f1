// ── Cache subscriptions ──
//
// Lets views follow one manager's records without polling it.

use std::sync::Arc;

use tokio::sync::watch;

/// An immutable view of a manager's records at one moment.
pub type Snapshot<E> = Arc<Vec<Arc<E>>>;

/// Follows the records of one entity kind.
///
/// `current()` is the view this subscriber last observed; `latest()`
/// peeks at whatever the manager holds now without marking it seen.
pub struct EntityStream<E: Send + Sync + 'static> {
    seen: Snapshot<E>,
    rx: watch::Receiver<Snapshot<E>>,
}

impl<E: Send + Sync + 'static> EntityStream<E> {
    pub(crate) fn new(rx: watch::Receiver<Snapshot<E>>) -> Self {
        let seen = Arc::clone(&rx.borrow());
        Self { seen, rx }
    }

    pub fn current(&self) -> &Snapshot<E> {
        &self.seen
    }

    pub fn latest(&self) -> Snapshot<E> {
        Arc::clone(&self.rx.borrow())
    }

    /// True when the manager has published records this subscriber
    /// has not yet taken through `changed()`.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Resolves with the next published view. `None` means the manager
    /// is gone and nothing more will arrive.
    pub async fn changed(&mut self) -> Option<Snapshot<E>> {
        if self.rx.changed().await.is_err() {
            return None;
        }
        self.seen = Arc::clone(&self.rx.borrow_and_update());
        Some(Arc::clone(&self.seen))
    }
}
