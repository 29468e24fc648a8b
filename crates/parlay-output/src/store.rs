use tokio::sync::watch;

use crate::snapshot::OutputSnapshot;

/// Observable store for the current run snapshot
///
/// Subscribe/get-current-value contract for presentation layers: the driver
/// publishes after every mutation, subscribers see clones and never mutate.
pub struct SnapshotStore {
    tx: watch::Sender<OutputSnapshot>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(OutputSnapshot::default());
        Self { tx }
    }

    /// Publish a new snapshot to all subscribers
    pub fn publish(&self, snapshot: OutputSnapshot) {
        // send_replace stores the value even with no receivers attached, so
        // current() and late subscribers always see the latest snapshot.
        self.tx.send_replace(snapshot);
    }

    /// Subscribe to snapshot updates
    ///
    /// The receiver immediately holds the latest published value.
    pub fn subscribe(&self) -> watch::Receiver<OutputSnapshot> {
        self.tx.subscribe()
    }

    /// Latest published snapshot
    pub fn current(&self) -> OutputSnapshot {
        self.tx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_sees_latest_value() {
        let store = SnapshotStore::new();
        let mut snapshot = OutputSnapshot::default();
        snapshot.is_loading = true;
        store.publish(snapshot);

        let rx = store.subscribe();
        assert!(rx.borrow().is_loading);
        assert!(store.current().is_loading);
    }

    #[tokio::test]
    async fn test_subscriber_is_notified_on_publish() {
        let store = SnapshotStore::new();
        let mut rx = store.subscribe();

        let mut snapshot = OutputSnapshot::default();
        snapshot.is_loading = true;
        store.publish(snapshot);

        rx.changed().await.unwrap();
        assert!(rx.borrow().is_loading);
    }
}
