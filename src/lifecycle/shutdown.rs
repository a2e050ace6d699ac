//! Graceful shutdown handle.

use tokio::sync::broadcast;

/// Fan-out trigger shared by the signal listener and the server.
///
/// Cloning is cheap; every clone triggers the same channel.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver that fires once `trigger` is called.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Notify every subscriber. Calling it again, or with no subscribers, is a no-op.
    pub fn trigger(&self) {
        let notified = self.tx.send(()).unwrap_or(0);
        tracing::debug!(subscribers = notified, "Shutdown triggered");
    }

    /// Number of live subscribers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve when the receiver's shutdown fires or its sender is gone.
pub async fn signalled(mut rx: broadcast::Receiver<()>) {
    // Lagged means a trigger was sent; Closed means nobody can send one.
    let _ = rx.recv().await;
}
