//! Shutdown coordination for background tasks.

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

/// One-shot stop signal for the tasks an adapter spawns.
///
/// Tasks subscribe before they start; triggering is idempotent.
#[derive(Debug)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
    triggered: AtomicBool,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            triggered: AtomicBool::new(false),
        }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Fire the signal. Later calls do nothing.
    pub fn trigger(&self) {
        if !self.triggered.swap(true, Ordering::SeqCst) {
            let tasks = self.tx.send(()).unwrap_or(0);
            tracing::debug!(tasks, "Shutdown triggered");
        }
    }

    /// Whether the signal has fired.
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Number of tasks still listening.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
