//! Shutdown coordination for a resolver instance.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;

/// Liveness flag plus wake-up channel for soft shutdown.
///
/// Triggering flips the flag and notifies subscribers. The flag is what
/// makes cancellation soft: events already queued when shutdown happens are
/// checked against it and discarded rather than processed.
#[derive(Debug)]
pub struct ShutdownFlag {
    live: AtomicBool,
    tx: broadcast::Sender<()>,
}

impl ShutdownFlag {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            live: AtomicBool::new(true),
            tx,
        }
    }

    /// Whether shutdown has not yet been triggered.
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trip the flag and wake subscribers. Idempotent.
    pub fn trigger(&self) {
        self.live.store(false, Ordering::Release);
        let _ = self.tx.send(());
    }
}

impl Default for ShutdownFlag {
    fn default() -> Self {
        Self::new()
    }
}
