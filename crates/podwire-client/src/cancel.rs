//! One-shot signals used to stop a running subscription.

use std::sync::Arc;

use tokio::sync::watch;

/// A flag that goes from lowered to raised exactly once.
///
/// Raising is synchronous, so it can be done from a signal handler or any
/// thread. Waiting never misses a raise that happened before the wait
/// started.
#[derive(Debug, Clone)]
pub(crate) struct Latch(Arc<watch::Sender<bool>>);

impl Latch {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self(Arc::new(tx))
    }

    /// Raises the latch. Returns `true` only for the call that raised it.
    pub(crate) fn raise(&self) -> bool {
        self.0.send_if_modified(|raised| {
            if *raised {
                false
            } else {
                *raised = true;
                true
            }
        })
    }

    pub(crate) fn is_raised(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once the latch is raised.
    pub(crate) async fn raised(&self) {
        let mut rx = self.0.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|raised| *raised).await;
    }
}

/// Externally triggered request to end an event subscription early.
///
/// Clones share the same state. Firing more than once has no further
/// effect, and firing concurrently from several threads is safe.
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    latch: Latch,
}

impl CancellationSignal {
    /// Creates a signal that has not fired.
    #[must_use]
    pub fn new() -> Self {
        Self {
            latch: Latch::new(),
        }
    }

    /// Fires the signal. Returns `true` if this call was the one that fired it.
    pub fn fire(&self) -> bool {
        self.latch.raise()
    }

    /// Returns `true` once the signal has fired.
    #[must_use]
    pub fn is_fired(&self) -> bool {
        self.latch.is_raised()
    }

    /// Resolves once the signal has fired.
    pub async fn cancelled(&self) {
        self.latch.raised().await;
    }
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::new()
    }
}
