//! Client-wide cancellation, shared by every in-flight attempt.

use std::sync::Arc;

use tokio::sync::watch;

/// Client-wide cancellation flag.
///
/// Cloned into every component that performs network attempts. Once
/// [`cancel()`](Self::cancel) is called the flag stays set: attempts in
/// flight fail with `Cancelled`, and so does every later attempt.
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl CancellationSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Set the flag and wake every waiter.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the flag is set.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancelled_resolves_after_cancel() {
        let signal = CancellationSignal::new();
        assert!(!signal.is_cancelled());

        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.cancelled().await })
        };
        signal.cancel();
        waiter.await.unwrap();
        assert!(signal.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_resolves_immediately_when_already_set() {
        let signal = CancellationSignal::new();
        signal.cancel();
        signal.cancelled().await;
    }
}
