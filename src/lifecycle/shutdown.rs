//! Shutdown coordination for the proxy.
//!
//! The flag is latched in a `watch` channel, so a listener created after
//! the trigger still observes it and the server never misses a signal that
//! arrives while it is still binding.

use tokio::sync::watch;

/// Owner side of the shutdown flag.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

/// Server side of the shutdown flag.
#[derive(Debug, Clone)]
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Latch the flag. Repeated calls are no-ops.
    pub fn trigger(&self) {
        self.tx.send_if_modified(|stopped| !std::mem::replace(stopped, true));
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownListener {
    /// Resolve once the flag is set, or when every `Shutdown` is dropped.
    pub async fn triggered(mut self) {
        // A closed channel means nobody can stop us anymore; treat it as a stop.
        let _ = self.rx.wait_for(|stopped| *stopped).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_all_listeners_notified() {
        let shutdown = Shutdown::new();
        let a = shutdown.subscribe();
        let b = shutdown.clone().subscribe();

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), async {
            a.triggered().await;
            b.triggered().await;
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_listener_created_after_trigger_sees_it() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        shutdown.trigger();
        assert!(shutdown.is_triggered());

        tokio::time::timeout(Duration::from_secs(1), shutdown.subscribe().triggered())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_pending_until_triggered() {
        let shutdown = Shutdown::default();
        let listener = shutdown.subscribe();
        let waited = tokio::time::timeout(Duration::from_millis(50), listener.triggered()).await;
        assert!(waited.is_err());
        assert!(!shutdown.is_triggered());
    }
}
