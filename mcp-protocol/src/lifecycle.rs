use tokio::sync::watch;

/// A one-shot event, observable by any number of waiters, that can be
/// checked for "already happened" without racing the fire.
///
/// Grounded in the design note on lifecycle signals (§9): the source uses
/// process-wide channels for `TransportStarted`/`OperationPhaseStarted`;
/// this rewrite makes each one a field on the owning [`crate::Peer`] rather
/// than module-level state, so multiple peers never share a signal.
#[derive(Debug)]
pub struct LifecycleSignal {
    tx: watch::Sender<bool>,
    rx: watch::Receiver<bool>,
}

impl LifecycleSignal {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx, rx }
    }

    /// Fires the signal. Idempotent: firing twice is a no-op the second time.
    pub fn fire(&self) {
        let _ = self.tx.send(true);
    }

    pub fn has_fired(&self) -> bool {
        *self.rx.borrow()
    }

    /// Waits until the signal has fired, returning immediately if it already
    /// has.
    pub async fn wait(&self) {
        let mut rx = self.rx.clone();
        if *rx.borrow() {
            return;
        }
        while rx.changed().await.is_ok() {
            if *rx.borrow() {
                return;
            }
        }
    }
}

impl Default for LifecycleSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wait_returns_immediately_once_fired() {
        let signal = LifecycleSignal::new();
        signal.fire();
        tokio::time::timeout(std::time::Duration::from_millis(50), signal.wait())
            .await
            .expect("already-fired signal resolves immediately");
    }

    #[tokio::test]
    async fn wait_blocks_until_fire() {
        let signal = std::sync::Arc::new(LifecycleSignal::new());
        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.wait().await })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());
        signal.fire();
        waiter.await.expect("waiter task did not panic");
    }
}
