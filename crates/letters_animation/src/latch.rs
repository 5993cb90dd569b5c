//! One-shot "layout completed" latch

use tokio::sync::watch;

/// Signaled once by the layout probe and never reset
#[derive(Debug)]
pub struct LayoutLatch {
    tx: watch::Sender<bool>,
}

impl LayoutLatch {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Signal the latch. Returns `true` only for the first call.
    pub fn signal(&self) -> bool {
        self.tx.send_if_modified(|ready| {
            if *ready {
                false
            } else {
                *ready = true;
                true
            }
        })
    }

    pub fn is_signaled(&self) -> bool {
        *self.tx.borrow()
    }

    /// A waiter that does not keep the latch alive
    pub fn waiter(&self) -> LayoutWaiter {
        LayoutWaiter {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for LayoutLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Future side of a [`LayoutLatch`]
#[derive(Debug, Clone)]
pub struct LayoutWaiter {
    rx: watch::Receiver<bool>,
}

impl LayoutWaiter {
    /// Resolves once the latch is signaled.
    ///
    /// Returns `false` if the latch was dropped without ever being signaled.
    pub async fn wait(mut self) -> bool {
        self.rx.wait_for(|ready| *ready).await.is_ok()
    }
}
