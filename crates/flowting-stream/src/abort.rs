use std::sync::Arc;

use tokio::sync::watch;

/// Caller-side cancellation handle for one streaming session.
///
/// Cloning shares the same session; aborting is idempotent.
#[derive(Debug, Clone)]
pub struct AbortHandle {
    tx: Arc<watch::Sender<bool>>,
}

/// Read-loop side of an [`AbortHandle`].
#[derive(Debug, Clone)]
pub struct AbortSignal {
    rx: watch::Receiver<bool>,
}

impl AbortHandle {
    pub fn pair() -> (AbortHandle, AbortSignal) {
        let (tx, rx) = watch::channel(false);
        (AbortHandle { tx: Arc::new(tx) }, AbortSignal { rx })
    }

    pub fn abort(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_aborted(&self) -> bool {
        *self.tx.borrow()
    }
}

impl AbortSignal {
    pub fn is_aborted(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the session is aborted. Never resolves if every
    /// handle was dropped without aborting.
    pub async fn aborted(&mut self) {
        let closed = self.rx.wait_for(|aborted| *aborted).await.is_err();
        if closed {
            futures::future::pending::<()>().await;
        }
    }
}
