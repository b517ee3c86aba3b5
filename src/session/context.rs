//! Cancellation signals shared between the application and the session.

use std::sync::Arc;

use tokio::sync::watch;

/// Observer side of a cancellation signal.
///
/// Cloning is cheap. A context whose every [`CancelHandle`] was dropped
/// without cancelling never reports cancellation.
#[derive(Debug, Clone)]
pub struct Context {
    rx: Option<watch::Receiver<bool>>,
}

/// Owner side of a cancellation signal.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

/// Create a linked handle and context.
#[must_use]
pub fn with_cancel() -> (CancelHandle, Context) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx: Arc::new(tx) }, Context { rx: Some(rx) })
}

impl Context {
    /// A context that is never cancelled.
    #[must_use]
    pub fn background() -> Self {
        Self { rx: None }
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolve once cancellation is requested.
    pub async fn cancelled(&self) {
        let Some(rx) = &self.rx else {
            return std::future::pending().await;
        };

        let mut rx = rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            // All handles are gone.
            std::future::pending::<()>().await;
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

impl CancelHandle {
    /// Request cancellation. Repeated calls are no-ops.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Whether [`cancel`](Self::cancel) was called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Another context observing this handle.
    #[must_use]
    pub fn context(&self) -> Context {
        Context {
            rx: Some(self.tx.subscribe()),
        }
    }
}
