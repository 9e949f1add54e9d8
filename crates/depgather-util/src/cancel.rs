//! Cooperative cancellation shared between a caller and in-flight work.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

use crate::errors::{GatherError, GatherResult};

/// Cancellation token for stopping a resolution.
///
/// Clones share the same flag, so cancelling any clone cancels them all.
/// Work can either poll [`check`](Self::check) between steps or await
/// [`cancelled`](Self::cancelled) alongside a blocking call.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation and wake every task awaiting [`cancelled`](Self::cancelled).
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Returns [`GatherError::Cancelled`] once cancellation was requested.
    pub fn check(&self) -> GatherResult<()> {
        if self.is_cancelled() {
            Err(GatherError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Completes once the token is cancelled.
    pub async fn cancelled(&self) {
        loop {
            // register before reading the flag so a concurrent cancel is not missed
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}
