//! Cancellation token for cooperative cancellation.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// A token shared by every task of one pipeline run.
///
/// Cancellation is idempotent - only the first cancellation reason is kept.
/// Stages race each blocking send against [`cancelled`](Self::cancelled),
/// so a parked sender unblocks promptly instead of leaking a task.
#[derive(Default)]
pub struct CancellationToken {
    /// Whether cancellation has been requested.
    cancelled: AtomicBool,
    /// The reason for cancellation (first one wins).
    reason: RwLock<Option<String>>,
    /// Wakes tasks parked in [`cancelled`](Self::cancelled).
    notify: Notify,
}

impl CancellationToken {
    /// Creates a new token behind the `Arc` every stage clones.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Requests cancellation with a reason.
    ///
    /// This is idempotent - only the first reason is kept. Every task
    /// parked in [`cancelled`](Self::cancelled) is woken.
    pub fn cancel(&self, reason: impl Into<String>) {
        // Only set if not already cancelled (first reason wins)
        if self
            .cancelled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            *self.reason.write() = Some(reason.into());
            self.notify.notify_waiters();
        }
    }

    /// Returns whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns the cancellation reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.reason.read().clone()
    }

    /// Resolves once cancellation has been requested.
    ///
    /// Intended for `tokio::select!` against a blocking send or receive.
    /// Interest is registered before the flag is re-checked, so a `cancel`
    /// landing between the check and the park cannot be missed.
    pub async fn cancelled(&self) {
        loop {
            if self.is_cancelled() {
                return;
            }
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .field("reason", &self.reason())
            .finish()
    }
}

/// Cancels its token when dropped.
///
/// Held by the composer so the token is released on every exit path of a
/// pipeline run - success, failure, or panic - and no stage outlives the
/// run still parked on a send.
#[derive(Debug)]
pub struct CancelGuard {
    token: Arc<CancellationToken>,
    reason: String,
}

impl CancelGuard {
    /// Creates a guard that cancels `token` with `reason` on drop.
    #[must_use]
    pub fn new(token: Arc<CancellationToken>, reason: impl Into<String>) -> Self {
        Self {
            token,
            reason: reason.into(),
        }
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.token.cancel(std::mem::take(&mut self.reason));
    }
}
