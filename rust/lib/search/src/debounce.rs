//! Cancellable trailing-edge timer.
//!
//! At most one timer is alive per [`Debouncer`]: scheduling cancels the
//! previous unfired timer. Once a timer fires its task runs to completion;
//! cancellation only ever stops timers that have not fired yet.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::trace;

struct Pending {
    id: u64,
    cancel: CancellationToken,
}

#[derive(Default)]
struct Slot {
    next_id: u64,
    pending: Option<Pending>,
}

/// Single-slot debounce timer. Must be used from within a tokio runtime.
#[derive(Default)]
pub struct Debouncer {
    slot: Arc<Mutex<Slot>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` after `delay`, unless another `schedule` or
    /// `cancel_pending` comes first.
    pub fn schedule<F>(&self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let id = {
            let mut slot = self.slot.lock();
            slot.next_id += 1;
            let id = slot.next_id;
            let previous = slot.pending.replace(Pending {
                id,
                cancel: cancel.clone(),
            });
            if let Some(previous) = previous {
                previous.cancel.cancel();
            }
            id
        };

        let slot = Arc::clone(&self.slot);
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    trace!(id, "debounce timer cancelled");
                }
                _ = tokio::time::sleep(delay) => {
                    // Claim the slot; a cancel that won the lock first wins.
                    let fire = {
                        let mut slot = slot.lock();
                        match &slot.pending {
                            Some(p) if p.id == id => {
                                slot.pending = None;
                                true
                            }
                            _ => false,
                        }
                    };
                    if fire {
                        trace!(id, "debounce timer fired");
                        task.await;
                    }
                }
            }
        });
    }

    /// Cancel the unfired timer, if any. Returns whether one was pending.
    pub fn cancel_pending(&self) -> bool {
        match self.slot.lock().pending.take() {
            Some(p) => {
                p.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Whether a timer is scheduled and has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.slot.lock().pending.is_some()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
