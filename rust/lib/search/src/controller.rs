//! Debounced search controller.
//!
//! One controller per mounted search box. Keystrokes go through
//! [`SearchController::set_query`], which echoes the text immediately and
//! schedules a remote search on the trailing edge of the debounce delay.
//!
//! Every query change starts a new generation; a response is committed
//! only if its generation is still current, and the in-flight request of
//! a superseded generation is cancelled outright.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use postify_content::{ContentApi, Post, PostQuery};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::debounce::Debouncer;
use crate::state::{SearchState, SearchStore, SubscriptionId};

/// Message shown when a search request fails.
pub const SEARCH_FAILED: &str = "Failed to search stories";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before searching.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Maximum results to request.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_delay_ms() -> u64 {
    300
}

fn default_limit() -> u32 {
    3
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            limit: default_limit(),
        }
    }
}

impl SearchConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

struct InFlight {
    generation: u64,
    cancel: CancellationToken,
}

struct Inner {
    api: Arc<dyn ContentApi>,
    config: SearchConfig,
    store: SearchStore,
    debouncer: Debouncer,
    in_flight: Mutex<Option<InFlight>>,
    disposed: CancellationToken,
}

/// Debounced remote search for one search box.
///
/// Dropping the controller disposes it. Must be used from within a tokio
/// runtime.
pub struct SearchController {
    inner: Arc<Inner>,
}

impl SearchController {
    pub fn new(api: Arc<dyn ContentApi>, config: SearchConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                config,
                store: SearchStore::new(),
                debouncer: Debouncer::new(),
                in_flight: Mutex::new(None),
                disposed: CancellationToken::new(),
            }),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.inner.config
    }

    // ====================================================================
    // Commands
    // ====================================================================

    /// Echo `text` as the current query and (re)start the debounce timer.
    pub fn set_query(&self, text: impl Into<String>) {
        let text = text.into();
        let Some(generation) = self.inner.store.begin_query(text.clone()) else {
            return;
        };
        self.inner.cancel_in_flight();

        let inner = Arc::clone(&self.inner);
        self.inner.debouncer.schedule(self.inner.config.delay(), async move {
            inner.run_search(generation, text).await;
        });
    }

    /// Empty the query, results and error, and cancel anything pending.
    pub fn clear_search(&self) {
        if self.inner.store.is_frozen() {
            return;
        }
        self.inner.debouncer.cancel_pending();
        self.inner.cancel_in_flight();
        self.inner.store.reset();
    }

    /// Cancel the timer and any in-flight request, and freeze state.
    /// Idempotent; also runs on drop.
    pub fn dispose(&self) {
        if self.inner.disposed.is_cancelled() {
            return;
        }
        self.inner.disposed.cancel();
        self.inner.debouncer.cancel_pending();
        self.inner.cancel_in_flight();
        self.inner.store.freeze();
        debug!("search controller disposed");
    }

    // ====================================================================
    // Read accessors
    // ====================================================================

    pub fn query(&self) -> String {
        self.inner.store.snapshot().query
    }

    pub fn results(&self) -> Vec<Post> {
        self.inner.store.snapshot().results
    }

    pub fn is_loading(&self) -> bool {
        self.inner.store.snapshot().loading
    }

    pub fn error(&self) -> Option<String> {
        self.inner.store.snapshot().error
    }

    /// All four fields read atomically.
    pub fn snapshot(&self) -> SearchState {
        self.inner.store.snapshot()
    }

    /// Whether a debounce timer is waiting to fire.
    pub fn is_pending(&self) -> bool {
        self.inner.debouncer.is_pending()
    }

    // ====================================================================
    // Subscriptions
    // ====================================================================

    /// Observe state changes. The handler runs synchronously after each
    /// committed change.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&SearchState) + Send + Sync + 'static,
    {
        self.inner.store.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.store.unsubscribe(id)
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl Inner {
    fn cancel_in_flight(&self) {
        if let Some(prev) = self.in_flight.lock().take() {
            debug!(generation = prev.generation, "cancelling superseded search");
            prev.cancel.cancel();
        }
    }

    /// Trailing-edge action of the debounce timer.
    async fn run_search(&self, generation: u64, query: String) {
        if query.trim().is_empty() {
            self.store.apply_if_current(generation, |s| {
                s.results.clear();
                s.error = None;
                s.loading = false;
            });
            return;
        }

        // Claim loading first: a task woken after its generation was
        // superseded must not touch the newer request.
        let started = self.store.apply_if_current(generation, |s| {
            s.loading = true;
            s.error = None;
        });
        if !started {
            debug!(generation, "search superseded before start");
            return;
        }

        let cancel = CancellationToken::new();
        let previous = {
            let mut slot = self.in_flight.lock();
            if slot.as_ref().is_some_and(|f| f.generation > generation) {
                debug!(generation, "newer search already in flight");
                return;
            }
            slot.replace(InFlight {
                generation,
                cancel: cancel.clone(),
            })
        };
        if let Some(prev) = previous {
            prev.cancel.cancel();
        }

        let request = PostQuery::new()
            .search(query.as_str())
            .limit(self.config.limit)
            .page(1)
            .depth(1);
        debug!(generation, query = %query, "searching");

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(generation, "search cancelled");
                return;
            }
            _ = self.disposed.cancelled() => return,
            outcome = self.api.fetch_posts(&request) => outcome,
        };
        self.finish(generation);

        let committed = match outcome {
            Ok(resp) => self.store.apply_if_current(generation, |s| {
                s.results = resp.docs;
                s.error = None;
                s.loading = false;
            }),
            Err(e) => {
                warn!(query = %query, error = %e, "search failed");
                self.store.apply_if_current(generation, |s| {
                    s.results.clear();
                    s.error = Some(SEARCH_FAILED.to_string());
                    s.loading = false;
                })
            }
        };
        if !committed {
            debug!(generation, "discarded stale search response");
        }
    }

    /// Release the in-flight slot if it still belongs to `generation`.
    fn finish(&self, generation: u64) {
        let mut slot = self.in_flight.lock();
        if slot.as_ref().is_some_and(|f| f.generation == generation) {
            *slot = None;
        }
    }
}
