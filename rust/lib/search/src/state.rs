use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex, RwLock};
use postify_content::Post;

/// Observable state of one search box.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    /// Text as typed, untrimmed.
    pub query: String,
    /// Remote results for the last settled query, in API order.
    pub results: Vec<Post>,
    /// A request for the current query is in flight.
    pub loading: bool,
    /// User-facing message from the last failed request.
    pub error: Option<String>,
}

/// Callback type for state change notifications.
pub type ChangeHandler = Arc<dyn Fn(&SearchState) + Send + Sync>;

/// Unique handle for a subscription, returned by [`SearchStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Clone)]
struct HandlerEntry {
    id: SubscriptionId,
    handler: ChangeHandler,
}

struct Tagged {
    state: SearchState,
    /// Bumped on every query change, clear, or freeze. Responses carry the
    /// generation they were issued under and are dropped on mismatch.
    generation: u64,
    frozen: bool,
}

/// Search state with generation tagging and change subscriptions.
///
/// Handlers run synchronously on the thread that committed the change,
/// after the state lock is released, and only when the state actually
/// changed. Commits and their notifications are serialized, so every
/// subscriber sees changes in commit order even across threads.
pub struct SearchStore {
    inner: Mutex<Tagged>,
    /// Held from commit through delivery. Reentrant so handlers may
    /// commit from inside a notification.
    delivery: ReentrantMutex<()>,
    handlers: RwLock<Vec<HandlerEntry>>,
    next_id: AtomicU64,
}

impl SearchStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Tagged {
                state: SearchState::default(),
                generation: 0,
                frozen: false,
            }),
            delivery: ReentrantMutex::new(()),
            handlers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> SearchState {
        self.inner.lock().state.clone()
    }

    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    /// Record a new query text and start a new generation.
    ///
    /// `loading` drops to false: whatever is in flight belongs to an older
    /// query. Returns `None` once frozen.
    pub fn begin_query(&self, query: String) -> Option<u64> {
        let _delivery = self.delivery.lock();
        let (generation, changed) = {
            let mut inner = self.inner.lock();
            if inner.frozen {
                return None;
            }
            inner.generation += 1;
            let before = inner.state.clone();
            inner.state.query = query;
            inner.state.loading = false;
            (inner.generation, diff(&before, &inner.state))
        };
        self.notify(changed);
        Some(generation)
    }

    /// Reset to the empty state and start a new generation.
    pub fn reset(&self) {
        let _delivery = self.delivery.lock();
        let changed = {
            let mut inner = self.inner.lock();
            if inner.frozen {
                return;
            }
            inner.generation += 1;
            let before = std::mem::take(&mut inner.state);
            diff(&before, &inner.state)
        };
        self.notify(changed);
    }

    /// Apply `f` only if `generation` is still current and the store is not
    /// frozen. Returns whether it was applied.
    pub fn apply_if_current<F>(&self, generation: u64, f: F) -> bool
    where
        F: FnOnce(&mut SearchState),
    {
        let _delivery = self.delivery.lock();
        let changed = {
            let mut inner = self.inner.lock();
            if inner.frozen || inner.generation != generation {
                return false;
            }
            let before = inner.state.clone();
            f(&mut inner.state);
            diff(&before, &inner.state)
        };
        self.notify(changed);
        true
    }

    /// Stop accepting changes. Pending generations become stale.
    pub fn freeze(&self) {
        let mut inner = self.inner.lock();
        inner.frozen = true;
        inner.generation += 1;
    }

    pub fn is_frozen(&self) -> bool {
        self.inner.lock().frozen
    }

    /// Register a change handler.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&SearchState) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.write().push(HandlerEntry {
            id,
            handler: Arc::new(handler),
        });
        id
    }

    /// Remove a handler. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|h| h.id != id);
        handlers.len() < before
    }

    fn notify(&self, changed: Option<SearchState>) {
        let Some(state) = changed else { return };
        // Clone the list so handlers may (un)subscribe re-entrantly.
        let handlers: Vec<HandlerEntry> = self.handlers.read().clone();
        for entry in handlers {
            (entry.handler)(&state);
        }
    }
}

impl Default for SearchStore {
    fn default() -> Self {
        Self::new()
    }
}

fn diff(before: &SearchState, after: &SearchState) -> Option<SearchState> {
    (before != after).then(|| after.clone())
}
