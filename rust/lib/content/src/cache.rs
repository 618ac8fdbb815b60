//! Response caching for the Content API.
//!
//! List and search responses go stale quickly; single items, categories
//! and globals change rarely. [`CachedContentApi`] applies a TTL per kind.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::client::ContentApi;
use crate::error::ApiError;
use crate::model::{Category, ListResponse, Post};
use crate::query::PostQuery;

pub const LIST_TTL: Duration = Duration::from_secs(60);
pub const ITEM_TTL: Duration = Duration::from_secs(300);

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Async map whose entries expire after a fixed TTL.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, Entry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Fresh value for `key`, if any.
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|e| Instant::now() < e.expires_at)
            .map(|e| e.value.clone())
    }

    pub async fn insert(&self, key: K, value: V) {
        let expires_at = Instant::now() + self.ttl;
        let mut entries = self.entries.write().await;
        // Drop expired entries on write so the map stays bounded by live keys.
        let now = Instant::now();
        entries.retain(|_, e| now < e.expires_at);
        entries.insert(key, Entry { value, expires_at });
    }

    /// Return the cached value or run `load` and cache its `Ok` result.
    pub async fn get_or_try_insert<F, Fut, E>(&self, key: K, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<V, E>>,
    {
        if let Some(v) = self.get(&key).await {
            return Ok(v);
        }
        let value = load().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    pub async fn remove(&self, key: &K) -> Option<V> {
        self.entries.write().await.remove(key).map(|e| e.value)
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// [`ContentApi`] decorator with per-kind TTL caching. Errors are never cached.
pub struct CachedContentApi<A> {
    inner: A,
    posts: TtlCache<String, ListResponse<Post>>,
    post_by_slug: TtlCache<String, Option<Post>>,
    post_by_id: TtlCache<String, Option<Post>>,
    categories: TtlCache<(), ListResponse<Category>>,
    globals: TtlCache<(String, u32), serde_json::Value>,
}

impl<A: ContentApi> CachedContentApi<A> {
    /// Cache with the default TTLs (60 s lists, 300 s items).
    pub fn new(inner: A) -> Self {
        Self::with_ttl(inner, LIST_TTL, ITEM_TTL)
    }

    pub fn with_ttl(inner: A, list_ttl: Duration, item_ttl: Duration) -> Self {
        Self {
            inner,
            posts: TtlCache::new(list_ttl),
            post_by_slug: TtlCache::new(item_ttl),
            post_by_id: TtlCache::new(item_ttl),
            categories: TtlCache::new(item_ttl),
            globals: TtlCache::new(item_ttl),
        }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Drop every cached response.
    pub async fn invalidate_all(&self) {
        self.posts.clear().await;
        self.post_by_slug.clear().await;
        self.post_by_id.clear().await;
        self.categories.clear().await;
        self.globals.clear().await;
        debug!("content cache cleared");
    }
}

#[async_trait]
impl<A: ContentApi> ContentApi for CachedContentApi<A> {
    async fn fetch_posts(&self, query: &PostQuery) -> Result<ListResponse<Post>, ApiError> {
        self.posts
            .get_or_try_insert(query.cache_key(), || self.inner.fetch_posts(query))
            .await
    }

    async fn fetch_post(&self, slug: &str) -> Result<Option<Post>, ApiError> {
        self.post_by_slug
            .get_or_try_insert(slug.to_string(), || self.inner.fetch_post(slug))
            .await
    }

    async fn fetch_post_by_id(&self, id: &str) -> Result<Option<Post>, ApiError> {
        self.post_by_id
            .get_or_try_insert(id.to_string(), || self.inner.fetch_post_by_id(id))
            .await
    }

    async fn fetch_categories(&self) -> Result<ListResponse<Category>, ApiError> {
        self.categories
            .get_or_try_insert((), || self.inner.fetch_categories())
            .await
    }

    async fn fetch_global(&self, slug: &str, depth: u32) -> Result<serde_json::Value, ApiError> {
        self.globals
            .get_or_try_insert((slug.to_string(), depth), || self.inner.fetch_global(slug, depth))
            .await
    }
}
