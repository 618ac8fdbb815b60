//! Cached access to CMS global documents (header, footer, site settings).
//!
//! Entries are keyed by global slug and tagged `global_<slug>`; a CMS
//! change hook calls [`GlobalCache::revalidate_tag`] to drop them.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::client::ContentApi;
use crate::error::ApiError;

struct CachedGlobal {
    tag: String,
    value: serde_json::Value,
}

pub struct GlobalCache {
    api: Arc<dyn ContentApi>,
    entries: RwLock<HashMap<String, CachedGlobal>>,
}

/// Revalidation tag for a global slug.
pub fn global_tag(slug: &str) -> String {
    format!("global_{}", slug)
}

impl GlobalCache {
    pub fn new(api: Arc<dyn ContentApi>) -> Self {
        Self {
            api,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Cached global, fetched on miss.
    ///
    /// The cache key is the slug alone: the depth of the first fetch is
    /// served until the entry is revalidated.
    pub async fn get(&self, slug: &str, depth: u32) -> Result<serde_json::Value, ApiError> {
        // Fast path: read lock.
        {
            let entries = self.entries.read().await;
            if let Some(hit) = entries.get(slug) {
                return Ok(hit.value.clone());
            }
        }

        // Slow path: write lock, re-check, fetch.
        let mut entries = self.entries.write().await;
        if let Some(hit) = entries.get(slug) {
            return Ok(hit.value.clone());
        }
        let value = self.api.fetch_global(slug, depth).await?;
        debug!(slug, depth, "global cached");
        entries.insert(
            slug.to_string(),
            CachedGlobal {
                tag: global_tag(slug),
                value: value.clone(),
            },
        );
        Ok(value)
    }

    /// Drop every entry carrying `tag`. Returns how many were dropped.
    pub async fn revalidate_tag(&self, tag: &str) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.tag != tag);
        let dropped = before - entries.len();
        debug!(tag, dropped, "globals revalidated");
        dropped
    }

    pub async fn revalidate(&self, slug: &str) -> usize {
        self.revalidate_tag(&global_tag(slug)).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::model::{Category, ListResponse, Post};
    use crate::query::PostQuery;

    /// Serves globals whose `version` bumps on every fetch.
    #[derive(Default)]
    struct VersionedGlobals {
        fetches: AtomicU32,
    }

    #[async_trait]
    impl ContentApi for VersionedGlobals {
        async fn fetch_posts(&self, _: &PostQuery) -> Result<ListResponse<Post>, ApiError> {
            Ok(ListResponse::single_page(vec![]))
        }

        async fn fetch_post(&self, _: &str) -> Result<Option<Post>, ApiError> {
            Ok(None)
        }

        async fn fetch_post_by_id(&self, _: &str) -> Result<Option<Post>, ApiError> {
            Ok(None)
        }

        async fn fetch_categories(&self) -> Result<ListResponse<Category>, ApiError> {
            Ok(ListResponse::single_page(vec![]))
        }

        async fn fetch_global(&self, slug: &str, depth: u32) -> Result<serde_json::Value, ApiError> {
            if slug == "missing" {
                return Err(ApiError::Server { status: 404, message: "no such global".into() });
            }
            let version = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(json!({ "slug": slug, "depth": depth, "version": version }))
        }
    }

    fn cache() -> (Arc<VersionedGlobals>, GlobalCache) {
        let api = Arc::new(VersionedGlobals::default());
        let cache = GlobalCache::new(api.clone());
        (api, cache)
    }

    #[tokio::test]
    async fn second_get_hits_cache() {
        let (api, cache) = cache();
        let first = cache.get("header", 1).await.unwrap();
        let second = cache.get("header", 1).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(api.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn key_is_slug_only() {
        let (api, cache) = cache();
        cache.get("footer", 0).await.unwrap();
        let deeper = cache.get("footer", 2).await.unwrap();
        assert_eq!(deeper["depth"], 0);
        assert_eq!(api.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn revalidate_tag_refetches_only_that_global() {
        let (api, cache) = cache();
        cache.get("header", 0).await.unwrap();
        cache.get("footer", 0).await.unwrap();

        assert_eq!(cache.revalidate_tag("global_header").await, 1);
        assert_eq!(cache.revalidate_tag("global_header").await, 0);

        let header = cache.get("header", 0).await.unwrap();
        assert_eq!(header["version"], 3);
        let footer = cache.get("footer", 0).await.unwrap();
        assert_eq!(footer["version"], 2);
        assert_eq!(api.fetches.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn revalidate_by_slug() {
        let (_, cache) = cache();
        cache.get("header", 0).await.unwrap();
        assert_eq!(cache.revalidate("header").await, 1);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let (_, cache) = cache();
        assert!(cache.get("missing", 0).await.unwrap_err().is_not_found());
        assert!(cache.get("missing", 0).await.is_err());
        assert_eq!(global_tag("missing"), "global_missing");
    }
}
