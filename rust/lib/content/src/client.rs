//! Content API client.
//!
//! [`ContentApi`] is the seam everything else consumes; [`HttpContentClient`]
//! is the reqwest-backed implementation talking to the CMS REST API.
//!
//! # Usage
//!
//! ```ignore
//! use postify_content::{ContentConfig, HttpContentClient, PostQuery};
//!
//! let client = HttpContentClient::new(ContentConfig::from_env())?;
//! let posts = client.fetch_posts(&PostQuery::new().limit(10).depth(1)).await?;
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::model::{Category, ListResponse, Post};
use crate::query::PostQuery;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

// ── ContentApi ──────────────────────────────────────────────────────

/// Read-only view of the CMS.
#[async_trait]
pub trait ContentApi: Send + Sync + 'static {
    /// Paginated, published-only post list.
    async fn fetch_posts(&self, query: &PostQuery) -> Result<ListResponse<Post>, ApiError>;

    /// Post by slug. `Ok(None)` when nothing matches.
    async fn fetch_post(&self, slug: &str) -> Result<Option<Post>, ApiError>;

    /// Post by id. `Ok(None)` on 404.
    async fn fetch_post_by_id(&self, id: &str) -> Result<Option<Post>, ApiError>;

    async fn fetch_categories(&self) -> Result<ListResponse<Category>, ApiError>;

    /// Global config document (site header, footer, ...).
    async fn fetch_global(&self, slug: &str, depth: u32) -> Result<serde_json::Value, ApiError>;
}

// ── Config ──────────────────────────────────────────────────────────

/// Connection settings for [`HttpContentClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentConfig {
    /// CMS origin, e.g. `http://localhost:3000`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key sent as bearer token. May be empty.
    #[serde(default)]
    pub api_key: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
        }
    }
}

impl ContentConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Read `PAYLOAD_URL` and `PAYLOAD_API`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Override fields with `PAYLOAD_URL` / `PAYLOAD_API` when set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("PAYLOAD_URL") {
            if !url.is_empty() {
                self.base_url = url;
            }
        }
        if let Ok(key) = std::env::var("PAYLOAD_API") {
            self.api_key = key;
        }
        self
    }
}

// ── HttpContentClient ───────────────────────────────────────────────

pub struct HttpContentClient {
    http: reqwest::Client,
    base_url: String,
    base: reqwest::Url,
}

impl HttpContentClient {
    /// Build a client. Every request carries `Authorization: Bearer <key>`,
    /// even when the key is empty.
    pub fn new(config: ContentConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| ApiError::Config(format!("api key: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let base_url = config.base_url.trim_end_matches('/').to_string();
        let base = reqwest::Url::parse(&base_url)
            .map_err(|e| ApiError::Config(format!("base url {:?}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::Config(format!("base url {:?} cannot carry a path", base_url)));
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self { http, base_url, base })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL plus `segments`, each escaped as exactly one path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url, ApiError> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(ApiError::Config(format!("invalid path segment {:?}", bad)));
        }
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Config(format!("base url {:?} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<R: DeserializeOwned>(
        &self,
        url: reqwest::Url,
        params: &[(String, String)],
    ) -> Result<R, ApiError> {
        debug!(url = %url, ?params, "content api request");
        let resp = self.http.get(url).query(params).send().await?;
        Self::parse(resp).await
    }

    /// Like [`get_json`](Self::get_json) but maps 404 to `None`.
    async fn get_optional<R: DeserializeOwned>(
        &self,
        url: reqwest::Url,
        params: &[(String, String)],
    ) -> Result<Option<R>, ApiError> {
        match self.get_json(url, params).await {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Parse an API response, mapping HTTP errors to `ApiError`.
    async fn parse<R: DeserializeOwned>(resp: reqwest::Response) -> Result<R, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            let code = status.as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Server { status: code, message: body });
        }
        resp.json::<R>()
            .await
            .map_err(|e| ApiError::Decode(format!("response body: {}", e)))
    }
}

fn param(key: &str, value: impl ToString) -> (String, String) {
    (key.to_string(), value.to_string())
}

#[async_trait]
impl ContentApi for HttpContentClient {
    async fn fetch_posts(&self, query: &PostQuery) -> Result<ListResponse<Post>, ApiError> {
        let url = self.endpoint(&["api", "posts"])?;
        self.get_json(url, &query.to_params()).await
    }

    async fn fetch_post(&self, slug: &str) -> Result<Option<Post>, ApiError> {
        let params = [param("where[slug][equals]", slug), param("depth", 2)];
        let url = self.endpoint(&["api", "posts"])?;
        let list: Option<ListResponse<Post>> = self.get_optional(url, &params).await?;
        Ok(list.and_then(|l| l.docs.into_iter().next()))
    }

    async fn fetch_post_by_id(&self, id: &str) -> Result<Option<Post>, ApiError> {
        let url = self.endpoint(&["api", "posts", id])?;
        self.get_optional(url, &[param("depth", 2)]).await
    }

    async fn fetch_categories(&self) -> Result<ListResponse<Category>, ApiError> {
        let url = self.endpoint(&["api", "categories"])?;
        self.get_json(url, &[]).await
    }

    async fn fetch_global(&self, slug: &str, depth: u32) -> Result<serde_json::Value, ApiError> {
        let url = self.endpoint(&["api", "globals", slug])?;
        self.get_json(url, &[param("depth", depth)]).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::sync::Mutex;

    use super::*;

    /// Request details seen by the mock server.
    #[derive(Default)]
    struct Captured {
        auth: Mutex<Vec<String>>,
        queries: Mutex<Vec<Vec<(String, String)>>>,
    }

    fn post_json(id: &str, title: &str, slug: &str) -> serde_json::Value {
        json!({ "id": id, "title": title, "slug": slug })
    }

    fn envelope(docs: Vec<serde_json::Value>) -> serde_json::Value {
        let n = docs.len();
        json!({
            "docs": docs, "totalDocs": n, "limit": 10, "page": 1, "totalPages": 1,
            "hasNextPage": false, "hasPrevPage": false, "nextPage": null, "prevPage": null
        })
    }

    async fn mock_cms(captured: Arc<Captured>) -> String {
        let cap = captured.clone();
        let posts = move |headers: HeaderMap, Query(q): Query<Vec<(String, String)>>| {
            let cap = cap.clone();
            async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("<none>")
                    .to_string();
                cap.auth.lock().unwrap().push(auth);
                cap.queries.lock().unwrap().push(q.clone());
                let slug = q.iter().find(|(k, _)| k == "where[slug][equals]").map(|(_, v)| v.clone());
                match slug.as_deref() {
                    Some("hello-world") => Json(envelope(vec![post_json("1", "Hello", "hello-world")])),
                    Some(_) => Json(envelope(vec![])),
                    None => Json(envelope(vec![
                        post_json("1", "Hello", "hello-world"),
                        post_json("2", "Second", "second"),
                    ])),
                }
            }
        };
        let post_by_id = |Path(id): Path<String>| async move {
            if id == "1" {
                Json(post_json("1", "Hello", "hello-world")).into_response()
            } else {
                (StatusCode::NOT_FOUND, "Not Found").into_response()
            }
        };
        let app = Router::new()
            .route("/api/posts", get(posts))
            .route("/api/posts/:id", get(post_by_id))
            .route(
                "/api/categories",
                get(|| async {
                    Json(envelope(vec![json!({ "id": 3, "title": "Rust", "slug": "rust" })]))
                }),
            )
            .route(
                "/api/globals/:slug",
                get(|Path(slug): Path<String>, Query(q): Query<Vec<(String, String)>>| async move {
                    Json(json!({ "slug": slug, "depth": q[0].1 }))
                }),
            )
            .route(
                "/api/broken",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn fetch_posts_sends_query_and_bearer() {
        let captured = Arc::new(Captured::default());
        let base = mock_cms(captured.clone()).await;
        let client = HttpContentClient::new(ContentConfig::new(base, "secret")).unwrap();

        let resp = client
            .fetch_posts(&PostQuery::new().search("hello").limit(3).page(1).depth(1))
            .await
            .unwrap();
        assert_eq!(resp.docs.len(), 2);
        assert_eq!(resp.docs[0].slug, "hello-world");

        assert_eq!(captured.auth.lock().unwrap()[0], "Bearer secret");
        let q = &captured.queries.lock().unwrap()[0];
        assert!(q.contains(&("where[title][contains]".into(), "hello".into())));
        assert!(q.contains(&("where[_status][equals]".into(), "published".into())));
    }

    #[tokio::test]
    async fn empty_api_key_still_sends_bearer_header() {
        let captured = Arc::new(Captured::default());
        let base = mock_cms(captured.clone()).await;
        let client = HttpContentClient::new(ContentConfig::new(base, "")).unwrap();

        client.fetch_posts(&PostQuery::new()).await.unwrap();
        let auth = captured.auth.lock().unwrap()[0].clone();
        assert!(auth.starts_with("Bearer"), "got {auth:?}");
    }

    #[tokio::test]
    async fn fetch_post_by_slug_returns_first_or_none() {
        let base = mock_cms(Arc::new(Captured::default())).await;
        let client = HttpContentClient::new(ContentConfig::new(base, "k")).unwrap();

        let post = client.fetch_post("hello-world").await.unwrap().unwrap();
        assert_eq!(post.title, "Hello");
        assert!(client.fetch_post("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fetch_post_by_id_maps_404_to_none() {
        let base = mock_cms(Arc::new(Captured::default())).await;
        let client = HttpContentClient::new(ContentConfig::new(format!("{}/", base), "k")).unwrap();

        assert_eq!(client.fetch_post_by_id("1").await.unwrap().unwrap().id, "1");
        assert!(client.fetch_post_by_id("999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fetch_post_by_id_escapes_the_id() {
        let base = mock_cms(Arc::new(Captured::default())).await;
        let client = HttpContentClient::new(ContentConfig::new(base, "k")).unwrap();

        // Unescaped, this would have fetched post 1 with a query string.
        assert!(client.fetch_post_by_id("1?depth=0").await.unwrap().is_none());
        assert!(client.fetch_post_by_id("1#x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn categories_and_globals() {
        let base = mock_cms(Arc::new(Captured::default())).await;
        let client = HttpContentClient::new(ContentConfig::new(base, "k")).unwrap();

        let cats = client.fetch_categories().await.unwrap();
        assert_eq!(cats.docs[0].id, "3");

        let header = client.fetch_global("header", 1).await.unwrap();
        assert_eq!(header["slug"], "header");
        assert_eq!(header["depth"], "1");
    }

    #[tokio::test]
    async fn server_error_surfaces_status() {
        let base = mock_cms(Arc::new(Captured::default())).await;
        let client = HttpContentClient::new(ContentConfig::new(base, "k")).unwrap();

        let url = client.endpoint(&["api", "broken"]).unwrap();
        let err = client.get_json::<serde_json::Value>(url, &[]).await.unwrap_err();
        match err {
            ApiError::Server { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn connection_refused_is_network_error() {
        // Port 9 (discard) on loopback is not expected to be listening.
        let client =
            HttpContentClient::new(ContentConfig::new("http://127.0.0.1:9", "k")).unwrap();
        let err = client.fetch_categories().await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)), "got {err}");
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = HttpContentClient::new(ContentConfig::new("http://cms.local/", "")).unwrap();
        assert_eq!(client.base_url(), "http://cms.local");
        assert_eq!(
            client.endpoint(&["api", "posts"]).unwrap().as_str(),
            "http://cms.local/api/posts"
        );
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let client = HttpContentClient::new(ContentConfig::new("http://cms.local/cms/", "")).unwrap();
        assert_eq!(
            client.endpoint(&["api", "categories"]).unwrap().as_str(),
            "http://cms.local/cms/api/categories"
        );
    }

    #[test]
    fn ids_and_slugs_stay_one_path_segment() {
        let client = HttpContentClient::new(ContentConfig::new("http://cms.local", "")).unwrap();
        let url = client.endpoint(&["api", "posts", "1?depth=0"]).unwrap();
        assert_eq!(url.path(), "/api/posts/1%3Fdepth=0");
        assert_eq!(url.query(), None);

        let url = client.endpoint(&["api", "globals", "../categories"]).unwrap();
        assert_eq!(url.path(), "/api/globals/..%2Fcategories");

        for bad in ["..", ".", ""] {
            let err = client.endpoint(&["api", "posts", bad]).unwrap_err();
            assert!(matches!(err, ApiError::Config(_)), "{bad:?}: {err}");
        }
    }

    #[test]
    fn invalid_base_url_is_config_error() {
        let err = HttpContentClient::new(ContentConfig::new("not a url", "")).err().unwrap();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn invalid_api_key_is_config_error() {
        let err = HttpContentClient::new(ContentConfig::new("http://x", "bad\nkey")).err().unwrap();
        assert!(matches!(err, ApiError::Config(_)));
    }
}
