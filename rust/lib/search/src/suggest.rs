//! Header search box with a suggestion dropdown.

use postify_content::{Post, Route};

use crate::controller::SearchController;

/// Dropdown state around a [`SearchController`].
///
/// The box never filters locally; suggestions are exactly the controller's
/// results. Navigation is returned as a [`Route`] for the caller to follow.
pub struct SuggestionBox {
    controller: SearchController,
    open: bool,
}

impl SuggestionBox {
    pub fn new(controller: SearchController) -> Self {
        Self {
            controller,
            open: false,
        }
    }

    /// Keystroke. Opens the dropdown and schedules a search.
    pub fn input(&mut self, text: impl Into<String>) {
        self.controller.set_query(text);
        self.open = true;
    }

    pub fn focus(&mut self) {
        self.open = true;
    }

    /// Escape key: close and reset the query.
    pub fn escape(&mut self) {
        self.open = false;
        self.controller.set_query("");
    }

    /// Click outside the box. The query is kept.
    pub fn blur(&mut self) {
        self.open = false;
    }

    /// Suggestion picked: close, reset the search, go to the post.
    pub fn select(&mut self, post: &Post) -> Route {
        self.open = false;
        self.controller.clear_search();
        Route::post(post.slug.clone())
    }

    /// "View all results" link. Carries the raw query text.
    pub fn view_all(&mut self) -> Option<Route> {
        let query = self.controller.query();
        if query.trim().is_empty() {
            return None;
        }
        self.open = false;
        Some(Route::search(query))
    }

    /// Enter key: full search page for the trimmed query.
    pub fn submit(&mut self) -> Option<Route> {
        let query = self.controller.query();
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return None;
        }
        let route = Route::search(trimmed);
        self.open = false;
        self.controller.clear_search();
        Some(route)
    }

    /// Dropdown is rendered only while open with a non-blank query.
    pub fn is_open(&self) -> bool {
        self.open && !self.controller.query().trim().is_empty()
    }

    pub fn suggestions(&self) -> Vec<Post> {
        self.controller.results()
    }

    pub fn is_loading(&self) -> bool {
        self.controller.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.controller.error()
    }

    /// Settled search with nothing found: "No results" is shown.
    pub fn no_results(&self) -> bool {
        let state = self.controller.snapshot();
        self.open
            && !state.query.trim().is_empty()
            && !state.loading
            && state.error.is_none()
            && state.results.is_empty()
            && !self.controller.is_pending()
    }

    pub fn controller(&self) -> &SearchController {
        &self.controller
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use postify_content::{ApiError, Category, ContentApi, ListResponse, PostQuery};
    use tokio::time::sleep;

    use super::*;
    use crate::controller::{SearchConfig, SEARCH_FAILED};

    /// Finds one post for "rust", nothing for anything else, fails on "boom".
    struct OneHitApi;

    #[async_trait]
    impl ContentApi for OneHitApi {
        async fn fetch_posts(&self, query: &PostQuery) -> Result<ListResponse<Post>, ApiError> {
            match query.search.as_deref().map(str::trim) {
                Some("boom") => Err(ApiError::Server {
                    status: 500,
                    message: "down".into(),
                }),
                Some("rust") => Ok(ListResponse::single_page(vec![Post::new(
                    "1",
                    "Ownership in Rust",
                    "ownership-in-rust",
                )])),
                _ => Ok(ListResponse::single_page(vec![])),
            }
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

        async fn fetch_global(&self, _: &str, _: u32) -> Result<serde_json::Value, ApiError> {
            Ok(serde_json::Value::Null)
        }
    }

    fn suggestion_box() -> SuggestionBox {
        SuggestionBox::new(SearchController::new(
            Arc::new(OneHitApi),
            SearchConfig::default(),
        ))
    }

    async fn settle() {
        sleep(Duration::from_millis(350)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn input_opens_dropdown_and_fetches() {
        let mut b = suggestion_box();
        assert!(!b.is_open());

        b.input("rust");
        assert!(b.is_open());
        assert!(b.suggestions().is_empty());
        assert!(!b.no_results(), "still debouncing");

        settle().await;
        assert_eq!(b.suggestions().len(), 1);
        assert!(!b.no_results());
    }

    #[tokio::test(start_paused = true)]
    async fn blank_query_keeps_dropdown_hidden() {
        let mut b = suggestion_box();
        b.input("   ");
        assert!(!b.is_open());
        assert!(b.view_all().is_none());
        assert!(b.submit().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn no_results_after_settled_empty_search() {
        let mut b = suggestion_box();
        b.input("haskell");
        settle().await;
        assert!(b.no_results());
        assert!(b.is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn failure_shows_error_not_empty_state() {
        let mut b = suggestion_box();
        b.input("boom");
        settle().await;
        assert_eq!(b.error().as_deref(), Some(SEARCH_FAILED));
        assert!(!b.no_results());
    }

    #[tokio::test(start_paused = true)]
    async fn select_clears_and_routes() {
        let mut b = suggestion_box();
        b.input("rust");
        settle().await;

        let post = b.suggestions().remove(0);
        let route = b.select(&post);
        assert_eq!(route.href(), "/blog/ownership-in-rust");
        assert!(!b.is_open());
        assert_eq!(b.controller().query(), "");
        assert!(b.suggestions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn view_all_keeps_raw_query() {
        let mut b = suggestion_box();
        b.input(" rust lang");
        let route = b.view_all().unwrap();
        assert_eq!(route, Route::search(" rust lang"));
        assert!(!b.is_open());
        // Search state is left alone.
        assert_eq!(b.controller().query(), " rust lang");
    }

    #[tokio::test(start_paused = true)]
    async fn submit_trims_and_resets() {
        let mut b = suggestion_box();
        b.input("  rust & tokio ");
        let route = b.submit().unwrap();
        assert_eq!(route.href(), "/search?q=rust+%26+tokio");
        assert!(!b.is_open());
        assert_eq!(b.controller().query(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn escape_resets_query() {
        let mut b = suggestion_box();
        b.input("rust");
        settle().await;
        b.escape();
        assert!(!b.is_open());
        assert_eq!(b.controller().query(), "");

        settle().await;
        assert!(b.suggestions().is_empty());
        b.focus();
        assert!(!b.is_open(), "nothing typed");
    }

    #[tokio::test(start_paused = true)]
    async fn blur_keeps_query_and_hides_empty_state() {
        let mut b = suggestion_box();
        b.input("haskell");
        settle().await;
        assert!(b.no_results());

        b.blur();
        assert!(!b.is_open());
        assert!(!b.no_results());
        b.focus();
        assert!(b.is_open());
        assert_eq!(b.controller().query(), "haskell");
    }
}
