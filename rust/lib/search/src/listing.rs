//! Blog listing search: instant local filtering plus remote suggestions.
//!
//! Two independent result sets share one text box. [`ListingFilter::filtered`]
//! is the synchronous substring filter over the posts already on the page;
//! [`ListingFilter::suggestions`] is whatever the debounced controller last
//! fetched. They refresh on different schedules and are never merged.

use postify_content::{Post, Route};

use crate::controller::SearchController;
use crate::filter::filter_posts;

pub struct ListingFilter {
    posts: Vec<Post>,
    text: String,
    suggestions_open: bool,
    controller: SearchController,
}

impl ListingFilter {
    /// Filter over `posts` (the current listing page) backed by `controller`
    /// for remote suggestions.
    pub fn new(posts: Vec<Post>, controller: SearchController) -> Self {
        Self {
            posts,
            text: String::new(),
            suggestions_open: false,
            controller,
        }
    }

    /// Keystroke. Filters locally right away and schedules a remote search.
    pub fn input(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.suggestions_open = !text.trim().is_empty();
        self.controller.set_query(text.clone());
        self.text = text;
    }

    /// Escape key: close the dropdown and reset the query.
    pub fn escape(&mut self) {
        self.suggestions_open = false;
        self.text.clear();
        self.controller.set_query("");
    }

    /// Clear button: reset everything, including remote results.
    pub fn clear(&mut self) {
        self.suggestions_open = false;
        self.text.clear();
        self.controller.clear_search();
    }

    /// Focus re-opens suggestions when there is something typed.
    pub fn focus(&mut self) {
        self.suggestions_open = !self.text.trim().is_empty();
    }

    /// Click outside the box.
    pub fn blur(&mut self) {
        self.suggestions_open = false;
    }

    /// Suggestion click: navigate to the post.
    pub fn select(&self, post: &Post) -> Route {
        Route::post(post.slug.clone())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Replace the local collection (e.g. after paging).
    pub fn set_posts(&mut self, posts: Vec<Post>) {
        self.posts = posts;
    }

    /// Local matches for the current text, in page order.
    pub fn filtered(&self) -> Vec<&Post> {
        filter_posts(&self.posts, &self.text)
    }

    /// Remote suggestions from the debounced controller.
    pub fn suggestions(&self) -> Vec<Post> {
        self.controller.results()
    }

    pub fn suggestions_open(&self) -> bool {
        self.suggestions_open
    }

    pub fn is_loading(&self) -> bool {
        self.controller.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.controller.error()
    }

    pub fn controller(&self) -> &SearchController {
        &self.controller
    }

    /// Local filter is narrowing the page. Pagination is hidden meanwhile.
    pub fn is_filtering(&self) -> bool {
        self.filtered().len() != self.posts.len()
    }

    /// Result summary shown under the box while suggestions are closed.
    pub fn summary(&self) -> Option<String> {
        if self.text.is_empty() || self.suggestions_open {
            return None;
        }
        let total = self.posts.len();
        let found = self.filtered().len();
        Some(if found == total {
            format!("Showing all {} stories", total)
        } else {
            format!(
                "Found {} of {} stories matching \"{}\"",
                found, total, self.text
            )
        })
    }
}
