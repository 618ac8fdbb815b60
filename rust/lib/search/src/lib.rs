//! Debounced post search for the blog frontend.
//!
//! [`SearchController`] turns keystrokes into at most one remote query per
//! quiet period and keeps only the newest answer. [`SuggestionBox`] and
//! [`ListingFilter`] are the two search boxes built on top of it.

pub mod controller;
pub mod debounce;
pub mod filter;
pub mod listing;
pub mod state;
pub mod suggest;

pub use controller::{SearchConfig, SearchController, SEARCH_FAILED};
pub use debounce::Debouncer;
pub use filter::filter_posts;
pub use listing::ListingFilter;
pub use state::{SearchState, SearchStore, SubscriptionId};
pub use suggest::SuggestionBox;
