//! Postify content layer.
//!
//! Typed access to the headless CMS that backs the blog: post and
//! category models, query building, an injectable [`ContentApi`] with an
//! HTTP implementation, TTL response caching, cached globals, media URL
//! resolution, and the navigation helpers (pagination window, routes)
//! listing pages are built from.

pub mod cache;
pub mod client;
pub mod error;
pub mod globals;
pub mod media;
pub mod model;
pub mod pagination;
pub mod query;
pub mod route;

pub use cache::{CachedContentApi, TtlCache};
pub use client::{ContentApi, ContentConfig, HttpContentClient};
pub use error::ApiError;
pub use globals::GlobalCache;
pub use media::media_url;
pub use model::{Author, Category, CategoryRef, ListResponse, Media, Meta, Post};
pub use pagination::{page_window, PageItem, Pagination};
pub use query::{ListingParams, PostQuery, Sort};
pub use route::Route;
