//! Canonical page paths for navigation targets.

use url::form_urlencoded;

use crate::query::Sort;

/// Where the site can navigate to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Blog { page: u32 },
    Post { slug: String },
    Category { slug: String, page: u32 },
    Search {
        query: String,
        page: u32,
        category: Option<String>,
        sort: Sort,
    },
}

impl Route {
    pub fn post(slug: impl Into<String>) -> Self {
        Route::Post { slug: slug.into() }
    }

    /// First page of search results for `query`, default sort.
    pub fn search(query: impl Into<String>) -> Self {
        Route::Search {
            query: query.into(),
            page: 1,
            category: None,
            sort: Sort::Relevance,
        }
    }

    /// Path plus query string. Page 1 and the default sort are omitted.
    pub fn href(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Blog { page } => with_page("/blog".to_string(), *page),
            Route::Post { slug } => format!("/blog/{}", slug),
            Route::Category { slug, page } => with_page(format!("/category/{}", slug), *page),
            Route::Search {
                query,
                page,
                category,
                sort,
            } => {
                let mut qs = form_urlencoded::Serializer::new(String::new());
                if !query.is_empty() {
                    qs.append_pair("q", query);
                }
                if *sort != Sort::Relevance {
                    qs.append_pair("sort", sort.as_str());
                }
                if let Some(slug) = category.as_deref().filter(|c| !c.is_empty()) {
                    qs.append_pair("category", slug);
                }
                if *page > 1 {
                    qs.append_pair("page", &page.to_string());
                }
                let qs = qs.finish();
                if qs.is_empty() {
                    "/search".to_string()
                } else {
                    format!("/search?{}", qs)
                }
            }
        }
    }
}

fn with_page(path: String, page: u32) -> String {
    if page > 1 {
        format!("{}?page={}", path, page)
    } else {
        path
    }
}
