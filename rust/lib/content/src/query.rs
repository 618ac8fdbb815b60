//! Query building: UI filters to CMS query-string parameters.

use std::fmt;
use std::str::FromStr;

use url::form_urlencoded;

/// Posts per page on every listing surface.
pub const PAGE_SIZE: u32 = 10;

/// Filter for `GET /api/posts`.
///
/// Zero numbers and empty strings count as unset and are not emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PostQuery {
    pub limit: Option<u32>,
    pub page: Option<u32>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub depth: Option<u32>,
    pub select: Vec<String>,
}

impl PostQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn category(mut self, slug: impl Into<String>) -> Self {
        self.category = Some(slug.into());
        self
    }

    pub fn depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn select(mut self, field: impl Into<String>) -> Self {
        self.select.push(field.into());
        self
    }

    /// Query-string pairs in wire order. Published-only is always appended.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        push_num(&mut params, "limit", self.limit);
        push_num(&mut params, "page", self.page);
        push_num(&mut params, "depth", self.depth);
        push_str(&mut params, "where[title][contains]", self.search.as_deref());
        push_str(
            &mut params,
            "where[categories.slug][equals]",
            self.category.as_deref(),
        );
        for field in &self.select {
            let key = format!("select[{}]", field);
            // A repeated field overwrites rather than duplicates.
            params.retain(|(k, _)| k != &key);
            params.push((key, "true".to_string()));
        }
        params.push(("where[_status][equals]".into(), "published".into()));
        params
    }

    /// Stable cache key for this query: the encoded query string, so
    /// distinct parameter lists never share a key.
    pub fn cache_key(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.to_params())
            .finish()
    }
}

fn push_num(params: &mut Vec<(String, String)>, key: &str, value: Option<u32>) {
    if let Some(v) = value.filter(|v| *v > 0) {
        params.push((key.to_string(), v.to_string()));
    }
}

fn push_str(params: &mut Vec<(String, String)>, key: &str, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        params.push((key.to_string(), v.to_string()));
    }
}

/// Result ordering offered by the search page.
///
/// Echoed back into links only; the CMS request does not carry it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Sort {
    #[default]
    Relevance,
    Newest,
    Oldest,
    Popular,
}

impl Sort {
    pub const ALL: [Sort; 4] = [Sort::Relevance, Sort::Newest, Sort::Oldest, Sort::Popular];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sort::Relevance => "relevance",
            Sort::Newest => "newest",
            Sort::Oldest => "oldest",
            Sort::Popular => "popular",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sort::Relevance => "Most Relevant",
            Sort::Newest => "Newest First",
            Sort::Oldest => "Oldest First",
            Sort::Popular => "Most Popular",
        }
    }

    /// Lenient parse: anything unknown is `Relevance`.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for Sort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relevance" => Ok(Sort::Relevance),
            "newest" => Ok(Sort::Newest),
            "oldest" => Ok(Sort::Oldest),
            "popular" => Ok(Sort::Popular),
            other => Err(format!("unknown sort: {}", other)),
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw listing-page parameters, as they arrive from a URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingParams {
    pub page: Option<String>,
    pub q: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
}

impl ListingParams {
    /// Current page. Missing, non-numeric, or < 1 becomes 1.
    pub fn current_page(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1)
    }

    /// Search text, or `None` when blank.
    pub fn search_text(&self) -> Option<&str> {
        self.q.as_deref().filter(|q| !q.trim().is_empty())
    }

    /// Category filter, or `None` when blank.
    pub fn category_slug(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }

    pub fn sort(&self) -> Sort {
        Sort::parse_lenient(self.sort.as_deref())
    }

    /// `/blog` listing.
    pub fn blog_query(&self) -> PostQuery {
        PostQuery::new()
            .limit(PAGE_SIZE)
            .page(self.current_page())
            .depth(1)
    }

    /// `/category/<slug>` listing.
    pub fn category_query(&self, slug: &str) -> PostQuery {
        self.blog_query().category(slug)
    }

    /// `/search` results. `None` when there is no search text, in which
    /// case the page shows the bare search box instead of results.
    pub fn search_query(&self) -> Option<PostQuery> {
        let text = self.search_text()?;
        let mut query = self.blog_query().search(text);
        if let Some(slug) = self.category_slug() {
            query = query.category(slug);
        }
        Some(query)
    }
}
