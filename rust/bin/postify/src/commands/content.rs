//! Content commands: `postify posts`, `postify post --slug ...`, etc.

use std::sync::Arc;

use anyhow::Result;
use postify_content::{
    media_url, ContentApi, GlobalCache, HttpContentClient, ListingParams, Pagination, Route,
};
use tracing::debug;

use super::output::{pagination_line, print_categories, print_json, print_posts, Output};
use crate::config::ClientConfig;

/// HTTP client for the configured CMS.
pub fn build_client(config: &ClientConfig) -> Result<HttpContentClient> {
    if config.content.base_url.trim().is_empty() {
        anyhow::bail!("No CMS URL configured. Set [content] base_url or PAYLOAD_URL.");
    }
    debug!(base_url = %config.content.base_url, "connecting");
    Ok(HttpContentClient::new(config.content.clone())?)
}

/// Which listing a `posts` invocation maps to.
fn listing_route(params: &ListingParams) -> Route {
    let page = params.current_page();
    if let Some(q) = params.search_text() {
        return Route::Search {
            query: q.to_string(),
            page,
            category: params.category_slug().map(str::to_string),
            sort: params.sort(),
        };
    }
    match params.category_slug() {
        Some(slug) => Route::Category {
            slug: slug.to_string(),
            page,
        },
        None => Route::Blog { page },
    }
}

/// Route for page 1 of the same listing; pagination links hang off it.
fn first_page(route: &Route) -> Route {
    let mut first = route.clone();
    match &mut first {
        Route::Blog { page } | Route::Category { page, .. } | Route::Search { page, .. } => {
            *page = 1
        }
        Route::Home | Route::Post { .. } => {}
    }
    first
}

/// List posts: the blog listing, a category listing, or a search page.
pub async fn posts(
    config: &ClientConfig,
    params: ListingParams,
    limit: Option<u32>,
    output: Output,
) -> Result<()> {
    let api = build_client(config)?;

    let mut query = match (params.search_query(), params.category_slug()) {
        (Some(q), _) => q,
        (None, Some(slug)) => params.category_query(slug),
        (None, None) => params.blog_query(),
    };
    if let Some(limit) = limit {
        query = query.limit(limit);
    }

    let resp = api.fetch_posts(&query).await?;
    print_posts(&resp.docs, output)?;

    if output == Output::Table {
        let route = listing_route(&params);
        let pagination = Pagination::from_response(&resp, first_page(&route).href());
        if let Some(line) = pagination_line(&pagination) {
            println!();
            println!("{}", line);
        }
        println!("{} stories total.", resp.total_docs);
    }
    Ok(())
}

/// Show one post by slug or id.
pub async fn post(
    config: &ClientConfig,
    slug: Option<&str>,
    id: Option<&str>,
    output: Output,
) -> Result<()> {
    let api = build_client(config)?;
    let found = match (slug, id) {
        (Some(slug), _) => api.fetch_post(slug).await?,
        (None, Some(id)) => api.fetch_post_by_id(id).await?,
        (None, None) => anyhow::bail!("Provide --slug or --id."),
    };
    let Some(post) = found else {
        anyhow::bail!("Post not found.");
    };

    if output == Output::Json {
        return print_json(&post);
    }
    println!("{}", post.title);
    println!("  url:        {}", Route::post(post.slug.clone()).href());
    if let Some(date) = post.published_date() {
        println!("  published:  {}", date.format("%B %-d, %Y"));
    }
    if let Some(desc) = post.description() {
        println!("  summary:    {}", desc);
    }
    let categories: Vec<_> = post.category_refs().iter().map(|c| c.title.as_str()).collect();
    if !categories.is_empty() {
        println!("  categories: {}", categories.join(", "));
    }
    if let Some(authors) = &post.populated_authors {
        let names: Vec<_> = authors.iter().map(|a| a.name.as_str()).collect();
        println!("  authors:    {}", names.join(", "));
    }
    if let Some(hero) = &post.hero_image {
        let src = media_url(Some(&hero.url), None, api.base_url());
        println!("  hero:       {}", src);
    }
    Ok(())
}

pub async fn categories(config: &ClientConfig, output: Output) -> Result<()> {
    let api = build_client(config)?;
    let resp = api.fetch_categories().await?;
    print_categories(&resp.docs, output)
}

/// Fetch a global (header, footer, ...) through the global cache.
pub async fn global(config: &ClientConfig, slug: &str, depth: u32) -> Result<()> {
    let api: Arc<dyn ContentApi> = Arc::new(build_client(config)?);
    let globals = GlobalCache::new(api);
    let value = globals.get(slug, depth).await?;
    print_json(&value)
}

/// Resolve a media URL against the configured CMS origin.
pub fn media(config: &ClientConfig, url: &str, cache_tag: Option<&str>) -> Result<()> {
    let base = config.content.base_url.trim_end_matches('/');
    let resolved = media_url(Some(url), cache_tag, base);
    if resolved.is_empty() {
        anyhow::bail!("Empty media URL.");
    }
    println!("{}", resolved);
    Ok(())
}
