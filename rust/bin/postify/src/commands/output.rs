//! Table and JSON rendering for command results.

use anyhow::Result;
use clap::ValueEnum;
use postify_content::{Category, PageItem, Pagination, Post};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Output {
    Table,
    Json,
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

pub fn post_row(post: &Post) -> String {
    let date = post
        .published_date()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    let categories = post
        .category_refs()
        .iter()
        .map(|c| c.title.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{:<40}  {:<32}  {:<10}  {}",
        truncate(&post.title, 40),
        truncate(&post.slug, 32),
        date,
        categories
    )
}

pub fn print_posts(posts: &[Post], output: Output) -> Result<()> {
    match output {
        Output::Json => print_json(posts),
        Output::Table => {
            if posts.is_empty() {
                println!("No stories found.");
                return Ok(());
            }
            println!("{:<40}  {:<32}  {:<10}  CATEGORIES", "TITLE", "SLUG", "PUBLISHED");
            for post in posts {
                println!("{}", post_row(post));
            }
            Ok(())
        }
    }
}

pub fn print_categories(categories: &[Category], output: Output) -> Result<()> {
    match output {
        Output::Json => print_json(categories),
        Output::Table => {
            println!("{:<24}  SLUG", "TITLE");
            for c in categories {
                println!("{:<24}  {}", truncate(&c.title, 24), c.slug);
            }
            Ok(())
        }
    }
}

/// One-line pagination footer, e.g. `Page 2 of 5: 1 2 3 … 5  (prev: /blog, next: /blog?page=3)`.
pub fn pagination_line(p: &Pagination) -> Option<String> {
    if !p.is_visible() {
        return None;
    }
    let window = p
        .items()
        .into_iter()
        .map(|item| match item {
            PageItem::Page(n) if n == p.current => format!("[{}]", n),
            PageItem::Page(n) => n.to_string(),
            PageItem::Ellipsis => "…".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ");
    let mut links = Vec::new();
    if let Some(prev) = p.prev_href() {
        links.push(format!("prev: {}", prev));
    }
    if let Some(next) = p.next_href() {
        links.push(format!("next: {}", next));
    }
    let mut line = format!("Page {} of {}: {}", p.current, p.total_pages, window);
    if !links.is_empty() {
        line.push_str(&format!("  ({})", links.join(", ")));
    }
    Some(line)
}

#[cfg(test)]
mod tests {
    use postify_content::CategoryRef;

    use super::*;

    #[test]
    fn test_post_row() {
        let mut post = Post::new("1", "Hello", "hello");
        post.published_at = Some("2024-03-05T10:00:00.000Z".into());
        post.categories = Some(vec![
            CategoryRef { title: "Rust".into(), slug: "rust".into() },
            CategoryRef { title: "Async".into(), slug: "async".into() },
        ]);
        let row = post_row(&post);
        assert!(row.starts_with("Hello "));
        assert!(row.contains("2024-03-05"));
        assert!(row.ends_with("Rust, Async"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn test_pagination_line() {
        let p = Pagination {
            current: 2,
            total_pages: 8,
            has_next: true,
            has_prev: true,
            base_url: "/search?q=rust".into(),
        };
        let line = pagination_line(&p).unwrap();
        assert!(line.starts_with("Page 2 of 8: 1 [2] 3"), "{}", line);
        assert!(line.contains("prev: /search?q=rust,"), "{}", line);
        assert!(line.contains("next: /search?q=rust&page=3"), "{}", line);

        let single = Pagination { total_pages: 1, ..p };
        assert!(pagination_line(&single).is_none());
    }
}
