//! Content API data types.
//!
//! Field names follow the CMS JSON (camelCase). Ids are held as strings
//! but accepted as JSON integers too, since SQL-backed CMS deployments
//! emit numeric ids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Blog post, as returned by `/api/posts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<Media>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<CategoryRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub populated_authors: Option<Vec<Author>>,
}

impl Post {
    /// Minimal post with only the required fields set.
    pub fn new(id: impl Into<String>, title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            slug: slug.into(),
            content: None,
            hero_image: None,
            meta: None,
            categories: None,
            published_at: None,
            populated_authors: None,
        }
    }

    /// SEO description, if the post has one.
    pub fn description(&self) -> Option<&str> {
        self.meta.as_ref().and_then(|m| m.description.as_deref())
    }

    /// Category references, empty when the post has none.
    pub fn category_refs(&self) -> &[CategoryRef] {
        self.categories.as_deref().unwrap_or(&[])
    }

    /// Parsed publish date. `None` when absent or not RFC 3339.
    pub fn published_date(&self) -> Option<DateTime<Utc>> {
        let raw = self.published_at.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|d| d.with_timezone(&Utc))
    }
}

/// Uploaded media reference (hero image).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// SEO metadata block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Category as embedded in a post at depth >= 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub name: String,
}

/// Category, as returned by `/api/categories`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub title: String,
    pub slug: String,
}

/// Paginated list envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    pub docs: Vec<T>,
    #[serde(default)]
    pub total_docs: u64,
    #[serde(default)]
    pub limit: u32,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub has_prev_page: bool,
    #[serde(default)]
    pub next_page: Option<u32>,
    #[serde(default)]
    pub prev_page: Option<u32>,
}

impl<T> ListResponse<T> {
    /// Single-page envelope wrapping `docs`.
    pub fn single_page(docs: Vec<T>) -> Self {
        let total = docs.len();
        Self {
            total_docs: total as u64,
            limit: total as u32,
            page: 1,
            total_pages: if total == 0 { 0 } else { 1 },
            has_next_page: false,
            has_prev_page: false,
            next_page: None,
            prev_page: None,
            docs,
        }
    }
}

fn first_page() -> u32 {
    1
}

fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Str(String),
        Int(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Str(s) => s,
        RawId::Int(n) => n.to_string(),
    })
}
