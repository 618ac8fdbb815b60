//! Local substring filter over an already-loaded post collection.

use postify_content::Post;

/// Case-insensitive match of `needle` (already lowercased and trimmed)
/// against title, description, and any category title.
pub fn matches(post: &Post, needle: &str) -> bool {
    post.title.to_lowercase().contains(needle)
        || post
            .description()
            .is_some_and(|d| d.to_lowercase().contains(needle))
        || post
            .category_refs()
            .iter()
            .any(|c| c.title.to_lowercase().contains(needle))
}

/// Posts matching `query`, in their original order. A blank query keeps
/// every post.
pub fn filter_posts<'a>(posts: &'a [Post], query: &str) -> Vec<&'a Post> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return posts.iter().collect();
    }
    posts.iter().filter(|p| matches(p, &needle)).collect()
}
