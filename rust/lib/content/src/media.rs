//! Media URL resolution.

use url::form_urlencoded;

/// Characters `encodeURIComponent` leaves alone, besides alphanumerics.
const UNRESERVED: &[u8] = b"-_.!~*'()";

/// Resolve a CMS media URL for display.
///
/// Relative URLs are prefixed with `base_url`; absolute ones pass through.
/// A non-empty `cache_tag` is percent-encoded and appended as `?<tag>`.
/// A missing or empty `url` resolves to `""`.
pub fn media_url(url: Option<&str>, cache_tag: Option<&str>, base_url: &str) -> String {
    let url = match url {
        Some(u) if !u.is_empty() => u,
        _ => return String::new(),
    };

    let tag = cache_tag.filter(|t| !t.is_empty()).map(encode_component);

    let resolved = if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("{}{}", base_url, url)
    };

    match tag {
        Some(tag) => format!("{}?{}", resolved, tag),
        None => resolved,
    }
}

/// Percent-encode like JavaScript's `encodeURIComponent`.
pub fn encode_component(raw: &str) -> String {
    // form_urlencoded turns spaces into '+' and escapes a few characters
    // encodeURIComponent keeps; undo both.
    let encoded: String = form_urlencoded::byte_serialize(raw.as_bytes()).collect();
    let mut out = String::with_capacity(encoded.len());
    let mut chars = encoded.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '+' => out.push_str("%20"),
            '%' => {
                let hex: String = chars.by_ref().take(2).collect();
                match u8::from_str_radix(&hex, 16) {
                    Ok(b) if UNRESERVED.contains(&b) => out.push(b as char),
                    _ => {
                        out.push('%');
                        out.push_str(&hex);
                    }
                }
            }
            other => out.push(other),
        }
    }
    out
}
