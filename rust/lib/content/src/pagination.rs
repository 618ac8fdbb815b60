//! Page-number window and prev/next links for listing pages.

use crate::model::ListResponse;

/// Pages shown in full before the window collapses with ellipses.
const MAX_VISIBLE_PAGES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

/// Page numbers to render around `current`. Empty when there is at most
/// one page.
pub fn page_window(current: u32, total: u32) -> Vec<PageItem> {
    use PageItem::{Ellipsis, Page};

    if total <= 1 {
        return Vec::new();
    }
    if total <= MAX_VISIBLE_PAGES {
        return (1..=total).map(Page).collect();
    }

    let mut items = Vec::with_capacity(7);
    if current <= 3 {
        items.extend((1..=4).map(Page));
        items.push(Ellipsis);
        items.push(Page(total));
    } else if current >= total - 2 {
        items.push(Page(1));
        items.push(Ellipsis);
        items.extend((total - 3..=total).map(Page));
    } else {
        items.push(Page(1));
        items.push(Ellipsis);
        items.extend((current - 1..=current + 1).map(Page));
        items.push(Ellipsis);
        items.push(Page(total));
    }
    items
}

/// Pagination bar state for one listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub current: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
    /// Link for page 1, e.g. `/blog` or `/search?q=rust`.
    pub base_url: String,
}

impl Pagination {
    pub fn from_response<T>(resp: &ListResponse<T>, base_url: impl Into<String>) -> Self {
        Self {
            current: resp.page,
            total_pages: resp.total_pages,
            has_next: resp.has_next_page,
            has_prev: resp.has_prev_page,
            base_url: base_url.into(),
        }
    }

    /// Whether the bar renders at all.
    pub fn is_visible(&self) -> bool {
        self.total_pages > 1
    }

    pub fn items(&self) -> Vec<PageItem> {
        page_window(self.current, self.total_pages)
    }

    /// Link for `page`. Page 1 is the bare base URL.
    pub fn page_href(&self, page: u32) -> String {
        if page <= 1 {
            return self.base_url.clone();
        }
        let sep = if self.base_url.contains('?') { '&' } else { '?' };
        format!("{}{}page={}", self.base_url, sep, page)
    }

    pub fn prev_href(&self) -> Option<String> {
        self.has_prev
            .then(|| self.page_href(self.current.saturating_sub(1)))
    }

    pub fn next_href(&self) -> Option<String> {
        self.has_next.then(|| self.page_href(self.current + 1))
    }
}
