//! Pagination state and page-link windowing.
//!
//! Each route carries a client-local current page; the pager view is
//! recomputed from scratch on every render so link targets always reflect the
//! latest total, never a page count captured by an earlier render.

use std::collections::HashMap;

/// Fixed page size used for route torrent pages.
pub const PAGE_SIZE: u32 = 25;

/// Maximum number of numbered links shown at once.
const LINK_WINDOW: u32 = 5;

/// Total page count for a collection; never less than one.
#[must_use]
pub fn total_pages(total: u32, size: u32) -> u32 {
    if size == 0 {
        return 1;
    }
    total.div_ceil(size).max(1)
}

/// Clamp a requested page into the valid range.
///
/// The lower bound is always 1; the upper bound applies only when the total
/// page count is known.
#[must_use]
pub fn clamp_page(page: u32, total_pages: Option<u32>) -> u32 {
    let page = page.max(1);
    match total_pages {
        Some(bound) => page.min(bound.max(1)),
        None => page,
    }
}

/// Renderable pager controls for one route.
///
/// Every numbered link carries its resolved target page; consumers dispatch
/// the target directly instead of capturing page arithmetic at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerView {
    /// Current page, clamped into range.
    pub page: u32,
    /// Total page count.
    pub total_pages: u32,
    /// Numbered link targets, at most five, centered on the current page.
    pub numbers: Vec<u32>,
    /// Whether the window excludes page 1.
    pub leading_gap: bool,
    /// Whether the window excludes the last page.
    pub trailing_gap: bool,
}

impl PagerView {
    /// Whether the first/prev controls are actionable.
    #[must_use]
    pub const fn prev_enabled(&self) -> bool {
        self.page > 1
    }

    /// Whether the next/last controls are actionable.
    #[must_use]
    pub const fn next_enabled(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Compute the pager for a route, or `None` when it should stay hidden.
#[must_use]
pub fn render_pager(page: u32, size: u32, total: u32) -> Option<PagerView> {
    let bound = total_pages(total, size);
    if bound <= 1 {
        return None;
    }
    let page = clamp_page(page, Some(bound));

    let highest_start = bound.saturating_sub(LINK_WINDOW - 1).max(1);
    let start = page.saturating_sub(LINK_WINDOW / 2).max(1).min(highest_start);
    let end = (start + LINK_WINDOW - 1).min(bound);

    Some(PagerView {
        page,
        total_pages: bound,
        numbers: (start..=end).collect(),
        leading_gap: start > 1,
        trailing_gap: end < bound,
    })
}

/// Client-local current page per route.
///
/// Entries appear when a route is first observed and are discarded alongside
/// the route.
#[derive(Debug, Default)]
pub struct PageMap {
    pages: HashMap<String, u32>,
}

impl PageMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current page for a route, defaulting to 1.
    #[must_use]
    pub fn current(&self, route: &str) -> u32 {
        self.pages.get(route).copied().unwrap_or(1)
    }

    /// Navigate a route to a page, clamping against the known bound.
    ///
    /// Returns the resolved page so the caller can trigger the matching
    /// fetch for that route only.
    pub fn goto_page(&mut self, route: &str, page: u32, total_pages: Option<u32>) -> u32 {
        let resolved = clamp_page(page, total_pages);
        self.pages.insert(route.to_string(), resolved);
        resolved
    }

    /// Drop state for routes no longer present in the listing.
    pub fn retain_routes(&mut self, live: &[String]) {
        self.pages.retain(|route, _| live.contains(route));
    }

    /// Forget a single route.
    pub fn remove(&mut self, route: &str) {
        self.pages.remove(route);
    }
}
