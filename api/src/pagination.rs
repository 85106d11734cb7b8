//! Page-number pagination: page resolution, item ranges and navigation links
//!
//! Pages are 1-based. A requested page outside `[1, total_pages]` is clamped
//! rather than rejected, and an empty result set always resolves to page 1.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;

/// Characters left unescaped in query-string values
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Number of pages needed to show `total_count` items
pub fn total_pages(total_count: i64, per_page: i64) -> i64 {
    if total_count <= 0 || per_page <= 0 {
        return 0;
    }
    (total_count + per_page - 1) / per_page
}

/// Parse a raw `page` query value from its leading digits, so `"3abc"` is
/// page 3 and `"2.5"` is page 2. Missing, non-numeric and non-positive
/// values all mean page 1; a number too large for `i64` saturates and is
/// clamped to the last page later.
pub fn parse_page(raw: Option<&str>) -> i64 {
    let Some(raw) = raw.map(str::trim) else {
        return 1;
    };
    if raw.starts_with('-') {
        return 1;
    }

    let digits = raw.strip_prefix('+').unwrap_or(raw);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if digits.is_empty() {
        return 1;
    }

    digits.parse::<i64>().unwrap_or(i64::MAX).max(1)
}

/// Clamp a page into `[1, total_pages]`; with no pages at all this is 1
pub fn clamp_page(page: i64, total_pages: i64) -> i64 {
    page.clamp(1, total_pages.max(1))
}

/// Parse and clamp in one step
pub fn resolve_page(raw: Option<&str>, total_pages: i64) -> i64 {
    clamp_page(parse_page(raw), total_pages)
}

/// Row offset of the first item on `page`. Saturates for absurd pages,
/// which then read as past the end.
pub fn offset_for(page: i64, per_page: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(per_page.max(0))
}

/// Navigation metadata for one page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current_page: i64,
    pub per_page: i64,
    pub total_pages: i64,
    pub total_count: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub start_item: i64,
    pub end_item: i64,
}

impl Pagination {
    /// Compute metadata for an already-clamped `current_page`
    pub fn new(total_count: i64, current_page: i64, per_page: i64) -> Self {
        let total_pages = total_pages(total_count, per_page);
        Self {
            current_page,
            per_page,
            total_pages,
            total_count,
            has_next_page: current_page < total_pages,
            has_prev_page: current_page > 1,
            start_item: offset_for(current_page, per_page).saturating_add(1),
            end_item: current_page.saturating_mul(per_page).min(total_count),
        }
    }

    pub fn offset(&self) -> i64 {
        offset_for(self.current_page, self.per_page)
    }

    /// Page numbers to show in navigation, at most `max_links` of them,
    /// keeping the current page centred where possible.
    pub fn page_numbers(&self, max_links: i64) -> Vec<i64> {
        let total = self.total_pages;
        let current = self.current_page;
        let max_links = max_links.max(1);
        let half_up = (max_links + 1) / 2;
        let half_down = max_links / 2;

        let (first, last) = if total <= max_links {
            (1, total)
        } else if current <= half_up {
            (1, max_links)
        } else if current >= total - half_down {
            (total - max_links + 1, total)
        } else {
            let start = current - half_down;
            (start, start + max_links - 1)
        };

        (first..=last).collect()
    }
}

/// Build a link to `page` under `base_path`, carrying the search term in
/// `query_param` when one is active.
pub fn page_url(base_path: &str, page: i64, query_param: &str, query: &str) -> String {
    let mut url = format!("{}?page={}", base_path, page);
    if !query.is_empty() {
        url.push('&');
        url.push_str(query_param);
        url.push('=');
        url.extend(utf8_percent_encode(query, QUERY_VALUE));
    }
    url
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub number: i64,
    pub url: String,
    pub current: bool,
}

/// Ready-to-render page navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub pages: Vec<PageLink>,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
}

impl Navigation {
    /// Returns `None` when everything fits on a single page.
    pub fn build(
        pagination: &Pagination,
        base_path: &str,
        query_param: &str,
        query: &str,
        max_links: i64,
    ) -> Option<Self> {
        if pagination.total_pages <= 1 {
            return None;
        }

        let link = |page: i64| page_url(base_path, page, query_param, query);
        let pages = pagination
            .page_numbers(max_links)
            .into_iter()
            .map(|number| PageLink {
                number,
                url: link(number),
                current: number == pagination.current_page,
            })
            .collect();

        Some(Self {
            pages,
            prev_url: pagination
                .has_prev_page
                .then(|| link(pagination.current_page - 1)),
            next_url: pagination
                .has_next_page
                .then(|| link(pagination.current_page + 1)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_partial_page() {
        let p = Pagination::new(45, resolve_page(Some("3"), total_pages(45, 20)), 20);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.current_page, 3);
        assert_eq!(p.offset(), 40);
        assert_eq!(p.start_item, 41);
        assert_eq!(p.end_item, 45);
        assert!(!p.has_next_page);
        assert!(p.has_prev_page);
    }

    #[test]
    fn test_empty_result_with_garbage_page() {
        let page = resolve_page(Some("abc"), total_pages(0, 20));
        assert_eq!(page, 1);

        let p = Pagination::new(0, page, 20);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next_page);
        assert!(!p.has_prev_page);
    }

    #[test]
    fn test_page_parsing() {
        assert_eq!(parse_page(None), 1);
        assert_eq!(parse_page(Some("")), 1);
        assert_eq!(parse_page(Some("0")), 1);
        assert_eq!(parse_page(Some("-4")), 1);
        assert_eq!(parse_page(Some(" 7 ")), 7);
        assert_eq!(parse_page(Some("2.5")), 2);
        assert_eq!(parse_page(Some("3abc")), 3);
        assert_eq!(parse_page(Some("+4")), 4);
        assert_eq!(parse_page(Some("abc3")), 1);
        assert_eq!(parse_page(Some("-")), 1);
    }

    #[test]
    fn test_huge_page_saturates_instead_of_overflowing() {
        let page = parse_page(Some("9223372036854775807"));
        assert_eq!(page, i64::MAX);
        assert_eq!(offset_for(page, 20), i64::MAX);
        assert_eq!(parse_page(Some("99999999999999999999999")), i64::MAX);

        let clamped = clamp_page(page, total_pages(45, 20));
        assert_eq!(clamped, 3);
        assert_eq!(offset_for(clamped, 20), 40);

        let p = Pagination::new(45, i64::MAX, 20);
        assert_eq!(p.end_item, 45);
    }

    #[test]
    fn test_out_of_range_page_is_clamped() {
        assert_eq!(resolve_page(Some("99"), 4), 4);
        assert_eq!(resolve_page(Some("99"), 0), 1);
        assert_eq!(clamp_page(0, 4), 1);
    }

    #[test]
    fn test_item_range_invariants() {
        for per_page in 1..=25 {
            for total_count in 0..=120 {
                let pages = total_pages(total_count, per_page);
                for requested in -2..=pages + 3 {
                    let page = clamp_page(requested, pages);
                    assert!(page >= 1 && page <= pages.max(1));

                    let p = Pagination::new(total_count, page, per_page);
                    if total_count > 0 {
                        assert!(p.start_item <= p.end_item, "{p:?}");
                        assert!(p.end_item <= total_count, "{p:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_page_numbers_window() {
        let at = |page: i64, total_pages: i64| Pagination::new(total_pages * 10, page, 10);

        assert_eq!(at(1, 3).page_numbers(5), vec![1, 2, 3]);
        assert_eq!(at(2, 10).page_numbers(5), vec![1, 2, 3, 4, 5]);
        assert_eq!(at(3, 10).page_numbers(5), vec![1, 2, 3, 4, 5]);
        assert_eq!(at(6, 10).page_numbers(5), vec![4, 5, 6, 7, 8]);
        assert_eq!(at(8, 10).page_numbers(5), vec![6, 7, 8, 9, 10]);
        assert_eq!(at(10, 10).page_numbers(5), vec![6, 7, 8, 9, 10]);
        assert_eq!(at(5, 10).page_numbers(3), vec![4, 5, 6]);
    }

    #[test]
    fn test_page_url_encodes_query() {
        assert_eq!(page_url("/videos", 2, "search", ""), "/videos?page=2");
        assert_eq!(
            page_url("/videos", 2, "search", "rock & roll"),
            "/videos?page=2&search=rock%20%26%20roll"
        );
        assert_eq!(page_url("/", 1, "query", "a_b"), "/?page=1&query=a_b");
    }

    #[test]
    fn test_navigation() {
        let single = Pagination::new(5, 1, 20);
        assert!(Navigation::build(&single, "/videos", "search", "", 5).is_none());

        let p = Pagination::new(45, 2, 20);
        let nav = Navigation::build(&p, "/videos", "search", "live", 5).unwrap();
        assert_eq!(nav.pages.len(), 3);
        assert!(nav.pages[1].current);
        assert_eq!(nav.prev_url.as_deref(), Some("/videos?page=1&search=live"));
        assert_eq!(nav.next_url.as_deref(), Some("/videos?page=3&search=live"));
    }
}
