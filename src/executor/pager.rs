//! Page-link strip for result navigation

use serde::{Deserialize, Serialize};

/// Pages always shown at each end of the strip
const EDGE_PAGES: usize = 2;
/// Pages shown before the current page
const BEFORE_CURRENT: usize = 2;
/// Pages shown after the current page
const AFTER_CURRENT: usize = 4;

/// One entry of a page strip. Page numbers are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageLink {
    Page(usize),
    Gap,
}

/// Builds the page strip for `current_page` (1-based, clamped into range)
pub fn page_links(total_pages: usize, current_page: usize) -> Vec<PageLink> {
    if total_pages == 0 {
        return Vec::new();
    }
    let current = current_page.clamp(1, total_pages);
    let mut links = Vec::new();

    let left_end = (1 + EDGE_PAGES).min(total_pages + 1);
    links.extend((1..left_end).map(PageLink::Page));

    let mid_start = left_end.max(current.saturating_sub(BEFORE_CURRENT));
    let mid_end = (current + AFTER_CURRENT + 1).min(total_pages + 1);

    if mid_start > left_end {
        links.push(PageLink::Gap);
    }
    links.extend((mid_start..mid_end).map(PageLink::Page));

    let right_start = mid_end.max(total_pages.saturating_sub(EDGE_PAGES) + 1);

    if right_start > mid_end {
        links.push(PageLink::Gap);
    }
    links.extend((right_start..=total_pages).map(PageLink::Page));

    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageLink::{Gap, Page};

    #[test]
    fn test_empty() {
        assert!(page_links(0, 1).is_empty());
    }

    #[test]
    fn test_short_strip_has_no_gaps() {
        assert_eq!(page_links(3, 2), vec![Page(1), Page(2), Page(3)]);
        assert_eq!(page_links(1, 1), vec![Page(1)]);
    }

    #[test]
    fn test_first_page() {
        assert_eq!(
            page_links(10, 1),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Gap, Page(9), Page(10)]
        );
    }

    #[test]
    fn test_middle_page() {
        let mut expected = vec![Page(1), Page(2), Gap];
        expected.extend((5..=11).map(Page));
        expected.extend([Gap, Page(19), Page(20)]);

        assert_eq!(page_links(20, 7), expected);
    }

    #[test]
    fn test_current_clamped() {
        assert_eq!(page_links(10, 0), page_links(10, 1));
        assert_eq!(page_links(10, 99), page_links(10, 10));
    }
}
