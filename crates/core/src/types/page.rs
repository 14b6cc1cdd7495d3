//! Client-side pagination.

use serde::Serialize;

/// One page of a client-side paginated list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number, clamped into `1..=total_pages`.
    pub page: usize,
    pub per_page: usize,
    /// At least 1, even for an empty list.
    pub total_pages: usize,
    /// Number of items across all pages.
    pub total: usize,
}

impl<T> Page<T> {
    /// Slice `items` into page `page` of `per_page` items.
    ///
    /// Out-of-range pages are clamped and a `per_page` of zero is treated as 1.
    #[must_use]
    pub fn paginate(items: Vec<T>, page: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let total = items.len();
        let total_pages = total.div_ceil(per_page).max(1);
        let page = page.clamp(1, total_pages);

        let items = items
            .into_iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .collect();

        Self {
            items,
            page,
            per_page,
            total_pages,
            total,
        }
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_boundaries() {
        let page = Page::paginate((1..=25).collect::<Vec<_>>(), 3, 10);
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total, 25);
        assert!(!page.has_next());
        assert!(page.has_prev());

        let page = Page::paginate((1..=20).collect::<Vec<_>>(), 2, 10);
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_paginate_clamps() {
        let page = Page::paginate((1..=5).collect::<Vec<_>>(), 9, 2);
        assert_eq!(page.page, 3);
        assert_eq!(page.items, vec![5]);

        let page = Page::paginate((1..=5).collect::<Vec<_>>(), 0, 2);
        assert_eq!(page.page, 1);
        assert_eq!(page.items, vec![1, 2]);

        let page = Page::paginate((1..=3).collect::<Vec<_>>(), 1, 0);
        assert_eq!(page.per_page, 1);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_paginate_empty() {
        let page = Page::paginate(Vec::<u8>::new(), 1, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next());
        assert!(!page.has_prev());
    }
}
