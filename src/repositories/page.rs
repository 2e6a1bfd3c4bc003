//! Paginated query results.

use serde::Serialize;
use std::collections::HashMap;

/// One page of rows plus the numbers needed to render pagination links.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub per_page: u64,
    /// 1-based page number.
    pub current_page: u64,
    pub last_page: u64,
    /// Query-string parameter carrying the page number.
    pub page_name: String,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, per_page: u64, current_page: u64, page_name: impl Into<String>) -> Self {
        let per_page = per_page.max(1);
        let last_page = total.div_ceil(per_page).max(1);
        Self {
            items,
            total,
            per_page,
            current_page: current_page.max(1),
            last_page,
            page_name: page_name.into(),
        }
    }

    /// Read the requested page number from query-string parameters.
    ///
    /// Missing, unparsable and zero values all fall back to page 1.
    pub fn page_from_query(params: &HashMap<String, String>, page_name: &str) -> u64 {
        params
            .get(page_name)
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|page| *page > 0)
            .unwrap_or(1)
    }

    pub fn has_more_pages(&self) -> bool {
        self.current_page < self.last_page
    }

    pub fn next_page(&self) -> Option<u64> {
        self.has_more_pages().then(|| self.current_page + 1)
    }

    pub fn previous_page(&self) -> Option<u64> {
        (self.current_page > 1).then(|| self.current_page - 1)
    }

    /// Query-string fragment selecting `page`, e.g. `p=3`.
    pub fn page_query(&self, page: u64) -> String {
        format!("{}={}", self.page_name, page)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_numbers() {
        let page = Page::new(vec![3, 4], 6, 2, 2, "p");
        assert_eq!(page.last_page, 3);
        assert_eq!(page.next_page(), Some(3));
        assert_eq!(page.previous_page(), Some(1));
        assert_eq!(page.page_query(3), "p=3");

        let empty: Page<i32> = Page::new(Vec::new(), 0, 10, 1, "p");
        assert_eq!(empty.last_page, 1);
        assert!(!empty.has_more_pages());
        assert_eq!(empty.previous_page(), None);
    }

    #[test]
    fn test_page_from_query() {
        let mut params = HashMap::new();
        assert_eq!(Page::<()>::page_from_query(&params, "p"), 1);

        params.insert("p".to_string(), " 4 ".to_string());
        assert_eq!(Page::<()>::page_from_query(&params, "p"), 4);
        assert_eq!(Page::<()>::page_from_query(&params, "page"), 1);

        params.insert("p".to_string(), "0".to_string());
        assert_eq!(Page::<()>::page_from_query(&params, "p"), 1);

        params.insert("p".to_string(), "abc".to_string());
        assert_eq!(Page::<()>::page_from_query(&params, "p"), 1);
    }
}
