use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 500;

/// `page`/`limit` query parameters as sent by the dashboard.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> Page {
        self.page_with_default(DEFAULT_LIMIT)
    }

    pub fn page_with_default(&self, default_limit: i64) -> Page {
        Page::new(
            self.page.unwrap_or(DEFAULT_PAGE),
            self.limit.unwrap_or(default_limit),
        )
    }
}

/// A clamped 1-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    /// Saturates so that an absurd `page` reads as "past the end".
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Applies the window to an already ordered collection.
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .skip(self.offset() as usize)
            .take(self.limit as usize)
            .cloned()
            .collect()
    }

    pub fn describe(&self, total: i64) -> Pagination {
        let total_pages = if total == 0 {
            0
        } else {
            (total + self.limit - 1) / self.limit
        };
        Pagination {
            page: self.page,
            limit: self.limit,
            total,
            total_pages,
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page_of_fifty() {
        let page = PageQuery::default().page();
        assert_eq!(page, Page::new(1, 50));
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = Page::new(3, 50);
        let pagination = page.describe(120);
        assert_eq!(pagination.total_pages, 3);
        assert_eq!(page.offset(), 100);

        let seeded: Vec<i32> = (0..120).collect();
        assert_eq!(page.slice(&seeded).len(), 20);
        assert_eq!(Page::new(1, 50).slice(&seeded).len(), 50);
    }

    #[test]
    fn clamps_nonsense_input() {
        let page = Page::new(0, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 1);
        assert_eq!(Page::new(1, 100_000).limit, MAX_LIMIT);
        assert_eq!(Page::default().describe(0).total_pages, 0);
    }

    #[test]
    fn serializes_total_pages_in_camel_case() {
        let json = serde_json::to_value(Page::new(1, 50).describe(120)).unwrap();
        assert_eq!(json["totalPages"], 3);
    }

    #[test]
    fn huge_page_reads_past_the_end() {
        let page = Page::new(i64::MAX, 50);
        assert_eq!(page.offset(), i64::MAX);

        let seeded: Vec<i32> = (0..10).collect();
        assert!(page.slice(&seeded).is_empty());
        assert_eq!(page.describe(10).total_pages, 1);
    }
}
