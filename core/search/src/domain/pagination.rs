//! ページネーション計算（純粋な算術）

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// 総件数 0 なら 0、それ以外は ceil(total / limit)
pub fn total_pages(total: u64, limit: u32) -> u64 {
    if total == 0 || limit == 0 {
        return 0;
    }
    total.div_ceil(limit as u64)
}

/// データ取得の読み飛ばし件数 `(page-1)*limit`
pub fn offset(page: u32, limit: u32) -> u64 {
    (page.max(1) as u64 - 1) * limit as u64
}

/// 結果ページのページ情報
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        Self {
            page,
            limit,
            total,
            total_pages: total_pages(total, limit),
        }
    }

    /// このページに載る項目の 1 始まり番号範囲。範囲外のページなら None。
    pub fn window(&self) -> Option<RangeInclusive<u64>> {
        let start = offset(self.page, self.limit) + 1;
        if self.total == 0 || start > self.total {
            return None;
        }
        let end = (start + self.limit as u64 - 1).min(self.total);
        Some(start..=end)
    }

    pub fn has_next(&self) -> bool {
        (self.page as u64) < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_law() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(30, 10), 3);
        assert_eq!(total_pages(31, 10), 4);
        assert_eq!(total_pages(1, 50), 1);
    }

    #[test]
    fn test_window_of_last_page() {
        let p = Pagination::new(3, 10, 25);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.window(), Some(21..=25));
        assert!(!p.has_next());
        assert!(p.has_prev());
    }

    #[test]
    fn test_window_beyond_end_and_empty() {
        assert_eq!(Pagination::new(4, 10, 25).window(), None);
        assert_eq!(Pagination::new(1, 10, 0).window(), None);
        assert_eq!(Pagination::new(1, 10, 0).total_pages, 0);
    }

    #[test]
    fn test_offset() {
        assert_eq!(offset(1, 10), 0);
        assert_eq!(offset(3, 10), 20);
    }
}
