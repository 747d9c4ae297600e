//! 求人ストア Outbound ポート
//!
//! AND/OR 述語で絞り込み、作成日時順に並べ、範囲を切り出せるレコードソース。
//! 実装は PostgREST（HTTP）やインメモリ（フィクスチャ・テスト用）など。

use crate::domain::pagination::offset;
use crate::domain::{JobRecord, Predicate, StoreError};

/// データ取得の範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub limit: u32,
}

impl Window {
    /// `(page-1)*limit` から `limit` 件
    pub fn for_page(page: u32, limit: u32) -> Self {
        Self {
            offset: offset(page, limit),
            limit,
        }
    }
}

/// 求人を検索する能力
///
/// `count` と `fetch_window` は別スレッドから同時に呼ばれる。
pub trait JobStore: Send + Sync {
    /// 述語に一致する件数（ページ無視）
    fn count(&self, predicate: &Predicate) -> Result<u64, StoreError>;

    /// 述語に一致するレコードを created_at 降順で `window` 分返す。
    /// 企業の表示用項目（名前・ロゴ）を結合済みで返すこと。
    fn fetch_window(&self, predicate: &Predicate, window: Window)
        -> Result<Vec<JobRecord>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_for_page() {
        assert_eq!(Window::for_page(1, 10), Window { offset: 0, limit: 10 });
        assert_eq!(Window::for_page(3, 10), Window { offset: 20, limit: 10 });
    }
}
