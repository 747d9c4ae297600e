//! 検索結果ページと、呼び出し側へ返す検索結果（エラー表示付き）

use super::error::SearchError;
use super::filter_spec::FilterSpec;
use super::pagination::Pagination;
use super::summary::JobSummary;
use serde::{Deserialize, Serialize};

/// 1 ページ分の検索結果（キャッシュの格納単位）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPage {
    pub items: Vec<JobSummary>,
    pub pagination: Pagination,
}

impl ResultPage {
    /// 0 件のページ
    pub fn empty(spec: &FilterSpec) -> Self {
        Self {
            items: Vec::new(),
            pagination: Pagination::new(spec.page(), spec.limit(), 0),
        }
    }
}

/// 表示用のエラー指標（空リストと区別するため明示する）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchFailure {
    pub message: String,
    pub retryable: bool,
}

impl From<&SearchError> for SearchFailure {
    fn from(e: &SearchError) -> Self {
        Self {
            message: e.to_string(),
            retryable: e.is_retryable(),
        }
    }
}

/// 正規化からの一連の検索結果。失敗時は空ページ + `error`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    pub spec: FilterSpec,
    pub page: ResultPage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SearchFailure>,
}

impl SearchOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
