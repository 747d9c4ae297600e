//! 検索コアのドメインエラー
//!
//! - StoreError: ポート（ストア）が返す失敗
//! - SearchError: 検索全体の失敗（キャッシュには載せない）
//! - FavoriteError: お気に入り操作の失敗（呼び出し側で回復可能）

use common::domain::JobId;
use common::error::Error;

/// ストア呼び出しの失敗
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// 接続できない・設定不備（自動再試行しない）
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// クエリ自体の失敗（一時的とみなす）
    #[error("store query failed: {0}")]
    Query(String),
    /// 応答を解釈できない
    #[error("store response could not be decoded: {0}")]
    Decode(String),
}

/// どちらのクエリが失敗したか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStage {
    Count,
    Data,
}

impl QueryStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Data => "data",
        }
    }
}

impl std::fmt::Display for QueryStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 検索の失敗（部分結果は返さない）
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("{stage} query failed: {message}")]
    StoreQuery { stage: QueryStage, message: String },
    #[error("search backend is not configured or unreachable: {0}")]
    Configuration(String),
}

impl SearchError {
    pub fn from_store(stage: QueryStage, e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(msg) => Self::Configuration(msg),
            StoreError::Query(msg) | StoreError::Decode(msg) => Self::StoreQuery {
                stage,
                message: msg,
            },
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreQuery { .. })
    }
}

/// お気に入り操作の失敗
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FavoriteError {
    /// コミット失敗。表示はすでに `reverted_to` に戻してある。
    #[error("お気に入りの更新に失敗しました（{id}）: {message}")]
    CommitFailed {
        id: JobId,
        reverted_to: bool,
        message: String,
    },
    /// 同じ求人の切り替えが処理中
    #[error("お気に入りの更新が処理中です（{0}）")]
    InFlight(JobId),
    /// 未ログイン
    #[error("お気に入りにはログインが必要です")]
    Unauthenticated,
    /// 状態の取得に失敗
    #[error("お気に入り状態の取得に失敗しました: {0}")]
    Store(StoreError),
}

impl From<SearchError> for Error {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::Configuration(_) => Error::config(e.to_string()),
            SearchError::StoreQuery { .. } => Error::io_msg(e.to_string()),
        }
    }
}

impl From<FavoriteError> for Error {
    fn from(e: FavoriteError) -> Self {
        match e {
            FavoriteError::Unauthenticated => Error::invalid_argument(e.to_string()),
            FavoriteError::Store(StoreError::Unavailable(_)) => Error::config(e.to_string()),
            _ => Error::io_msg(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_mapping() {
        let e = SearchError::from_store(QueryStage::Count, StoreError::Query("timeout".into()));
        assert!(e.is_retryable());
        assert_eq!(e.to_string(), "count query failed: timeout");

        let e = SearchError::from_store(QueryStage::Data, StoreError::Unavailable("no url".into()));
        assert!(!e.is_retryable());
        assert_eq!(Error::from(e).exit_code(), 78);
    }

    #[test]
    fn test_favorite_error_exit_codes() {
        assert_eq!(Error::from(FavoriteError::Unauthenticated).exit_code(), 64);
        let e = FavoriteError::CommitFailed {
            id: JobId::new("j1"),
            reverted_to: false,
            message: "500".into(),
        };
        assert!(e.to_string().contains("j1"));
        assert_eq!(Error::from(e).exit_code(), 74);
    }
}
