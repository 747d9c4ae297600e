//! お気に入りのドメイン型（切り替えの状態機械と、結果への重ね合わせ行）

use super::summary::JobSummary;
use common::domain::JobId;
use serde::Serialize;

/// 求人ごとの切り替え状態
///
/// `Idle → Pending → {Committed → Idle, RolledBack → Idle}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleState {
    Idle,
    Pending,
    Committed,
    RolledBack,
}

impl ToggleState {
    /// 許される遷移か
    pub fn can_transition_to(self, next: ToggleState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Pending)
                | (Self::Pending, Self::Committed)
                | (Self::Pending, Self::RolledBack)
                | (Self::Committed, Self::Idle)
                | (Self::RolledBack, Self::Idle)
        )
    }
}

/// 切り替え成功時の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleOutcome {
    pub id: JobId,
    /// 確定した値
    pub value: bool,
}

/// 結果ページの 1 行にお気に入り状態を重ねたもの
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritedJob {
    #[serde(flatten)]
    pub summary: JobSummary,
    pub is_favorite: bool,
}
