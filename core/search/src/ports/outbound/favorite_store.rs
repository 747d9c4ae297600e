//! お気に入りストア Outbound ポート
//!
//! (ユーザー, 求人) の組をキーに持つフラグのストア。

use crate::domain::StoreError;
use common::domain::{JobId, UserId};
use std::collections::HashSet;

/// お気に入りを読み書きする能力
pub trait FavoriteStore: Send + Sync {
    /// `ids` のうち、ユーザーがお気に入り登録しているものを返す
    fn fetch_favorites(&self, ids: &[JobId], user: &UserId) -> Result<HashSet<JobId>, StoreError>;

    fn add_favorite(&self, id: &JobId, user: &UserId) -> Result<(), StoreError>;

    fn remove_favorite(&self, id: &JobId, user: &UserId) -> Result<(), StoreError>;
}
