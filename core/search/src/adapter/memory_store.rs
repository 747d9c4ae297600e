//! インメモリの求人・お気に入りストア
//!
//! JSON フィクスチャから読み込み、述語をその場で評価する。オフライン実行とテストに使う。

use crate::domain::{JobRecord, Predicate, StoreError};
use crate::ports::outbound::{FavoriteStore, JobStore, Window};
use common::domain::{JobId, UserId};
use common::error::Error;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// フィクスチャ上のお気に入り 1 件
#[derive(Debug, Clone, Deserialize)]
struct FavoriteRow {
    user_id: UserId,
    job_id: JobId,
}

/// フィクスチャファイルのスキーマ（`{"jobs": [...], "favorites": [...]}` か、求人配列のみ）
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FixtureFile {
    Full {
        jobs: Vec<JobRecord>,
        #[serde(default)]
        favorites: Vec<FavoriteRow>,
    },
    JobsOnly(Vec<JobRecord>),
}

/// Vec で保持するストア実装
pub struct InMemoryStore {
    jobs: Vec<JobRecord>,
    favorites: Mutex<HashSet<(UserId, JobId)>>,
}

impl InMemoryStore {
    pub fn new(jobs: Vec<JobRecord>) -> Self {
        Self {
            jobs,
            favorites: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_favorites(self, favorites: impl IntoIterator<Item = (UserId, JobId)>) -> Self {
        self.favorites
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(favorites);
        self
    }

    /// JSON 文字列から読み込む
    pub fn from_json(s: &str) -> Result<Self, Error> {
        let parsed: FixtureFile = serde_json::from_str(s).map_err(|e| Error::json(e.to_string()))?;
        Ok(match parsed {
            FixtureFile::Full { jobs, favorites } => Self::new(jobs)
                .with_favorites(favorites.into_iter().map(|f| (f.user_id, f.job_id))),
            FixtureFile::JobsOnly(jobs) => Self::new(jobs),
        })
    }

    /// フィクスチャファイルから読み込む
    pub fn from_json_file(path: &Path) -> Result<Self, Error> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| Error::io_msg(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&s)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

impl JobStore for InMemoryStore {
    fn count(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        Ok(self.jobs.iter().filter(|j| predicate.matches(j)).count() as u64)
    }

    fn fetch_window(
        &self,
        predicate: &Predicate,
        window: Window,
    ) -> Result<Vec<JobRecord>, StoreError> {
        let mut hits: Vec<&JobRecord> = self.jobs.iter().filter(|j| predicate.matches(j)).collect();
        // 新しい順。同時刻は id で決定的に並べる
        hits.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(hits
            .into_iter()
            .skip(window.offset as usize)
            .take(window.limit as usize)
            .cloned()
            .collect())
    }
}

impl FavoriteStore for InMemoryStore {
    fn fetch_favorites(&self, ids: &[JobId], user: &UserId) -> Result<HashSet<JobId>, StoreError> {
        let favorites = self.favorites.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(ids
            .iter()
            .filter(|id| favorites.contains(&(user.clone(), (*id).clone())))
            .cloned()
            .collect())
    }

    fn add_favorite(&self, id: &JobId, user: &UserId) -> Result<(), StoreError> {
        self.favorites
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((user.clone(), id.clone()));
        Ok(())
    }

    fn remove_favorite(&self, id: &JobId, user: &UserId) -> Result<(), StoreError> {
        self.favorites
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(user.clone(), id.clone()));
        Ok(())
    }
}
