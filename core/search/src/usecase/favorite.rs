//! お気に入りの重ね合わせ（一括取得と楽観的な切り替え）
//!
//! 切り替えは求人ごとに `Idle → Pending → {Committed, RolledBack} → Idle`。
//! 処理中の求人への切り替え要求は拒否する。
//!
//! 一括取得の結果は、その読み取りが始まった後に切り替えが始まった・終わった求人には書き込まない。
//! 切り替えのたびに `epoch` を進め、読み取り中に動いた求人を `touched` に記録して判定する。

use crate::domain::{
    FavoriteError, FavoritedJob, ResultPage, ToggleOutcome, ToggleState,
};
use crate::ports::outbound::FavoriteStore;
use common::domain::{JobId, UserId};
use common::ports::outbound::{Log, LogRecord};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct OverlayState {
    /// 直近の一括取得で表示中のお気に入り状態（楽観的な値を含む）
    snapshot: HashMap<JobId, bool>,
    in_flight: HashMap<JobId, ToggleState>,
    epoch: u64,
    /// 実行中の一括取得が始まった時点の epoch
    reads: Vec<u64>,
    /// 実行中の一括取得より後に切り替えが動いた求人と、その epoch
    touched: HashMap<JobId, u64>,
}

impl OverlayState {
    fn touch(&mut self, id: &JobId) {
        self.epoch += 1;
        if !self.reads.is_empty() {
            self.touched.insert(id.clone(), self.epoch);
        }
    }

    /// `started` 以降に切り替えが動いた求人か
    fn moved_since(&self, id: &JobId, started: u64) -> bool {
        self.touched.get(id).is_some_and(|&at| at > started)
    }

    /// 一括取得の結果で snapshot を置き換え、呼び出し元へ返す値を作る
    fn apply_read(
        &mut self,
        ids: &[JobId],
        favorites: &HashSet<JobId>,
        started: u64,
    ) -> HashMap<JobId, bool> {
        let mut next: HashMap<JobId, bool> = self
            .snapshot
            .iter()
            .filter(|(id, _)| self.in_flight.contains_key(*id) || self.touched.contains_key(*id))
            .map(|(id, v)| (id.clone(), *v))
            .collect();
        let mut status = HashMap::with_capacity(ids.len());
        for id in ids {
            let value = if self.in_flight.contains_key(id) || self.moved_since(id, started) {
                // 読み取りより新しい値（楽観的な値かコミット・巻き戻し後の値）を優先する
                self.snapshot
                    .get(id)
                    .copied()
                    .unwrap_or_else(|| favorites.contains(id))
            } else {
                favorites.contains(id)
            };
            next.insert(id.clone(), value);
            status.insert(id.clone(), value);
        }
        self.snapshot = next;
        status
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct FavoriteOverlay {
    store: Arc<dyn FavoriteStore>,
    log: Arc<dyn Log>,
    state: Mutex<OverlayState>,
}

/// 処理中の登録。drop で Idle に戻す（コミット中の panic でも残らない）。
struct PendingToggle<'a> {
    overlay: &'a FavoriteOverlay,
    id: JobId,
}

impl PendingToggle<'_> {
    /// 表示値を確定させ、状態を進める
    fn finish(self, next: ToggleState, value: bool) {
        let mut state = lock(&self.overlay.state);
        state.snapshot.insert(self.id.clone(), value);
        state.touch(&self.id);
        if let Some(current) = state.in_flight.get_mut(&self.id) {
            if current.can_transition_to(next) {
                *current = next;
            }
        }
    }
}

impl Drop for PendingToggle<'_> {
    fn drop(&mut self) {
        lock(&self.overlay.state).in_flight.remove(&self.id);
    }
}

/// 実行中の一括取得の登録。drop で外し、不要になった `touched` を捨てる。
struct PendingRead<'a> {
    overlay: &'a FavoriteOverlay,
    started: u64,
}

impl Drop for PendingRead<'_> {
    fn drop(&mut self) {
        let mut state = lock(&self.overlay.state);
        if let Some(pos) = state.reads.iter().position(|&e| e == self.started) {
            state.reads.swap_remove(pos);
        }
        match state.reads.iter().min().copied() {
            Some(oldest) => state.touched.retain(|_, at| *at > oldest),
            None => state.touched.clear(),
        }
    }
}

impl FavoriteOverlay {
    pub fn new(store: Arc<dyn FavoriteStore>, log: Arc<dyn Log>) -> Self {
        Self {
            store,
            log,
            state: Mutex::new(OverlayState::default()),
        }
    }

    fn emit(&self, record: LogRecord) {
        let _ = self.log.log(&record.layer("usecase").kind("favorite"));
    }

    fn begin_read(&self) -> PendingRead<'_> {
        let mut state = lock(&self.state);
        let started = state.epoch;
        state.reads.push(started);
        PendingRead {
            overlay: self,
            started,
        }
    }

    /// 求人 id 群のお気に入り状態を一括取得する。未ログインならストアに問い合わせず全て false。
    ///
    /// 表示中の状態はこの id 群で置き換える（切り替え中の求人は残す）。
    pub fn fetch_status(
        &self,
        ids: &[JobId],
        user: Option<&UserId>,
    ) -> Result<HashMap<JobId, bool>, FavoriteError> {
        match user {
            Some(user) if !ids.is_empty() => {
                let read = self.begin_read();
                let favorites = self
                    .store
                    .fetch_favorites(ids, user)
                    .map_err(FavoriteError::Store)?;
                let status = lock(&self.state).apply_read(ids, &favorites, read.started);
                Ok(status)
            }
            _ => {
                let mut state = lock(&self.state);
                let started = state.epoch;
                Ok(state.apply_read(ids, &HashSet::new(), started))
            }
        }
    }

    /// 表示中の状態（未取得なら false）
    pub fn is_favorite(&self, id: &JobId) -> bool {
        lock(&self.state).snapshot.get(id).copied().unwrap_or(false)
    }

    pub fn state(&self, id: &JobId) -> ToggleState {
        lock(&self.state)
            .in_flight
            .get(id)
            .copied()
            .unwrap_or(ToggleState::Idle)
    }

    fn begin(&self, id: &JobId, optimistic: bool) -> Result<PendingToggle<'_>, FavoriteError> {
        let mut state = lock(&self.state);
        if state.in_flight.contains_key(id) {
            return Err(FavoriteError::InFlight(id.clone()));
        }
        state.in_flight.insert(id.clone(), ToggleState::Pending);
        state.snapshot.insert(id.clone(), optimistic);
        state.touch(id);
        Ok(PendingToggle {
            overlay: self,
            id: id.clone(),
        })
    }

    /// `current` を反転する。表示は即座に反転し、コミット失敗時は `current` に戻す。
    pub fn toggle(
        &self,
        id: &JobId,
        current: bool,
        user: Option<&UserId>,
    ) -> Result<ToggleOutcome, FavoriteError> {
        let user = user.ok_or(FavoriteError::Unauthenticated)?;
        let next = !current;
        let pending = self.begin(id, next)?;

        let committed = if next {
            self.store.add_favorite(id, user)
        } else {
            self.store.remove_favorite(id, user)
        };

        match committed {
            Ok(()) => {
                pending.finish(ToggleState::Committed, next);
                self.emit(
                    LogRecord::info("favorite committed")
                        .field("job_id", id.as_str())
                        .field("value", next),
                );
                Ok(ToggleOutcome {
                    id: id.clone(),
                    value: next,
                })
            }
            Err(e) => {
                pending.finish(ToggleState::RolledBack, current);
                self.emit(
                    LogRecord::warn("favorite rolled back")
                        .field("job_id", id.as_str())
                        .field("reverted_to", current)
                        .field("error", e.to_string()),
                );
                Err(FavoriteError::CommitFailed {
                    id: id.clone(),
                    reverted_to: current,
                    message: e.to_string(),
                })
            }
        }
    }

    /// 結果ページの各行に表示中のお気に入り状態を重ねる
    pub fn overlay(&self, page: &ResultPage) -> Vec<FavoritedJob> {
        let state = lock(&self.state);
        page.items
            .iter()
            .map(|summary| FavoritedJob {
                is_favorite: state.snapshot.get(&summary.id).copied().unwrap_or(false),
                summary: summary.clone(),
            })
            .collect()
    }
}
