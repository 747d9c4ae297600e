//! 検索結果キャッシュ（正規化キー → ResultPage）
//!
//! - 挿入から TTL 以上経ったエントリは参照時に削除する（掃除スレッドは持たない）
//! - 件数が上限に達していれば、最も古く挿入された 1 件を追い出してから挿入する
//! - 失敗した検索結果は載せない
//!
//! 同じキーへの重なったリクエストは既定では「後から届いた応答が勝つ」。
//! `sequence_guard` を有効にすると、同じキーで後から発行されたリクエストより古い応答は捨てる。

use crate::domain::{FilterSpec, ResultPage};
use common::ports::outbound::Clock;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

pub const DEFAULT_TTL: Duration = Duration::from_secs(120);
pub const DEFAULT_MAX_ENTRIES: usize = 30;

/// キャッシュの方針
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub ttl: Duration,
    pub max_entries: usize,
    pub sequence_guard: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_entries: DEFAULT_MAX_ENTRIES,
            sequence_guard: false,
        }
    }
}

/// 参照結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Hit(ResultPage),
    Miss,
    /// 期限切れのエントリがあり、今回削除した
    Expired,
}

impl Lookup {
    pub fn into_page(self) -> Option<ResultPage> {
        match self {
            Self::Hit(page) => Some(page),
            Self::Miss | Self::Expired => None,
        }
    }
}

/// 発行済みリクエストの整理券（キーごとに単調増加）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    key: String,
    seq: u64,
}

impl RequestTicket {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// 応答を格納しようとした結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreDecision {
    Stored,
    /// 同じキーで後発のリクエストがあったが、後着優先で上書きした
    StoredOverNewer,
    /// 後発のリクエストがあるため捨てた（sequence_guard 有効時）
    DroppedStale,
    /// 失敗した検索なので格納しなかった
    Skipped,
}

impl StoreDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stored => "stored",
            Self::StoredOverNewer => "stored_over_newer",
            Self::DroppedStale => "dropped_stale",
            Self::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreReport {
    pub decision: StoreDecision,
    /// 上限超過で追い出したキー
    pub evicted: Option<String>,
}

/// 統計（ログと REPL の `:stats` 用）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
}

struct Entry {
    page: ResultPage,
    inserted_at_ms: u64,
}

/// キーごとの発行状況
struct Sequence {
    latest: u64,
    in_flight: u32,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    /// 挿入順（先頭が最古）
    order: VecDeque<String>,
    issued: HashMap<String, Sequence>,
    next_seq: u64,
    stats: CacheStats,
}

impl Inner {
    fn remove(&mut self, key: &str) -> Option<Entry> {
        let entry = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(entry)
    }

    /// 挿入し、追い出したキーを返す。既存キーの再格納は TTL と同じく挿入順も最新に戻す。
    fn insert(&mut self, key: String, page: ResultPage, now_ms: u64, max: usize) -> Option<String> {
        let mut evicted = None;
        if self.remove(&key).is_none() && self.entries.len() >= max {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
                self.stats.evictions += 1;
                evicted = Some(oldest);
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(
            key,
            Entry {
                page,
                inserted_at_ms: now_ms,
            },
        );
        evicted
    }
}

/// 単一の Mutex で参照・挿入・追い出しを守る結果キャッシュ
pub struct ResultCache {
    clock: Arc<dyn Clock>,
    policy: CachePolicy,
    inner: Mutex<Inner>,
}

impl ResultCache {
    pub fn new(clock: Arc<dyn Clock>, policy: CachePolicy) -> Self {
        Self {
            clock,
            policy,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    // panic で中断されても Inner の整合は崩れないので、poison は無視する
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 有効なエントリがあれば返す
    pub fn lookup(&self, spec: &FilterSpec) -> Option<ResultPage> {
        self.lookup_detailed(spec).into_page()
    }

    pub fn lookup_detailed(&self, spec: &FilterSpec) -> Lookup {
        let key = spec.canonical_key();
        let now = self.clock.now_ms();
        let ttl_ms = self.policy.ttl.as_millis() as u64;
        let mut guard = self.lock();
        let inner = &mut *guard;

        let age_ms = inner
            .entries
            .get(&key)
            .map(|entry| now.saturating_sub(entry.inserted_at_ms));
        match age_ms {
            None => {
                inner.stats.misses += 1;
                Lookup::Miss
            }
            Some(age) if age >= ttl_ms => {
                inner.remove(&key);
                inner.stats.expirations += 1;
                inner.stats.misses += 1;
                Lookup::Expired
            }
            Some(_) => {
                inner.stats.hits += 1;
                inner
                    .entries
                    .get(&key)
                    .map(|entry| Lookup::Hit(entry.page.clone()))
                    .unwrap_or(Lookup::Miss)
            }
        }
    }

    /// 無条件に格納する。追い出したキーを返す。
    pub fn store(&self, spec: &FilterSpec, page: ResultPage) -> Option<String> {
        let now = self.clock.now_ms();
        let max = self.policy.max_entries;
        self.lock().insert(spec.canonical_key(), page, now, max)
    }

    /// 取得を始める前に整理券を受け取る
    pub fn begin(&self, spec: &FilterSpec) -> RequestTicket {
        let key = spec.canonical_key();
        let mut inner = self.lock();
        inner.next_seq += 1;
        let seq = inner.next_seq;
        let state = inner.issued.entry(key.clone()).or_insert(Sequence {
            latest: 0,
            in_flight: 0,
        });
        state.latest = seq;
        state.in_flight += 1;
        RequestTicket { key, seq }
    }

    /// 取得の完了を報告する。`page` が None（失敗）なら格納しない。
    pub fn complete(&self, ticket: RequestTicket, page: Option<ResultPage>) -> StoreReport {
        let now = self.clock.now_ms();
        let max = self.policy.max_entries;
        let sequence_guard = self.policy.sequence_guard;
        let mut guard = self.lock();
        let inner = &mut *guard;

        let (is_latest, done) = match inner.issued.get_mut(&ticket.key) {
            Some(state) => {
                state.in_flight = state.in_flight.saturating_sub(1);
                (state.latest == ticket.seq, state.in_flight == 0)
            }
            None => (true, false),
        };
        if done {
            inner.issued.remove(&ticket.key);
        }

        let Some(page) = page else {
            return StoreReport {
                decision: StoreDecision::Skipped,
                evicted: None,
            };
        };
        if !is_latest && sequence_guard {
            return StoreReport {
                decision: StoreDecision::DroppedStale,
                evicted: None,
            };
        }
        let evicted = inner.insert(ticket.key, page, now, max);
        StoreReport {
            decision: if is_latest {
                StoreDecision::Stored
            } else {
                StoreDecision::StoredOverNewer
            },
            evicted,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        CacheStats {
            entries: inner.entries.len(),
            ..inner.stats
        }
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.order.clear();
    }
}
