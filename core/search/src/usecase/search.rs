//! 検索ユースケース: 正規化 → キャッシュ参照 → 述語構築 → 並行取得 → 変換 → キャッシュ格納
//!
//! ページ移動も同じ経路を通る（ページごとに取得・キャッシュする）。

use crate::domain::bookmark::from_query_string;
use crate::domain::{
    build_predicate, normalize, transform, FilterSpec, Normalized, Pagination, ResultPage,
    SearchError, SearchOutcome,
};
use crate::ports::outbound::JobStore;
use crate::usecase::cache::{CacheStats, Lookup, ResultCache, StoreDecision};
use crate::usecase::executor::execute;
use common::ports::outbound::{Log, LogRecord};
use serde_json::Value;
use std::sync::Arc;

pub struct SearchUseCase {
    store: Arc<dyn JobStore>,
    cache: Arc<ResultCache>,
    log: Arc<dyn Log>,
}

impl SearchUseCase {
    pub fn new(store: Arc<dyn JobStore>, cache: Arc<ResultCache>, log: Arc<dyn Log>) -> Self {
        Self { store, cache, log }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn emit(&self, record: LogRecord) {
        let _ = self.log.log(&record.layer("usecase"));
    }

    /// 正規化済みの条件で 1 ページ分を検索する
    pub fn search(&self, spec: &FilterSpec) -> Result<ResultPage, SearchError> {
        let key = spec.canonical_key();
        match self.cache.lookup_detailed(spec) {
            Lookup::Hit(page) => {
                self.emit(LogRecord::debug("cache hit").kind("cache").field("key", key));
                return Ok(page);
            }
            Lookup::Expired => {
                self.emit(LogRecord::debug("cache expired").kind("cache").field("key", key.as_str()));
            }
            Lookup::Miss => {
                self.emit(LogRecord::debug("cache miss").kind("cache").field("key", key.as_str()));
            }
        }

        let ticket = self.cache.begin(spec);
        let seq = ticket.seq();
        let predicate = build_predicate(spec);
        let result = execute(self.store.as_ref(), &predicate, spec.page(), spec.limit()).map(|raw| {
            ResultPage {
                items: transform(&raw.records),
                pagination: Pagination::new(spec.page(), spec.limit(), raw.total),
            }
        });
        let report = self.cache.complete(ticket, result.as_ref().ok().cloned());

        match &result {
            Ok(page) => {
                let record = match report.decision {
                    StoreDecision::DroppedStale => LogRecord::info("stale response dropped"),
                    StoreDecision::StoredOverNewer => {
                        LogRecord::info("cache overwritten by older request")
                    }
                    _ => LogRecord::debug("cache store"),
                };
                self.emit(
                    record
                        .kind("cache")
                        .field("key", key.as_str())
                        .field("seq", seq)
                        .field("decision", report.decision.as_str())
                        .field("total", page.pagination.total),
                );
            }
            Err(e) => {
                self.emit(
                    LogRecord::error(e.to_string())
                        .kind("store")
                        .field("key", key.as_str())
                        .field("retryable", e.is_retryable()),
                );
            }
        }
        if let Some(evicted) = report.evicted {
            self.emit(LogRecord::debug("cache evict").kind("cache").field("key", evicted));
        }
        result
    }

    /// 生の検索条件（外部入力）から検索する。失敗は空ページ + エラー表示で返す。
    pub fn search_raw(&self, raw: &Value) -> SearchOutcome {
        self.run(normalize(raw))
    }

    /// ブックマーク URL のクエリ文字列から検索する
    pub fn search_query_string(&self, query: &str) -> SearchOutcome {
        self.run(from_query_string(query))
    }

    fn run(&self, normalized: Normalized) -> SearchOutcome {
        for fallback in &normalized.fallbacks {
            self.emit(
                LogRecord::warn(fallback.reason.as_str())
                    .kind("normalize")
                    .field("field", fallback.field),
            );
        }
        let spec = normalized.spec;
        match self.search(&spec) {
            Ok(page) => SearchOutcome {
                spec,
                page,
                error: None,
            },
            Err(e) => SearchOutcome {
                page: ResultPage::empty(&spec),
                error: Some((&e).into()),
                spec,
            },
        }
    }
}
