//! 配線: 設定と標準アダプタで検索・お気に入りユースケースを組み立てる

use std::path::Path;
use std::sync::Arc;

use common::adapter::{FileJsonLog, StderrLog, StdClock};
use common::error::Error;
use common::ports::outbound::{Clock, EnvResolver, Log, LogLevel};

use crate::adapter::{load_config, InMemoryStore, JobSearchConfig, PostgrestConfig, PostgrestStore};
use crate::ports::outbound::{FavoriteStore, JobStore};
use crate::usecase::{CachePolicy, FavoriteOverlay, ResultCache, SearchUseCase};

/// 配線済みのアプリケーション
pub struct App {
    pub config: JobSearchConfig,
    pub logger: Arc<dyn Log>,
    pub search: SearchUseCase,
    pub favorites: FavoriteOverlay,
}

/// 配線時の指定（CLI のグローバルオプション由来）
#[derive(Debug, Clone, Copy, Default)]
pub struct WireOptions<'a> {
    pub config_path: Option<&'a Path>,
    pub fixture: Option<&'a Path>,
    pub verbose: bool,
}

/// verbose なら stderr にデバッグまで、log.path があれば JSONL、どちらも無ければ警告以上を stderr へ
fn wire_logger(config: &JobSearchConfig, verbose: bool) -> Arc<dyn Log> {
    if verbose {
        return Arc::new(StderrLog::new(LogLevel::Debug));
    }
    match &config.log.path {
        Some(path) => Arc::new(FileJsonLog::new(path)),
        None => Arc::new(StderrLog::new(LogLevel::Warn)),
    }
}

fn wire_stores(
    config: &JobSearchConfig,
    fixture: Option<&Path>,
    env: &dyn EnvResolver,
) -> Result<(Arc<dyn JobStore>, Arc<dyn FavoriteStore>), Error> {
    if let Some(path) = fixture {
        let store = Arc::new(InMemoryStore::from_json_file(path)?);
        let jobs: Arc<dyn JobStore> = store.clone();
        let favorites: Arc<dyn FavoriteStore> = store;
        return Ok((jobs, favorites));
    }
    let base_url = config.store.base_url.clone().ok_or_else(|| {
        Error::config("store.base_url is not set (set JOBSEARCH_STORE_URL or use --fixture)")
    })?;
    let store = Arc::new(
        PostgrestStore::new(PostgrestConfig {
            base_url,
            api_key: config.store.api_key(env)?,
            jobs_table: config.store.jobs_table.clone(),
            favorites_table: config.store.favorites_table.clone(),
            companies_table: config.store.companies_table.clone(),
            timeout: config.store.timeout,
        })
        .map_err(|e| Error::config(e.to_string()))?,
    );
    let jobs: Arc<dyn JobStore> = store.clone();
    let favorites: Arc<dyn FavoriteStore> = store;
    Ok((jobs, favorites))
}

/// 設定済みのポート群から組み立てる（テストでは偽物のストアや ManualClock を渡す）
pub fn assemble(
    config: JobSearchConfig,
    job_store: Arc<dyn JobStore>,
    favorite_store: Arc<dyn FavoriteStore>,
    clock: Arc<dyn Clock>,
    logger: Arc<dyn Log>,
) -> App {
    let cache = Arc::new(ResultCache::new(
        clock,
        CachePolicy {
            ttl: config.cache.ttl,
            max_entries: config.cache.max_entries,
            sequence_guard: config.cache.sequence_guard,
        },
    ));
    App {
        search: SearchUseCase::new(job_store, cache, Arc::clone(&logger)),
        favorites: FavoriteOverlay::new(favorite_store, Arc::clone(&logger)),
        logger,
        config,
    }
}

/// 配線: 設定を読み、標準アダプタで App を組み立てる
pub fn wire_app(opts: WireOptions<'_>, env: &dyn EnvResolver) -> Result<App, Error> {
    let config = load_config(opts.config_path, env)?;
    let logger = wire_logger(&config, opts.verbose);
    let (job_store, favorite_store) = wire_stores(&config, opts.fixture, env)?;
    Ok(assemble(config, job_store, favorite_store, Arc::new(StdClock), logger))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::adapter::MapEnvResolver;

    #[test]
    fn test_wire_without_store_is_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        let env = MapEnvResolver::new().with("JOBSEARCH_HOME", &tmp.path().to_string_lossy());
        let err = wire_app(WireOptions::default(), &env).err().unwrap();
        assert_eq!(err.exit_code(), 78);
    }

    #[test]
    fn test_wire_http_store_requires_api_key() {
        let tmp = tempfile::tempdir().unwrap();
        let env = MapEnvResolver::new()
            .with("JOBSEARCH_HOME", &tmp.path().to_string_lossy())
            .with("JOBSEARCH_STORE_URL", "https://example.supabase.co");
        let err = wire_app(WireOptions::default(), &env).err().unwrap();
        assert!(err.to_string().contains("JOBSEARCH_API_KEY"));

        let env = env.with("JOBSEARCH_API_KEY", "anon");
        assert!(wire_app(WireOptions::default(), &env).is_ok());
    }

    #[test]
    fn test_wire_with_fixture() {
        let tmp = tempfile::tempdir().unwrap();
        let fixture = tmp.path().join("jobs.json");
        std::fs::write(
            &fixture,
            r#"[{"id":"a","title":"Rust","created_at":"2026-01-01T00:00:00Z"}]"#,
        )
        .unwrap();
        let env = MapEnvResolver::new().with("JOBSEARCH_HOME", &tmp.path().to_string_lossy());
        let app = wire_app(
            WireOptions {
                fixture: Some(&fixture),
                ..WireOptions::default()
            },
            &env,
        )
        .unwrap();
        let outcome = app.search.search_query_string("");
        assert!(outcome.is_ok());
        assert_eq!(outcome.page.pagination.total, 1);
    }
}
