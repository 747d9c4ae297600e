//! config.json 用の設定型と読み込み（adapter 層）
//!
//! 探索順: `--config` 指定 → $JOBSEARCH_HOME/config.json → ~/.config/jobsearch/config.json。
//! 既定パスにファイルが無ければ既定値で動く。明示指定のファイルが無いのは設定不備。

use crate::usecase::cache::{DEFAULT_MAX_ENTRIES, DEFAULT_TTL};
use common::error::Error;
use common::ports::outbound::EnvResolver;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "config.json";
pub const DEFAULT_API_KEY_ENV: &str = "JOBSEARCH_API_KEY";
pub const STORE_URL_ENV: &str = "JOBSEARCH_STORE_URL";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// 解決済みの設定
#[derive(Debug, Clone, PartialEq)]
pub struct JobSearchConfig {
    pub store: StoreConfig,
    pub cache: CacheConfig,
    pub log: LogConfig,
}

/// 求人ストア（PostgREST）への接続設定
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// 例: https://xxxx.supabase.co（未設定ならフィクスチャ指定が必要）
    pub base_url: Option<String>,
    /// API キーを読む環境変数名
    pub api_key_env: String,
    pub jobs_table: String,
    pub favorites_table: String,
    pub companies_table: String,
    pub timeout: Duration,
}

/// 結果キャッシュの設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub ttl: Duration,
    pub max_entries: usize,
    /// 古いリクエストの応答でキャッシュを上書きしない
    pub sequence_guard: bool,
}

/// ログ出力先
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig {
    /// JSONL の出力先（未設定ならファイルには出さない）
    pub path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            jobs_table: "jobs".to_string(),
            favorites_table: "favorites".to_string(),
            companies_table: "companies".to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_entries: DEFAULT_MAX_ENTRIES,
            sequence_guard: false,
        }
    }
}

impl Default for JobSearchConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            cache: CacheConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl StoreConfig {
    /// API キーを環境変数から読む
    pub fn api_key(&self, env: &dyn EnvResolver) -> Result<String, Error> {
        env.var(&self.api_key_env).ok_or_else(|| {
            Error::config(format!(
                "{} environment variable is not set",
                self.api_key_env
            ))
        })
    }
}

// --- serde 用の内部構造（全項目省略可）

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigRaw {
    store: StoreConfigRaw,
    cache: CacheConfigRaw,
    log: LogConfigRaw,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoreConfigRaw {
    base_url: Option<String>,
    api_key_env: Option<String>,
    jobs_table: Option<String>,
    favorites_table: Option<String>,
    companies_table: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CacheConfigRaw {
    ttl_secs: Option<u64>,
    max_entries: Option<usize>,
    sequence_guard: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LogConfigRaw {
    path: Option<PathBuf>,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// JSON 文字列を解決済み設定にする
pub fn parse_config(json: &str) -> Result<JobSearchConfig, Error> {
    let raw: ConfigRaw = serde_json::from_str(json)
        .map_err(|e| Error::config(format!("invalid config: {}", e)))?;
    let d = JobSearchConfig::default();

    let cache = CacheConfig {
        ttl: raw.cache.ttl_secs.map(Duration::from_secs).unwrap_or(d.cache.ttl),
        max_entries: raw.cache.max_entries.unwrap_or(d.cache.max_entries),
        sequence_guard: raw.cache.sequence_guard.unwrap_or(d.cache.sequence_guard),
    };
    if cache.ttl.is_zero() {
        return Err(Error::config("cache.ttl_secs must be greater than 0"));
    }
    if cache.max_entries == 0 {
        return Err(Error::config("cache.max_entries must be greater than 0"));
    }

    Ok(JobSearchConfig {
        store: StoreConfig {
            base_url: non_empty(raw.store.base_url),
            api_key_env: non_empty(raw.store.api_key_env).unwrap_or(d.store.api_key_env),
            jobs_table: non_empty(raw.store.jobs_table).unwrap_or(d.store.jobs_table),
            favorites_table: non_empty(raw.store.favorites_table)
                .unwrap_or(d.store.favorites_table),
            companies_table: non_empty(raw.store.companies_table)
                .unwrap_or(d.store.companies_table),
            timeout: raw
                .store
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(d.store.timeout),
        },
        cache,
        log: LogConfig { path: raw.log.path },
    })
}

/// 設定ファイルのパスを決める（明示指定が最優先）
pub fn resolve_config_path(
    explicit: Option<&Path>,
    env: &dyn EnvResolver,
) -> Result<(PathBuf, bool), Error> {
    if let Some(p) = explicit {
        return Ok((p.to_path_buf(), true));
    }
    let home = env.resolve_home_dir()?;
    Ok((home.join(CONFIG_FILENAME), false))
}

/// 設定を読み込み、環境変数の上書きを適用する
pub fn load_config(explicit: Option<&Path>, env: &dyn EnvResolver) -> Result<JobSearchConfig, Error> {
    let mut config = match resolve_config_path(explicit, env) {
        Ok((path, required)) => match std::fs::read_to_string(&path) {
            Ok(s) => parse_config(&s)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                JobSearchConfig::default()
            }
            Err(e) => {
                return Err(Error::config(format!("{}: {}", path.display(), e)));
            }
        },
        // HOME 不明でも環境変数だけで動けるようにする
        Err(_) => JobSearchConfig::default(),
    };
    if let Some(url) = env.var(STORE_URL_ENV) {
        config.store.base_url = Some(url);
    }
    Ok(config)
}
