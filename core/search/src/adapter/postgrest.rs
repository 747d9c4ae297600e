//! PostgREST（Supabase 互換）HTTP ストア
//!
//! 述語を `and=(...)` / `or=(...)` の論理ツリーパラメータに変換して jobs テーブルを検索し、
//! favorites テーブルでお気に入りを読み書きする。HTTP は reqwest の blocking クライアント。

use crate::domain::{Condition, JobRecord, Predicate, StoreError};
use crate::ports::outbound::{FavoriteStore, JobStore, Window};
use common::domain::{JobId, UserId};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

/// 企業の表示用項目だけを結合する select
const JOB_SELECT: &str = "*,company:{companies}(name,logo_url)";

/// 接続設定（wiring で設定ファイルと環境変数から組み立てる）
#[derive(Debug, Clone)]
pub struct PostgrestConfig {
    pub base_url: String,
    pub api_key: String,
    pub jobs_table: String,
    pub favorites_table: String,
    pub companies_table: String,
    pub timeout: Duration,
}

/// PostgREST への HTTP ストア
pub struct PostgrestStore {
    client: Client,
    config: PostgrestConfig,
}

impl PostgrestStore {
    pub fn new(config: PostgrestConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Unavailable(format!("HTTP client init failed: {}", e)))?;
        Ok(Self { client, config })
    }

    fn table_url(&self, table: &str) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            table
        )
    }

    fn authed(&self, rb: RequestBuilder) -> RequestBuilder {
        rb.header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    fn send(&self, rb: RequestBuilder) -> Result<Response, StoreError> {
        let response = self.authed(rb).send().map_err(|e| {
            if e.is_connect() || e.is_builder() {
                StoreError::Unavailable(format!("HTTP request failed: {}", e))
            } else {
                StoreError::Query(format!("HTTP request failed: {}", e))
            }
        })?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(classify_status(status, &body))
    }
}

/// HTTP ステータスをストアエラーに分類する（認証・テーブル不在は設定不備扱い）
fn classify_status(status: StatusCode, body: &str) -> StoreError {
    let message = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(v) => v["message"]
            .as_str()
            .map(|s| format!("HTTP {}: {}", status, s))
            .unwrap_or_else(|| format!("HTTP {}: {}", status, body)),
        Err(_) => format!("HTTP {}: {}", status, body),
    };
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
            StoreError::Unavailable(message)
        }
        _ => StoreError::Query(message),
    }
}

/// `Content-Range: 0-9/23` の総数部分（`*/0` も可）
pub fn parse_content_range(value: &str) -> Option<u64> {
    value.rsplit('/').next()?.trim().parse().ok()
}

/// 論理ツリー内の値をダブルクォートで囲む（`,.:()` 等の予約文字対策）
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// ilike の部分一致パターン。`*` はワイルドカードなので落とし、`%` `_` はエスケープする。
fn like_pattern(needle: &str) -> String {
    let escaped: String = needle
        .chars()
        .filter(|c| *c != '*')
        .flat_map(|c| match c {
            '%' | '_' => vec!['\\', c],
            _ => vec![c],
        })
        .collect();
    quote(&format!("*{}*", escaped))
}

fn render_condition(c: &Condition) -> String {
    match c {
        Condition::ILike { field, needle } => {
            format!("{}.ilike.{}", field.column(), like_pattern(needle))
        }
        Condition::Eq { field, value } => format!("{}.eq.{}", field.column(), quote(value)),
        Condition::Contains { field, value } => {
            format!("{}.cs.{{{}}}", field.column(), quote(value))
        }
        Condition::Gte { field, value } => format!("{}.gte.{}", field.column(), value),
    }
}

fn render_node(p: &Predicate) -> String {
    match p {
        // 空の AND は常に真、空の OR は常に偽（id は主キーなので null にならない）
        Predicate::All(children) if children.is_empty() => "id.not.is.null".to_string(),
        Predicate::Any(children) if children.is_empty() => "id.is.null".to_string(),
        Predicate::All(children) => format!("and({})", join(children)),
        Predicate::Any(children) => format!("or({})", join(children)),
        Predicate::Cond(c) => render_condition(c),
    }
}

fn join(children: &[Predicate]) -> String {
    children
        .iter()
        .map(render_node)
        .collect::<Vec<_>>()
        .join(",")
}

/// 述語をトップレベルのクエリパラメータに変換する。常に真なら None。
pub fn render_filter(p: &Predicate) -> Option<(&'static str, String)> {
    match p {
        Predicate::All(children) if children.is_empty() => None,
        Predicate::All(children) => Some(("and", format!("({})", join(children)))),
        Predicate::Any(children) => Some(("or", format!("({})", join(children)))),
        Predicate::Cond(c) => Some(("and", format!("({})", render_condition(c)))),
    }
}

impl JobStore for PostgrestStore {
    fn count(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        let mut query: Vec<(&str, String)> = vec![("select", "id".to_string())];
        query.extend(render_filter(predicate));
        let rb = self
            .client
            .head(self.table_url(&self.config.jobs_table))
            .query(&query)
            .header("Prefer", "count=exact")
            .header("Range-Unit", "items")
            .header("Range", "0-0");
        let response = self.send(rb)?;
        response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| StoreError::Decode("missing or invalid Content-Range".to_string()))
    }

    fn fetch_window(
        &self,
        predicate: &Predicate,
        window: Window,
    ) -> Result<Vec<JobRecord>, StoreError> {
        let select = JOB_SELECT.replace("{companies}", &self.config.companies_table);
        let mut query: Vec<(&str, String)> = vec![
            ("select", select),
            ("order", "created_at.desc".to_string()),
            ("offset", window.offset.to_string()),
            ("limit", window.limit.to_string()),
        ];
        query.extend(render_filter(predicate));
        let rb = self
            .client
            .get(self.table_url(&self.config.jobs_table))
            .query(&query);
        self.send(rb)?
            .json::<Vec<JobRecord>>()
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct FavoriteRow {
    job_id: JobId,
}

impl FavoriteStore for PostgrestStore {
    fn fetch_favorites(&self, ids: &[JobId], user: &UserId) -> Result<HashSet<JobId>, StoreError> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }
        let in_list = ids.iter().map(|id| quote(id)).collect::<Vec<_>>().join(",");
        let rb = self
            .client
            .get(self.table_url(&self.config.favorites_table))
            .query(&[
                ("select", "job_id".to_string()),
                ("user_id", format!("eq.{}", user)),
                ("job_id", format!("in.({})", in_list)),
            ]);
        let rows = self
            .send(rb)?
            .json::<Vec<FavoriteRow>>()
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(rows.into_iter().map(|r| r.job_id).collect())
    }

    fn add_favorite(&self, id: &JobId, user: &UserId) -> Result<(), StoreError> {
        let rb = self
            .client
            .post(self.table_url(&self.config.favorites_table))
            .header("Prefer", "return=minimal")
            .json(&serde_json::json!({ "user_id": user, "job_id": id }));
        match self.send(rb) {
            Ok(_) => Ok(()),
            // 既に登録済み（一意制約違反）は成功とみなす
            Err(StoreError::Query(msg)) if msg.starts_with("HTTP 409") => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn remove_favorite(&self, id: &JobId, user: &UserId) -> Result<(), StoreError> {
        let rb = self
            .client
            .delete(self.table_url(&self.config.favorites_table))
            .query(&[
                ("user_id", format!("eq.{}", user)),
                ("job_id", format!("eq.{}", id)),
            ]);
        self.send(rb).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{build_predicate, normalize};
    use serde_json::json;

    #[test]
    fn test_render_filter_for_typical_spec() {
        let spec = normalize(&json!({
            "keyword": "engineer",
            "location": ["東京都"],
            "industries": ["IT", "金融"],
            "salaryMin": 500,
        }))
        .spec;
        let (key, value) = render_filter(&build_predicate(&spec)).unwrap();
        assert_eq!(key, "and");
        assert_eq!(
            value,
            "(or(title.ilike.\"*engineer*\",description.ilike.\"*engineer*\"),\
             or(location.cs.{\"東京都\"}),\
             or(industry.eq.\"IT\",industry.eq.\"金融\"),\
             salary_min.gte.500)"
        );
    }

    #[test]
    fn test_render_filter_always_true_is_none() {
        assert!(render_filter(&Predicate::always()).is_none());
    }

    #[test]
    fn test_like_pattern_escapes() {
        assert_eq!(like_pattern("100%_a*b"), "\"*100\\\\%\\\\_ab*\"");
        assert_eq!(quote("a\"b"), "\"a\\\"b\"");
    }

    #[test]
    fn test_parse_content_range() {
        assert_eq!(parse_content_range("0-0/23"), Some(23));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-9/*"), None);
    }

    #[test]
    fn test_classify_status() {
        let e = classify_status(StatusCode::UNAUTHORIZED, r#"{"message":"JWT expired"}"#);
        assert_eq!(e, StoreError::Unavailable("HTTP 401 Unauthorized: JWT expired".to_string()));
        let e = classify_status(StatusCode::INTERNAL_SERVER_ERROR, "oops");
        assert!(matches!(e, StoreError::Query(m) if m.contains("oops")));
    }
}
