//! 検索条件のドメイン型（正規化済みの FilterSpec）
//!
//! FilterSpec は `normalize` 経由でしか作れない。外部から来た未検証の値が
//! 述語構築やキャッシュキーに直接届かないようにするため。

use serde::Serialize;
use std::collections::BTreeSet;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MIN_LIMIT: u32 = 1;
pub const MAX_LIMIT: u32 = 50;

/// 正規化済みの検索条件（不変の値オブジェクト）
///
/// 集合ファセットは `BTreeSet` で持つため、重複は除かれ、直列化順は常にソート順になる。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    pub(super) keyword: String,
    pub(super) location: BTreeSet<String>,
    pub(super) salary_min_floor: Option<u64>,
    pub(super) industries: BTreeSet<String>,
    pub(super) job_types: BTreeSet<String>,
    pub(super) appeal_points: BTreeSet<String>,
    pub(super) page: u32,
    pub(super) limit: u32,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            location: BTreeSet::new(),
            salary_min_floor: None,
            industries: BTreeSet::new(),
            job_types: BTreeSet::new(),
            appeal_points: BTreeSet::new(),
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl FilterSpec {
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn location(&self) -> &BTreeSet<String> {
        &self.location
    }

    pub fn salary_min_floor(&self) -> Option<u64> {
        self.salary_min_floor
    }

    pub fn industries(&self) -> &BTreeSet<String> {
        &self.industries
    }

    pub fn job_types(&self) -> &BTreeSet<String> {
        &self.job_types
    }

    pub fn appeal_points(&self) -> &BTreeSet<String> {
        &self.appeal_points
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// ページだけを差し替えた条件を返す（ページ送りは新しい条件として検索し直す）
    pub fn with_page(&self, page: i64) -> Self {
        Self {
            page: clamp_page(page),
            ..self.clone()
        }
    }

    /// 件数だけを差し替えた条件を返す
    pub fn with_limit(&self, limit: i64) -> Self {
        Self {
            limit: clamp_limit(limit),
            ..self.clone()
        }
    }

    /// ファセット（ページ・件数以外）が何も指定されていないか
    pub fn has_no_facets(&self) -> bool {
        self.keyword.is_empty()
            && self.location.is_empty()
            && self.salary_min_floor.is_none()
            && self.industries.is_empty()
            && self.job_types.is_empty()
            && self.appeal_points.is_empty()
    }

    /// キャッシュキーに使う決定的な直列化
    ///
    /// フィールド順は構造体定義順、集合はソート済み。同じ条件なら常に同じバイト列になる。
    pub fn canonical_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }

    /// 生入力（JSON）としての表現。`normalize` に戻すと同じ FilterSpec になる。
    pub fn to_raw(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

pub(super) fn clamp_page(page: i64) -> u32 {
    page.clamp(DEFAULT_PAGE as i64, u32::MAX as i64) as u32
}

pub(super) fn clamp_limit(limit: i64) -> u32 {
    limit.clamp(MIN_LIMIT as i64, MAX_LIMIT as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spec() {
        let spec = FilterSpec::default();
        assert_eq!(spec.page(), 1);
        assert_eq!(spec.limit(), 10);
        assert!(spec.has_no_facets());
    }

    #[test]
    fn test_canonical_key_is_camel_case_and_sorted() {
        let mut spec = FilterSpec::default();
        spec.industries.insert("製造".to_string());
        spec.industries.insert("IT".to_string());
        let key = spec.canonical_key();
        assert!(key.starts_with("{\"keyword\":\"\""));
        assert!(key.contains("\"industries\":[\"IT\",\"製造\"]"));
        assert!(key.contains("\"salaryMinFloor\":null"));
        assert!(key.ends_with("\"page\":1,\"limit\":10}"));
    }

    #[test]
    fn test_with_page_clamps() {
        let spec = FilterSpec::default();
        assert_eq!(spec.with_page(0).page(), 1);
        assert_eq!(spec.with_page(-3).page(), 1);
        assert_eq!(spec.with_page(4).page(), 4);
    }

    #[test]
    fn test_with_limit_clamps() {
        let spec = FilterSpec::default();
        assert_eq!(spec.with_limit(0).limit(), 1);
        assert_eq!(spec.with_limit(51).limit(), 50);
        assert_eq!(spec.with_limit(25).limit(), 25);
    }

    #[test]
    fn test_page_is_part_of_key() {
        let spec = FilterSpec::default();
        assert_ne!(spec.canonical_key(), spec.with_page(2).canonical_key());
    }
}
