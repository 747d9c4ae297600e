//! ブックマーク可能な URL クエリとの相互変換
//!
//! 既定値と異なるパラメータだけを次の順で出力する:
//! keyword, location, salaryMin, industries, jobTypes, appealPoints, page。
//! 集合はカンマ結合、エンコードは application/x-www-form-urlencoded。

use super::filter_spec::{FilterSpec, DEFAULT_PAGE};
use super::normalize::{normalize, NormalizationFallback, Normalized};
use reqwest::Url;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

const BASE: &str = "http://localhost/";

/// クエリに出現しうるパラメータ名（これ以外は読み捨てる）
const PARAMS: [&str; 7] = [
    "keyword",
    "location",
    "salaryMin",
    "industries",
    "jobTypes",
    "appealPoints",
    "page",
];

fn joined(set: &BTreeSet<String>) -> String {
    set.iter().cloned().collect::<Vec<_>>().join(",")
}

/// FilterSpec → クエリ文字列（先頭の `?` なし）。全て既定値なら空文字。
pub fn to_query_string(spec: &FilterSpec) -> String {
    let mut pairs: Vec<(&str, String)> = Vec::new();
    if !spec.keyword().is_empty() {
        pairs.push(("keyword", spec.keyword().to_string()));
    }
    if !spec.location().is_empty() {
        pairs.push(("location", joined(spec.location())));
    }
    if let Some(floor) = spec.salary_min_floor() {
        pairs.push(("salaryMin", floor.to_string()));
    }
    if !spec.industries().is_empty() {
        pairs.push(("industries", joined(spec.industries())));
    }
    if !spec.job_types().is_empty() {
        pairs.push(("jobTypes", joined(spec.job_types())));
    }
    if !spec.appeal_points().is_empty() {
        pairs.push(("appealPoints", joined(spec.appeal_points())));
    }
    if spec.page() != DEFAULT_PAGE {
        pairs.push(("page", spec.page().to_string()));
    }
    if pairs.is_empty() {
        return String::new();
    }

    let Ok(mut url) = Url::parse(BASE) else {
        return String::new();
    };
    url.query_pairs_mut().extend_pairs(pairs);
    url.query().unwrap_or_default().to_string()
}

/// クエリ文字列（`?` 付き・URL 全体も可）→ 正規化済み FilterSpec
///
/// パラメータが一つも無ければ既定の条件（1 ページ目）。
pub fn from_query_string(input: &str) -> Normalized {
    let input = input.trim();
    let parsed = if input.starts_with("http://") || input.starts_with("https://") {
        Url::parse(input)
    } else {
        Url::parse(&format!("{}?{}", BASE, input.trim_start_matches('?')))
    };
    let url = match parsed {
        Ok(url) => url,
        Err(e) => {
            let mut n = normalize(&Value::Null);
            n.fallbacks.push(NormalizationFallback {
                field: "*",
                reason: format!("unparsable query string: {}", e),
            });
            return n;
        }
    };

    let mut raw = Map::new();
    for (k, v) in url.query_pairs() {
        if PARAMS.contains(&k.as_ref()) {
            raw.insert(k.into_owned(), Value::String(v.into_owned()));
        }
    }
    normalize(&Value::Object(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_spec_encodes_to_empty() {
        assert_eq!(to_query_string(&FilterSpec::default()), "");
        let n = from_query_string("");
        assert_eq!(n.spec, FilterSpec::default());
    }

    #[test]
    fn test_encoding_order_and_format() {
        let spec = normalize(&json!({
            "page": 2,
            "industries": ["金融", "IT"],
            "keyword": "web engineer",
            "salaryMin": "500万円",
        }))
        .spec;
        assert_eq!(
            to_query_string(&spec),
            "keyword=web+engineer&salaryMin=500&industries=IT%2C%E9%87%91%E8%9E%8D&page=2"
        );
    }

    #[test]
    fn test_page_one_is_omitted() {
        let spec = normalize(&json!({ "keyword": "a", "page": 1 })).spec;
        assert_eq!(to_query_string(&spec), "keyword=a");
    }

    #[test]
    fn test_decode_restores_spec() {
        let spec = normalize(&json!({
            "keyword": "看護師",
            "location": ["東京都", "大阪府"],
            "jobTypes": ["正社員"],
            "appealPoints": ["土日休み"],
            "page": 4,
        }))
        .spec;
        let qs = to_query_string(&spec);
        let back = from_query_string(&format!("?{}", qs));
        assert!(back.fallbacks.is_empty());
        assert_eq!(back.spec, spec);
    }

    #[test]
    fn test_decode_full_url_and_ignore_unknown() {
        let n = from_query_string("https://jobs.example.com/search?keyword=rust&utm_source=x&limit=50");
        assert_eq!(n.spec.keyword(), "rust");
        // limit は URL に含めない契約なので既定値のまま
        assert_eq!(n.spec.limit(), 10);
    }
}
