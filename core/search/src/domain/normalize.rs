//! 検索条件の正規化（生入力 → FilterSpec）
//!
//! 入力はフォームやブックマーク URL から来る型の緩い JSON。ここでは決して失敗せず、
//! 解釈できない値はそのファセットのゼロ値に落として `NormalizationFallback` を記録する。

use super::filter_spec::{clamp_limit, clamp_page, FilterSpec, DEFAULT_LIMIT, DEFAULT_PAGE};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// 給与下限の「こだわらない」を表すラベル
pub const NO_PREFERENCE: &str = "指定なし";

/// 正規化で採用したフォールバック（致命的ではない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizationFallback {
    pub field: &'static str,
    pub reason: String,
}

impl NormalizationFallback {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// 正規化結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub spec: FilterSpec,
    pub fallbacks: Vec<NormalizationFallback>,
}

fn non_digits() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^0-9]").expect("static regex"))
}

/// 生入力を FilterSpec に正規化する
///
/// オブジェクト以外（配列・文字列など）が来た場合は既定の条件にフォールバックする。
pub fn normalize(raw: &Value) -> Normalized {
    let mut fallbacks = Vec::new();
    let empty = Map::new();
    let obj = match raw {
        Value::Object(map) => map,
        Value::Null => &empty,
        other => {
            fallbacks.push(NormalizationFallback::new(
                "*",
                format!("expected an object, got {}", type_name(other)),
            ));
            &empty
        }
    };

    let spec = FilterSpec {
        keyword: keyword(obj.get("keyword"), &mut fallbacks),
        location: string_set("location", obj.get("location"), &mut fallbacks),
        salary_min_floor: salary_floor(
            obj.get("salaryMin").or_else(|| obj.get("salaryMinFloor")),
            &mut fallbacks,
        ),
        industries: string_set("industries", obj.get("industries"), &mut fallbacks),
        job_types: string_set("jobTypes", obj.get("jobTypes"), &mut fallbacks),
        appeal_points: string_set("appealPoints", obj.get("appealPoints"), &mut fallbacks),
        page: integer("page", obj.get("page"), DEFAULT_PAGE, &mut fallbacks)
            .map(clamp_page)
            .unwrap_or(DEFAULT_PAGE),
        limit: integer("limit", obj.get("limit"), DEFAULT_LIMIT, &mut fallbacks)
            .map(clamp_limit)
            .unwrap_or(DEFAULT_LIMIT),
    };

    Normalized { spec, fallbacks }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn keyword(v: Option<&Value>, fallbacks: &mut Vec<NormalizationFallback>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => {
            fallbacks.push(NormalizationFallback::new(
                "keyword",
                format!("unsupported {}", type_name(other)),
            ));
            String::new()
        }
    }
}

/// 集合ファセット: 配列、またはカンマ区切り文字列を受け付ける
fn string_set(
    field: &'static str,
    v: Option<&Value>,
    fallbacks: &mut Vec<NormalizationFallback>,
) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    match v {
        None | Some(Value::Null) => {}
        Some(Value::String(s)) => {
            out.extend(
                s.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string),
            );
        }
        Some(Value::Array(items)) => {
            for item in items {
                match item {
                    Value::String(s) if !s.trim().is_empty() => {
                        out.insert(s.trim().to_string());
                    }
                    Value::String(_) | Value::Null => {}
                    Value::Number(n) => {
                        out.insert(n.to_string());
                    }
                    other => fallbacks.push(NormalizationFallback::new(
                        field,
                        format!("dropped {} element", type_name(other)),
                    )),
                }
            }
        }
        Some(other) => fallbacks.push(NormalizationFallback::new(
            field,
            format!("unsupported {}", type_name(other)),
        )),
    }
    out
}

/// 給与下限: 「指定なし」は未指定、それ以外は数字以外を取り除いて整数にする
fn salary_floor(v: Option<&Value>, fallbacks: &mut Vec<NormalizationFallback>) -> Option<u64> {
    let text = match v {
        None | Some(Value::Null) => return None,
        Some(Value::Number(n)) => {
            if let Some(u) = n.as_u64() {
                return Some(u);
            }
            n.to_string()
        }
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => {
            fallbacks.push(NormalizationFallback::new(
                "salaryMin",
                format!("unsupported {}", type_name(other)),
            ));
            return None;
        }
    };
    if text.is_empty() || text == NO_PREFERENCE {
        return None;
    }
    let digits = non_digits().replace_all(&text, "");
    match digits.parse::<u64>() {
        Ok(n) => Some(n),
        Err(_) => {
            fallbacks.push(NormalizationFallback::new(
                "salaryMin",
                format!("unparsable value {:?}", text),
            ));
            None
        }
    }
}

/// page / limit: 数値または数値文字列。解釈できなければ既定値（None は未指定）。
fn integer(
    field: &'static str,
    v: Option<&Value>,
    default: u32,
    fallbacks: &mut Vec<NormalizationFallback>,
) -> Option<i64> {
    let parsed = match v {
        None | Some(Value::Null) => return None,
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Some(Value::String(s)) if s.trim().is_empty() => return None,
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    };
    if parsed.is_none() {
        fallbacks.push(NormalizationFallback::new(
            field,
            format!("unparsable value, using default {}", default),
        ));
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trims_and_dedups() {
        let n = normalize(&json!({
            "keyword": "  engineer ",
            "location": ["東京都", " 東京都", "大阪府", ""],
            "industries": "IT, 製造,IT",
        }));
        assert!(n.fallbacks.is_empty());
        assert_eq!(n.spec.keyword(), "engineer");
        assert_eq!(n.spec.location().len(), 2);
        assert_eq!(
            n.spec.industries().iter().cloned().collect::<Vec<_>>(),
            vec!["IT".to_string(), "製造".to_string()]
        );
    }

    #[test]
    fn test_salary_floor_rules() {
        let floor = |v: Value| normalize(&json!({ "salaryMin": v })).spec.salary_min_floor();
        assert_eq!(floor(json!("指定なし")), None);
        assert_eq!(floor(json!("500万円以上")), Some(500));
        assert_eq!(floor(json!("1,200")), Some(1200));
        assert_eq!(floor(json!(300)), Some(300));
        assert_eq!(floor(json!("")), None);
        assert_eq!(floor(json!(null)), None);
    }

    #[test]
    fn test_salary_without_digits_falls_back() {
        let n = normalize(&json!({ "salaryMin": "高め" }));
        assert_eq!(n.spec.salary_min_floor(), None);
        assert_eq!(n.fallbacks.len(), 1);
        assert_eq!(n.fallbacks[0].field, "salaryMin");
    }

    #[test]
    fn test_page_and_limit_defaults_and_clamps() {
        let n = normalize(&json!({}));
        assert_eq!((n.spec.page(), n.spec.limit()), (1, 10));

        let n = normalize(&json!({ "page": 0, "limit": 500 }));
        assert_eq!((n.spec.page(), n.spec.limit()), (1, 50));

        let n = normalize(&json!({ "page": "3", "limit": "0" }));
        assert_eq!((n.spec.page(), n.spec.limit()), (3, 1));

        let n = normalize(&json!({ "page": "abc" }));
        assert_eq!(n.spec.page(), 1);
        assert_eq!(n.fallbacks[0].field, "page");
    }

    #[test]
    fn test_non_object_input_is_default_spec() {
        let n = normalize(&json!(["not", "an", "object"]));
        assert_eq!(n.spec, FilterSpec::default());
        assert_eq!(n.fallbacks.len(), 1);
        assert_eq!(n.fallbacks[0].field, "*");

        let n = normalize(&Value::Null);
        assert_eq!(n.spec, FilterSpec::default());
        assert!(n.fallbacks.is_empty());
    }

    #[test]
    fn test_bad_elements_are_dropped() {
        let n = normalize(&json!({ "jobTypes": ["正社員", {"x": 1}, true], "keyword": ["a"] }));
        assert_eq!(n.spec.job_types().len(), 1);
        assert_eq!(n.spec.keyword(), "");
        assert_eq!(n.fallbacks.len(), 3);
    }

    #[test]
    fn test_idempotent() {
        let inputs = vec![
            json!({}),
            json!({ "keyword": " 看護師 ", "location": "東京都,神奈川県", "salaryMin": "400万〜" }),
            json!({ "industries": ["IT", "IT", "金融"], "page": -1, "limit": 99 }),
            json!({ "appealPoints": [" 土日休み", "リモート可"], "jobTypes": "正社員", "page": "7" }),
            json!("garbage"),
        ];
        for raw in inputs {
            let once = normalize(&raw).spec;
            let twice = normalize(&once.to_raw());
            assert_eq!(twice.spec, once, "input: {}", raw);
            assert_eq!(twice.spec.canonical_key(), once.canonical_key());
            assert!(twice.fallbacks.is_empty());
        }
    }

    #[test]
    fn test_set_order_does_not_change_key() {
        let a = normalize(&json!({ "industries": ["IT", "金融", "製造"] })).spec;
        let b = normalize(&json!({ "industries": ["製造", "IT", "金融"] })).spec;
        assert_eq!(a.canonical_key(), b.canonical_key());
    }
}
