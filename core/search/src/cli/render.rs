//! 検索結果の表示（テキスト / JSON）

use crate::domain::bookmark::to_query_string;
use crate::domain::{FavoritedJob, SearchOutcome};
use crate::usecase::CacheStats;
use serde::Serialize;
use std::fmt::Write;

/// JSON 出力の形（`items` はお気に入り状態付き）
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeView<'a> {
    query: String,
    items: &'a [FavoritedJob],
    pagination: &'a crate::domain::Pagination,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a crate::domain::SearchFailure>,
}

pub fn outcome_json(outcome: &SearchOutcome, rows: &[FavoritedJob]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&OutcomeView {
        query: to_query_string(&outcome.spec),
        items: rows,
        pagination: &outcome.page.pagination,
        error: outcome.error.as_ref(),
    })
}

pub fn outcome_text(outcome: &SearchOutcome, rows: &[FavoritedJob]) -> String {
    let mut out = String::new();
    let query = to_query_string(&outcome.spec);
    let _ = writeln!(out, "条件: ?{}", query);

    if let Some(err) = &outcome.error {
        let _ = writeln!(out, "検索に失敗しました: {}", err.message);
        if err.retryable {
            let _ = writeln!(out, "しばらくしてから再試行してください。");
        }
        return out;
    }

    let p = &outcome.page.pagination;
    match p.window() {
        Some(window) => {
            let _ = writeln!(
                out,
                "{} 件中 {}〜{} 件目（{}/{} ページ）",
                p.total,
                window.start(),
                window.end(),
                p.page,
                p.total_pages
            );
        }
        None if p.total == 0 => {
            let _ = writeln!(out, "条件に一致する求人はありません。");
        }
        None => {
            let _ = writeln!(
                out,
                "{} 件中、{} ページ目には求人がありません（全 {} ページ）。",
                p.total, p.page, p.total_pages
            );
        }
    }

    let first = p.window().map(|w| *w.start()).unwrap_or(1);
    for (i, row) in rows.iter().enumerate() {
        let s = &row.summary;
        let star = if row.is_favorite { "★" } else { "☆" };
        let _ = writeln!(out, "{} {}. {} / {} [{}]", star, first + i as u64, s.title, s.company_name, s.id);
        if !s.location.is_empty() {
            let _ = writeln!(out, "     勤務地: {}", s.location.join("・"));
        }
        let _ = writeln!(out, "     給与: {}", s.salary_display);
        let _ = writeln!(out, "     アピール: {}", s.appeal_display.join(" / "));
        if !s.tags.is_empty() {
            let _ = writeln!(out, "     タグ: {}", s.tags.join(", "));
        }
    }
    if p.has_next() {
        let next = outcome.spec.with_page(p.page as i64 + 1);
        let _ = writeln!(out, "次のページ: ?{}", to_query_string(&next));
    }
    out
}

pub fn stats_text(stats: &CacheStats) -> String {
    format!(
        "cache: entries={} hits={} misses={} evictions={} expirations={}",
        stats.entries, stats.hits, stats.misses, stats.evictions, stats.expirations
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{normalize, Pagination, ResultPage, SearchFailure, JobSummary};
    use chrono::{TimeZone, Utc};
    use common::domain::JobId;
    use serde_json::json;

    fn row(id: &str, fav: bool) -> FavoritedJob {
        FavoritedJob {
            summary: JobSummary {
                id: JobId::new(id),
                title: "Rust エンジニア".to_string(),
                company_name: "株式会社テスト".to_string(),
                image_url: None,
                tags: vec![],
                location: vec!["東京都".to_string()],
                salary_display: "500万〜800万".to_string(),
                appeal_display: vec!["リモート可".to_string()],
                created_at: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
            },
            is_favorite: fav,
        }
    }

    #[test]
    fn test_text_shows_window_and_next_page() {
        let spec = normalize(&json!({ "keyword": "rust" })).spec;
        let outcome = SearchOutcome {
            page: ResultPage {
                items: vec![],
                pagination: Pagination::new(1, 10, 23),
            },
            spec,
            error: None,
        };
        let text = outcome_text(&outcome, &[row("a", true), row("b", false)]);
        assert!(text.contains("23 件中 1〜10 件目（1/3 ページ）"));
        assert!(text.contains("★ 1. Rust エンジニア / 株式会社テスト [a]"));
        assert!(text.contains("☆ 2."));
        assert!(text.contains("次のページ: ?keyword=rust&page=2"));
    }

    #[test]
    fn test_text_shows_error_instead_of_empty_list() {
        let spec = normalize(&json!({})).spec;
        let outcome = SearchOutcome {
            page: ResultPage::empty(&spec),
            spec,
            error: Some(SearchFailure {
                message: "count query failed: timeout".to_string(),
                retryable: true,
            }),
        };
        let text = outcome_text(&outcome, &[]);
        assert!(text.contains("検索に失敗しました: count query failed: timeout"));
        assert!(!text.contains("一致する求人はありません"));

        let json: serde_json::Value =
            serde_json::from_str(&outcome_json(&outcome, &[]).unwrap()).unwrap();
        assert_eq!(json["error"]["retryable"], json!(true));
        assert_eq!(json["pagination"]["totalPages"], json!(0));
    }
}
