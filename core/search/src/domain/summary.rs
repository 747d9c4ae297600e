//! 結果変換（生レコード → 表示用 JobSummary）
//!
//! 純粋関数のみ。キャッシュヒット時や再試行時にも同じ入力から同じ出力になる。

use super::job::JobRecord;
use chrono::{DateTime, Utc};
use common::domain::JobId;
use serde::{Deserialize, Serialize};

pub const UNTITLED_PREFIX: &str = "求人タイトル未設定";
pub const UNNAMED_COMPANY_PREFIX: &str = "企業名未設定";
pub const SALARY_NEGOTIABLE: &str = "給与応相談";
pub const NO_APPEAL_POINTS: &str = "アピールポイント未設定";
pub const MAX_TAGS: usize = 3;
pub const MAX_APPEAL_POINTS: usize = 3;

/// 一覧表示用の求人（読み取り専用の射影）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub id: JobId,
    pub title: String,
    pub company_name: String,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
    pub location: Vec<String>,
    pub salary_display: String,
    pub appeal_display: Vec<String>,
    pub created_at: DateTime<Utc>,
}

fn present(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn first_present(values: &[String], max: usize) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .take(max)
        .map(str::to_string)
        .collect()
}

/// 給与表示: 上下限とも正なら「<min>万〜<max>万」、なければ給与備考、それもなければ「給与応相談」
pub fn salary_display(min: Option<i64>, max: Option<i64>, note: Option<&str>) -> String {
    match (min, max) {
        (Some(min), Some(max)) if min > 0 && max > 0 => format!("{}万〜{}万", min, max),
        _ => present(note)
            .map(str::to_string)
            .unwrap_or_else(|| SALARY_NEGOTIABLE.to_string()),
    }
}

/// 1 件を変換する。`index` はページ内の 0 始まり位置（プレースホルダーには 1 始まりで出す）。
pub fn to_summary(record: &JobRecord, index: usize) -> JobSummary {
    let ordinal = index + 1;
    let company = record.company.as_ref();

    let title = present(record.title.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} #{}", UNTITLED_PREFIX, ordinal));
    let company_name = present(company.and_then(|c| c.name.as_deref()))
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} #{}", UNNAMED_COMPANY_PREFIX, ordinal));
    let image_url = present(record.image_url.as_deref())
        .or_else(|| present(company.and_then(|c| c.logo_url.as_deref())))
        .map(str::to_string);

    let mut appeal_display = first_present(&record.appeal_points, MAX_APPEAL_POINTS);
    if appeal_display.is_empty() {
        appeal_display.push(NO_APPEAL_POINTS.to_string());
    }

    JobSummary {
        id: record.id.clone(),
        title,
        company_name,
        image_url,
        tags: first_present(&record.tags, MAX_TAGS),
        location: first_present(&record.location, usize::MAX),
        salary_display: salary_display(
            record.salary_min,
            record.salary_max,
            record.salary_note.as_deref(),
        ),
        appeal_display,
        created_at: record.created_at,
    }
}

/// ページ分のレコードを順序を保って変換する
pub fn transform(records: &[JobRecord]) -> Vec<JobSummary> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| to_summary(r, i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job::CompanyRef;
    use chrono::TimeZone;

    fn bare(id: &str) -> JobRecord {
        JobRecord {
            id: JobId::new(id),
            title: None,
            description: None,
            image_url: None,
            tags: vec![],
            location: vec![],
            industry: None,
            job_type: None,
            appeal_points: vec![],
            salary_min: None,
            salary_max: None,
            salary_note: None,
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
            company: None,
        }
    }

    #[test]
    fn test_salary_display_rules() {
        assert_eq!(salary_display(Some(500), Some(800), None), "500万〜800万");
        assert_eq!(salary_display(Some(0), Some(0), None), SALARY_NEGOTIABLE);
        assert_eq!(salary_display(Some(300), None, Some("経験により優遇")), "経験により優遇");
        assert_eq!(salary_display(Some(300), Some(-1), Some("  ")), SALARY_NEGOTIABLE);
        assert_eq!(salary_display(None, None, Some(" 月給25万円〜 ")), "月給25万円〜");
    }

    #[test]
    fn test_placeholders_use_one_based_index() {
        let items = transform(&[bare("a"), bare("b")]);
        assert_eq!(items[0].title, "求人タイトル未設定 #1");
        assert_eq!(items[1].title, "求人タイトル未設定 #2");
        assert_eq!(items[1].company_name, "企業名未設定 #2");
        assert_eq!(items[0].appeal_display, vec![NO_APPEAL_POINTS.to_string()]);
        assert_eq!(items[0].salary_display, SALARY_NEGOTIABLE);
    }

    #[test]
    fn test_lists_are_capped_at_three() {
        let mut r = bare("a");
        r.tags = ["未経験歓迎", "", "週休2日", "賞与あり", "駅近"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        r.appeal_points = r.tags.clone();
        let s = to_summary(&r, 0);
        assert_eq!(s.tags, vec!["未経験歓迎", "週休2日", "賞与あり"]);
        assert_eq!(s.appeal_display.len(), 3);
    }

    #[test]
    fn test_company_fields_and_image_fallback() {
        let mut r = bare("a");
        r.title = Some("  看護師 ".to_string());
        r.company = Some(CompanyRef {
            name: Some("医療法人テスト".to_string()),
            logo_url: Some("https://cdn.example.com/logo.png".to_string()),
        });
        let s = to_summary(&r, 4);
        assert_eq!(s.title, "看護師");
        assert_eq!(s.company_name, "医療法人テスト");
        assert_eq!(s.image_url.as_deref(), Some("https://cdn.example.com/logo.png"));

        r.image_url = Some("https://cdn.example.com/job.png".to_string());
        assert_eq!(
            to_summary(&r, 4).image_url.as_deref(),
            Some("https://cdn.example.com/job.png")
        );
    }

    #[test]
    fn test_deterministic() {
        let r = bare("x");
        assert_eq!(to_summary(&r, 2), to_summary(&r, 2));
    }
}
