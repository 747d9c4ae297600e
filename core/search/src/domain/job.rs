//! ストアから返る求人レコード（生の行 + 企業の表示用項目）

use chrono::{DateTime, Utc};
use common::domain::JobId;
use serde::{Deserialize, Deserializer, Serialize};

/// null を空配列として読む（PostgREST は未設定の配列列を null で返す）
fn null_as_empty<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(d)?.unwrap_or_default())
}

/// 結合された企業の表示用項目（最小限）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// 求人の生レコード
///
/// 列名は jobs テーブルと一致させる（snake_case）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location: Vec<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub appeal_points: Vec<String>,
    #[serde(default)]
    pub salary_min: Option<i64>,
    #[serde(default)]
    pub salary_max: Option<i64>,
    #[serde(default)]
    pub salary_note: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub company: Option<CompanyRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_postgrest_row_with_nulls() {
        let row = serde_json::json!({
            "id": "j1",
            "title": "Rust エンジニア",
            "tags": null,
            "location": ["東京都"],
            "appeal_points": null,
            "salary_min": 500,
            "salary_max": null,
            "created_at": "2026-01-02T03:04:05Z",
            "company": { "name": "株式会社テスト", "logo_url": null }
        });
        let rec: JobRecord = serde_json::from_value(row).unwrap();
        assert_eq!(&*rec.id, "j1");
        assert!(rec.tags.is_empty());
        assert!(rec.appeal_points.is_empty());
        assert_eq!(rec.location, vec!["東京都".to_string()]);
        assert_eq!(rec.salary_max, None);
        assert_eq!(rec.company.unwrap().name.as_deref(), Some("株式会社テスト"));
    }

    #[test]
    fn test_deserialize_minimal_row() {
        let rec: JobRecord = serde_json::from_str(
            r#"{"id":"j2","created_at":"2026-01-02T03:04:05+09:00"}"#,
        )
        .unwrap();
        assert!(rec.title.is_none());
        assert!(rec.company.is_none());
    }
}
