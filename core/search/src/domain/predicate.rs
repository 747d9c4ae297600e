//! 検索述語（ファセットごとの OR グループを AND で結合）
//!
//! 述語はストア非依存の木として組み立て、アダプターが SQL / PostgREST 等に変換する。
//! インメモリ実装向けに `matches` で直接評価もできる。

use super::filter_spec::FilterSpec;
use super::job::JobRecord;

/// 述語が参照する求人の列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobField {
    Title,
    Description,
    Location,
    Industry,
    JobType,
    AppealPoints,
    SalaryMin,
}

impl JobField {
    /// jobs テーブルの列名
    pub fn column(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Location => "location",
            Self::Industry => "industry",
            Self::JobType => "job_type",
            Self::AppealPoints => "appeal_points",
            Self::SalaryMin => "salary_min",
        }
    }
}

/// 末端の条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// 大文字小文字を区別しない部分一致
    ILike { field: JobField, needle: String },
    /// スカラー列の完全一致
    Eq { field: JobField, value: String },
    /// 配列列が要素を含む
    Contains { field: JobField, value: String },
    /// 数値列が下限以上
    Gte { field: JobField, value: u64 },
}

/// 述語の木
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// 全て真（空なら常に真）
    All(Vec<Predicate>),
    /// いずれか真
    Any(Vec<Predicate>),
    Cond(Condition),
}

impl Predicate {
    /// 常に真の述語（ファセット未指定）
    pub fn always() -> Self {
        Self::All(Vec::new())
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Self::All(children) if children.is_empty())
    }

    /// レコードに対して直接評価する
    pub fn matches(&self, record: &JobRecord) -> bool {
        match self {
            Self::All(children) => children.iter().all(|p| p.matches(record)),
            Self::Any(children) => children.iter().any(|p| p.matches(record)),
            Self::Cond(c) => condition_matches(c, record),
        }
    }
}

fn scalar<'a>(record: &'a JobRecord, field: JobField) -> Option<&'a str> {
    match field {
        JobField::Title => record.title.as_deref(),
        JobField::Description => record.description.as_deref(),
        JobField::Industry => record.industry.as_deref(),
        JobField::JobType => record.job_type.as_deref(),
        _ => None,
    }
}

fn list(record: &JobRecord, field: JobField) -> &[String] {
    match field {
        JobField::Location => &record.location,
        JobField::AppealPoints => &record.appeal_points,
        _ => &[],
    }
}

fn condition_matches(c: &Condition, record: &JobRecord) -> bool {
    match c {
        Condition::ILike { field, needle } => scalar(record, *field)
            .map(|s| s.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(false),
        Condition::Eq { field, value } => scalar(record, *field) == Some(value.as_str()),
        Condition::Contains { field, value } => list(record, *field).iter().any(|v| v == value),
        Condition::Gte { field, value } => match field {
            JobField::SalaryMin => record
                .salary_min
                .map(|m| m >= 0 && m as u64 >= *value)
                .unwrap_or(false),
            _ => false,
        },
    }
}

/// 値の集合を 1 つの OR グループにする（空なら None = 条件なし）
fn any_of<'a>(
    values: impl IntoIterator<Item = &'a String>,
    to_cond: impl Fn(String) -> Condition,
) -> Option<Predicate> {
    let children: Vec<Predicate> = values
        .into_iter()
        .map(|v| Predicate::Cond(to_cond(v.clone())))
        .collect();
    if children.is_empty() {
        None
    } else {
        Some(Predicate::Any(children))
    }
}

/// FilterSpec から述語を組み立てる
///
/// - keyword: タイトル または 説明 の部分一致
/// - location / appealPoints: 配列列がいずれかの値を含む
/// - industries / jobTypes: いずれかの値と一致
/// - salaryMinFloor: salary_min ≥ 下限（指定時のみ）
pub fn build_predicate(spec: &FilterSpec) -> Predicate {
    let mut groups: Vec<Predicate> = Vec::new();

    if !spec.keyword().is_empty() {
        let needle = spec.keyword().to_string();
        groups.push(Predicate::Any(vec![
            Predicate::Cond(Condition::ILike {
                field: JobField::Title,
                needle: needle.clone(),
            }),
            Predicate::Cond(Condition::ILike {
                field: JobField::Description,
                needle,
            }),
        ]));
    }
    groups.extend(any_of(spec.location(), |value| Condition::Contains {
        field: JobField::Location,
        value,
    }));
    groups.extend(any_of(spec.industries(), |value| Condition::Eq {
        field: JobField::Industry,
        value,
    }));
    groups.extend(any_of(spec.job_types(), |value| Condition::Eq {
        field: JobField::JobType,
        value,
    }));
    groups.extend(any_of(spec.appeal_points(), |value| Condition::Contains {
        field: JobField::AppealPoints,
        value,
    }));
    if let Some(floor) = spec.salary_min_floor() {
        groups.push(Predicate::Cond(Condition::Gte {
            field: JobField::SalaryMin,
            value: floor,
        }));
    }

    Predicate::All(groups)
}
