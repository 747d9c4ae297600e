//! 人間向けログ（LogRecord → stderr へ要点のみ出力）
//!
//! `--verbose` 指定時のみ wiring で有効にする。fields の全量は出さず要点のみ（巨大化防止）。

use crate::ports::outbound::{Log, LogLevel, LogRecord};

const FIELDS_SUMMARY_MAX: usize = 400;

/// fields の要点だけを短い文字列にする
fn fields_summary(record: &LogRecord) -> String {
    let Some(fields) = record.fields.as_ref().filter(|f| !f.is_empty()) else {
        return String::new();
    };
    let s = serde_json::to_string(fields).unwrap_or_default();
    if s.chars().count() <= FIELDS_SUMMARY_MAX {
        return s;
    }
    let truncated = s.chars().take(FIELDS_SUMMARY_MAX).collect::<String>();
    format!("{}... (len={})", truncated, s.len())
}

/// 1 行に整形する（level / kind / message / fields）
pub fn format_line(record: &LogRecord) -> String {
    let kind = record.kind.as_deref().unwrap_or("-");
    let summary = fields_summary(record);
    if summary.is_empty() {
        format!("[{}] {} {}", record.level.as_str(), kind, record.message)
    } else {
        format!(
            "[{}] {} {} {}",
            record.level.as_str(),
            kind,
            record.message,
            summary
        )
    }
}

/// stderr へ整形して出す Log 実装
#[derive(Debug, Clone)]
pub struct StderrLog {
    min_level: LogLevel,
}

impl StderrLog {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }

    fn enabled(&self, level: LogLevel) -> bool {
        rank(level) <= rank(self.min_level)
    }
}

impl Default for StderrLog {
    fn default() -> Self {
        Self::new(LogLevel::Debug)
    }
}

fn rank(level: LogLevel) -> u8 {
    match level {
        LogLevel::Error => 0,
        LogLevel::Warn => 1,
        LogLevel::Info => 2,
        LogLevel::Debug => 3,
    }
}

impl Log for StderrLog {
    fn log(&self, record: &LogRecord) -> anyhow::Result<()> {
        if self.enabled(record.level) {
            eprintln!("{}", format_line(record));
        }
        Ok(())
    }
}
