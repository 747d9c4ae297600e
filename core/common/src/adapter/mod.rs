//! アダプター（外界の I/O を trait で抽象化）
//!
//! usecase はポート trait 経由でのみ時刻・ログ・環境変数に触れる。
//! 実装は標準実装（Std*）やテスト用の実装（ManualClock / MapEnvResolver / NoopLog）を注入する。

pub mod file_json_log;
pub mod human_log_sink;
pub mod manual_clock;
pub mod std_clock;
pub mod std_env_resolver;

pub use file_json_log::{FileJsonLog, NoopLog};
pub use human_log_sink::StderrLog;
pub use manual_clock::ManualClock;
pub use std_clock::StdClock;
pub use std_env_resolver::{MapEnvResolver, StdEnvResolver};
