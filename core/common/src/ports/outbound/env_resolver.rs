//! 環境変数解決 Outbound ポート
//!
//! 設定ディレクトリ・接続先・API キーを環境変数から解決する。
//! wiring / adapter はこの trait 経由でのみ環境変数にアクセスする。

use crate::domain::HomeDir;
use crate::error::Error;

/// 環境変数解決抽象（Outbound ポート）
///
/// 実装は `common::adapter::StdEnvResolver` やテスト用の `MapEnvResolver` など。
pub trait EnvResolver: Send + Sync {
    /// 任意の環境変数を取得する（空文字は未設定扱い）
    fn var(&self, name: &str) -> Option<String>;

    /// 設定ディレクトリを環境変数から解決する
    ///
    /// 優先順位:
    /// 1. JOBSEARCH_HOME（設定されていれば）
    /// 2. $XDG_CONFIG_HOME/jobsearch（XDG_CONFIG_HOME が設定されていれば）
    /// 3. $HOME/.config/jobsearch
    fn resolve_home_dir(&self) -> Result<HomeDir, Error> {
        if let Some(home) = self.var("JOBSEARCH_HOME") {
            return Ok(HomeDir::new(home));
        }
        let config_base = self
            .var("XDG_CONFIG_HOME")
            .map(std::path::PathBuf::from)
            .or_else(|| {
                self.var("HOME")
                    .map(|h| std::path::PathBuf::from(h).join(".config"))
            })
            .ok_or_else(|| Error::config("HOME is not set"))?;
        Ok(HomeDir::new(config_base.join("jobsearch")))
    }
}
