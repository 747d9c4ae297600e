//! 標準環境変数解決実装（std::env を委譲）とテスト用の固定マップ実装

use crate::ports::outbound::EnvResolver;
use std::collections::HashMap;
use std::env;

/// 標準環境変数解決実装
#[derive(Debug, Clone, Default)]
pub struct StdEnvResolver;

impl EnvResolver for StdEnvResolver {
    fn var(&self, name: &str) -> Option<String> {
        env::var(name).ok().filter(|s| !s.is_empty())
    }
}

/// 固定のキー・値から引く EnvResolver（テストでプロセス環境を汚さないため）
#[derive(Debug, Clone, Default)]
pub struct MapEnvResolver {
    vars: HashMap<String, String>,
}

impl MapEnvResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_string(), value.to_string());
        self
    }
}

impl EnvResolver for MapEnvResolver {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).filter(|s| !s.is_empty()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_home_dir_prefers_jobsearch_home() {
        let env = MapEnvResolver::new()
            .with("JOBSEARCH_HOME", "/opt/jobsearch")
            .with("HOME", "/home/u");
        let home = env.resolve_home_dir().unwrap();
        assert_eq!(*home, PathBuf::from("/opt/jobsearch"));
    }

    #[test]
    fn test_home_dir_falls_back_to_xdg_then_home() {
        let env = MapEnvResolver::new()
            .with("XDG_CONFIG_HOME", "/xdg")
            .with("HOME", "/home/u");
        assert_eq!(*env.resolve_home_dir().unwrap(), PathBuf::from("/xdg/jobsearch"));

        let env = MapEnvResolver::new().with("HOME", "/home/u");
        assert_eq!(
            *env.resolve_home_dir().unwrap(),
            PathBuf::from("/home/u/.config/jobsearch")
        );
    }

    #[test]
    fn test_home_dir_without_home_is_config_error() {
        let env = MapEnvResolver::new();
        let err = env.resolve_home_dir().unwrap_err();
        assert_eq!(err.exit_code(), 78);
    }

    #[test]
    fn test_empty_value_is_unset() {
        let env = MapEnvResolver::new().with("JOBSEARCH_HOME", "");
        assert!(env.var("JOBSEARCH_HOME").is_none());
    }
}
