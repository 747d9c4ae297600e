//! アダプター（ストア実装と設定ファイル）

pub mod config;
pub mod memory_store;
pub mod postgrest;

pub use config::{load_config, JobSearchConfig};
pub use memory_store::InMemoryStore;
pub use postgrest::{PostgrestConfig, PostgrestStore};
