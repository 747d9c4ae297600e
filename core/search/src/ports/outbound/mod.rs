//! Outbound ポート: 検索コアが外部ストアを使うための trait

pub mod favorite_store;
pub mod job_store;

pub use favorite_store::FavoriteStore;
pub use job_store::{JobStore, Window};
