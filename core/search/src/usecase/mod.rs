//! ユースケース層（ポート経由でのみ外界に触れる）

pub mod cache;
pub mod executor;
pub mod favorite;
pub mod search;

pub use cache::{CachePolicy, CacheStats, ResultCache};
pub use favorite::FavoriteOverlay;
pub use search::SearchUseCase;
