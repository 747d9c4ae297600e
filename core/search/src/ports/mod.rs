//! Ports & Adapters のポート定義
//!
//! - outbound: 検索コアが外界（求人ストア・お気に入りストア）に依頼するための trait

pub mod outbound;
