//! jobsearch: ファセット付き求人検索コア
//!
//! 生の検索条件を FilterSpec に正規化し、TTL 付きキャッシュを経由して
//! 件数とページを並行に取得し、表示用の JobSummary に変換する。
//! お気に入りは楽観的に切り替え、失敗時は元に戻す。

pub mod adapter;
pub mod cli;
pub mod domain;
pub mod ports;
pub mod usecase;
pub mod wiring;
