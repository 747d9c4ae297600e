//! jobsearch 共通ライブラリ
//!
//! 検索コア（`jobsearch`）と CLI で共有されるエラー型・ドメイン型・ポート・アダプターを提供します。

/// エラーハンドリング
pub mod error;

/// ドメイン型（Newtype）
pub mod domain;

/// Ports & Adapters のポート定義
pub mod ports;

/// ポートの標準実装
pub mod adapter;
