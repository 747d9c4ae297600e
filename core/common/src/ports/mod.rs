//! Ports & Adapters のポート定義
//!
//! - inbound: なし（common はライブラリのためアプリの入り口を持たない）
//! - outbound: アプリが外界（時刻・ログ・環境変数）を使うための trait

pub mod outbound;
