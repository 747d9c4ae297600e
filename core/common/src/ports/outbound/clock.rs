//! 時刻取得 Outbound ポート
//!
//! キャッシュの TTL 判定はこの trait 経由で「現在時刻」を取得する。テストでは時刻を手動で進める実装を渡す。

/// 時刻取得の抽象
///
/// 実装は `common::adapter::StdClock` やテスト用の `ManualClock` など。
pub trait Clock: Send + Sync {
    /// 現在時刻をミリ秒（Unix epoch）で返す
    fn now_ms(&self) -> u64;
}
