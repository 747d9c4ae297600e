//! 検索実行（件数クエリとデータクエリを並行に発行し、両方を待つ）
//!
//! どちらかが失敗すれば検索全体が失敗する。部分結果は返さない。

use crate::domain::{JobRecord, Predicate, QueryStage, SearchError, StoreError};
use crate::ports::outbound::{JobStore, Window};
use std::thread;

/// 変換前の取得結果
#[derive(Debug, Clone, PartialEq)]
pub struct RawPage {
    pub total: u64,
    pub records: Vec<JobRecord>,
}

fn joined<T>(
    stage: QueryStage,
    result: thread::Result<Result<T, StoreError>>,
) -> Result<T, SearchError> {
    match result {
        Ok(r) => r.map_err(|e| SearchError::from_store(stage, e)),
        Err(_) => Err(SearchError::StoreQuery {
            stage,
            message: "query thread panicked".to_string(),
        }),
    }
}

/// 述語と (page, limit) で 1 ページ分を取得する
pub fn execute(
    store: &dyn JobStore,
    predicate: &Predicate,
    page: u32,
    limit: u32,
) -> Result<RawPage, SearchError> {
    let window = Window::for_page(page, limit);
    let (count, data) = thread::scope(|s| {
        let count = s.spawn(|| store.count(predicate));
        let data = s.spawn(|| store.fetch_window(predicate, window));
        (count.join(), data.join())
    });
    let total = joined(QueryStage::Count, count)?;
    let records = joined(QueryStage::Data, data)?;
    Ok(RawPage { total, records })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::{channel, Receiver, Sender};
    use std::sync::Mutex;
    use std::time::Duration;

    /// 件数・データの片方だけ失敗させるストア
    struct FailingStore {
        count: Result<u64, StoreError>,
        data: Result<Vec<JobRecord>, StoreError>,
    }

    impl JobStore for FailingStore {
        fn count(&self, _p: &Predicate) -> Result<u64, StoreError> {
            self.count.clone()
        }
        fn fetch_window(&self, _p: &Predicate, _w: Window) -> Result<Vec<JobRecord>, StoreError> {
            self.data.clone()
        }
    }

    #[test]
    fn test_count_failure_fails_whole_search() {
        let store = FailingStore {
            count: Err(StoreError::Query("timeout".into())),
            data: Ok(vec![]),
        };
        let err = execute(&store, &Predicate::always(), 1, 10).unwrap_err();
        assert_eq!(
            err,
            SearchError::StoreQuery {
                stage: QueryStage::Count,
                message: "timeout".into()
            }
        );
    }

    #[test]
    fn test_data_failure_fails_whole_search() {
        let store = FailingStore {
            count: Ok(3),
            data: Err(StoreError::Decode("bad json".into())),
        };
        let err = execute(&store, &Predicate::always(), 1, 10).unwrap_err();
        assert!(matches!(err, SearchError::StoreQuery { stage: QueryStage::Data, .. }));
    }

    #[test]
    fn test_unavailable_is_configuration_error() {
        let store = FailingStore {
            count: Err(StoreError::Unavailable("no url".into())),
            data: Ok(vec![]),
        };
        let err = execute(&store, &Predicate::always(), 1, 10).unwrap_err();
        assert!(!err.is_retryable());
    }

    /// 件数とデータが互いの到着を待つストア（逐次実行だとタイムアウトする）
    struct RendezvousStore {
        to_data: Mutex<Sender<()>>,
        from_count: Mutex<Receiver<()>>,
        to_count: Mutex<Sender<()>>,
        from_data: Mutex<Receiver<()>>,
    }

    impl JobStore for RendezvousStore {
        fn count(&self, _p: &Predicate) -> Result<u64, StoreError> {
            let _ = self.to_data.lock().unwrap().send(());
            self.from_data
                .lock()
                .unwrap()
                .recv_timeout(Duration::from_secs(5))
                .map(|_| 7)
                .map_err(|_| StoreError::Query("data query never started".into()))
        }
        fn fetch_window(&self, _p: &Predicate, w: Window) -> Result<Vec<JobRecord>, StoreError> {
            assert_eq!(w, Window { offset: 10, limit: 10 });
            let _ = self.to_count.lock().unwrap().send(());
            self.from_count
                .lock()
                .unwrap()
                .recv_timeout(Duration::from_secs(5))
                .map(|_| vec![])
                .map_err(|_| StoreError::Query("count query never started".into()))
        }
    }

    #[test]
    fn test_queries_run_concurrently() {
        let (to_data, from_count) = channel();
        let (to_count, from_data) = channel();
        let store = RendezvousStore {
            to_data: Mutex::new(to_data),
            from_count: Mutex::new(from_count),
            to_count: Mutex::new(to_count),
            from_data: Mutex::new(from_data),
        };
        let raw = execute(&store, &Predicate::always(), 2, 10).unwrap();
        assert_eq!(raw.total, 7);
        assert!(raw.records.is_empty());
    }
}
