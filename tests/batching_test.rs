//! Batch loader properties exercised through the public API
//!
//! These tests use counting executors instead of a database: the
//! properties under test are about how many times a group executes and
//! which slice each member receives, not about SQL.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use libris_api::config::BatchConfig;
use libris_api::error::ApiResult;
use libris_api::loader::{
    BatchLoader, GroupExecutor, GroupResult, LoadMember, LoadRequest, LoadSlice,
};
use libris_api::models::Review;
use libris_api::ApiError;

fn review(id: i64, book_id: i64) -> Review {
    Review {
        id,
        book_id,
        star: 4,
        text: format!("review {}", id),
    }
}

/// Counts executions, records member order, serves fixed rows.
struct CountingExecutor {
    calls: AtomicUsize,
    member_lists: Mutex<Vec<Vec<Option<i64>>>>,
    rows: Vec<Review>,
}

impl CountingExecutor {
    fn new(rows: Vec<Review>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            member_lists: Mutex::new(Vec::new()),
            rows,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GroupExecutor for CountingExecutor {
    async fn execute(&self, members: &[LoadMember]) -> ApiResult<GroupResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.member_lists
            .lock()
            .unwrap()
            .push(members.iter().map(|m| m.parent_id).collect());
        Ok(GroupResult::Reviews(self.rows.clone()))
    }

    fn distribute(&self, member: &LoadMember, group: &GroupResult) -> ApiResult<LoadSlice> {
        let GroupResult::Reviews(rows) = group else {
            return Err(ApiError::Internal("wrong variant".to_string()));
        };
        Ok(LoadSlice::Reviews(
            rows.iter()
                .filter(|r| Some(r.book_id) == member.parent_id)
                .cloned()
                .collect(),
        ))
    }
}

fn request(
    identity: &str,
    signature: Option<&str>,
    parent: Option<i64>,
    executor: Arc<CountingExecutor>,
) -> LoadRequest {
    LoadRequest {
        identity_key: identity.to_string(),
        group_signature: signature.map(str::to_string),
        member: LoadMember { parent_id: parent },
        executor,
    }
}

fn loader() -> Arc<BatchLoader> {
    Arc::new(BatchLoader::new(BatchConfig {
        window: Duration::from_millis(20),
        max_batch: 64,
    }))
}

/// Property 1: equal identity keys within one request execute once and
/// observe the same outcome, even when submitted from concurrent tasks.
#[tokio::test]
async fn single_flight_per_identity_under_concurrency() {
    let loader = loader();
    let executor = CountingExecutor::new(vec![review(1, 7)]);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let loader = Arc::clone(&loader);
        let executor = Arc::clone(&executor);
        handles.push(tokio::spawn(async move {
            loader
                .load(request("same-key", Some("sig"), Some(7), executor))
                .await
        }));
    }
    for handle in handles {
        let slice = handle.await.unwrap().unwrap();
        let LoadSlice::Reviews(rows) = slice else {
            panic!("expected reviews");
        };
        assert_eq!(rows.len(), 1);
    }
    assert_eq!(executor.calls(), 1);
}

/// Property 2: equal signatures coalesce; the executor sees the ordered
/// union of member parent ids.
#[tokio::test]
async fn group_coalescing_unions_parent_ids() {
    let loader = loader();
    let executor = CountingExecutor::new(vec![review(1, 1), review(2, 2), review(3, 3)]);

    let rx1 = loader.submit(request("k1", Some("sig"), Some(1), executor.clone()));
    let rx2 = loader.submit(request("k2", Some("sig"), Some(2), executor.clone()));
    let rx3 = loader.submit(request("k3", Some("sig"), Some(3), executor.clone()));
    rx1.await.unwrap().unwrap();
    rx2.await.unwrap().unwrap();
    rx3.await.unwrap().unwrap();

    assert_eq!(executor.calls(), 1);
    assert_eq!(
        executor.member_lists.lock().unwrap()[0],
        vec![Some(1), Some(2), Some(3)]
    );
}

/// Property 3: a nil signature (how paginated statements arrive from the
/// shaper) forbids merging; N submissions produce N executions.
#[tokio::test]
async fn no_merge_without_signature() {
    let loader = loader();
    let executor = CountingExecutor::new(vec![review(1, 1)]);

    let rx1 = loader.submit(request("k1", None, Some(1), executor.clone()));
    let rx2 = loader.submit(request("k2", None, Some(1), executor.clone()));
    let rx3 = loader.submit(request("k3", None, Some(1), executor.clone()));
    rx1.await.unwrap().unwrap();
    rx2.await.unwrap().unwrap();
    rx3.await.unwrap().unwrap();

    assert_eq!(executor.calls(), 3);
}

/// Property 4: each member's future resolves with exactly the rows whose
/// parent id matches, in their original row order.
#[tokio::test]
async fn distribute_selects_member_rows_in_row_order() {
    let loader = loader();
    let rows = vec![
        review(10, 1),
        review(11, 2),
        review(12, 1),
        review(13, 3),
        review(14, 1),
    ];
    let executor = CountingExecutor::new(rows);

    let rx1 = loader.submit(request("k1", Some("sig"), Some(1), executor.clone()));
    let rx2 = loader.submit(request("k2", Some("sig"), Some(2), executor.clone()));
    let rx3 = loader.submit(request("k3", Some("sig"), Some(3), executor.clone()));

    let ids = |slice: LoadSlice| -> Vec<i64> {
        let LoadSlice::Reviews(rows) = slice else {
            panic!("expected reviews");
        };
        rows.iter().map(|r| r.id).collect()
    };
    assert_eq!(ids(rx1.await.unwrap().unwrap()), vec![10, 12, 14]);
    assert_eq!(ids(rx2.await.unwrap().unwrap()), vec![11]);
    assert_eq!(ids(rx3.await.unwrap().unwrap()), vec![13]);
}

/// Property 5: cancelling before the window expires resolves every pending
/// future with `cancelled` and never executes.
#[tokio::test]
async fn cancellation_before_dispatch_executes_nothing() {
    let loader = Arc::new(BatchLoader::new(BatchConfig {
        window: Duration::from_millis(200),
        max_batch: 64,
    }));
    let executor = CountingExecutor::new(Vec::new());

    let rx1 = loader.submit(request("k1", Some("sig"), Some(1), executor.clone()));
    let rx2 = loader.submit(request("k2", None, Some(2), executor.clone()));
    loader.cancel();

    assert!(matches!(*rx1.await.unwrap().unwrap_err(), ApiError::Cancelled));
    assert!(matches!(*rx2.await.unwrap().unwrap_err(), ApiError::Cancelled));

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(executor.calls(), 0);
}

/// Group errors broadcast: every member of a failing group receives the
/// same error; members of other groups are unaffected.
#[tokio::test]
async fn group_error_broadcasts_without_poisoning_other_groups() {
    struct Failing;

    #[async_trait]
    impl GroupExecutor for Failing {
        async fn execute(&self, _members: &[LoadMember]) -> ApiResult<GroupResult> {
            Err(ApiError::Internal("query exploded".to_string()))
        }

        fn distribute(&self, _member: &LoadMember, _group: &GroupResult) -> ApiResult<LoadSlice> {
            Ok(LoadSlice::Reviews(Vec::new()))
        }
    }

    let loader = loader();
    let failing: Arc<dyn GroupExecutor> = Arc::new(Failing);
    let healthy = CountingExecutor::new(vec![review(1, 1)]);

    let rx1 = loader.submit(LoadRequest {
        identity_key: "f1".to_string(),
        group_signature: Some("failing".to_string()),
        member: LoadMember::of_parent(1),
        executor: failing.clone(),
    });
    let rx2 = loader.submit(LoadRequest {
        identity_key: "f2".to_string(),
        group_signature: Some("failing".to_string()),
        member: LoadMember::of_parent(2),
        executor: failing,
    });
    let rx3 = loader.submit(request("h1", Some("healthy"), Some(1), healthy.clone()));

    let e1 = rx1.await.unwrap().unwrap_err();
    let e2 = rx2.await.unwrap().unwrap_err();
    assert_eq!(e1.to_string(), e2.to_string());
    assert!(rx3.await.unwrap().is_ok());
    assert_eq!(healthy.calls(), 1);
}
