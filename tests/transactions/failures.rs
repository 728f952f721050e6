//! Failure Handling Tests
//!
//! - Transport errors pass through unclassified
//! - Failed mutations trigger an eager, best-effort discard
//! - Cleanup failures never shadow the original error
//! - Start timestamp mismatches invalidate the transaction atomically

use crate::common::*;
use meridian::{CleanupOutcome, Client, Error, RpcError, StatusCode, StubPool};
use std::time::Duration;

#[tokio::test]
async fn deadline_on_query_passes_through_and_keeps_flags() {
    let (cluster, nodes) = mock_nodes(1);
    let client = Client::new(
        StubPool::with_endpoints(endpoints_for(&nodes)).with_deadline(Duration::from_millis(20)),
    );
    let mut txn = client.new_transaction();
    txn.mutate(set("<0x1>", "name", "A")).await.unwrap();
    cluster.faults.lock().query_delay = Some(Duration::from_millis(200));

    let err = txn.query("{ q }").await.unwrap_err();

    match err {
        Error::Transport(RpcError { code, .. }) => assert_eq!(code, StatusCode::DeadlineExceeded),
        other => panic!("expected transport error, got {:?}", other),
    }
    assert!(txn.is_mutated());
    assert!(!txn.is_finished());
    assert!(cluster.aborts().is_empty());

    // The caller still owns cleanup
    txn.discard().await;
    assert_eq!(cluster.aborts(), vec![txn.start_ts()]);
}

#[tokio::test]
async fn deadline_on_query_leaves_transaction_usable() {
    let (cluster, nodes) = mock_nodes(1);
    let client = Client::new(
        StubPool::with_endpoints(endpoints_for(&nodes)).with_deadline(Duration::from_millis(20)),
    );
    let mut txn = client.new_transaction();

    cluster.faults.lock().query_delay = Some(Duration::from_millis(200));
    assert!(matches!(
        txn.query("{ q }").await.unwrap_err(),
        Error::Transport(_)
    ));

    cluster.faults.lock().query_delay = None;
    txn.query("{ q }").await.unwrap();
    txn.mutate(set("<0x1>", "name", "A")).await.unwrap();
    txn.commit().await.unwrap();
}

#[tokio::test]
async fn failed_mutation_discards_eagerly() {
    let (client, cluster, _nodes) = mock_client(1);
    let mut txn = client.new_transaction();
    txn.mutate(set("<0x1>", "name", "A")).await.unwrap();
    let start_ts = txn.start_ts();
    cluster.faults.lock().mutate = Some(RpcError::unavailable("connection reset"));

    let err = txn.mutate(set("<0x2>", "name", "B")).await.unwrap_err();

    assert_eq!(
        err,
        Error::Transport(RpcError::unavailable("connection reset"))
    );
    assert_eq!(cluster.aborts(), vec![start_ts]);
    assert_eq!(txn.last_cleanup(), Some(&CleanupOutcome::Completed));
    assert!(txn.is_finished());

    // Cleanup code can still discard unconditionally
    txn.discard().await;
    assert_eq!(cluster.aborts().len(), 1);
}

#[tokio::test]
async fn cleanup_failure_does_not_shadow_original_error() {
    let (client, cluster, _nodes) = mock_client(1);
    let mut txn = client.new_transaction();
    txn.mutate(set("<0x1>", "name", "A")).await.unwrap();
    {
        let mut faults = cluster.faults.lock();
        faults.mutate = Some(RpcError::new(StatusCode::Internal, "disk full"));
        faults.abort = Some(RpcError::unavailable("gone"));
    }

    let err = txn.mutate(set("<0x2>", "name", "B")).await.unwrap_err();

    assert_eq!(
        err,
        Error::Transport(RpcError::new(StatusCode::Internal, "disk full"))
    );
    let cleanup = txn.last_cleanup().unwrap();
    assert!(cleanup.was_attempted());
    assert!(matches!(cleanup, CleanupOutcome::Failed(_)));
}

#[tokio::test]
async fn explicit_discard_swallows_abort_failure() {
    let (client, cluster, _nodes) = mock_client(1);
    let mut txn = client.new_transaction();
    txn.mutate(set("<0x1>", "name", "A")).await.unwrap();
    cluster.faults.lock().abort = Some(RpcError::unavailable("gone"));

    txn.discard().await;

    assert!(txn.is_finished());
    assert!(matches!(txn.last_cleanup(), Some(CleanupOutcome::Failed(_))));
}

#[tokio::test]
async fn commit_transport_failure_is_single_shot() {
    let (client, cluster, _nodes) = mock_client(1);
    let mut txn = client.new_transaction();
    txn.mutate(set("<0x1>", "name", "A")).await.unwrap();
    cluster.faults.lock().commit = Some(RpcError::unavailable("gone"));

    let err = txn.commit().await.unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
    assert!(txn.is_finished());
    assert_eq!(txn.commit().await.unwrap_err(), Error::TransactionFinished);
}

#[tokio::test]
async fn start_ts_mismatch_invalidates_transaction() {
    let (client, cluster, _nodes) = mock_client(1);
    let mut txn = client.new_transaction();
    txn.query("{ q }").await.unwrap();
    txn.mutate(set("<0x1>", "name", "A")).await.unwrap();
    let start_ts = txn.start_ts();
    let context_before = txn.context().clone();

    cluster.faults.lock().start_ts_override = Some(start_ts + 100);
    let err = txn.query("{ q }").await.unwrap_err();

    assert_eq!(
        err,
        Error::StartTsMismatch {
            current: start_ts,
            received: start_ts + 100
        }
    );
    assert!(!err.is_retryable());
    assert!(txn.is_finished());
    // Context was not partially updated; only the abort flag was set for cleanup
    assert_eq!(txn.start_ts(), start_ts);
    assert_eq!(txn.watermark(), context_before.watermark());
    assert_eq!(txn.keys(), context_before.keys());
    assert_eq!(cluster.aborts(), vec![start_ts]);
    assert_eq!(txn.query("{ q }").await.unwrap_err(), Error::TransactionFinished);
}

#[tokio::test]
async fn empty_pool_reports_no_endpoints() {
    let client = Client::new(StubPool::new());
    let mut txn = client.new_transaction();

    assert_eq!(txn.query("{ q }").await.unwrap_err(), Error::NoEndpoints);
    assert_eq!(
        client.alter(meridian::Operation::drop_all()).await.unwrap_err(),
        Error::NoEndpoints
    );
}
