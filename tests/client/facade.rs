//! Client Façade Tests

use crate::common::*;
use meridian::{Client, Operation};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn alter_is_a_stateless_passthrough() {
    let (client, cluster, _nodes) = mock_client(2);

    let payload = client
        .alter(Operation::schema("name: string @index(exact) ."))
        .await
        .unwrap();

    assert_eq!(payload.data, b"name: string @index(exact) .".to_vec());
    assert_eq!(
        cluster.log(),
        vec![CallRecord::Alter(Operation::schema(
            "name: string @index(exact) ."
        ))]
    );
    assert!(client.watermark().is_empty());
}

#[tokio::test]
async fn check_version_reports_server_tag() {
    let (client, _cluster, _nodes) = mock_client(1);
    let version = client.check_version().await.unwrap();
    assert_eq!(version.tag, "v1.0.0-mock");
}

#[tokio::test]
async fn new_transactions_start_unassigned() {
    let (client, _cluster, _nodes) = mock_client(1);
    let txn = client.new_transaction();
    assert_eq!(txn.start_ts(), 0);
    assert!(!txn.is_read_only());
    assert!(!txn.is_mutated());
    assert!(!txn.is_finished());

    let ro = client.new_read_only_transaction();
    assert!(ro.is_read_only());
}

#[tokio::test]
async fn clones_share_watermark() {
    let (client, _cluster, _nodes) = mock_client(1);
    let other = client.clone();

    let mut txn = other.new_transaction();
    txn.query("{ q }").await.unwrap();

    assert_eq!(client.watermark(), other.watermark());
    assert!(!client.watermark().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn transactions_can_be_created_concurrently() {
    let (client, cluster, _nodes) = mock_client(3);
    let client = Arc::new(client);

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let client = Arc::clone(&client);
            tokio::spawn(async move {
                let mut txn = client.new_read_only_transaction();
                txn.query("{ q }").await.unwrap();
                txn.start_ts()
            })
        })
        .collect();

    let mut highest = 0;
    for h in handles {
        highest = highest.max(h.await.unwrap());
    }

    assert_eq!(cluster.log().len(), 32);
    assert!(client.watermark().get(GROUP).unwrap() >= highest);
}

#[tokio::test]
async fn close_shuts_down_every_endpoint() {
    let (client, _cluster, nodes) = mock_client(3);

    let report = client.close(Duration::from_secs(1)).await;

    assert!(report.is_clean());
    assert_eq!(report.closed, 3);
    for node in &nodes {
        assert_eq!(node.shutdowns.load(Ordering::SeqCst), 1);
    }
}

#[test]
fn client_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Client>();
    assert_send_sync::<meridian::Transaction>();
}
