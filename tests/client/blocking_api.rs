//! Blocking API Tests
//!
//! The blocking types wrap the async engine; these tests run on plain
//! threads, never inside a runtime.

use crate::common::*;
use meridian::{BlockingClient, Client, Error, StubPool};
use std::thread;

fn blocking_client(n: usize) -> (BlockingClient, std::sync::Arc<MockCluster>) {
    let (cluster, nodes) = mock_nodes(n);
    let client = Client::new(StubPool::with_endpoints(endpoints_for(&nodes)));
    (BlockingClient::new(client).unwrap(), cluster)
}

#[test]
fn blocking_commit_round_trip() {
    let (client, cluster) = blocking_client(1);
    let mut txn = client.new_transaction();

    txn.query("{ q }").unwrap();
    txn.mutate(set("<0x1>", "name", "A")).unwrap();
    txn.commit().unwrap();

    assert!(txn.is_finished());
    assert_eq!(cluster.commits(), 1);
    assert!(!client.watermark().is_empty());
}

#[test]
fn blocking_errors_match_async_classification() {
    let (client, cluster) = blocking_client(1);

    let mut first = client.new_transaction();
    let mut second = client.new_transaction();
    first.query("{ q }").unwrap();
    second.query("{ q }").unwrap();
    first.mutate(set("<0x1>", "n", "1")).unwrap();
    second.mutate(set("<0x1>", "n", "2")).unwrap();
    first.commit().unwrap();

    let err = second.commit().unwrap_err();
    assert!(matches!(err, Error::TransactionConflict { .. }));
    assert_eq!(second.query("{ q }").unwrap_err(), Error::TransactionFinished);
    assert_eq!(cluster.commits(), 2);
}

#[test]
fn dropping_unfinished_transaction_discards_it() {
    let (client, cluster) = blocking_client(1);
    let start_ts = {
        let mut txn = client.new_transaction();
        txn.mutate(set("<0x1>", "name", "A")).unwrap();
        txn.start_ts()
    };

    assert_eq!(cluster.aborts(), vec![start_ts]);
}

#[test]
fn dropping_committed_transaction_sends_nothing_more() {
    let (client, cluster) = blocking_client(1);
    {
        let mut txn = client.new_transaction();
        txn.mutate(set("<0x1>", "name", "A")).unwrap();
        txn.commit().unwrap();
    }
    assert!(cluster.aborts().is_empty());
}

#[test]
fn read_only_and_best_effort() {
    let (client, cluster) = blocking_client(1);

    let mut ro = client.new_read_only_transaction();
    assert_eq!(
        ro.mutate(set("<0x1>", "name", "A")).unwrap_err(),
        Error::TransactionReadOnly
    );

    let mut be = client.new_best_effort_transaction();
    be.query("{ q }").unwrap();
    assert!(be.inner().is_best_effort());
    assert_eq!(cluster.mutations(), 0);
}

#[test]
fn blocking_client_shared_across_threads() {
    let (client, cluster) = blocking_client(2);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let client = client.clone();
            thread::spawn(move || {
                let mut txn = client.new_transaction();
                txn.mutate(set(&format!("<0x{}>", i + 10), "name", "x"))
                    .unwrap();
                txn.commit().unwrap();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(cluster.commits(), 4);
    assert_eq!(client.check_version().unwrap().tag, "v1.0.0-mock");
    assert!(client.close(std::time::Duration::from_secs(1)).is_clean());
}
