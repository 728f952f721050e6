//! Endpoint Selection Tests
//!
//! Random selection must spread calls roughly uniformly; round-robin must
//! visit endpoints in order.

use crate::common::*;
use meridian::{Client, RoundRobin, StubPool};

const NODES: usize = 4;
const TRANSACTIONS: usize = 1000;

#[tokio::test]
async fn random_selection_is_roughly_uniform() {
    let (client, _cluster, nodes) = mock_client(NODES);

    for _ in 0..TRANSACTIONS {
        let mut txn = client.new_read_only_transaction();
        txn.query("{ q }").await.unwrap();
    }

    // Expected 250 per node, sd ~13.7; 6 sd either side keeps flakes out
    let expected = TRANSACTIONS / NODES;
    for node in &nodes {
        let hits = node.hits();
        assert!(
            hits > expected - 85 && hits < expected + 85,
            "node received {} of {} calls",
            hits,
            TRANSACTIONS
        );
    }
    assert_eq!(nodes.iter().map(|n| n.hits()).sum::<usize>(), TRANSACTIONS);
}

#[tokio::test]
async fn round_robin_visits_every_node_equally() {
    let (_cluster, nodes) = mock_nodes(NODES);
    let pool = StubPool::with_endpoints(endpoints_for(&nodes)).with_policy(Box::new(RoundRobin::new()));
    let client = Client::new(pool);

    for _ in 0..TRANSACTIONS {
        let mut txn = client.new_read_only_transaction();
        txn.query("{ q }").await.unwrap();
    }

    for node in &nodes {
        assert_eq!(node.hits(), TRANSACTIONS / NODES);
    }
}

#[tokio::test]
async fn each_call_selects_independently() {
    let (_cluster, nodes) = mock_nodes(2);
    let pool = StubPool::with_endpoints(endpoints_for(&nodes)).with_policy(Box::new(RoundRobin::new()));
    let client = Client::new(pool);

    // One transaction, three calls, spread over both nodes
    let mut txn = client.new_transaction();
    txn.query("{ q }").await.unwrap();
    txn.mutate(set("<0x1>", "name", "A")).await.unwrap();
    txn.commit().await.unwrap();

    assert_eq!(nodes[0].hits(), 2);
    assert_eq!(nodes[1].hits(), 1);
}
