//! Client API for meridian
//!
//! - [`Client`]: async façade owning the endpoint pool and the client-wide
//!   watermark
//! - [`BlockingClient`] / [`BlockingTransaction`]: the same operations on an
//!   owned runtime
//! - [`ClientConfig`]: `meridian.toml` configuration
//!
//! # Example
//!
//! ```ignore
//! use meridian_client::{Client, ClientConfig, Mutation, Error};
//!
//! let client = Client::from_config(&ClientConfig::default(), endpoints)?;
//! let mut txn = client.new_transaction();
//! let result = async {
//!     txn.mutate(Mutation::new().with_set_nquads("_:a <name> \"Alice\" .")).await?;
//!     txn.commit().await
//! }.await;
//! txn.discard().await; // no-op after a successful commit
//! match result {
//!     Err(e) if e.is_retryable() => { /* run again in a new transaction */ }
//!     other => other?,
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod blocking;
pub mod client;
pub mod config;

pub use blocking::{BlockingClient, BlockingTransaction};
pub use client::{Client, DEFAULT_SHUTDOWN_TIMEOUT};
pub use config::{ClientConfig, CONFIG_FILE_NAME};

pub use meridian_concurrency::{CleanupOutcome, Transaction, TransactionContext};
pub use meridian_core::{
    Assigned, Error, GraphRpc, GroupId, Mutation, Operation, Payload, Request, Response, Result,
    RpcError, RpcResult, SharedWatermark, StatusCode, TxnContext, Version, Watermark,
    WatermarkSink, ABORTED_MESSAGE,
};
pub use meridian_pool::{
    Call, Endpoint, RandomSelection, RoundRobin, Selection, SelectionPolicy, ShutdownReport,
    StubPool,
};
