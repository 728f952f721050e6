//! Blocking API
//!
//! Thin wrappers that drive the async [`Client`] and [`Transaction`] on an
//! owned tokio runtime. No transaction logic lives here; errors come back
//! exactly as the async calls classified them.
//!
//! These types must not be used from inside an async context.

use crate::client::Client;
use crate::config::ClientConfig;
use meridian_concurrency::{CleanupOutcome, Transaction};
use meridian_core::{
    Assigned, Error, Mutation, Operation, Payload, Response, Result, Version, Watermark,
};
use meridian_pool::{Endpoint, ShutdownReport};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::warn;

/// Blocking handle to a cluster
#[derive(Debug, Clone)]
pub struct BlockingClient {
    inner: Client,
    runtime: Arc<Runtime>,
}

impl BlockingClient {
    /// Wrap `client` with a dedicated runtime
    pub fn new(client: Client) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create runtime: {}", e)))?;
        Ok(Self::with_runtime(client, Arc::new(runtime)))
    }

    /// Wrap `client` with an existing runtime
    pub fn with_runtime(client: Client, runtime: Arc<Runtime>) -> Self {
        Self {
            inner: client,
            runtime,
        }
    }

    /// Create a client over `endpoints` configured by `config`
    pub fn from_config(
        config: &ClientConfig,
        endpoints: impl IntoIterator<Item = Endpoint>,
    ) -> Result<Self> {
        Self::new(Client::from_config(config, endpoints)?)
    }

    /// The async client underneath
    pub fn client(&self) -> &Client {
        &self.inner
    }

    /// Snapshot of the client-wide watermark
    pub fn watermark(&self) -> Watermark {
        self.inner.watermark()
    }

    /// Start a read-write transaction
    pub fn new_transaction(&self) -> BlockingTransaction {
        self.wrap(self.inner.new_transaction())
    }

    /// Start a read-only transaction
    pub fn new_read_only_transaction(&self) -> BlockingTransaction {
        self.wrap(self.inner.new_read_only_transaction())
    }

    /// Start a read-only transaction in best-effort mode
    pub fn new_best_effort_transaction(&self) -> BlockingTransaction {
        self.wrap(self.inner.new_best_effort_transaction())
    }

    /// Apply a schema operation
    pub fn alter(&self, op: Operation) -> Result<Payload> {
        self.runtime.block_on(self.inner.alter(op))
    }

    /// Ask any endpoint for the server version
    pub fn check_version(&self) -> Result<Version> {
        self.runtime.block_on(self.inner.check_version())
    }

    /// Shut down every endpoint, waiting at most `timeout`
    pub fn close(&self, timeout: Duration) -> ShutdownReport {
        self.runtime.block_on(self.inner.close(timeout))
    }

    /// Shut down every endpoint within the configured shutdown bound
    pub fn shutdown(&self) -> ShutdownReport {
        self.runtime.block_on(self.inner.shutdown())
    }

    fn wrap(&self, txn: Transaction) -> BlockingTransaction {
        BlockingTransaction {
            inner: txn,
            runtime: Arc::clone(&self.runtime),
        }
    }
}

/// Blocking transaction.
///
/// Dropping an unfinished transaction discards it, so early returns and
/// panics release server-side state without an explicit `discard` call.
#[derive(Debug)]
pub struct BlockingTransaction {
    inner: Transaction,
    runtime: Arc<Runtime>,
}

impl BlockingTransaction {
    /// The async transaction underneath
    pub fn inner(&self) -> &Transaction {
        &self.inner
    }

    /// Server-assigned start timestamp
    pub fn start_ts(&self) -> u64 {
        self.inner.start_ts()
    }

    /// True after commit, discard or a commit-now mutation
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Outcome of the most recent discard
    pub fn last_cleanup(&self) -> Option<&CleanupOutcome> {
        self.inner.last_cleanup()
    }

    /// Run a read
    pub fn query(&mut self, query: &str) -> Result<Response> {
        self.runtime.block_on(self.inner.query(query))
    }

    /// Run a read with variables
    pub fn query_with_vars(
        &mut self,
        query: &str,
        vars: HashMap<String, String>,
    ) -> Result<Response> {
        self.runtime
            .block_on(self.inner.query_with_vars(query, vars))
    }

    /// Apply a mutation
    pub fn mutate(&mut self, mutation: Mutation) -> Result<Assigned> {
        self.runtime.block_on(self.inner.mutate(mutation))
    }

    /// Commit
    pub fn commit(&mut self) -> Result<()> {
        self.runtime.block_on(self.inner.commit())
    }

    /// Discard; never fails
    pub fn discard(&mut self) {
        self.runtime.block_on(self.inner.discard())
    }
}

impl Drop for BlockingTransaction {
    fn drop(&mut self) {
        if self.inner.is_finished() {
            return;
        }
        if Handle::try_current().is_ok() {
            warn!(
                start_ts = self.inner.start_ts(),
                "Blocking transaction dropped inside an async context, not discarded"
            );
            return;
        }
        self.runtime.block_on(self.inner.discard());
    }
}
