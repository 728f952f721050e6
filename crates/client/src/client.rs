//! Async client façade
//!
//! [`Client`] owns the endpoint pool and the client-wide watermark. It is
//! cheap to clone and safe to share: every clone talks to the same pool and
//! folds into the same watermark, so a transaction always starts from
//! everything any earlier transaction on this client observed.

use crate::config::ClientConfig;
use meridian_concurrency::Transaction;
use meridian_core::{Error, Operation, Payload, Result, SharedWatermark, Version, Watermark};
use meridian_pool::{Endpoint, ShutdownReport, StubPool};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Shutdown bound used by [`Client::shutdown`] unless configured otherwise
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to a cluster
#[derive(Debug, Clone)]
pub struct Client {
    pool: Arc<StubPool>,
    watermark: Arc<SharedWatermark>,
    shutdown_timeout: Duration,
}

impl Client {
    /// Create a client over a prepared pool
    pub fn new(pool: StubPool) -> Self {
        Self {
            pool: Arc::new(pool),
            watermark: Arc::new(SharedWatermark::new()),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Create a client over `endpoints` configured by `config`
    pub fn from_config(
        config: &ClientConfig,
        endpoints: impl IntoIterator<Item = Endpoint>,
    ) -> Result<Self> {
        Ok(Self::new(config.build_pool(endpoints)?)
            .with_shutdown_timeout(config.shutdown_timeout()))
    }

    /// Bound applied by [`shutdown`](Self::shutdown)
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Configured shutdown bound
    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// Endpoint pool
    pub fn pool(&self) -> &StubPool {
        &self.pool
    }

    /// Snapshot of the client-wide watermark
    pub fn watermark(&self) -> Watermark {
        self.watermark.read()
    }

    /// Start a read-write transaction
    pub fn new_transaction(&self) -> Transaction {
        Transaction::new(
            Arc::clone(&self.pool),
            self.watermark.clone(),
            self.watermark.read(),
        )
    }

    /// Start a read-only transaction
    pub fn new_read_only_transaction(&self) -> Transaction {
        Transaction::new_read_only(
            Arc::clone(&self.pool),
            self.watermark.clone(),
            self.watermark.read(),
        )
    }

    /// Start a read-only transaction in best-effort mode
    pub fn new_best_effort_transaction(&self) -> Transaction {
        Transaction::new_best_effort(
            Arc::clone(&self.pool),
            self.watermark.clone(),
            self.watermark.read(),
        )
    }

    /// Apply a schema operation on any endpoint. No transaction is involved.
    pub async fn alter(&self, op: Operation) -> Result<Payload> {
        let call = self.pool.any_endpoint()?;
        call.alter(op).await.map_err(Error::from_rpc)
    }

    /// Ask any endpoint for the server version
    pub async fn check_version(&self) -> Result<Version> {
        let call = self.pool.any_endpoint()?;
        call.check_version().await.map_err(Error::from_rpc)
    }

    /// Shut down every endpoint, waiting at most `timeout`
    pub async fn close(&self, timeout: Duration) -> ShutdownReport {
        let report = self.pool.close(timeout).await;
        info!(
            closed = report.closed,
            failed = report.failed,
            timed_out = report.timed_out,
            "Client closed"
        );
        report
    }

    /// Shut down every endpoint within the configured shutdown bound
    pub async fn shutdown(&self) -> ShutdownReport {
        self.close(self.shutdown_timeout).await
    }
}
