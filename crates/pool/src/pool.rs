//! Pool of endpoints to one cluster
//!
//! The endpoint set is filled at construction time and read-only afterwards.
//! Every call picks its endpoint independently through the configured
//! [`SelectionPolicy`].

use crate::endpoint::{Call, Endpoint};
use crate::policy::{RandomSelection, SelectionPolicy};
use meridian_core::{Error, Result};
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::warn;

/// Outcome of [`StubPool::close`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Endpoints that shut down cleanly
    pub closed: usize,
    /// Endpoints whose shutdown returned an error
    pub failed: usize,
    /// Endpoints still shutting down when the timeout elapsed
    pub timed_out: usize,
}

impl ShutdownReport {
    /// True if every endpoint closed cleanly
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.timed_out == 0
    }
}

/// Endpoints to the same cluster plus the policy choosing among them
#[derive(Debug)]
pub struct StubPool {
    endpoints: Vec<Endpoint>,
    policy: Box<dyn SelectionPolicy>,
    deadline: Option<Duration>,
}

impl Default for StubPool {
    fn default() -> Self {
        Self::new()
    }
}

impl StubPool {
    /// Empty pool with random selection and no deadline
    pub fn new() -> Self {
        Self {
            endpoints: Vec::new(),
            policy: Box::new(RandomSelection),
            deadline: None,
        }
    }

    /// Pool over `endpoints` with random selection and no deadline
    pub fn with_endpoints(endpoints: impl IntoIterator<Item = Endpoint>) -> Self {
        let mut pool = Self::new();
        pool.extend(endpoints);
        pool
    }

    /// Replace the selection policy
    pub fn with_policy(mut self, policy: Box<dyn SelectionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Apply `deadline` to every call. A zero duration disables it.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = if deadline.is_zero() {
            None
        } else {
            Some(deadline)
        };
        self
    }

    /// Register one endpoint
    pub fn add(&mut self, endpoint: Endpoint) {
        self.endpoints.push(endpoint);
    }

    /// Register several endpoints
    pub fn extend(&mut self, endpoints: impl IntoIterator<Item = Endpoint>) {
        self.endpoints.extend(endpoints);
    }

    /// Number of registered endpoints
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// True if no endpoint is registered
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Registered endpoints in registration order
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Per-call deadline, if configured
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Pick an endpoint for the next call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoEndpoints`] if the pool is empty.
    pub fn any_endpoint(&self) -> Result<Call> {
        let endpoint = self
            .policy
            .select(&self.endpoints)
            .ok_or(Error::NoEndpoints)?;
        Ok(Call::new(endpoint.clone(), self.deadline))
    }

    /// Shut down every endpoint concurrently, waiting at most `timeout`.
    ///
    /// A failing endpoint does not stop the others from closing. Endpoints
    /// still running when the timeout elapses are abandoned.
    pub async fn close(&self, timeout: Duration) -> ShutdownReport {
        let mut tasks = JoinSet::new();
        for endpoint in &self.endpoints {
            let endpoint = endpoint.clone();
            tasks.spawn(async move {
                let result = endpoint.rpc().shutdown().await;
                (endpoint, result)
            });
        }

        let mut report = ShutdownReport::default();
        let drained = tokio::time::timeout(timeout, async {
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((_, Ok(()))) => report.closed += 1,
                    Ok((endpoint, Err(e))) => {
                        warn!(endpoint = %endpoint.label(), error = %e, "Endpoint shutdown failed");
                        report.failed += 1;
                    }
                    Err(e) => {
                        warn!(error = %e, "Endpoint shutdown task did not complete");
                        report.failed += 1;
                    }
                }
            }
        })
        .await;

        if drained.is_err() {
            report.timed_out = tasks.len();
            warn!(
                pending = report.timed_out,
                ?timeout,
                "Endpoint shutdown timed out"
            );
            tasks.abort_all();
        }
        report
    }
}
