//! Endpoints and single-call handles

use meridian_core::{
    Assigned, GraphRpc, Mutation, Operation, Payload, Request, Response, RpcError, RpcResult,
    TxnContext, Version,
};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// One connection to a cluster node
#[derive(Clone)]
pub struct Endpoint {
    label: String,
    rpc: Arc<dyn GraphRpc>,
}

impl Endpoint {
    /// Wrap a connection
    pub fn new(rpc: Arc<dyn GraphRpc>) -> Self {
        Self::labeled("endpoint", rpc)
    }

    /// Wrap a connection with a label used in logs
    pub fn labeled(label: impl Into<String>, rpc: Arc<dyn GraphRpc>) -> Self {
        Self {
            label: label.into(),
            rpc,
        }
    }

    /// Label given at construction
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Underlying connection
    pub fn rpc(&self) -> &Arc<dyn GraphRpc> {
        &self.rpc
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint").field("label", &self.label).finish()
    }
}

/// An endpoint selected for one call
///
/// Every method consumes the handle, so a deadline applies to the next call
/// only. Pick a fresh handle from the pool for each RPC.
#[derive(Debug, Clone)]
pub struct Call {
    endpoint: Endpoint,
    deadline: Option<Duration>,
}

impl Call {
    pub(crate) fn new(endpoint: Endpoint, deadline: Option<Duration>) -> Self {
        Self { endpoint, deadline }
    }

    /// Endpoint the call will go to
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Deadline applied to the call, if any
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Apply a schema operation
    pub async fn alter(self, op: Operation) -> RpcResult<Payload> {
        bounded(self.deadline, self.endpoint.rpc.alter(op)).await
    }

    /// Run a read
    pub async fn query(self, request: Request) -> RpcResult<Response> {
        bounded(self.deadline, self.endpoint.rpc.query(request)).await
    }

    /// Apply a write
    pub async fn mutate(self, mutation: Mutation) -> RpcResult<Assigned> {
        bounded(self.deadline, self.endpoint.rpc.mutate(mutation)).await
    }

    /// Commit or abort
    pub async fn commit_or_abort(self, context: TxnContext) -> RpcResult<TxnContext> {
        bounded(self.deadline, self.endpoint.rpc.commit_or_abort(context)).await
    }

    /// Fetch the server version
    pub async fn check_version(self) -> RpcResult<Version> {
        bounded(self.deadline, self.endpoint.rpc.check_version()).await
    }
}

async fn bounded<T, F>(deadline: Option<Duration>, call: F) -> RpcResult<T>
where
    F: Future<Output = RpcResult<T>>,
{
    match deadline {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(RpcError::deadline_exceeded(format!(
                "call did not complete within {:?}",
                limit
            ))),
        },
        None => call.await,
    }
}
