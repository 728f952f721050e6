//! Transport contract for a single cluster node
//!
//! [`GraphRpc`] is what the transaction layer needs from a connection. Channel
//! setup, TLS and wire encoding live behind it.

use crate::proto::{Assigned, Mutation, Operation, Payload, Request, Response, TxnContext, Version};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Status code reported by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCode {
    /// Cancelled by the caller
    Cancelled,
    /// Unknown error
    Unknown,
    /// Malformed request
    InvalidArgument,
    /// Call deadline elapsed
    DeadlineExceeded,
    /// Entity not found
    NotFound,
    /// Entity already exists
    AlreadyExists,
    /// Caller lacks permission
    PermissionDenied,
    /// Server out of resources
    ResourceExhausted,
    /// State precondition did not hold
    FailedPrecondition,
    /// Operation aborted, typically a transaction conflict
    Aborted,
    /// Operation not supported
    Unimplemented,
    /// Server internal error
    Internal,
    /// Node unreachable
    Unavailable,
    /// Caller not authenticated
    Unauthenticated,
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusCode::Cancelled => "CANCELLED",
            StatusCode::Unknown => "UNKNOWN",
            StatusCode::InvalidArgument => "INVALID_ARGUMENT",
            StatusCode::DeadlineExceeded => "DEADLINE_EXCEEDED",
            StatusCode::NotFound => "NOT_FOUND",
            StatusCode::AlreadyExists => "ALREADY_EXISTS",
            StatusCode::PermissionDenied => "PERMISSION_DENIED",
            StatusCode::ResourceExhausted => "RESOURCE_EXHAUSTED",
            StatusCode::FailedPrecondition => "FAILED_PRECONDITION",
            StatusCode::Aborted => "ABORTED",
            StatusCode::Unimplemented => "UNIMPLEMENTED",
            StatusCode::Internal => "INTERNAL",
            StatusCode::Unavailable => "UNAVAILABLE",
            StatusCode::Unauthenticated => "UNAUTHENTICATED",
        };
        f.write_str(name)
    }
}

/// Failed RPC
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct RpcError {
    /// Machine-checkable status
    pub code: StatusCode,
    /// Server or transport message
    pub message: String,
}

impl RpcError {
    /// Create an error with the given status
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Deadline elapsed before the node answered
    pub fn deadline_exceeded(message: impl Into<String>) -> Self {
        Self::new(StatusCode::DeadlineExceeded, message)
    }

    /// Node unreachable
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::Unavailable, message)
    }

    /// True if the status marks a transaction conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self.code, StatusCode::Aborted | StatusCode::FailedPrecondition)
    }
}

/// Result of a single RPC
pub type RpcResult<T> = std::result::Result<T, RpcError>;

/// One connection to a cluster node
#[async_trait]
pub trait GraphRpc: Send + Sync {
    /// Apply a schema operation
    async fn alter(&self, op: Operation) -> RpcResult<Payload>;

    /// Run a read
    async fn query(&self, request: Request) -> RpcResult<Response>;

    /// Apply a write
    async fn mutate(&self, mutation: Mutation) -> RpcResult<Assigned>;

    /// Commit the transaction described by `context`, or abort it if
    /// `context.aborted` is set. The returned context reports `aborted`
    /// when the server refused the commit.
    async fn commit_or_abort(&self, context: TxnContext) -> RpcResult<TxnContext>;

    /// Report the server version
    async fn check_version(&self) -> RpcResult<Version>;

    /// Close the connection
    async fn shutdown(&self) -> RpcResult<()> {
        Ok(())
    }
}
