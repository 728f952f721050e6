//! Error types for the meridian client
//!
//! This module defines all error types surfaced to callers.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Transport failures are classified exactly once, where the response is
//! received, via [`Error::from_rpc`] or [`Error::from_server_message`]. After
//! that the error travels unchanged through the async and blocking APIs.

use crate::rpc::RpcError;
use thiserror::Error;

/// Marker servers without typed status codes put in the message of an
/// aborted transaction.
pub const ABORTED_MESSAGE: &str = "Transaction has been aborted";

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the meridian client
///
/// | Category | Variants | Retry? |
/// |----------|----------|--------|
/// | Lifecycle | `TransactionFinished`, `TransactionReadOnly`, `BestEffortRequiresReadOnly` | never, caller bug |
/// | Concurrency | `TransactionConflict` | yes, in a new transaction |
/// | Protocol | `StartTsMismatch` | never |
/// | Server/transport | `Server`, `Transport`, `NoEndpoints` | caller decides |
/// | Setup | `Config`, `Internal` | never |
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Operation attempted after commit or discard
    #[error("Transaction has already been committed or discarded")]
    TransactionFinished,

    /// Mutation attempted on a read-only transaction
    #[error("Read-only transaction cannot run mutations or commits")]
    TransactionReadOnly,

    /// Server aborted the transaction due to a concurrent modification.
    ///
    /// Retry by running the whole transaction again in a new one.
    #[error("Transaction aborted due to conflict, retry with a new transaction: {reason}")]
    TransactionConflict {
        /// Server message or status description
        reason: String,
    },

    /// Server reported a different start timestamp than the one already
    /// assigned to the transaction
    #[error("Start timestamp mismatch: transaction has {current}, server reported {received}")]
    StartTsMismatch {
        /// Start timestamp held by the transaction
        current: u64,
        /// Start timestamp on the offending response
        received: u64,
    },

    /// Server reported an error in-band without a status code
    #[error("Server error: {message}")]
    Server {
        /// Message from the server
        message: String,
    },

    /// Unclassified transport failure (network, deadline, server internal)
    #[error("RPC error: {0}")]
    Transport(#[from] RpcError),

    /// The endpoint pool is empty
    #[error("No endpoints registered in the pool")]
    NoEndpoints,

    /// Best-effort reads were requested on a read-write transaction
    #[error("Best-effort mode is only available on read-only transactions")]
    BestEffortRequiresReadOnly,

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local failure unrelated to the server (runtime setup, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Classify a transport failure.
    ///
    /// `Aborted` and `FailedPrecondition` mean the server rejected the
    /// transaction for a conflict; every other status passes through as
    /// [`Error::Transport`].
    pub fn from_rpc(err: RpcError) -> Self {
        if err.is_conflict() {
            Error::TransactionConflict {
                reason: err.to_string(),
            }
        } else {
            Error::Transport(err)
        }
    }

    /// Classify an in-band error message from an older server
    pub fn from_server_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains(ABORTED_MESSAGE) {
            Error::TransactionConflict { reason: message }
        } else {
            Error::Server { message }
        }
    }

    /// True if running the work again in a new transaction may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::TransactionConflict { .. })
    }

    /// True for errors that indicate misuse of the transaction lifecycle
    pub fn is_lifecycle_violation(&self) -> bool {
        matches!(
            self,
            Error::TransactionFinished
                | Error::TransactionReadOnly
                | Error::BestEffortRequiresReadOnly
        )
    }
}
