//! Meridian - transactional client for distributed graph database clusters
//!
//! Meridian lets application code run queries and mutations against a
//! cluster while keeping the server's consistency guarantees:
//!
//! - every transaction carries its start timestamp and the watermark of
//!   versions it has observed
//! - watermarks flow back into a client-wide watermark, so new transactions
//!   read at least what earlier ones saw
//! - server conflicts surface as a retryable [`Error::TransactionConflict`]
//! - commit and discard are one-shot; discard is always safe to call
//!
//! # Architecture
//!
//! The [`Client`] and [`BlockingClient`] types are the entry points. The
//! connection to each node is supplied as an implementation of [`GraphRpc`].

// Re-export the public API from meridian-client
pub use meridian_client::*;
