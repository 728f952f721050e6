//! Transaction layer for meridian
//!
//! This crate implements the client side of the server's optimistic
//! concurrency control:
//! - TransactionContext: start timestamp, watermark and conflict keys
//! - Transaction: the query/mutate/commit/discard state machine
//! - CleanupOutcome: result of the best-effort abort run on error paths
//!
//! Conflict detection happens on the server. The client only carries the
//! context, classifies the server's verdict, and enforces the one-shot
//! commit/discard lifecycle.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cleanup;
pub mod context;
pub mod transaction;

pub use cleanup::CleanupOutcome;
pub use context::TransactionContext;
pub use transaction::Transaction;
