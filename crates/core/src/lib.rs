//! Core types for meridian
//!
//! This crate defines the foundational types shared by every layer:
//! - Watermark: per-group version lower bounds and their merge
//! - SharedWatermark: the client-wide, mutex-guarded watermark cell
//! - Error: the typed failure taxonomy and transport error classification
//! - Protocol messages: Request, Response, Mutation, Assigned, TxnContext, ...
//! - GraphRpc: the transport contract for one cluster node

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod proto;
pub mod rpc;
pub mod watermark;

pub use error::{Error, Result, ABORTED_MESSAGE};
pub use proto::{Assigned, Mutation, Operation, Payload, Request, Response, TxnContext, Version};
pub use rpc::{GraphRpc, RpcError, RpcResult, StatusCode};
pub use watermark::{GroupId, SharedWatermark, Watermark, WatermarkSink};
