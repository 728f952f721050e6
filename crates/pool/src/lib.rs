//! Endpoint pool for meridian
//!
//! This crate holds the set of node connections a client talks to:
//! - Endpoint: one connection to a cluster node
//! - Call: an endpoint picked for exactly one call, with its deadline
//! - SelectionPolicy: how the next endpoint is chosen (random, round-robin)
//! - StubPool: the endpoint set, selection, and graceful shutdown

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod endpoint;
pub mod policy;
pub mod pool;

pub use endpoint::{Call, Endpoint};
pub use policy::{RandomSelection, RoundRobin, Selection, SelectionPolicy};
pub use pool::{ShutdownReport, StubPool};
