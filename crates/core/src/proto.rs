//! Request and response messages exchanged with a cluster node
//!
//! These mirror the server's RPC contract. Payload bodies (`json`,
//! `set_json`, N-Quads) are opaque bytes to this layer.

use crate::watermark::Watermark;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Transaction state carried on every response and on commit/abort
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxnContext {
    /// Server-assigned start timestamp (0 = not yet assigned)
    pub start_ts: u64,
    /// Commit timestamp, set by the server on a successful commit
    pub commit_ts: u64,
    /// Abort flag. Set by the client to request an abort, or by the server
    /// to report one.
    pub aborted: bool,
    /// Conflict keys touched by the transaction
    pub keys: Vec<String>,
    /// Versions the server observed while serving the call
    pub watermark: Watermark,
}

/// Read request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Query text, interpreted by the server
    pub query: String,
    /// Query variables
    pub vars: HashMap<String, String>,
    /// Transaction start timestamp (0 lets the server pick one)
    pub start_ts: u64,
    /// Lower bounds the server must satisfy before answering
    pub watermark: Watermark,
    /// Read-only transaction
    pub read_only: bool,
    /// Allow the server to answer from any replica without waiting on the
    /// latest timestamp
    pub best_effort: bool,
}

/// Query result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Encoded result body
    pub json: Vec<u8>,
    /// Transaction state after the read
    pub txn: TxnContext,
}

/// Write request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mutation {
    /// JSON objects to set
    pub set_json: Vec<u8>,
    /// JSON objects to delete
    pub delete_json: Vec<u8>,
    /// N-Quads to set
    pub set_nquads: Vec<u8>,
    /// N-Quads to delete
    pub del_nquads: Vec<u8>,
    /// Filled in by the transaction before sending
    pub start_ts: u64,
    /// Ask the server to commit right after applying the mutation
    pub commit_now: bool,
    /// Skip index-key conflict detection on the server
    pub ignore_index_conflict: bool,
}

impl Mutation {
    /// Create an empty mutation
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the JSON body to add
    pub fn with_set_json(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.set_json = body.into();
        self
    }

    /// Set the JSON body to delete
    pub fn with_delete_json(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.delete_json = body.into();
        self
    }

    /// Set the N-Quads to add
    pub fn with_set_nquads(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.set_nquads = body.into();
        self
    }

    /// Set the N-Quads to delete
    pub fn with_del_nquads(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.del_nquads = body.into();
        self
    }

    /// Commit in the same round trip
    pub fn with_commit_now(mut self, commit_now: bool) -> Self {
        self.commit_now = commit_now;
        self
    }

    /// Skip index conflict detection
    pub fn with_ignore_index_conflict(mut self, ignore: bool) -> Self {
        self.ignore_index_conflict = ignore;
        self
    }
}

/// Mutation result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assigned {
    /// Blank node label to assigned uid
    pub uids: HashMap<String, String>,
    /// Transaction state after the write
    pub context: TxnContext,
    /// Error message reported in-band by servers that predate typed status
    /// codes. `None` or empty means success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Schema alteration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Schema text to apply
    pub schema: String,
    /// Predicate to drop
    pub drop_attr: String,
    /// Drop all data and schema
    pub drop_all: bool,
}

impl Operation {
    /// Alter the schema
    pub fn schema(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            ..Self::default()
        }
    }

    /// Drop one predicate
    pub fn drop_attr(attr: impl Into<String>) -> Self {
        Self {
            drop_attr: attr.into(),
            ..Self::default()
        }
    }

    /// Drop everything
    pub fn drop_all() -> Self {
        Self {
            drop_all: true,
            ..Self::default()
        }
    }
}

/// Opaque alter result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Raw bytes returned by the server
    pub data: Vec<u8>,
}

/// Server build version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Version tag, e.g. `v1.0.0`
    pub tag: String,
}
