//! Per-transaction consistency state
//!
//! A [`TransactionContext`] belongs to exactly one transaction. It records the
//! start timestamp the server assigned, the watermark the transaction has
//! observed, and the conflict keys it has touched.
//!
//! ## Start timestamp
//!
//! `start_ts` is 0 until the first response assigns it and is fixed from then
//! on. A response carrying a different non-zero `start_ts` is a protocol
//! violation. [`TransactionContext::absorb`] checks this before changing any
//! field, so a rejected response leaves the context exactly as it was.

use meridian_core::{Error, Result, TxnContext, Watermark};
use std::collections::BTreeSet;

/// Mutable consistency record of one transaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionContext {
    start_ts: u64,
    watermark: Watermark,
    keys: BTreeSet<String>,
    aborted: bool,
}

impl TransactionContext {
    /// Fresh context seeded with a known watermark
    pub fn seeded(watermark: Watermark) -> Self {
        Self {
            watermark,
            ..Self::default()
        }
    }

    /// Server-assigned start timestamp (0 = unassigned)
    pub fn start_ts(&self) -> u64 {
        self.start_ts
    }

    /// Watermark observed so far
    pub fn watermark(&self) -> &Watermark {
        &self.watermark
    }

    /// Conflict keys returned by the server
    pub fn keys(&self) -> &BTreeSet<String> {
        &self.keys
    }

    /// True once the transaction was marked for abort
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Mark the transaction for abort
    pub fn mark_aborted(&mut self) {
        self.aborted = true;
    }

    /// Check that `received` is compatible with the assigned start timestamp
    pub fn check_start_ts(&self, received: u64) -> Result<()> {
        if self.start_ts != 0 && received != 0 && received != self.start_ts {
            return Err(Error::StartTsMismatch {
                current: self.start_ts,
                received,
            });
        }
        Ok(())
    }

    /// Fold a server response into the context.
    ///
    /// Assigns `start_ts` on first use, merges the watermark and appends the
    /// conflict keys. On a start timestamp mismatch nothing is modified.
    pub fn absorb(&mut self, response: &TxnContext) -> Result<()> {
        self.check_start_ts(response.start_ts)?;

        if self.start_ts == 0 {
            self.start_ts = response.start_ts;
        }
        self.watermark = self.watermark.merge(&response.watermark);
        self.keys.extend(response.keys.iter().cloned());
        Ok(())
    }

    /// Wire form sent with commit or abort
    pub fn to_wire(&self) -> TxnContext {
        TxnContext {
            start_ts: self.start_ts,
            commit_ts: 0,
            aborted: self.aborted,
            keys: self.keys.iter().cloned().collect(),
            watermark: self.watermark.clone(),
        }
    }
}
