//! Client transaction engine
//!
//! A [`Transaction`] drives one server-side transaction through its lifecycle:
//!
//! ```text
//! CREATED --query/mutate--> ACTIVE(mutated?) --commit|discard--> FINISHED
//! FINISHED --query|mutate|commit--> Err(TransactionFinished)
//! FINISHED --discard--> no-op
//! ```
//!
//! Every call carries the transaction's start timestamp and watermark. Every
//! successful response is folded back into the transaction context and then
//! into the client-wide watermark sink, so later transactions on the same
//! client observe at least what this one observed.
//!
//! Conflicts are never retried here. A `TransactionConflict` means the caller
//! must run the work again in a new transaction.
//!
//! All operations take `&mut self`, so one transaction can never be driven
//! by two callers at once. The async methods are the only implementation;
//! blocking wrappers await them.

use crate::cleanup::{abort_best_effort, CleanupOutcome};
use crate::context::TransactionContext;
use meridian_core::{
    Assigned, Error, Mutation, Request, Response, Result, TxnContext, Watermark, WatermarkSink,
};
use meridian_pool::StubPool;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

/// One client-side transaction
pub struct Transaction {
    context: TransactionContext,
    pool: Arc<StubPool>,
    sink: Arc<dyn WatermarkSink>,
    read_only: bool,
    best_effort: bool,
    mutated: bool,
    finished: bool,
    last_cleanup: Option<CleanupOutcome>,
}

impl Transaction {
    /// Create a read-write transaction seeded with `seed`.
    ///
    /// Endpoints for every call come from `pool`; every watermark the
    /// transaction merges is also reported to `sink`.
    pub fn new(pool: Arc<StubPool>, sink: Arc<dyn WatermarkSink>, seed: Watermark) -> Self {
        Self::with_mode(pool, sink, seed, false)
    }

    /// Create a read-only transaction seeded with `seed`
    pub fn new_read_only(
        pool: Arc<StubPool>,
        sink: Arc<dyn WatermarkSink>,
        seed: Watermark,
    ) -> Self {
        Self::with_mode(pool, sink, seed, true)
    }

    fn with_mode(
        pool: Arc<StubPool>,
        sink: Arc<dyn WatermarkSink>,
        seed: Watermark,
        read_only: bool,
    ) -> Self {
        Self {
            context: TransactionContext::seeded(seed),
            pool,
            sink,
            read_only,
            best_effort: false,
            mutated: false,
            finished: false,
            last_cleanup: None,
        }
    }

    /// Create a read-only transaction in best-effort mode
    pub fn new_best_effort(
        pool: Arc<StubPool>,
        sink: Arc<dyn WatermarkSink>,
        seed: Watermark,
    ) -> Self {
        let mut txn = Self::with_mode(pool, sink, seed, true);
        txn.best_effort = true;
        txn
    }

    /// Let the server answer reads without waiting for the latest timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BestEffortRequiresReadOnly`] on a read-write
    /// transaction, which is left unchanged.
    pub fn best_effort(&mut self) -> Result<()> {
        if !self.read_only {
            return Err(Error::BestEffortRequiresReadOnly);
        }
        self.best_effort = true;
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Server-assigned start timestamp (0 until the first response)
    pub fn start_ts(&self) -> u64 {
        self.context.start_ts()
    }

    /// Watermark observed by this transaction
    pub fn watermark(&self) -> &Watermark {
        self.context.watermark()
    }

    /// Conflict keys returned by the server
    pub fn keys(&self) -> &BTreeSet<String> {
        self.context.keys()
    }

    /// Full consistency context
    pub fn context(&self) -> &TransactionContext {
        &self.context
    }

    /// True for transactions created read-only
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// True in best-effort read mode
    pub fn is_best_effort(&self) -> bool {
        self.best_effort
    }

    /// True once at least one mutation succeeded
    pub fn is_mutated(&self) -> bool {
        self.mutated
    }

    /// True after commit, discard, a commit-now mutation, or a failure that
    /// invalidated the transaction
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Outcome of the most recent discard, if one ran
    pub fn last_cleanup(&self) -> Option<&CleanupOutcome> {
        self.last_cleanup.as_ref()
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Run a read without variables
    pub async fn query(&mut self, query: &str) -> Result<Response> {
        self.query_with_vars(query, HashMap::new()).await
    }

    /// Run a read with variables.
    ///
    /// The response body is returned as received. Transport failures leave
    /// the transaction's flags unchanged.
    pub async fn query_with_vars(
        &mut self,
        query: &str,
        vars: HashMap<String, String>,
    ) -> Result<Response> {
        self.ensure_active()?;

        let request = Request {
            query: query.to_string(),
            vars,
            start_ts: self.context.start_ts(),
            watermark: self.context.watermark().clone(),
            read_only: self.read_only,
            best_effort: self.best_effort,
        };
        let call = self.pool.any_endpoint()?;
        let response = call.query(request).await.map_err(Error::from_rpc)?;

        self.merge_response(&response.txn).await?;
        Ok(response)
    }

    /// Apply a mutation.
    ///
    /// On failure the transaction is discarded right away (best effort) and
    /// the classified error is returned. With `commit_now` set, a successful
    /// mutation also finishes the transaction.
    pub async fn mutate(&mut self, mut mutation: Mutation) -> Result<Assigned> {
        self.ensure_active()?;
        if self.read_only {
            return Err(Error::TransactionReadOnly);
        }

        mutation.start_ts = self.context.start_ts();
        let commit_now = mutation.commit_now;

        let assigned = match self.send_mutation(mutation).await {
            Ok(assigned) => assigned,
            Err(e) => {
                debug!(start_ts = self.context.start_ts(), error = %e, "Mutation failed, discarding");
                self.discard().await;
                return Err(e);
            }
        };

        self.mutated = true;
        self.merge_response(&assigned.context).await?;
        if commit_now {
            self.finished = true;
            debug!(start_ts = self.context.start_ts(), "Mutation committed immediately");
        }
        Ok(assigned)
    }

    /// Commit the transaction.
    ///
    /// The transaction is finished before the RPC is sent, so commit is
    /// single-shot even when it fails. Without mutations nothing is sent.
    pub async fn commit(&mut self) -> Result<()> {
        self.ensure_active()?;
        self.finished = true;

        if !self.mutated {
            debug!(start_ts = self.context.start_ts(), "Nothing to commit");
            return Ok(());
        }

        let start_ts = self.context.start_ts();
        let call = self.pool.any_endpoint()?;
        let reply = call
            .commit_or_abort(self.context.to_wire())
            .await
            .map_err(Error::from_rpc)?;

        if let Err(e) = self.context.check_start_ts(reply.start_ts) {
            error!(
                current = start_ts,
                received = reply.start_ts,
                "Commit reply carried a different start timestamp"
            );
            return Err(e);
        }

        if reply.aborted {
            debug!(start_ts, "Commit rejected by server");
            return Err(Error::TransactionConflict {
                reason: format!("commit of transaction {} was aborted by the server", start_ts),
            });
        }

        debug!(start_ts, commit_ts = reply.commit_ts, "Transaction committed");
        self.sink.fold_in(&reply.watermark);
        Ok(())
    }

    /// Release the transaction.
    ///
    /// Safe to call on every exit path: a finished transaction ignores it,
    /// and abort failures are recorded in [`last_cleanup`](Self::last_cleanup)
    /// instead of being returned.
    pub async fn discard(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        if !self.mutated {
            self.last_cleanup = Some(CleanupOutcome::Skipped);
            return;
        }

        self.context.mark_aborted();
        let outcome = abort_best_effort(&self.pool, self.context.to_wire()).await;
        self.last_cleanup = Some(outcome);
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn ensure_active(&self) -> Result<()> {
        if self.finished {
            return Err(Error::TransactionFinished);
        }
        Ok(())
    }

    async fn send_mutation(&self, mutation: Mutation) -> Result<Assigned> {
        let call = self.pool.any_endpoint()?;
        let assigned = call.mutate(mutation).await.map_err(Error::from_rpc)?;
        match assigned.error.as_deref() {
            Some(message) if !message.is_empty() => Err(Error::from_server_message(message)),
            _ => Ok(assigned),
        }
    }

    /// Fold a response context into the transaction and the client.
    ///
    /// A start timestamp mismatch invalidates the whole transaction: the
    /// context stays as it was, the transaction is finished, and pending
    /// server state is aborted.
    async fn merge_response(&mut self, response: &TxnContext) -> Result<()> {
        let was_unassigned = self.context.start_ts() == 0;

        if let Err(e) = self.context.absorb(response) {
            error!(
                current = self.context.start_ts(),
                received = response.start_ts,
                "Server reported a different start timestamp, invalidating transaction"
            );
            self.discard().await;
            return Err(e);
        }

        if was_unassigned && self.context.start_ts() != 0 {
            debug!(start_ts = self.context.start_ts(), "Start timestamp assigned");
        }
        self.sink.fold_in(self.context.watermark());
        Ok(())
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("context", &self.context)
            .field("read_only", &self.read_only)
            .field("best_effort", &self.best_effort)
            .field("mutated", &self.mutated)
            .field("finished", &self.finished)
            .finish()
    }
}
