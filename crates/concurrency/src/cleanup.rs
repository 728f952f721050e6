//! Best-effort abort of server-side transaction state
//!
//! When a transaction is torn down on an error path, the client asks the
//! server to abort it but never lets that request's failure replace the error
//! the caller is about to see. The server reaps abandoned transactions on its
//! own, so a failed cleanup only delays that.

use meridian_core::{Error, TxnContext};
use meridian_pool::StubPool;
use tracing::{debug, warn};

/// What happened to a scheduled cleanup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// Nothing to release on the server
    Skipped,
    /// The server acknowledged the abort
    Completed,
    /// The abort could not be delivered; the error was not surfaced
    Failed(Error),
}

impl CleanupOutcome {
    /// True if an abort RPC was sent, whatever its result
    pub fn was_attempted(&self) -> bool {
        !matches!(self, CleanupOutcome::Skipped)
    }
}

/// Send an abort for `context` and report the outcome instead of failing.
pub(crate) async fn abort_best_effort(pool: &StubPool, mut context: TxnContext) -> CleanupOutcome {
    context.aborted = true;
    let start_ts = context.start_ts;

    let call = match pool.any_endpoint() {
        Ok(call) => call,
        Err(e) => {
            warn!(start_ts, error = %e, "Abort not sent, no endpoint available");
            return CleanupOutcome::Failed(e);
        }
    };

    match call.commit_or_abort(context).await {
        Ok(_) => {
            debug!(start_ts, "Transaction aborted on server");
            CleanupOutcome::Completed
        }
        Err(e) => {
            warn!(start_ts, error = %e, "Best-effort abort failed, server will reap the transaction");
            CleanupOutcome::Failed(Error::from_rpc(e))
        }
    }
}
