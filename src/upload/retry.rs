//! Retry coordinator: re-run failed traces from their retry descriptors.

use crate::ledger::UploadTrace;
use crate::remote::RemoteStore;
use crate::upload::UploadEngine;
use futures::future::join_all;
use tracing::info;

impl<S: RemoteStore + ?Sized> UploadEngine<S> {
    /// Re-run each failed trace concurrently and wait for all of them to settle.
    ///
    /// Traces must already be removed from the ledger. A failed directory re-runs its
    /// whole subtree; a failed file re-runs only itself. Returns the number retried.
    pub async fn retry_traces(&self, failed: Vec<UploadTrace>, epoch: u64) -> usize {
        let count = failed.len();
        if count == 0 {
            return 0;
        }
        info!(count, epoch, "Retrying failed uploads");
        join_all(
            failed
                .into_iter()
                .map(|trace| self.upload_subtree(trace.retry, epoch)),
        )
        .await;
        count
    }
}
