//! Upload Trace Ledger
//!
//! Ordered, observable record of every node upload attempt in the current session.
//! The ledger is published as immutable snapshots: each mutation replaces the whole
//! collection (copy-on-write), so an observer holding a snapshot never sees it change.

use crate::remote::ProgressEvent;
use crate::tree::node::TreeNode;
use crate::types::{NodeKind, NodePath, RemoteRef, TraceId, UploadStatus};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Everything needed to redo one node, and for a directory its entire subtree
#[derive(Debug, Clone)]
pub struct RetryDescriptor {
    pub path: NodePath,
    pub node: TreeNode,
    pub parent: Option<RemoteRef>,
}

impl RetryDescriptor {
    pub fn new(path: NodePath, node: TreeNode, parent: Option<RemoteRef>) -> Self {
        Self { path, node, parent }
    }
}

/// Record of one node upload attempt
#[derive(Debug, Clone)]
pub struct UploadTrace {
    pub id: TraceId,
    pub name: String,
    pub path: NodePath,
    pub kind: NodeKind,
    pub status: UploadStatus,
    pub uploaded_bytes: u64,
    /// `None` for directories, which have no measurable transfer
    pub total_bytes: Option<u64>,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub(crate) retry: RetryDescriptor,
}

impl UploadTrace {
    pub fn can_retry(&self) -> bool {
        self.status == UploadStatus::Error
    }

    pub fn retry_descriptor(&self) -> &RetryDescriptor {
        &self.retry
    }

    /// Fraction of bytes transferred, for files with a known total
    pub fn progress(&self) -> Option<f64> {
        match self.total_bytes {
            Some(0) => Some(1.0),
            Some(total) => Some(self.uploaded_bytes as f64 / total as f64),
            None => None,
        }
    }
}

/// Immutable view of the ledger at one point in time
pub type LedgerSnapshot = Arc<Vec<UploadTrace>>;

/// Trace counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerCounts {
    pub pending: usize,
    pub success: usize,
    pub error: usize,
}

/// Observable collection of upload traces.
///
/// Every session (submit or reset) gets a new epoch; work registered under an older
/// epoch is discarded.
pub struct Ledger {
    traces: watch::Sender<LedgerSnapshot>,
    epoch: AtomicU64,
    next_id: AtomicU64,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        let (traces, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            traces,
            epoch: AtomicU64::new(0),
            next_id: AtomicU64::new(1),
        }
    }

    /// Receive a new snapshot after every change
    pub fn subscribe(&self) -> watch::Receiver<LedgerSnapshot> {
        self.traces.subscribe()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        Arc::clone(&self.traces.borrow())
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch() == epoch
    }

    pub fn counts(&self) -> LedgerCounts {
        let snapshot = self.snapshot();
        let mut counts = LedgerCounts::default();
        for trace in snapshot.iter() {
            match trace.status {
                UploadStatus::Pending => counts.pending += 1,
                UploadStatus::Success => counts.success += 1,
                UploadStatus::Error => counts.error += 1,
            }
        }
        counts
    }

    /// Clear all traces and start a new epoch, returning it
    pub(crate) fn reset(&self) -> u64 {
        let mut epoch = 0;
        self.traces.send_modify(|snapshot| {
            epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
            *snapshot = Arc::new(Vec::new());
        });
        epoch
    }

    /// Append a PENDING trace for the node described by `retry`.
    ///
    /// Returns `None` when `epoch` is no longer current.
    pub(crate) fn register(&self, epoch: u64, retry: RetryDescriptor) -> Option<TraceId> {
        let id = TraceId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (kind, total_bytes) = match &retry.node {
            TreeNode::File(leaf) => (NodeKind::File, Some(leaf.content.size)),
            TreeNode::Directory(_) => (NodeKind::Directory, None),
        };
        let trace = UploadTrace {
            id,
            name: retry.node.name().to_string(),
            path: retry.path.clone(),
            kind,
            status: UploadStatus::Pending,
            uploaded_bytes: 0,
            total_bytes,
            error: None,
            started_at: Utc::now(),
            finished_at: None,
            retry,
        };

        let registered = self.traces.send_if_modified(|snapshot| {
            if self.epoch.load(Ordering::SeqCst) != epoch {
                return false;
            }
            Arc::make_mut(snapshot).push(trace);
            true
        });
        registered.then_some(id)
    }

    /// Apply a transport progress event to a pending file trace
    pub(crate) fn record_progress(&self, id: TraceId, event: ProgressEvent) {
        let Some(total) = event.total else {
            return;
        };
        self.update(id, |trace| {
            if trace.kind != NodeKind::File || trace.status != UploadStatus::Pending {
                return false;
            }
            trace.uploaded_bytes = trace.uploaded_bytes.max(event.loaded);
            trace.total_bytes = Some(total);
            true
        });
    }

    pub(crate) fn complete(&self, id: TraceId) {
        self.update(id, |trace| {
            trace.status = UploadStatus::Success;
            if let Some(total) = trace.total_bytes {
                trace.uploaded_bytes = total;
            }
            trace.finished_at = Some(Utc::now());
            true
        });
    }

    pub(crate) fn fail(&self, id: TraceId, error: String) {
        self.update(id, |trace| {
            trace.status = UploadStatus::Error;
            trace.error = Some(error);
            trace.finished_at = Some(Utc::now());
            true
        });
    }

    /// Remove every ERROR trace and return them in ledger order
    pub(crate) fn drain_failed(&self) -> Vec<UploadTrace> {
        let mut failed = Vec::new();
        self.traces.send_if_modified(|snapshot| {
            if !snapshot.iter().any(UploadTrace::can_retry) {
                return false;
            }
            let (errors, kept): (Vec<_>, Vec<_>) =
                snapshot.iter().cloned().partition(UploadTrace::can_retry);
            failed = errors;
            *snapshot = Arc::new(kept);
            true
        });
        failed
    }

    /// Remove one ERROR trace
    pub(crate) fn take_failed(&self, id: TraceId) -> Option<UploadTrace> {
        let mut taken = None;
        self.traces.send_if_modified(|snapshot| {
            let Some(pos) = snapshot.iter().position(|t| t.id == id && t.can_retry()) else {
                return false;
            };
            taken = Some(Arc::make_mut(snapshot).remove(pos));
            true
        });
        taken
    }

    fn update(&self, id: TraceId, apply: impl FnOnce(&mut UploadTrace) -> bool) {
        self.traces.send_if_modified(|snapshot| {
            let Some(pos) = snapshot.iter().position(|t| t.id == id) else {
                return false;
            };
            apply(&mut Arc::make_mut(snapshot)[pos])
        });
    }
}
