//! Session aggregate derived from the ledger.

use crate::ledger::UploadTrace;
use crate::tree::node::DirectoryNode;
use crate::types::{NodeKind, UploadStatus};
use serde::Serialize;

/// Aggregate state of one submit-through-settle cycle, retries included
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadSession {
    pub total_files: usize,
    pub total_upload_size: u64,
    pub status: UploadStatus,
    /// 1 after submit, plus one per retry that re-ran anything
    pub attempts: u32,
}

impl UploadSession {
    /// PENDING session covering every file in `root`
    pub fn start(root: &DirectoryNode) -> Self {
        Self {
            total_files: root.file_count(),
            total_upload_size: root.total_size(),
            status: UploadStatus::Pending,
            attempts: 1,
        }
    }

    pub(crate) fn begin_retry(&mut self) {
        self.status = UploadStatus::Pending;
        self.attempts += 1;
    }

    pub(crate) fn settle(&mut self, traces: &[UploadTrace]) {
        self.status = overall_status(traces);
    }

    pub fn is_settled(&self) -> bool {
        self.status.is_settled()
    }
}

/// SUCCESS when at least one file trace succeeded, ERROR otherwise
pub fn overall_status(traces: &[UploadTrace]) -> UploadStatus {
    let any_file_succeeded = traces
        .iter()
        .any(|t| t.kind == NodeKind::File && t.status == UploadStatus::Success);
    if any_file_succeeded {
        UploadStatus::Success
    } else {
        UploadStatus::Error
    }
}
