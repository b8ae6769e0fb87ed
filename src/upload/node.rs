//! Node uploader: one remote creation per file or directory.

use crate::ledger::RetryDescriptor;
use crate::remote::{NodeMetadata, ProgressEvent, ProgressSink, RemoteStore};
use crate::tree::node::TreeNode;
use crate::types::RemoteRef;
use crate::upload::UploadEngine;
use std::sync::Arc;
use tracing::{debug, warn};

impl<S: RemoteStore + ?Sized> UploadEngine<S> {
    /// Create the node described by `descriptor` on the remote store.
    ///
    /// A PENDING trace is registered before the remote call is issued. Transport
    /// failures are absorbed into an ERROR trace and reported as `None`, so one
    /// node's failure never aborts sibling work. Directories resolve to a reference
    /// carrying the hierarchical foreign id that was requested for them.
    pub async fn upload_node(&self, descriptor: RetryDescriptor, epoch: u64) -> Option<RemoteRef> {
        let parent = descriptor.parent.as_ref();
        let (metadata, content) = match &descriptor.node {
            TreeNode::File(leaf) => (
                NodeMetadata::for_file(&leaf.name, &leaf.content, parent),
                Some(leaf.content.clone()),
            ),
            TreeNode::Directory(dir) => (NodeMetadata::for_directory(dir.name(), parent), None),
        };
        let kind = descriptor.node.kind();
        let path = descriptor.path.clone();

        let Some(trace_id) = self.ledger.register(epoch, descriptor) else {
            debug!(path = %path, "Session discarded, node not issued");
            return None;
        };

        let on_progress: Option<ProgressSink> = content.as_ref().map(|_| {
            let ledger = Arc::clone(&self.ledger);
            Arc::new(move |event: ProgressEvent| ledger.record_progress(trace_id, event)) as ProgressSink
        });

        let _permit = match &self.in_flight {
            Some(limit) => match limit.acquire().await {
                Ok(permit) => Some(permit),
                Err(_) => {
                    warn!(%trace_id, path = %path, "Upload limiter closed, node not issued");
                    self.ledger.fail(trace_id, "Upload limiter closed".to_string());
                    return None;
                }
            },
            None => None,
        };
        if !self.ledger.is_current(epoch) {
            debug!(%trace_id, path = %path, "Session discarded while queued, node not issued");
            return None;
        }

        debug!(%trace_id, path = %path, kind = ?kind, "Creating remote node");
        let requested_foreign_id = metadata.foreign_id.clone();
        let result = self
            .store
            .create_node(&self.collection_id, metadata, content, on_progress)
            .await;

        match result {
            Ok(created) => {
                self.ledger.complete(trace_id);
                debug!(%trace_id, path = %path, id = %created.id, "Remote node created");
                Some(match requested_foreign_id {
                    Some(foreign_id) => RemoteRef::new(created.id, foreign_id),
                    None => created,
                })
            }
            Err(e) => {
                warn!(
                    %trace_id,
                    path = %path,
                    kind = ?kind,
                    error = %e,
                    "Remote node creation failed"
                );
                self.ledger.fail(trace_id, e.to_string());
                None
            }
        }
    }
}
