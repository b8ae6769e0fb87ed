//! Tree traversal: parent-before-child ordering with sibling fan-out.

use crate::ledger::RetryDescriptor;
use crate::remote::RemoteStore;
use crate::tree::node::{DirectoryNode, TreeNode};
use crate::types::{NodePath, RemoteRef};
use crate::upload::UploadEngine;
use futures::future::{join_all, BoxFuture, FutureExt};
use std::sync::Arc;
use tracing::debug;

impl<S: RemoteStore + ?Sized> UploadEngine<S> {
    /// Upload every child of `dir` concurrently beneath `parent`.
    ///
    /// Resolves once every branch has settled. Branches never fail, so one failed
    /// subtree leaves the others running.
    pub fn traverse<'a>(
        &'a self,
        dir: Arc<DirectoryNode>,
        parent: Option<RemoteRef>,
        base: NodePath,
        epoch: u64,
    ) -> BoxFuture<'a, ()> {
        async move {
            let branches: Vec<_> = dir
                .children()
                .iter()
                .map(|child| {
                    let descriptor =
                        RetryDescriptor::new(base.child(child.name()), child.clone(), parent.clone());
                    self.upload_subtree(descriptor, epoch)
                })
                .collect();
            join_all(branches).await;
        }
        .boxed()
    }

    /// Upload one node and, if it is a directory that was created, everything beneath it.
    ///
    /// A directory that fails contributes no child traces.
    pub async fn upload_subtree(&self, descriptor: RetryDescriptor, epoch: u64) {
        let subtree = match &descriptor.node {
            TreeNode::Directory(dir) => Some(Arc::clone(dir)),
            TreeNode::File(_) => None,
        };
        let path = descriptor.path.clone();

        let created = self.upload_node(descriptor, epoch).await;
        match (subtree, created) {
            (Some(dir), Some(created)) => {
                self.traverse(dir, Some(created), path, epoch).await;
            }
            (Some(dir), None) => {
                debug!(
                    path = %path,
                    skipped_files = dir.file_count(),
                    "Directory not created, subtree not attempted"
                );
            }
            (None, _) => {}
        }
    }
}
