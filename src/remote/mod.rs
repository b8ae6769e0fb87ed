//! Remote document store contract
//!
//! The upload engine never talks to the network itself; it calls a `RemoteStore`
//! to create one node at a time.

pub mod http;

use crate::error::TransportError;
use crate::tree::node::ContentHandle;
use crate::types::{RemoteId, RemoteRef};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use http::HttpRemoteStore;

/// Metadata sent alongside a node creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMetadata {
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<RemoteId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_id: Option<String>,
}

impl NodeMetadata {
    /// Metadata for a file named `name` created beneath `parent`
    pub fn for_file(name: &str, content: &ContentHandle, parent: Option<&RemoteRef>) -> Self {
        Self {
            file_name: name.to_string(),
            mime_type: Some(content.mime_type_or_default().to_string()),
            parent_id: parent.map(|p| p.id.clone()),
            foreign_id: None,
        }
    }

    /// Metadata for a directory named `name` created beneath `parent`.
    ///
    /// The foreign id extends the parent's foreign id, or is the bare name at the top level.
    pub fn for_directory(name: &str, parent: Option<&RemoteRef>) -> Self {
        let foreign_id = match parent {
            Some(parent) => parent.child_foreign_id(name),
            None => name.to_string(),
        };
        Self {
            file_name: name.to_string(),
            mime_type: None,
            parent_id: parent.map(|p| p.id.clone()),
            foreign_id: Some(foreign_id),
        }
    }
}

/// Transfer progress reported by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub loaded: u64,
    /// Unknown when the transport cannot compute the body length
    pub total: Option<u64>,
}

impl ProgressEvent {
    pub fn length_computable(&self) -> bool {
        self.total.is_some()
    }
}

/// Callback receiving progress events for one transfer
pub type ProgressSink = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Collaborator that creates nodes on the remote document store
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Create one node in `collection_id`.
    ///
    /// `content` is `None` for directories. Progress, when a sink is supplied, is
    /// reported in transport order with non-decreasing `loaded`.
    async fn create_node(
        &self,
        collection_id: &str,
        metadata: NodeMetadata,
        content: Option<ContentHandle>,
        on_progress: Option<ProgressSink>,
    ) -> Result<RemoteRef, TransportError>;
}
