//! Selection tree node types

use crate::types::{NodeKind, NodePath};
use std::path::PathBuf;
use std::sync::Arc;

/// MIME type sent when the selection does not know one
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Where the bytes of a selected file come from
#[derive(Debug, Clone)]
pub enum ContentSource {
    Memory(Arc<Vec<u8>>),
    Path(PathBuf),
}

/// Handle to the content of one selected file
#[derive(Debug, Clone)]
pub struct ContentHandle {
    pub name: String,
    /// Size reported by the selection
    pub size: u64,
    /// Number of bytes the transport will send
    pub byte_length: u64,
    pub mime_type: Option<String>,
    pub source: ContentSource,
}

impl ContentHandle {
    /// Content held in memory
    pub fn from_bytes(name: impl Into<String>, mime_type: Option<String>, bytes: Vec<u8>) -> Self {
        let len = bytes.len() as u64;
        Self {
            name: name.into(),
            size: len,
            byte_length: len,
            mime_type,
            source: ContentSource::Memory(Arc::new(bytes)),
        }
    }

    /// Content read lazily from a local file of known length
    pub fn from_path(
        name: impl Into<String>,
        mime_type: Option<String>,
        path: PathBuf,
        len: u64,
    ) -> Self {
        Self {
            name: name.into(),
            size: len,
            byte_length: len,
            mime_type,
            source: ContentSource::Path(path),
        }
    }

    pub fn mime_type_or_default(&self) -> &str {
        match self.mime_type.as_deref() {
            Some(mime) if !mime.is_empty() => mime,
            _ => DEFAULT_MIME_TYPE,
        }
    }

    /// Load the full content
    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        match &self.source {
            ContentSource::Memory(bytes) => Ok(bytes.as_ref().clone()),
            ContentSource::Path(path) => tokio::fs::read(path).await,
        }
    }
}

/// A selected file
#[derive(Debug, Clone)]
pub struct FileLeaf {
    pub name: String,
    pub content: ContentHandle,
}

/// A directory implied by the selected paths
#[derive(Debug, Clone)]
pub struct DirectoryNode {
    pub(crate) name: String,
    pub(crate) children: Vec<TreeNode>, // insertion order, names unique
}

/// Node of the selection tree
#[derive(Debug, Clone)]
pub enum TreeNode {
    File(FileLeaf),
    Directory(Arc<DirectoryNode>),
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::File(leaf) => &leaf.name,
            TreeNode::Directory(dir) => &dir.name,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            TreeNode::File(_) => NodeKind::File,
            TreeNode::Directory(_) => NodeKind::Directory,
        }
    }
}

impl DirectoryNode {
    pub(crate) fn new(name: String, children: Vec<TreeNode>) -> Self {
        Self { name, children }
    }

    /// Name of this directory; empty for the implicit root
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Children in the order they were first selected
    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&TreeNode> {
        self.children.iter().find(|child| child.name() == name)
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of files anywhere beneath this directory
    pub fn file_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| match child {
                TreeNode::File(_) => 1,
                TreeNode::Directory(dir) => dir.file_count(),
            })
            .sum()
    }

    /// Sum of the reported sizes of every file beneath this directory
    pub fn total_size(&self) -> u64 {
        self.children
            .iter()
            .map(|child| match child {
                TreeNode::File(leaf) => leaf.content.size,
                TreeNode::Directory(dir) => dir.total_size(),
            })
            .sum()
    }

    /// Paths of every file beneath this directory, relative to it
    pub fn leaf_paths(&self) -> Vec<NodePath> {
        let mut paths = Vec::new();
        self.collect_leaf_paths(&NodePath::root(), &mut paths);
        paths
    }

    fn collect_leaf_paths(&self, base: &NodePath, out: &mut Vec<NodePath>) {
        for child in &self.children {
            let path = base.child(child.name());
            match child {
                TreeNode::File(_) => out.push(path),
                TreeNode::Directory(dir) => dir.collect_leaf_paths(&path, out),
            }
        }
    }
}
