//! Path-to-tree builder
//!
//! Folds a flat selection into a rooted tree. Pure and deterministic: children keep
//! the order in which they were first named by the selection.

use crate::error::BuildError;
use crate::tree::entry::PathEntry;
use crate::tree::node::{DirectoryNode, FileLeaf, TreeNode};
use std::collections::HashMap;
use std::sync::Arc;

/// Build the tree implied by `entries`, rooted at an unnamed directory.
///
/// Rejects an empty selection, a path used as both file and directory, and a file
/// path selected twice.
pub fn build(entries: &[PathEntry]) -> Result<DirectoryNode, BuildError> {
    if entries.is_empty() {
        return Err(BuildError::EmptySelection);
    }

    let mut root = DirBuilder::new(String::new());
    for entry in entries {
        root.insert(entry)?;
    }
    Ok(root.finish())
}

enum Slot {
    File(FileLeaf),
    Dir(DirBuilder),
}

struct DirBuilder {
    name: String,
    children: Vec<Slot>,
    index: HashMap<String, usize>,
}

impl DirBuilder {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn insert(&mut self, entry: &PathEntry) -> Result<(), BuildError> {
        let segments = entry.segments();
        let (file_name, dirs) = segments.split_last().ok_or(BuildError::EmptyPath)?;

        let mut current = self;
        for (depth, segment) in dirs.iter().enumerate() {
            current = current.directory(segment, || segments[..=depth].join("/"))?;
        }

        if let Some(&idx) = current.index.get(file_name.as_str()) {
            let path = entry.relative_path();
            return Err(match current.children[idx] {
                Slot::File(_) => BuildError::DuplicateEntry { path },
                Slot::Dir(_) => BuildError::PathCollision { path },
            });
        }

        current.push(
            file_name,
            Slot::File(FileLeaf {
                name: file_name.clone(),
                content: entry.content.clone(),
            }),
        );
        Ok(())
    }

    /// Child directory `name`, created on first use
    fn directory(
        &mut self,
        name: &str,
        path: impl FnOnce() -> String,
    ) -> Result<&mut DirBuilder, BuildError> {
        let existing = self.index.get(name).copied();
        let idx = match existing {
            Some(idx) => idx,
            None => self.push(name, Slot::Dir(DirBuilder::new(name.to_string()))),
        };
        match &mut self.children[idx] {
            Slot::Dir(dir) => Ok(dir),
            Slot::File(_) => Err(BuildError::PathCollision { path: path() }),
        }
    }

    fn push(&mut self, name: &str, slot: Slot) -> usize {
        let idx = self.children.len();
        self.children.push(slot);
        self.index.insert(name.to_string(), idx);
        idx
    }

    fn finish(self) -> DirectoryNode {
        let children = self
            .children
            .into_iter()
            .map(|slot| match slot {
                Slot::File(leaf) => TreeNode::File(leaf),
                Slot::Dir(dir) => TreeNode::Directory(Arc::new(dir.finish())),
            })
            .collect();
        DirectoryNode::new(self.name, children)
    }
}
