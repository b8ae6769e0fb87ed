//! Selection trees
//!
//! Converts a flat selection of relative paths into the rooted directory tree
//! that the upload engine walks.

pub mod builder;
pub mod entry;
pub mod node;

pub use builder::build;
pub use entry::{collect_local, PathEntry};
pub use node::{ContentHandle, ContentSource, DirectoryNode, FileLeaf, TreeNode};
