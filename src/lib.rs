//! Treelift: Hierarchical Concurrent Uploads
//!
//! Rebuilds the directory hierarchy of a flat path selection and creates it on a
//! remote document store: parents before children, siblings concurrently, with
//! per-node progress, isolated failures, and retry of exactly the failed subtrees.

pub mod config;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod orchestrator;
pub mod remote;
pub mod tree;
pub mod types;
pub mod upload;

pub use error::{BuildError, SetupError, TransportError, UploadError};
pub use ledger::{LedgerSnapshot, RetryDescriptor, UploadTrace};
pub use orchestrator::{connect, UploadOrchestrator};
pub use remote::{NodeMetadata, ProgressEvent, ProgressSink, RemoteStore};
pub use tree::{ContentHandle, PathEntry};
pub use types::{NodeKind, RemoteId, RemoteRef, TraceId, UploadStatus};
pub use upload::UploadSession;
