//! Upload engine
//!
//! Node uploader, tree traversal, and retry coordination over a shared ledger.

pub mod node;
pub mod retry;
pub mod session;
pub mod traverse;

use crate::ledger::Ledger;
use crate::remote::RemoteStore;
use std::sync::Arc;
use tokio::sync::Semaphore;

pub use session::UploadSession;

/// Drives node creation against a `RemoteStore` and records outcomes in the ledger
pub struct UploadEngine<S: RemoteStore + ?Sized> {
    store: Arc<S>,
    ledger: Arc<Ledger>,
    collection_id: String,
    /// Bounds outstanding remote calls when configured
    in_flight: Option<Arc<Semaphore>>,
}

impl<S: RemoteStore + ?Sized> UploadEngine<S> {
    pub fn new(
        store: Arc<S>,
        ledger: Arc<Ledger>,
        collection_id: impl Into<String>,
        max_in_flight: Option<usize>,
    ) -> Self {
        Self {
            store,
            ledger,
            collection_id: collection_id.into(),
            in_flight: max_in_flight.map(|n| Arc::new(Semaphore::new(n))),
        }
    }

    pub fn collection_id(&self) -> &str {
        &self.collection_id
    }
}
