//! Upload orchestrator
//!
//! Public entry point: submit a selection, retry failures, reset, and observe the
//! ledger and session aggregate.

use crate::config::{TreeliftConfig, UploadOptions};
use crate::error::{BuildError, SetupError, UploadError};
use crate::ledger::{Ledger, LedgerSnapshot, UploadTrace};
use crate::remote::{HttpRemoteStore, RemoteStore};
use crate::tree::{build, DirectoryNode, PathEntry};
use crate::types::{NodePath, TraceId};
use crate::upload::{UploadEngine, UploadSession};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Orchestrates hierarchical uploads against one remote collection
pub struct UploadOrchestrator<S: RemoteStore + ?Sized> {
    engine: UploadEngine<S>,
    ledger: Arc<Ledger>,
    session: watch::Sender<Option<UploadSession>>,
    /// Submit and retry passes of the current epoch that have not finished.
    /// Only changed while holding the session channel's lock.
    outstanding: AtomicUsize,
}

/// Orchestrator talking to the document store over HTTP, built from configuration
pub fn connect(config: &TreeliftConfig) -> Result<UploadOrchestrator<HttpRemoteStore>, SetupError> {
    let store = HttpRemoteStore::new(&config.remote)?;
    UploadOrchestrator::new(Arc::new(store), config.upload.clone())
}

impl<S: RemoteStore + ?Sized> UploadOrchestrator<S> {
    pub fn new(store: Arc<S>, options: UploadOptions) -> Result<Self, SetupError> {
        options.validate().map_err(SetupError::Invalid)?;
        let ledger = Arc::new(Ledger::new());
        let engine = UploadEngine::new(
            store,
            Arc::clone(&ledger),
            options.collection_id,
            options.max_in_flight,
        );
        let (session, _) = watch::channel(None);
        Ok(Self {
            engine,
            ledger,
            session,
            outstanding: AtomicUsize::new(0),
        })
    }

    /// Current ledger snapshot
    pub fn ledger(&self) -> LedgerSnapshot {
        self.ledger.snapshot()
    }

    /// Current session aggregate, `None` before submit or after reset
    pub fn session(&self) -> Option<UploadSession> {
        self.session.borrow().clone()
    }

    pub fn subscribe_ledger(&self) -> watch::Receiver<LedgerSnapshot> {
        self.ledger.subscribe()
    }

    pub fn subscribe_session(&self) -> watch::Receiver<Option<UploadSession>> {
        self.session.subscribe()
    }

    /// Upload a selection and wait until every reachable node has settled.
    ///
    /// Structural problems in `entries` are returned before any remote call. Node
    /// failures are not errors here: they are reported through the ledger.
    pub async fn submit(&self, entries: &[PathEntry]) -> Result<UploadSession, UploadError> {
        let root = build(entries)?;
        self.submit_tree(Arc::new(root)).await
    }

    /// Upload an already built tree, replacing any previous session
    pub async fn submit_tree(&self, root: Arc<DirectoryNode>) -> Result<UploadSession, UploadError> {
        if root.is_empty() {
            return Err(BuildError::EmptySelection.into());
        }

        let epoch = self.ledger.reset();
        let session = UploadSession::start(&root);
        info!(
            epoch,
            collection_id = %self.engine.collection_id(),
            total_files = session.total_files,
            total_upload_size = session.total_upload_size,
            "Upload session started"
        );
        self.session.send_modify(|current| {
            *current = Some(session);
            self.outstanding.store(1, Ordering::SeqCst);
        });

        self.engine
            .traverse(root, None, NodePath::root(), epoch)
            .await;
        self.settle(epoch)
    }

    /// Retry every failed trace, including the unattempted subtrees of failed directories.
    ///
    /// With no failed traces this changes nothing and returns the current session.
    /// When another pass of the session is still running, the returned session stays
    /// PENDING; the last pass to finish settles it.
    pub async fn retry_failed(&self) -> Result<UploadSession, UploadError> {
        let current = self.session().ok_or(UploadError::NoSession)?;
        let epoch = self.ledger.epoch();
        let failed = self.ledger.drain_failed();
        if failed.is_empty() {
            return Ok(current);
        }
        self.run_retry(failed, epoch).await
    }

    /// Retry a single failed trace
    pub async fn retry_trace(&self, id: TraceId) -> Result<UploadSession, UploadError> {
        self.session().ok_or(UploadError::NoSession)?;
        let epoch = self.ledger.epoch();
        let trace = self
            .ledger
            .take_failed(id)
            .ok_or(UploadError::NotRetryable(id))?;
        self.run_retry(vec![trace], epoch).await
    }

    /// Discard the session. Calls already issued keep running but no longer report.
    pub fn reset(&self) {
        let epoch = self.ledger.reset();
        self.session.send_modify(|current| {
            *current = None;
            self.outstanding.store(0, Ordering::SeqCst);
        });
        info!(epoch, "Upload session reset");
    }

    async fn run_retry(
        &self,
        failed: Vec<UploadTrace>,
        epoch: u64,
    ) -> Result<UploadSession, UploadError> {
        self.session.send_if_modified(|session| match session {
            Some(session) if self.ledger.is_current(epoch) => {
                session.begin_retry();
                self.outstanding.fetch_add(1, Ordering::SeqCst);
                true
            }
            _ => false,
        });
        self.engine.retry_traces(failed, epoch).await;
        self.settle(epoch)
    }

    /// Finish one pass. The session status is derived only when no other pass is running.
    fn settle(&self, epoch: u64) -> Result<UploadSession, UploadError> {
        let mut settled = None;
        self.session.send_if_modified(|session| {
            if !self.ledger.is_current(epoch) {
                return false;
            }
            let Some(session) = session.as_mut() else {
                return false;
            };
            let remaining = self.outstanding.load(Ordering::SeqCst).saturating_sub(1);
            self.outstanding.store(remaining, Ordering::SeqCst);
            if remaining > 0 {
                settled = Some(session.clone());
                return false;
            }
            session.settle(&self.ledger.snapshot());
            settled = Some(session.clone());
            true
        });

        let session = settled.ok_or(UploadError::Discarded)?;
        if !session.is_settled() {
            debug!(epoch, "Pass finished, session still has passes running");
            return Ok(session);
        }
        let counts = self.ledger.counts();
        info!(
            epoch,
            status = ?session.status,
            succeeded = counts.success,
            failed = counts.error,
            attempts = session.attempts,
            "Upload session settled"
        );
        Ok(session)
    }
}
