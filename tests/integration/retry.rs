use crate::support::{entry, orchestrator, ScriptedStore};
use std::sync::Arc;
use treelift::{UploadError, UploadStatus};

#[tokio::test]
async fn retry_with_nothing_failed_is_a_no_op() {
    let store = ScriptedStore::new();
    let uploads = orchestrator(&store);
    let session = uploads
        .submit(&[entry("a.txt", 1), entry("folder/b.txt", 1)])
        .await
        .unwrap();

    let before = uploads.ledger();
    let mut ledger_rx = uploads.subscribe_ledger();
    ledger_rx.borrow_and_update();
    let calls = store.events().len();

    let after_retry = uploads.retry_failed().await.unwrap();

    assert_eq!(after_retry, session);
    assert!(!ledger_rx.has_changed().unwrap());
    let after = uploads.ledger();
    assert_eq!(
        before.iter().map(|t| t.id).collect::<Vec<_>>(),
        after.iter().map(|t| t.id).collect::<Vec<_>>()
    );
    assert_eq!(store.events().len(), calls);
}

#[tokio::test]
async fn failed_directory_descendants_appear_only_after_retry() {
    let store = ScriptedStore::new();
    store.fail("d");
    let uploads = orchestrator(&store);
    let selection = [
        entry("d/e/f.txt", 2),
        entry("d/e/g/h.txt", 2),
        entry("d/i.txt", 2),
        entry("k.txt", 2),
    ];
    uploads.submit(&selection).await.unwrap();

    let ledger = uploads.ledger();
    assert!(ledger
        .iter()
        .all(|t| !t.path.to_string().starts_with("d/")));

    store.heal("d");
    uploads.retry_failed().await.unwrap();

    let mut paths: Vec<String> = uploads
        .ledger()
        .iter()
        .map(|t| {
            assert_eq!(t.status, UploadStatus::Success, "{} not uploaded", t.path);
            t.path.to_string()
        })
        .collect();
    paths.sort();
    assert_eq!(
        paths,
        vec!["d", "d/e", "d/e/f.txt", "d/e/g", "d/e/g/h.txt", "d/i.txt", "k.txt"]
    );
}

#[tokio::test]
async fn retrying_a_file_retries_only_that_file() {
    let store = ScriptedStore::new();
    store.fail("folder/b.txt");
    let uploads = orchestrator(&store);
    uploads
        .submit(&[entry("folder/a.txt", 1), entry("folder/b.txt", 1)])
        .await
        .unwrap();
    let folder_creations = store
        .started()
        .iter()
        .filter(|p| *p == "folder")
        .count();

    store.heal("folder/b.txt");
    let session = uploads.retry_failed().await.unwrap();
    assert_eq!(session.status, UploadStatus::Success);

    let started = store.started();
    assert_eq!(started.iter().filter(|p| *p == "folder").count(), folder_creations);
    assert_eq!(started.iter().filter(|p| *p == "folder/a.txt").count(), 1);
    assert_eq!(started.iter().filter(|p| *p == "folder/b.txt").count(), 2);

    // the retried file keeps its original parent
    let b = store.metadata_for("folder/b.txt").unwrap();
    assert_eq!(b.parent_id, store.id_for("folder"));
}

#[tokio::test]
async fn repeated_failures_stay_retryable() {
    let store = ScriptedStore::new();
    store.fail_everything(true);
    let uploads = orchestrator(&store);
    uploads.submit(&[entry("a.txt", 1)]).await.unwrap();

    let session = uploads.retry_failed().await.unwrap();
    assert_eq!(session.status, UploadStatus::Error);
    assert_eq!(session.attempts, 2);
    let ledger = uploads.ledger();
    assert_eq!(ledger.len(), 1);
    assert!(ledger[0].can_retry());

    store.fail_everything(false);
    let session = uploads.retry_failed().await.unwrap();
    assert_eq!(session.status, UploadStatus::Success);
    assert_eq!(session.attempts, 3);
    assert_eq!(uploads.ledger().len(), 1);
}

#[tokio::test]
async fn single_trace_retry() {
    let store = ScriptedStore::new();
    store.fail("a.txt");
    store.fail("b.txt");
    let uploads = orchestrator(&store);
    uploads
        .submit(&[entry("a.txt", 1), entry("b.txt", 1), entry("c.txt", 1)])
        .await
        .unwrap();

    let ledger = uploads.ledger();
    let a = ledger.iter().find(|t| t.name == "a.txt").unwrap().id;
    let c = ledger.iter().find(|t| t.name == "c.txt").unwrap().id;

    assert!(matches!(
        uploads.retry_trace(c).await,
        Err(UploadError::NotRetryable(id)) if id == c
    ));

    store.heal("a.txt");
    uploads.retry_trace(a).await.unwrap();

    let ledger = uploads.ledger();
    let status_of = |name: &str| ledger.iter().find(|t| t.name == name).map(|t| t.status);
    assert_eq!(status_of("a.txt"), Some(UploadStatus::Success));
    assert_eq!(status_of("b.txt"), Some(UploadStatus::Error));
    assert_eq!(ledger.iter().filter(|t| t.name == "a.txt").count(), 1);
}

#[tokio::test]
async fn retry_during_submit_leaves_session_pending_until_both_finish() {
    let store = ScriptedStore::new();
    store.fail("a.txt");
    let gate = store.gate("slow.txt");
    let uploads = Arc::new(orchestrator(&store));
    let mut ledger_rx = uploads.subscribe_ledger();

    let submit = {
        let uploads = Arc::clone(&uploads);
        tokio::spawn(async move {
            uploads
                .submit(&[entry("a.txt", 1), entry("slow.txt", 1)])
                .await
        })
    };

    ledger_rx
        .wait_for(|traces| {
            traces
                .iter()
                .any(|t| t.name == "a.txt" && t.status == UploadStatus::Error)
        })
        .await
        .unwrap();

    store.heal("a.txt");
    let during = uploads.retry_failed().await.unwrap();
    assert_eq!(during.status, UploadStatus::Pending);
    assert_eq!(during.attempts, 2);
    assert_eq!(
        uploads.session().map(|s| s.status),
        Some(UploadStatus::Pending)
    );
    let ledger = uploads.ledger();
    let status_of = |name: &str| ledger.iter().find(|t| t.name == name).map(|t| t.status);
    assert_eq!(status_of("a.txt"), Some(UploadStatus::Success));
    assert_eq!(status_of("slow.txt"), Some(UploadStatus::Pending));

    gate.notify_one();
    let settled = submit.await.unwrap().unwrap();
    assert_eq!(settled.status, UploadStatus::Success);
    assert_eq!(settled.attempts, 2);
    assert_eq!(uploads.session(), Some(settled));
    assert!(uploads
        .ledger()
        .iter()
        .all(|t| t.status == UploadStatus::Success));
}

#[tokio::test]
async fn submit_during_retry_discards_the_retry() {
    let store = ScriptedStore::new();
    store.fail("a.txt");
    let uploads = Arc::new(orchestrator(&store));
    uploads.submit(&[entry("a.txt", 1)]).await.unwrap();

    store.heal("a.txt");
    let gate = store.gate("a.txt");
    let mut ledger_rx = uploads.subscribe_ledger();
    let retry = {
        let uploads = Arc::clone(&uploads);
        tokio::spawn(async move { uploads.retry_failed().await })
    };

    ledger_rx
        .wait_for(|traces| {
            traces
                .iter()
                .any(|t| t.name == "a.txt" && t.status == UploadStatus::Pending)
        })
        .await
        .unwrap();

    let fresh = uploads.submit(&[entry("b.txt", 1)]).await.unwrap();
    assert_eq!(fresh.status, UploadStatus::Success);
    assert_eq!(fresh.attempts, 1);

    gate.notify_one();
    assert!(matches!(retry.await.unwrap(), Err(UploadError::Discarded)));
    assert_eq!(uploads.session(), Some(fresh));
    let ledger = uploads.ledger();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].name, "b.txt");
}
