use crate::support::{entry, limited_orchestrator, orchestrator, ScriptedStore, StoreEvent};
use std::sync::Arc;
use std::time::Duration;
use treelift::{UploadError, UploadStatus};

fn position(events: &[StoreEvent], wanted: &StoreEvent) -> usize {
    events
        .iter()
        .position(|e| e == wanted)
        .unwrap_or_else(|| panic!("missing event {:?}", wanted))
}

fn nested_selection() -> Vec<treelift::PathEntry> {
    vec![
        entry("a/b/c/deep.txt", 4),
        entry("a/b/side.txt", 4),
        entry("a/top.txt", 4),
        entry("x/one.txt", 4),
        entry("x/y/two.txt", 4),
        entry("root.txt", 4),
    ]
}

#[tokio::test]
async fn children_start_only_after_parent_is_created() {
    let store = ScriptedStore::new();
    let uploads = orchestrator(&store);
    uploads.submit(&nested_selection()).await.unwrap();

    let events = store.events();
    let edges = [
        ("a", "a/b"),
        ("a", "a/top.txt"),
        ("a/b", "a/b/c"),
        ("a/b", "a/b/side.txt"),
        ("a/b/c", "a/b/c/deep.txt"),
        ("x", "x/one.txt"),
        ("x", "x/y"),
        ("x/y", "x/y/two.txt"),
    ];
    for (parent, child) in edges {
        let created = position(&events, &StoreEvent::Created(parent.to_string()));
        let started = position(&events, &StoreEvent::Started(child.to_string()));
        assert!(
            created < started,
            "{} started before {} was created",
            child,
            parent
        );
    }
}

#[tokio::test]
async fn siblings_are_issued_concurrently() {
    let store = ScriptedStore::with_delay(Duration::from_millis(20));
    let uploads = orchestrator(&store);
    uploads
        .submit(&[
            entry("1.txt", 1),
            entry("2.txt", 1),
            entry("3.txt", 1),
            entry("4.txt", 1),
        ])
        .await
        .unwrap();

    assert_eq!(store.peak_concurrency(), 4);
}

#[tokio::test]
async fn failures_do_not_block_unrelated_subtrees() {
    let store = ScriptedStore::new();
    store.fail("a/b");
    store.fail("x/one.txt");
    let uploads = orchestrator(&store);

    let session = uploads.submit(&nested_selection()).await.unwrap();
    assert_eq!(session.status, UploadStatus::Success);

    let ledger = uploads.ledger();
    let status_of = |path: &str| {
        ledger
            .iter()
            .find(|t| t.path.to_string() == path)
            .map(|t| t.status)
    };

    assert_eq!(status_of("a"), Some(UploadStatus::Success));
    assert_eq!(status_of("a/b"), Some(UploadStatus::Error));
    assert_eq!(status_of("a/top.txt"), Some(UploadStatus::Success));
    assert_eq!(status_of("a/b/side.txt"), None);
    assert_eq!(status_of("a/b/c"), None);
    assert_eq!(status_of("x/one.txt"), Some(UploadStatus::Error));
    assert_eq!(status_of("x/y/two.txt"), Some(UploadStatus::Success));
    assert_eq!(status_of("root.txt"), Some(UploadStatus::Success));
}

#[tokio::test]
async fn in_flight_limit_bounds_concurrency_without_deadlock() {
    let store = ScriptedStore::with_delay(Duration::from_millis(5));
    let uploads = limited_orchestrator(&store, 2);

    let session = uploads.submit(&nested_selection()).await.unwrap();
    assert_eq!(session.status, UploadStatus::Success);
    assert_eq!(uploads.ledger().len(), 11);
    assert!(store.peak_concurrency() <= 2);

    let store = ScriptedStore::with_delay(Duration::from_millis(1));
    let uploads = limited_orchestrator(&store, 1);
    let session = uploads.submit(&nested_selection()).await.unwrap();
    assert_eq!(session.status, UploadStatus::Success);
    assert_eq!(store.peak_concurrency(), 1);
}

#[tokio::test]
async fn pending_traces_are_visible_before_completion() {
    let store = ScriptedStore::new();
    let gate = store.gate("slow.txt");
    let uploads = Arc::new(orchestrator(&store));
    let mut ledger_rx = uploads.subscribe_ledger();

    let task = {
        let uploads = Arc::clone(&uploads);
        tokio::spawn(async move { uploads.submit(&[entry("slow.txt", 8)]).await })
    };

    let snapshot = ledger_rx
        .wait_for(|traces| !traces.is_empty())
        .await
        .unwrap()
        .clone();
    assert_eq!(snapshot[0].status, UploadStatus::Pending);
    assert_eq!(
        uploads.session().map(|s| s.status),
        Some(UploadStatus::Pending)
    );

    gate.notify_one();
    let session = task.await.unwrap().unwrap();
    assert_eq!(session.status, UploadStatus::Success);
    // the earlier snapshot is unchanged by later updates
    assert_eq!(snapshot[0].status, UploadStatus::Pending);
}

#[tokio::test]
async fn reset_discards_in_flight_session() {
    let store = ScriptedStore::new();
    let gate = store.gate("dir");
    let uploads = Arc::new(orchestrator(&store));
    let mut ledger_rx = uploads.subscribe_ledger();

    let task = {
        let uploads = Arc::clone(&uploads);
        tokio::spawn(async move {
            uploads
                .submit(&[entry("dir/child.txt", 1), entry("dir/other.txt", 1)])
                .await
        })
    };

    ledger_rx
        .wait_for(|traces| !traces.is_empty())
        .await
        .unwrap();
    uploads.reset();
    gate.notify_one();

    assert!(matches!(task.await.unwrap(), Err(UploadError::Discarded)));
    assert!(uploads.ledger().is_empty());
    assert_eq!(uploads.session(), None);
    // the directory call was already issued; its children never are
    assert!(store.started().contains(&"dir".to_string()));
    assert!(!store.started().contains(&"dir/child.txt".to_string()));
}
