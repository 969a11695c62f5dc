mod support;

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;

use docindex_engine::{BatchIndexer, IndexError, NullProgressSink, ProgressSink};
use support::{docs, CollectingSink, InMemoryStore};

fn indexer(store: &Arc<InMemoryStore>, sink: Arc<dyn ProgressSink>) -> BatchIndexer {
    BatchIndexer::new(Arc::clone(store) as _, "docs_staging", sink)
        .with_throttle(Duration::ZERO)
}

fn store_with_staging() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store.seed_collection("docs_staging", Vec::new(), Vec::new(), Vec::new());
    store
}

#[tokio::test]
async fn partitions_one_page_into_batches_of_fifty() {
    let store = store_with_staging();
    let indexer = indexer(&store, Arc::new(NullProgressSink));

    let count = indexer.index(&docs(120), "src").await.unwrap();

    assert_eq!(count, 120);
    assert_eq!(
        store.import_calls(),
        vec![
            ("docs_staging".to_string(), 50),
            ("docs_staging".to_string(), 50),
            ("docs_staging".to_string(), 20),
        ]
    );
    assert_eq!(store.document_count("docs_staging"), 120);
}

#[tokio::test]
async fn emits_one_progress_event_per_page() {
    let store = store_with_staging();
    let sink = Arc::new(CollectingSink::new());
    let indexer = indexer(&store, Arc::clone(&sink) as _);

    indexer.index(&docs(60), "https://wiki.example.com").await.unwrap();

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].source, "https://wiki.example.com");
    assert_eq!(events[0].record_count, 60);
}

#[tokio::test]
async fn one_rejected_document_fails_the_whole_call() {
    let store = store_with_staging();
    store.reject_on_call(0);
    let sink = Arc::new(CollectingSink::new());
    let indexer = indexer(&store, Arc::clone(&sink) as _);

    let err = indexer.index(&docs(10), "src").await.unwrap_err();

    match err {
        IndexError::ImportFailed { failures } => {
            assert_eq!(failures.len(), 1);
            assert!(!failures[0].success);
            assert!(failures[0].error.is_some());
        }
        other => panic!("expected ImportFailed, got {other:?}"),
    }
    // No progress is reported for a failed page.
    assert!(sink.events().is_empty());
}

#[tokio::test]
async fn failures_are_collected_across_all_batches() {
    let store = store_with_staging();
    store.reject_on_call(0);
    store.reject_on_call(2);
    let indexer = indexer(&store, Arc::new(NullProgressSink));

    let err = indexer.index(&docs(150), "src").await.unwrap_err();

    match err {
        IndexError::ImportFailed { failures } => assert_eq!(failures.len(), 2),
        other => panic!("expected ImportFailed, got {other:?}"),
    }
    // All three batches were still submitted before the call failed.
    assert_eq!(store.import_calls().len(), 3);
}

#[tokio::test]
async fn transport_error_aborts_immediately() {
    let store = store_with_staging();
    store.transport_fail_on_call(1);
    let indexer = indexer(&store, Arc::new(NullProgressSink));

    let err = indexer.index(&docs(150), "src").await.unwrap_err();

    assert!(matches!(err, IndexError::Store(_)));
    // The second call failed in transport; the third was never made.
    assert_eq!(store.import_calls().len(), 1);
}
