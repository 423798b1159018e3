use std::time::{Duration, Instant};

use crate::document::DEFAULT_MARKDOWN;
use crate::remote::{MemoryRemote, RecordId, RemoteError};
use crate::store::{CONTENT_KEY, MemoryStore, PersistenceStore, StoreError};

use super::{Engine, EngineError, LoadOutcome, RECORD_TITLE};

fn create_test_engine() -> Engine<MemoryStore, MemoryRemote> {
    Engine::new(MemoryStore::new(), MemoryRemote::new())
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Store whose every operation fails.
struct BrokenStore;

impl PersistenceStore for BrokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Read {
            key: key.to_string(),
            source: std::io::Error::other("disk gone"),
        })
    }

    fn set(&self, key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Write {
            key: key.to_string(),
            source: std::io::Error::other("disk gone"),
        })
    }
}

#[test]
fn test_init_without_stored_content_uses_default() {
    let engine = create_test_engine();
    assert_eq!(engine.content(), DEFAULT_MARKDOWN);
    assert!(!engine.has_pending_persist());
    assert!(!engine.is_busy());
    assert_eq!(engine.last_record_id(), None);
}

#[test]
fn test_init_restores_stored_content() {
    let store = MemoryStore::with_value(CONTENT_KEY, "# Stored");
    let engine = Engine::new(store, MemoryRemote::new());
    assert_eq!(engine.content(), "# Stored");
}

#[test]
fn test_init_with_empty_stored_content_uses_default() {
    let store = MemoryStore::with_value(CONTENT_KEY, "");
    let engine = Engine::new(store, MemoryRemote::new());
    assert_eq!(engine.content(), DEFAULT_MARKDOWN);
    assert!(!engine.has_pending_persist());
}

#[test]
fn test_init_keeps_whitespace_only_content() {
    let store = MemoryStore::with_value(CONTENT_KEY, "\n");
    let engine = Engine::new(store, MemoryRemote::new());
    assert_eq!(engine.content(), "\n");
}

#[test]
fn test_init_with_unreadable_store_uses_default() {
    let engine = Engine::new(BrokenStore, MemoryRemote::new());
    assert_eq!(engine.content(), DEFAULT_MARKDOWN);
}

#[test]
fn test_edit_replaces_content_immediately() {
    let engine = create_test_engine();
    engine.edit("# Draft");
    assert_eq!(engine.content(), "# Draft");
    assert_eq!(engine.store().write_count(), 0);
    assert!(engine.has_pending_persist());
}

#[test]
fn test_burst_of_edits_persists_once_with_latest_text() {
    let engine = create_test_engine();
    let t0 = Instant::now();
    engine.edit_at("a", t0);
    engine.edit_at("ab", t0 + ms(100));
    engine.edit_at("abc", t0 + ms(200));

    for t in [0, 100, 200, 500, 699] {
        assert!(!engine.poll_persistence(t0 + ms(t)), "fired early at {t}ms");
    }
    assert_eq!(engine.persistence_deadline(), Some(t0 + ms(700)));
    assert!(engine.poll_persistence(t0 + ms(700)));
    assert!(!engine.poll_persistence(t0 + ms(1500)));

    assert_eq!(
        engine.store().writes(),
        vec![(CONTENT_KEY.to_string(), "abc".to_string())]
    );
}

#[test]
fn test_separate_quiet_periods_persist_separately() {
    let engine = create_test_engine();
    let t0 = Instant::now();
    engine.edit_at("one", t0);
    assert!(engine.poll_persistence(t0 + ms(500)));
    engine.edit_at("two", t0 + ms(900));
    assert!(engine.poll_persistence(t0 + ms(1400)));

    let values: Vec<_> = engine.store().writes().into_iter().map(|(_, v)| v).collect();
    assert_eq!(values, vec!["one", "two"]);
}

#[test]
fn test_custom_debounce_delay() {
    let engine = create_test_engine().with_debounce(ms(50));
    let t0 = Instant::now();
    engine.edit_at("fast", t0);
    assert!(engine.poll_persistence(t0 + ms(50)));
}

#[test]
fn test_flush_writes_pending_content_now() {
    let engine = create_test_engine();
    engine.edit("# Unsaved");
    assert!(engine.flush());
    assert!(!engine.has_pending_persist());
    assert_eq!(
        engine.store().get(CONTENT_KEY).unwrap().as_deref(),
        Some("# Unsaved")
    );
    assert!(!engine.flush(), "nothing left to flush");
}

#[test]
fn test_store_write_failure_does_not_break_editing() {
    let engine = Engine::new(BrokenStore, MemoryRemote::new());
    let t0 = Instant::now();
    engine.edit_at("first", t0);
    assert!(engine.poll_persistence(t0 + ms(500)));
    assert!(!engine.has_pending_persist());

    engine.edit_at("second", t0 + ms(600));
    assert_eq!(engine.content(), "second");
    assert!(engine.has_pending_persist());
}

#[test]
fn test_import_rearms_persistence() {
    let engine = create_test_engine();
    engine.import_from_file("# From disk\n");
    assert_eq!(engine.content(), "# From disk\n");
    let due = engine.persistence_deadline().unwrap();
    assert!(engine.poll_persistence(due));
    assert_eq!(
        engine.store().get(CONTENT_KEY).unwrap().as_deref(),
        Some("# From disk\n")
    );
}

#[test]
fn test_export_then_import_into_fresh_engine() {
    let source = create_test_engine();
    source.edit("# Title\n\n| a | b |\n|---|---|\n");
    let export = source.export_to_file();
    assert_eq!(export.file_name, "document.md");
    assert_eq!(export.media_type, "text/markdown");

    let fresh = create_test_engine();
    fresh.import_from_file(export.to_text());
    assert_eq!(fresh.content(), source.content());
}

#[test]
fn test_render_is_idempotent_and_pure() {
    let engine = create_test_engine();
    engine.edit("# Hello\n\n~~old~~ new");
    let first = engine.render();
    let second = engine.render();
    assert_eq!(first, second);
    assert!(first.contains("<h1>Hello</h1>"));
    assert_eq!(engine.store().write_count(), 0);
}

#[tokio::test]
async fn test_save_remote_records_id_and_leaves_document() {
    let engine = create_test_engine();
    engine.edit("# Cloud");

    let id = engine.save_remote().await.unwrap();
    assert_eq!(id, RecordId::Number(101));
    assert_eq!(engine.last_record_id(), Some(RecordId::Number(101)));
    assert_eq!(engine.load_prompt_default(), "101");
    assert!(!engine.is_busy());
    assert_eq!(engine.content(), "# Cloud");

    let stored = engine.remote().record("101").unwrap();
    assert_eq!(stored.body, "# Cloud");
    assert_eq!(stored.title, RECORD_TITLE);
    assert_eq!(stored.user_id, 1);
}

#[tokio::test]
async fn test_save_remote_failure_clears_busy() {
    let engine = create_test_engine();
    engine.remote().set_offline(true);

    let err = engine.save_remote().await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::RemoteSave(RemoteError::Unavailable(_))
    ));
    assert_eq!(err.user_message(), "Error saving content.");
    assert!(err.remote().is_some());
    assert!(!engine.is_busy());
    assert_eq!(engine.last_record_id(), None);
    assert_eq!(engine.content(), DEFAULT_MARKDOWN);
}

#[tokio::test]
async fn test_load_remote_replaces_document() {
    let engine = Engine::new(
        MemoryStore::new(),
        MemoryRemote::new().with_record(5_u64, "# Remote body"),
    );

    let outcome = engine.load_remote("5").await.unwrap();
    assert_eq!(outcome, LoadOutcome::Loaded(RecordId::Number(5)));
    assert_eq!(engine.content(), "# Remote body");
    assert_eq!(engine.last_record_id(), Some(RecordId::Number(5)));
    assert!(!engine.is_busy());
    assert!(engine.has_pending_persist(), "loaded text should be persisted");
}

#[tokio::test]
async fn test_load_remote_not_found_keeps_document() {
    let engine = create_test_engine();
    engine.edit("# Mine");
    let before = engine.content();

    let err = engine.load_remote("999").await.unwrap_err();
    match &err {
        EngineError::RemoteLoad { id, source } => {
            assert_eq!(id, "999");
            assert!(matches!(source, RemoteError::NotFound(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.user_message(), "Error loading content.");
    assert_eq!(engine.content(), before);
    assert!(!engine.is_busy());
    assert_eq!(engine.last_record_id(), None);
}

#[tokio::test]
async fn test_load_remote_network_failure_keeps_last_id() {
    let engine = create_test_engine();
    engine.save_remote().await.unwrap();
    engine.remote().set_offline(true);

    assert!(engine.load_remote("101").await.is_err());
    assert!(!engine.is_busy());
    assert_eq!(engine.last_record_id(), Some(RecordId::Number(101)));
}

#[tokio::test]
async fn test_load_remote_empty_id_is_noop() {
    let engine = create_test_engine();
    assert_eq!(engine.load_remote("").await.unwrap(), LoadOutcome::Skipped);
    assert_eq!(engine.load_remote("  ").await.unwrap(), LoadOutcome::Skipped);
    assert_eq!(engine.remote().request_count(), 0);
    assert!(!engine.is_busy());
}

#[tokio::test]
async fn test_busy_while_request_in_flight() {
    let engine = create_test_engine();
    let (saved, busy_during) = tokio::join!(engine.save_remote(), async { engine.is_busy() });
    assert!(saved.is_ok());
    assert!(busy_during);
    assert!(!engine.is_busy());
}

#[tokio::test]
async fn test_overlapping_remote_call_rejected() {
    let engine = create_test_engine();
    let (first, second) = tokio::join!(engine.save_remote(), engine.load_remote("101"));
    assert_eq!(first.unwrap(), RecordId::Number(101));
    let busy = second.unwrap_err();
    assert!(matches!(busy, EngineError::Busy));
    assert!(busy.remote().is_none());
    assert_eq!(engine.remote().request_count(), 1);
    assert!(!engine.is_busy());
}

#[tokio::test]
async fn test_save_uses_content_captured_at_call_time() {
    let engine = create_test_engine();
    engine.edit("snapshot");
    let (saved, ()) = tokio::join!(engine.save_remote(), async {
        engine.edit("typed while saving");
    });

    let id = saved.unwrap();
    assert_eq!(engine.remote().record(&id.to_string()).unwrap().body, "snapshot");
    assert_eq!(engine.content(), "typed while saving");
}

#[tokio::test]
async fn test_cancelled_remote_call_clears_busy() {
    let engine = create_test_engine();
    let finished = tokio::select! {
        biased;
        _ = engine.save_remote() => true,
        () = std::future::ready(()) => false,
    };
    assert!(!finished, "save should still be suspended when dropped");
    assert!(!engine.is_busy());
}
