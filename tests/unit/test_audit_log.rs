use lazarus::core::audit::{AuditEvent, AuditLog};
use lazarus::core::types::LogType;
use serde_json::json;
use std::fs;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn open_log(dir: &TempDir) -> AuditLog {
    AuditLog::open(dir.path().join("audit.jsonl")).expect("audit log should open")
}

#[test]
fn test_record_and_latest_newest_first() {
    let dir = TempDir::new().unwrap();
    let log = open_log(&dir);

    log.record(AuditEvent::info("first"));
    log.record(AuditEvent::healing("second"));
    log.record(AuditEvent::success("third"));

    let latest = log.latest(2);
    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0].message, "third");
    assert_eq!(latest[1].message, "second");
}

#[test]
fn test_entry_fields_assigned_at_write() {
    let dir = TempDir::new().unwrap();
    let log = open_log(&dir);

    let entry = log.record(
        AuditEvent::healing("Attempting fallback: mock_flights")
            .session(Some("session-1"))
            .tool("amadeus_flights")
            .backup("mock_flights")
            .metadata(json!({"error": "HTTP 500"})),
    );

    assert_eq!(entry.kind, LogType::Healing);
    assert_eq!(entry.session_id.as_deref(), Some("session-1"));
    assert_eq!(entry.tool_name.as_deref(), Some("amadeus_flights"));
    assert_eq!(entry.backup_tool.as_deref(), Some("mock_flights"));
    assert_eq!(entry.metadata["error"], "HTTP 500");
}

#[test]
fn test_replay_from_ledger() {
    let dir = TempDir::new().unwrap();
    {
        let log = open_log(&dir);
        log.record(AuditEvent::info("persisted one"));
        log.record(AuditEvent::error("persisted two"));
    }

    let reopened = open_log(&dir);
    assert_eq!(reopened.len(), 2);
    let latest = reopened.latest(10);
    assert_eq!(latest[0].message, "persisted two");
    assert_eq!(latest[1].message, "persisted one");
}

#[test]
fn test_malformed_ledger_lines_are_skipped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("audit.jsonl");
    {
        let log = AuditLog::open(path.clone()).unwrap();
        log.record(AuditEvent::info("valid"));
    }
    let mut content = fs::read_to_string(&path).unwrap();
    content.push_str("this is not json\n");
    fs::write(&path, content).unwrap();

    let reopened = AuditLog::open(path).unwrap();
    assert_eq!(reopened.len(), 1);
}

#[test]
fn test_clear_removes_everything() {
    let dir = TempDir::new().unwrap();
    let log = open_log(&dir);

    log.record(AuditEvent::info("one"));
    log.record(AuditEvent::info("two"));
    assert_eq!(log.len(), 2);

    log.clear().unwrap();
    assert!(log.is_empty());
    assert!(log.latest(10).is_empty());

    // The ledger is truncated too: a reopen sees nothing.
    drop(log);
    let reopened = open_log(&dir);
    assert!(reopened.is_empty());
}

#[test]
fn test_ledger_and_memory_agree_under_concurrent_clear() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("audit.jsonl");
    let log = Arc::new(AuditLog::open(path.clone()).unwrap());

    let writers: Vec<_> = (0..4)
        .map(|writer| {
            let log = Arc::clone(&log);
            thread::spawn(move || {
                for i in 0..50 {
                    log.record(AuditEvent::info(format!("entry {}-{}", writer, i)));
                }
            })
        })
        .collect();
    let clearer = {
        let log = Arc::clone(&log);
        thread::spawn(move || {
            for _ in 0..10 {
                log.clear().unwrap();
                thread::yield_now();
            }
        })
    };
    for writer in writers {
        writer.join().unwrap();
    }
    clearer.join().unwrap();

    // Whatever survived the clears, the file and the in-memory tail must
    // describe the same set of entries.
    let reopened = AuditLog::open(path).unwrap();
    assert_eq!(reopened.len(), log.len());
    let from_file: Vec<String> = reopened
        .latest(usize::MAX)
        .into_iter()
        .map(|entry| entry.message)
        .collect();
    let from_memory: Vec<String> = log
        .latest(usize::MAX)
        .into_iter()
        .map(|entry| entry.message)
        .collect();
    assert_eq!(from_file, from_memory);
}

#[test]
fn test_subscribe_receives_new_entries() {
    let dir = TempDir::new().unwrap();
    let log = open_log(&dir);

    let mut receiver = log.subscribe();
    log.record(AuditEvent::success("observed"));

    let pushed = receiver.try_recv().expect("subscriber should see the entry");
    assert_eq!(pushed.message, "observed");
    assert_eq!(pushed.kind, LogType::Success);
}

#[test]
fn test_subscriber_only_sees_entries_after_subscribe() {
    let dir = TempDir::new().unwrap();
    let log = open_log(&dir);

    log.record(AuditEvent::info("before"));
    let mut receiver = log.subscribe();
    log.record(AuditEvent::info("after"));

    let pushed = receiver.try_recv().unwrap();
    assert_eq!(pushed.message, "after");
    assert!(receiver.try_recv().is_err());
}

#[test]
fn test_wire_shape_uses_type_field() {
    let dir = TempDir::new().unwrap();
    let log = open_log(&dir);

    let entry = log.record(AuditEvent::error("boom").tool("amadeus_flights"));
    let value = serde_json::to_value(&entry).unwrap();

    assert_eq!(value["type"], "error");
    assert_eq!(value["tool_name"], "amadeus_flights");
    assert!(value["created_at"].is_string());
    assert!(value.get("session_id").is_some());
}
