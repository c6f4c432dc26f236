#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use crate::core::types::{ErrorCategory, LogType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::broadcast;
use tracing::warn;
use uuid::Uuid;

const BROADCAST_CAPACITY: usize = 256;

/// One orchestration event as persisted and pushed to observers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub session_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: LogType,
    pub message: String,
    pub tool_name: Option<String>,
    pub backup_tool: Option<String>,
    #[serde(default)]
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

/// Builder for one audit event; the sink assigns identity and timestamp at
/// write time.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    session_id: Option<String>,
    kind: LogType,
    message: String,
    tool_name: Option<String>,
    backup_tool: Option<String>,
    metadata: Value,
}

impl AuditEvent {
    pub fn new<T: Into<String>>(kind: LogType, message: T) -> Self {
        AuditEvent {
            session_id: None,
            kind,
            message: message.into(),
            tool_name: None,
            backup_tool: None,
            metadata: Value::Object(Default::default()),
        }
    }

    pub fn info<T: Into<String>>(message: T) -> Self {
        Self::new(LogType::Info, message)
    }

    pub fn healing<T: Into<String>>(message: T) -> Self {
        Self::new(LogType::Healing, message)
    }

    pub fn error<T: Into<String>>(message: T) -> Self {
        Self::new(LogType::Error, message)
    }

    pub fn success<T: Into<String>>(message: T) -> Self {
        Self::new(LogType::Success, message)
    }

    pub fn session(mut self, session_id: Option<&str>) -> Self {
        self.session_id = session_id.map(str::to_string);
        self
    }

    pub fn tool<T: Into<String>>(mut self, tool_name: T) -> Self {
        self.tool_name = Some(tool_name.into());
        self
    }

    pub fn backup<T: Into<String>>(mut self, backup_tool: T) -> Self {
        self.backup_tool = Some(backup_tool.into());
        self
    }

    pub fn metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Append-only, time-ordered audit sink.
///
/// Entries are appended to a JSONL ledger for durability, mirrored in memory
/// for latest-N reads, and pushed to broadcast subscribers. Individual entries
/// are never mutated or reordered; `clear` is the only deletion path.
pub struct AuditLog {
    path: PathBuf,
    entries: Mutex<Vec<LogEntry>>,
    sender: broadcast::Sender<LogEntry>,
}

impl AuditLog {
    /// Open the ledger at `path`, replaying any existing entries into memory.
    /// Unparseable lines are skipped with a warning rather than failing the
    /// process.
    pub fn open(path: PathBuf) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    AppError::new(
                        ErrorCategory::IoError,
                        format!("Failed to create audit directory: {}", e),
                    )
                    .with_code("AUDIT-001")
                })?;
            }
        }

        let mut entries = Vec::new();
        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                AppError::new(
                    ErrorCategory::IoError,
                    format!("Failed to read audit ledger: {}", e),
                )
                .with_code("AUDIT-002")
            })?;
            for line in content.lines().filter(|line| !line.trim().is_empty()) {
                match serde_json::from_str::<LogEntry>(line) {
                    Ok(entry) => entries.push(entry),
                    Err(e) => warn!("skipping malformed audit entry: {}", e),
                }
            }
        }

        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Ok(AuditLog {
            path,
            entries: Mutex::new(entries),
            sender,
        })
    }

    /// Append one event. Ledger write failures are swallowed and reported via
    /// process logging: observability degradation must never fail a request.
    pub fn record(&self, event: AuditEvent) -> LogEntry {
        let entry = LogEntry {
            id: Uuid::new_v4(),
            session_id: event.session_id,
            kind: event.kind,
            message: event.message,
            tool_name: event.tool_name,
            backup_tool: event.backup_tool,
            metadata: event.metadata,
            created_at: Utc::now(),
        };

        // The ledger append happens under the entries lock so a concurrent
        // clear cannot truncate the file between the append and the memory
        // push; file and tail always agree on what survived.
        {
            let mut entries = self.lock_entries();
            if let Err(e) = self.append_to_ledger(&entry) {
                warn!("audit ledger append failed: {}", e);
            }
            entries.push(entry.clone());
        }

        // No receivers is a normal state, not an error.
        let _ = self.sender.send(entry.clone());
        entry
    }

    /// Latest `limit` entries, newest first.
    pub fn latest(&self, limit: usize) -> Vec<LogEntry> {
        let entries = self.lock_entries();
        entries.iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all entries from memory and truncate the ledger.
    pub fn clear(&self) -> Result<(), AppError> {
        let mut entries = self.lock_entries();
        if self.path.exists() {
            fs::write(&self.path, b"").map_err(|e| {
                AppError::new(
                    ErrorCategory::SinkError,
                    format!("Failed to truncate audit ledger: {}", e),
                )
                .with_code("AUDIT-003")
            })?;
        }
        entries.clear();
        Ok(())
    }

    /// Subscribe to entries appended after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }

    // Entries are pushed whole, so a panic elsewhere cannot leave torn data;
    // recover the lock instead of letting the poison reach a request path.
    fn lock_entries(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn append_to_ledger(&self, entry: &LogEntry) -> Result<(), AppError> {
        let line = serde_json::to_string(entry)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(AppError::from)?;
        writeln!(file, "{}", line).map_err(AppError::from)?;
        Ok(())
    }
}
