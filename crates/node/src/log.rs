use std::sync::{Arc, RwLock};

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use claimer_types::{LogEntry, Severity};

/// Append-only, in-memory log of everything that happened during a session.
///
/// Cheap to clone; all clones share the same entries. Live observers can subscribe to
/// new entries, and every entry is mirrored to `tracing`.
#[derive(Clone)]
pub struct SessionLog {
    entries: Arc<RwLock<Vec<LogEntry>>>,
    tx: broadcast::Sender<LogEntry>,
}

impl SessionLog {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1024);
        Self {
            entries: Default::default(),
            tx,
        }
    }

    /// Append an entry
    pub fn push(&self, severity: Severity, message: impl Into<String>) {
        let entry = LogEntry {
            timestamp: Utc::now(),
            message: message.into(),
            severity,
        };

        match severity {
            Severity::Error => error!(kind = %severity, "{}", entry.message),
            Severity::Warning => warn!(kind = %severity, "{}", entry.message),
            _ => info!(kind = %severity, "{}", entry.message),
        }

        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry.clone());

        // No subscribers is fine
        let _ = self.tx.send(entry);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(Severity::Info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(Severity::Success, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.push(Severity::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(Severity::Error, message);
    }

    /// Snapshot of all entries, oldest first
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Receive entries appended from now on
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.tx.subscribe()
    }

    /// Drop all entries, leaving a single note that the log was cleared
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        self.info("Log cleared");
    }
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLog")
            .field("entries", &self.len())
            .finish()
    }
}
