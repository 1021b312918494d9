//! Append-only audit log shared across the whole console process.
//!
//! Every component records operator-visible warnings and errors here, independent of whether the
//! view that owns a job is still open. Entries are never mutated or removed individually; the only
//! destructive operation is [`AuditLog::clear`], which replaces the sequence with an empty one.

use std::{
    fmt::{self, Display},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use chrono::{DateTime, Utc};
use getset::Getters;
use serde::{Deserialize, Serialize};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The severity of an audit log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Routine diagnostic information.
    Info,

    /// Something went wrong but the primary flow continued.
    Warn,

    /// A failure that was surfaced to the operator.
    Error,

    /// A long-running operation finished successfully.
    Success,
}

/// An immutable audit log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[getset(get = "pub with_prefix")]
pub struct LogEntry {
    /// Monotonic id, assigned at append time. Never reset except by process restart.
    id: u64,

    /// Wall-clock time the entry was appended.
    timestamp: DateTime<Utc>,

    /// The severity of the entry.
    level: LogLevel,

    /// The component that produced the entry.
    source: String,

    /// The message text.
    message: String,
}

/// A cheaply cloneable handle to the process-wide audit log.
///
/// All clones share the same underlying buffer and id counter.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    inner: Arc<AuditLogInner>,
}

#[derive(Debug, Default)]
struct AuditLogInner {
    next_id: AtomicU64,
    entries: Mutex<Vec<LogEntry>>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl AuditLog {
    /// Creates a new, empty audit log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry and returns it.
    pub fn append(
        &self,
        level: LogLevel,
        source: impl Into<String>,
        message: impl Into<String>,
    ) -> LogEntry {
        let entry = LogEntry {
            id: self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            timestamp: Utc::now(),
            level,
            source: source.into(),
            message: message.into(),
        };

        let mut entries = self.inner.entries.lock().unwrap();
        entries.push(entry.clone());
        entry
    }

    /// Replaces the entry sequence with an empty one. The id counter is not reset.
    pub fn clear(&self) {
        self.inner.entries.lock().unwrap().clear();
    }

    /// Returns all entries in append order.
    pub fn all(&self) -> Vec<LogEntry> {
        self.inner.entries.lock().unwrap().clone()
    }

    /// Returns the number of entries currently held.
    pub fn len(&self) -> usize {
        self.inner.entries.lock().unwrap().len()
    }

    /// Returns whether the log currently holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
            LogLevel::Success => write!(f, "success"),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
