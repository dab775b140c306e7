//! Task ledger: lifecycle records for arrival tasks.
//!
//! The ledger is a concurrent map from task id to lifecycle state, readable
//! by the gateway while the worker writes. Transitions are last-write-wins;
//! after creation the worker is the sole writer, so no compare-and-swap is
//! needed. Reading an unknown id yields [`None`]; callers that want the
//! poll-friendly default use [`TaskLedger::status_or_pending`], which reports
//! PENDING for ids the ledger has not seen (a deliberate trade of strict
//! not-found semantics for resilience to read-after-write races between the
//! submitting and executing sides).

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Lifecycle state of an arrival task.
///
/// Tasks move PENDING → STARTED → SUCCESS | FAILURE. The terminal states are
/// never left once reached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Submitted but not yet picked up by a worker. Also the reported state
    /// for ids the ledger has no record of.
    #[default]
    Pending,

    /// A worker has begun executing the task.
    Started,

    /// The arrival completed and the assignment was committed.
    Success,

    /// Execution failed; the record carries the error class.
    Failure,
}

impl TaskStatus {
    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Started => "STARTED",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stored state for one task.
#[derive(Clone, Debug)]
pub struct TaskRecord {
    /// Current lifecycle status.
    pub status: TaskStatus,
    /// Error class captured on FAILURE, for observability.
    pub error: Option<String>,
}

/// Concurrent task ledger keyed by task id.
///
/// Cloneable; all clones share the same records. The submitting side creates
/// entries, the worker drives all later transitions, and any clone may read.
#[derive(Clone, Debug, Default)]
pub struct TaskLedger {
    entries: Arc<DashMap<Uuid, TaskRecord>>,
}

impl TaskLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new task in the given initial status.
    pub fn create(&self, task_id: Uuid, status: TaskStatus) {
        self.entries.insert(
            task_id,
            TaskRecord {
                status,
                error: None,
            },
        );
    }

    /// Moves a task to a new status, creating the record if absent.
    ///
    /// Last-write-wins; a previously captured error is kept.
    pub fn transition(&self, task_id: Uuid, status: TaskStatus) {
        self.entries
            .entry(task_id)
            .and_modify(|record| record.status = status)
            .or_insert(TaskRecord {
                status,
                error: None,
            });
    }

    /// Moves a task to FAILURE, capturing the triggering error class.
    pub fn fail(&self, task_id: Uuid, error: impl Into<String>) {
        self.entries.insert(
            task_id,
            TaskRecord {
                status: TaskStatus::Failure,
                error: Some(error.into()),
            },
        );
    }

    /// Discards a task record, if present.
    ///
    /// Used by the submitting side to roll back an entry whose job never
    /// reached the worker.
    pub fn remove(&self, task_id: &Uuid) {
        self.entries.remove(task_id);
    }

    /// Reads the record for a task, if the ledger has one.
    pub fn read(&self, task_id: &Uuid) -> Option<TaskRecord> {
        self.entries.get(task_id).map(|entry| entry.clone())
    }

    /// Reads the status for a task, reporting PENDING for unknown ids.
    pub fn status_or_pending(&self, task_id: &Uuid) -> TaskStatus {
        self.read(task_id)
            .map(|record| record.status)
            .unwrap_or_default()
    }

    /// Number of recorded tasks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no task has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_terminal() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Started.is_terminal());
        assert!(TaskStatus::Success.is_terminal());
        assert!(TaskStatus::Failure.is_terminal());
    }

    #[test]
    fn test_status_default_is_pending() {
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(TaskStatus::Pending.as_str(), "PENDING");
        assert_eq!(TaskStatus::Started.as_str(), "STARTED");
        assert_eq!(TaskStatus::Success.as_str(), "SUCCESS");
        assert_eq!(TaskStatus::Failure.as_str(), "FAILURE");

        let json = serde_json::to_string(&TaskStatus::Success).unwrap();
        assert_eq!(json, "\"SUCCESS\"");
        let parsed: TaskStatus = serde_json::from_str("\"STARTED\"").unwrap();
        assert_eq!(parsed, TaskStatus::Started);
    }

    #[test]
    fn test_create_and_read() {
        let ledger = TaskLedger::new();
        let id = Uuid::new_v4();

        ledger.create(id, TaskStatus::Pending);
        let record = ledger.read(&id).expect("record should exist");
        assert_eq!(record.status, TaskStatus::Pending);
        assert!(record.error.is_none());
    }

    #[test]
    fn test_unknown_id_reads_pending() {
        let ledger = TaskLedger::new();
        let id = Uuid::new_v4();

        assert!(ledger.read(&id).is_none());
        assert_eq!(ledger.status_or_pending(&id), TaskStatus::Pending);
    }

    #[test]
    fn test_transition_lifecycle() {
        let ledger = TaskLedger::new();
        let id = Uuid::new_v4();

        ledger.create(id, TaskStatus::Pending);
        ledger.transition(id, TaskStatus::Started);
        assert_eq!(ledger.status_or_pending(&id), TaskStatus::Started);

        ledger.transition(id, TaskStatus::Success);
        assert_eq!(ledger.status_or_pending(&id), TaskStatus::Success);
    }

    #[test]
    fn test_fail_captures_error_class() {
        let ledger = TaskLedger::new();
        let id = Uuid::new_v4();

        ledger.create(id, TaskStatus::Pending);
        ledger.fail(id, "StationVanished");

        let record = ledger.read(&id).expect("record should exist");
        assert_eq!(record.status, TaskStatus::Failure);
        assert_eq!(record.error.as_deref(), Some("StationVanished"));
    }

    #[test]
    fn test_remove_discards_record() {
        let ledger = TaskLedger::new();
        let id = Uuid::new_v4();

        ledger.create(id, TaskStatus::Pending);
        ledger.remove(&id);
        assert!(ledger.read(&id).is_none());
        assert!(ledger.is_empty());

        // Removing an unknown id is a no-op.
        ledger.remove(&Uuid::new_v4());
    }

    #[test]
    fn test_transition_creates_missing_record() {
        let ledger = TaskLedger::new();
        let id = Uuid::new_v4();

        ledger.transition(id, TaskStatus::Started);
        assert_eq!(ledger.status_or_pending(&id), TaskStatus::Started);
    }

    #[test]
    fn test_clones_share_entries() {
        let ledger = TaskLedger::new();
        let other = ledger.clone();
        let id = Uuid::new_v4();

        ledger.create(id, TaskStatus::Pending);
        assert_eq!(other.status_or_pending(&id), TaskStatus::Pending);
        assert_eq!(other.len(), 1);
        assert!(!other.is_empty());
    }
}
