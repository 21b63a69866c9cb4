//! Session entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use shifthub_core::types::{SessionKey, ShiftName};

use crate::checklist::{AuxiliaryItem, Task};

/// The logical record of one occurrence of one shift's checklist.
///
/// Exactly one live Session document exists per session key; the key is
/// immutable once created. The whole document is the unit of shared
/// mutable state: `tasks` and `auxiliary_checklist` are only ever
/// replaced in full, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The derived key addressing this document in the store.
    pub session_key: SessionKey,
    /// The shift this session belongs to.
    pub shift: ShiftName,
    /// The calendar date the session logically belongs to. For
    /// midnight-crossing shifts this stays on the start-side date for the
    /// whole occurrence.
    pub session_date: NaiveDate,
    /// Ordered checklist tasks.
    pub tasks: Vec<Task>,
    /// Ordered auxiliary checklist (fixed-time rounds).
    pub auxiliary_checklist: Vec<AuxiliaryItem>,
    /// When the document was first created.
    pub created_at: DateTime<Utc>,
    /// Bumped on every whole-collection replace.
    pub last_updated: DateTime<Utc>,
}

impl Session {
    /// Create a new session seeded with the given collections.
    pub fn new(
        session_key: SessionKey,
        shift: ShiftName,
        session_date: NaiveDate,
        tasks: Vec<Task>,
        auxiliary_checklist: Vec<AuxiliaryItem>,
    ) -> Self {
        let now = Utc::now();
        Self {
            session_key,
            shift,
            session_date,
            tasks,
            auxiliary_checklist,
            created_at: now,
            last_updated: now,
        }
    }

    /// Look up a task by ID.
    pub fn task(&self, task_id: u32) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Look up an auxiliary item by ID.
    pub fn auxiliary_item(&self, item_id: u32) -> Option<&AuxiliaryItem> {
        self.auxiliary_checklist.iter().find(|i| i.id == item_id)
    }

    /// Returns whether the completed/done_by invariant holds for all tasks.
    pub fn is_consistent(&self) -> bool {
        self.tasks.iter().all(Task::is_consistent)
            && self
                .auxiliary_checklist
                .iter()
                .all(|i| i.completed == i.done_by.is_some())
    }
}
