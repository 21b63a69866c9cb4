//! Task and auxiliary checklist item models.

use serde::{Deserialize, Serialize};

use shifthub_core::types::ActorId;

/// One task in a shift checklist.
///
/// The completion invariant is maintained through [`Task::complete`] and
/// [`Task::reopen`]: `completed` is `true` exactly when `done_by` is
/// `Some`. `in_progress_by` is an advisory single-claimant marker, not an
/// atomic lock; see the sync engine documentation for the accepted race.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Task ID, unique within the owning checklist template.
    pub id: u32,
    /// Short task label (static template text).
    pub text: String,
    /// Longer procedural description (static template text).
    #[serde(default)]
    pub info: String,
    /// Whether the task has been completed.
    #[serde(default)]
    pub completed: bool,
    /// Who completed the task. `Some` exactly when `completed` is `true`.
    #[serde(default)]
    pub done_by: Option<ActorId>,
    /// Free-text note attached by staff.
    #[serde(default)]
    pub note: String,
    /// Who is currently working the task, if anyone claimed it.
    #[serde(default)]
    pub in_progress_by: Option<ActorId>,
}

impl Task {
    /// Create a fresh, unworked task from template text.
    pub fn from_template(id: u32, text: impl Into<String>, info: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            info: info.into(),
            completed: false,
            done_by: None,
            note: String::new(),
            in_progress_by: None,
        }
    }

    /// Mark the task completed by the given actor.
    ///
    /// Completing work releases any in-progress claim.
    pub fn complete(&mut self, actor: ActorId) {
        self.completed = true;
        self.done_by = Some(actor);
        self.in_progress_by = None;
    }

    /// Revert the task to the not-completed state.
    pub fn reopen(&mut self) {
        self.completed = false;
        self.done_by = None;
    }

    /// Returns whether the completed/done_by invariant holds.
    pub fn is_consistent(&self) -> bool {
        self.completed == self.done_by.is_some()
    }
}

/// One item in the auxiliary checklist (fixed-time rounds).
///
/// Auxiliary items are a simpler task variant: no notes, no claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxiliaryItem {
    /// Item ID, unique within the owning auxiliary list.
    pub id: u32,
    /// Fixed label, e.g. `"1st 01:00"`.
    pub text: String,
    /// Whether the round has been done.
    #[serde(default)]
    pub completed: bool,
    /// Who did the round. `Some` exactly when `completed` is `true`.
    #[serde(default)]
    pub done_by: Option<ActorId>,
}

impl AuxiliaryItem {
    /// Create a fresh auxiliary item from template text.
    pub fn from_template(id: u32, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
            done_by: None,
        }
    }

    /// Mark the item done by the given actor.
    pub fn complete(&mut self, actor: ActorId) {
        self.completed = true;
        self.done_by = Some(actor);
    }

    /// Revert the item to the not-done state.
    pub fn reopen(&mut self) {
        self.completed = false;
        self.done_by = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_sets_done_by_and_releases_claim() {
        let mut task = Task::from_template(1, "Count Cash Float", "");
        task.in_progress_by = Some(ActorId::from("AB"));

        task.complete(ActorId::from("JD"));

        assert!(task.completed);
        assert_eq!(task.done_by, Some(ActorId::from("JD")));
        assert!(task.in_progress_by.is_none());
        assert!(task.is_consistent());
    }

    #[test]
    fn test_reopen_clears_done_by() {
        let mut task = Task::from_template(1, "Count Cash Float", "");
        task.complete(ActorId::from("JD"));
        task.reopen();

        assert!(!task.completed);
        assert!(task.done_by.is_none());
        assert!(task.is_consistent());
    }

    #[test]
    fn test_fresh_task_is_consistent() {
        let task = Task::from_template(3, "Print and Check Arrivals", "VIP check");
        assert!(task.is_consistent());
        assert!(task.note.is_empty());
    }
}
