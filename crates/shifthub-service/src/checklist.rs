//! Task state machine layered on the sync engine.
//!
//! Every operation goes through the engine's optimistic mutation
//! protocol and attempts exactly one audit write on success. Audit
//! failures are isolated from the mutation result: the one-shot fallback
//! lives inside [`AuditLog`], and any residual error is only logged here.

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::warn;

use shifthub_core::types::{Actor, ShiftName};
use shifthub_core::{AppError, AppResult};
use shifthub_entity::audit::{AuditEventType, NewAuditEvent};
use shifthub_entity::checklist::{AuxiliaryItem, Task};

use crate::audit::AuditLog;
use crate::engine::{ShiftSelection, SyncEngine};

/// Per-task transition rules over the shared checklist state.
#[derive(Clone)]
pub struct ChecklistService {
    engine: Arc<SyncEngine>,
    audit: Arc<AuditLog>,
}

impl ChecklistService {
    /// Create a checklist service over an engine and an audit log.
    pub fn new(engine: Arc<SyncEngine>, audit: Arc<AuditLog>) -> Self {
        Self { engine, audit }
    }

    /// The underlying sync engine.
    pub fn engine(&self) -> &Arc<SyncEngine> {
        &self.engine
    }

    /// Switch to the shift occurrence at `now`, auditing the change.
    pub async fn select_shift(
        &self,
        shift: &ShiftName,
        actor: &Actor,
        now: NaiveDateTime,
    ) -> AppResult<ShiftSelection> {
        let selection = self.engine.select_shift(shift, now).await?;

        if selection.created {
            self.emit(
                NewAuditEvent::new(
                    AuditEventType::SessionCreated,
                    "session_created",
                    actor.clone(),
                    "session",
                )
                .entity_id(selection.session_key.as_str()),
            )
            .await;
        }
        self.emit(
            NewAuditEvent::new(
                AuditEventType::ShiftChanged,
                "shift_selected",
                actor.clone(),
                "session",
            )
            .entity_id(selection.session_key.as_str())
            .metadata("degraded", serde_json::Value::Bool(selection.degraded)),
        )
        .await;

        Ok(selection)
    }

    /// Flip a task's completion state.
    ///
    /// Completing sets `done_by` to the actor and releases any claim;
    /// un-completing clears `done_by`.
    pub async fn toggle_completed(&self, task_id: u32, actor: &Actor) -> AppResult<Task> {
        let mut tasks = self.engine.current_tasks().await?;
        let index = self.find_task(&tasks, task_id)?;

        let before = tasks[index].clone();
        if before.completed {
            tasks[index].reopen();
        } else {
            tasks[index].complete(actor.id.clone());
        }
        let after = tasks[index].clone();

        self.engine.replace_tasks(tasks).await?;

        let (event_type, action) = if after.completed {
            (AuditEventType::TaskCompleted, "completed")
        } else {
            (AuditEventType::TaskUncompleted, "uncompleted")
        };
        self.emit(
            NewAuditEvent::new(event_type, action, actor.clone(), "task")
                .entity_id(task_id.to_string())
                .states(
                    serde_json::to_value(&before).ok(),
                    serde_json::to_value(&after).ok(),
                )
                .metadata(
                    "task_text",
                    serde_json::Value::String(after.text.clone()),
                ),
        )
        .await;

        Ok(after)
    }

    /// Replace a task's note verbatim. Length validation, if any, is an
    /// input-boundary concern outside the core.
    pub async fn set_note(
        &self,
        task_id: u32,
        note: impl Into<String>,
        actor: &Actor,
    ) -> AppResult<Task> {
        let note = note.into();
        let mut tasks = self.engine.current_tasks().await?;
        let index = self.find_task(&tasks, task_id)?;

        let before = tasks[index].clone();
        tasks[index].note = note;
        let after = tasks[index].clone();

        self.engine.replace_tasks(tasks).await?;

        let (event_type, action) = match (before.note.is_empty(), after.note.is_empty()) {
            (true, false) => (AuditEventType::TaskNoteAdded, "note_added"),
            (false, true) => (AuditEventType::TaskNoteDeleted, "note_deleted"),
            _ => (AuditEventType::TaskNoteUpdated, "note_updated"),
        };
        self.emit(
            NewAuditEvent::new(event_type, action, actor.clone(), "task")
                .entity_id(task_id.to_string())
                .states(
                    serde_json::to_value(&before).ok(),
                    serde_json::to_value(&after).ok(),
                ),
        )
        .await;

        Ok(after)
    }

    /// Claim a task as in-progress, or release an own claim.
    ///
    /// The claim is advisory: a task claimed by a different actor is
    /// left untouched and the call is rejected with a `Conflict` error.
    /// This is not a compare-and-swap against the store; two claims
    /// racing from different clients resolve last-write-wins.
    pub async fn toggle_in_progress(&self, task_id: u32, actor: &Actor) -> AppResult<Task> {
        let mut tasks = self.engine.current_tasks().await?;
        let index = self.find_task(&tasks, task_id)?;

        let before = tasks[index].clone();
        if let Some(claimant) = &before.in_progress_by
            && claimant != &actor.id
        {
            return Err(AppError::conflict(format!(
                "Task {task_id} is already claimed by {claimant}"
            )));
        }

        let claiming = before.in_progress_by.is_none();
        tasks[index].in_progress_by = claiming.then(|| actor.id.clone());
        let after = tasks[index].clone();

        self.engine.replace_tasks(tasks).await?;

        let (event_type, action) = if claiming {
            (AuditEventType::TaskClaimed, "claimed")
        } else {
            (AuditEventType::TaskReleased, "released")
        };
        self.emit(
            NewAuditEvent::new(event_type, action, actor.clone(), "task")
                .entity_id(task_id.to_string())
                .states(
                    serde_json::to_value(&before).ok(),
                    serde_json::to_value(&after).ok(),
                ),
        )
        .await;

        Ok(after)
    }

    /// Flip an auxiliary checklist item's completion state.
    pub async fn toggle_auxiliary(&self, item_id: u32, actor: &Actor) -> AppResult<AuxiliaryItem> {
        let mut items = self.engine.current_auxiliary().await?;
        let Some(index) = items.iter().position(|i| i.id == item_id) else {
            warn!(item_id, "Mutation for unknown auxiliary item ignored");
            return Err(AppError::not_found(format!(
                "No auxiliary item with ID {item_id} in the active session"
            )));
        };

        let before = items[index].clone();
        if before.completed {
            items[index].reopen();
        } else {
            items[index].complete(actor.id.clone());
        }
        let after = items[index].clone();

        self.engine.replace_auxiliary(items).await?;

        let (event_type, action) = if after.completed {
            (AuditEventType::TaskCompleted, "completed")
        } else {
            (AuditEventType::TaskUncompleted, "uncompleted")
        };
        self.emit(
            NewAuditEvent::new(event_type, action, actor.clone(), "auxiliary_item")
                .entity_id(item_id.to_string())
                .states(
                    serde_json::to_value(&before).ok(),
                    serde_json::to_value(&after).ok(),
                ),
        )
        .await;

        Ok(after)
    }

    /// Re-seed the whole session to its template state.
    pub async fn reset_all(&self, actor: &Actor) -> AppResult<()> {
        let key = self.engine.session_key().await?;
        let (tasks, auxiliary) = self.engine.reset().await?;

        let after = serde_json::json!({
            "tasks": tasks,
            "auxiliary_checklist": auxiliary,
        });
        self.emit(
            NewAuditEvent::new(
                AuditEventType::ChecklistReset,
                "reset_all",
                actor.clone(),
                "session",
            )
            .entity_id(key.as_str())
            .states(None, Some(after))
            .metadata("bulk", serde_json::Value::Bool(true)),
        )
        .await;

        Ok(())
    }

    fn find_task(&self, tasks: &[Task], task_id: u32) -> AppResult<usize> {
        tasks.iter().position(|t| t.id == task_id).ok_or_else(|| {
            warn!(task_id, "Mutation for unknown task ignored");
            AppError::not_found(format!("No task with ID {task_id} in the active session"))
        })
    }

    /// Attempt the single audit write for a successful mutation. The
    /// session context travels in the event metadata; failures stay on
    /// this side channel.
    async fn emit(&self, mut event: NewAuditEvent) {
        let snapshot = self.engine.snapshot();
        if let Some(key) = snapshot.session_key {
            event.metadata.insert(
                "session_key".to_string(),
                serde_json::Value::String(key.as_str().to_string()),
            );
        }
        if let Some(shift) = snapshot.shift {
            event.metadata.insert(
                "shift".to_string(),
                serde_json::Value::String(shift.as_str().to_string()),
            );
        }

        if let Err(err) = self.audit.record(event).await {
            warn!(error = %err, "Audit write failed for a successful mutation");
        }
    }
}
