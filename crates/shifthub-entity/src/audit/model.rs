//! Audit log entry entity model.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shifthub_core::types::Actor;

/// Closed taxonomy of auditable events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    /// A task was marked completed.
    TaskCompleted,
    /// A completed task was reverted to open.
    TaskUncompleted,
    /// A note was added to a task that had none.
    TaskNoteAdded,
    /// An existing task note was changed.
    TaskNoteUpdated,
    /// A task note was cleared.
    TaskNoteDeleted,
    /// An actor claimed a task as in progress.
    TaskClaimed,
    /// An actor released their in-progress claim.
    TaskReleased,
    /// The whole checklist was reset to its template state.
    ChecklistReset,
    /// The active shift selection changed.
    ShiftChanged,
    /// A new session document was created.
    SessionCreated,
    /// An internal failure, including audit write fallbacks.
    SystemError,
}

impl AuditEventType {
    /// The wire name of this event type (matches the serde encoding).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskCompleted => "task_completed",
            Self::TaskUncompleted => "task_uncompleted",
            Self::TaskNoteAdded => "task_note_added",
            Self::TaskNoteUpdated => "task_note_updated",
            Self::TaskNoteDeleted => "task_note_deleted",
            Self::TaskClaimed => "task_claimed",
            Self::TaskReleased => "task_released",
            Self::ChecklistReset => "checklist_reset",
            Self::ShiftChanged => "shift_changed",
            Self::SessionCreated => "session_created",
            Self::SystemError => "system_error",
        }
    }
}

impl fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Audit severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl AuditSeverity {
    /// The wire name of this severity (matches the serde encoding).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl Default for AuditSeverity {
    fn default() -> Self {
        Self::Info
    }
}

/// An immutable audit trail entry recording one state-changing action.
///
/// Once accepted by the store an entry is never mutated or deleted by
/// normal application flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique audit entry identifier.
    pub id: Uuid,
    /// The event type.
    pub event_type: AuditEventType,
    /// Short verb phrase describing the action (e.g. `"completed"`).
    pub action: String,
    /// Event severity.
    pub severity: AuditSeverity,
    /// Identity-provider ID of the acting staff member.
    pub actor_id: String,
    /// Actor email, `"unknown"` when not available.
    pub actor_email: String,
    /// Actor display initials, `"UNK"` when not available.
    pub actor_initials: String,
    /// The type of mutated entity (e.g. `"task"`, `"session"`).
    pub entity_type: String,
    /// The mutated entity's ID, when applicable.
    pub entity_id: Option<String>,
    /// Snapshot of the entity before the mutation.
    pub before_state: Option<serde_json::Value>,
    /// Snapshot of the entity after the mutation.
    pub after_state: Option<serde_json::Value>,
    /// Open key/value context bag (session key, shift, device info).
    pub metadata: HashMap<String, serde_json::Value>,
    /// Derived search tags.
    pub tags: Vec<String>,
    /// Store-assigned commit timestamp, monotonic per writer.
    pub timestamp: DateTime<Utc>,
}

/// Data required to record a new audit event.
///
/// The store assigns `id` and `timestamp`; the audit service derives
/// `tags` and enriches `metadata` with session context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAuditEvent {
    /// The event type.
    pub event_type: AuditEventType,
    /// Short verb phrase describing the action.
    pub action: String,
    /// Event severity.
    #[serde(default)]
    pub severity: AuditSeverity,
    /// The acting staff member.
    pub actor: Actor,
    /// The type of mutated entity.
    pub entity_type: String,
    /// The mutated entity's ID, when applicable.
    pub entity_id: Option<String>,
    /// Snapshot of the entity before the mutation.
    pub before_state: Option<serde_json::Value>,
    /// Snapshot of the entity after the mutation.
    pub after_state: Option<serde_json::Value>,
    /// Caller-supplied context (merged with session context on record).
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl NewAuditEvent {
    /// Create an event with the common fields filled in.
    pub fn new(
        event_type: AuditEventType,
        action: impl Into<String>,
        actor: Actor,
        entity_type: impl Into<String>,
    ) -> Self {
        Self {
            event_type,
            action: action.into(),
            severity: AuditSeverity::Info,
            actor,
            entity_type: entity_type.into(),
            entity_id: None,
            before_state: None,
            after_state: None,
            metadata: HashMap::new(),
        }
    }

    /// Set the mutated entity's ID.
    pub fn entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Set the severity.
    pub fn severity(mut self, severity: AuditSeverity) -> Self {
        self.severity = severity;
        self
    }

    /// Attach before/after snapshots.
    pub fn states(
        mut self,
        before: Option<serde_json::Value>,
        after: Option<serde_json::Value>,
    ) -> Self {
        self.before_state = before;
        self.after_state = after;
        self
    }

    /// Add a metadata entry.
    pub fn metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Derive search tags from an event's identifying fields.
///
/// Tags are the event type, action, and entity type, plus contextual
/// groupings for checklist and system events.
pub fn derive_tags(event_type: AuditEventType, action: &str, entity_type: &str) -> Vec<String> {
    let mut tags = vec![
        event_type.as_str().to_string(),
        action.to_string(),
        entity_type.to_string(),
    ];

    let name = event_type.as_str();
    if name.starts_with("task") || name.starts_with("checklist") {
        tags.push("checklist".to_string());
    }
    if matches!(event_type, AuditEventType::ShiftChanged | AuditEventType::SessionCreated) {
        tags.push("administration".to_string());
    }
    if matches!(event_type, AuditEventType::SystemError) {
        tags.push("system".to_string());
    }

    tags.retain(|t| !t.is_empty());
    tags
}
