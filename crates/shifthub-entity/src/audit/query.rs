//! Audit trail query, pagination, and statistics types.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::{AuditEntry, AuditEventType, AuditSeverity};

/// Sort order for audit queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Newest first (the default).
    Descending,
    /// Oldest first.
    Ascending,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::Descending
    }
}

/// Cursor marking the position after the last entry of a page.
///
/// Cursors follow the store's native ordering: `(timestamp, id)` of the
/// last returned entry. They remain valid across appends because entries
/// are immutable and timestamps are monotonic per writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditCursor {
    /// Timestamp of the last entry on the previous page.
    pub timestamp: DateTime<Utc>,
    /// ID of the last entry on the previous page (tiebreaker).
    pub id: Uuid,
}

impl AuditCursor {
    /// Build a cursor pointing after the given entry.
    pub fn after(entry: &AuditEntry) -> Self {
        Self {
            timestamp: entry.timestamp,
            id: entry.id,
        }
    }
}

/// Filter and pagination parameters for audit queries.
///
/// All filters are conjunctive; unset filters match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditQuery {
    /// Only entries at or after this time.
    pub start_date: Option<DateTime<Utc>>,
    /// Only entries at or before this time.
    pub end_date: Option<DateTime<Utc>>,
    /// Only entries by this actor.
    pub actor_id: Option<String>,
    /// Only entries with one of these event types. Empty matches all.
    #[serde(default)]
    pub event_types: Vec<AuditEventType>,
    /// Only entries touching this entity type.
    pub entity_type: Option<String>,
    /// Only entries at this severity.
    pub severity: Option<AuditSeverity>,
    /// Maximum entries per page. `None` uses the configured default.
    pub page_size: Option<u32>,
    /// Resume after this cursor.
    pub cursor: Option<AuditCursor>,
    /// Result ordering.
    #[serde(default)]
    pub sort_order: SortOrder,
}

impl AuditQuery {
    /// Returns whether an entry passes every set filter.
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(start) = self.start_date
            && entry.timestamp < start
        {
            return false;
        }
        if let Some(end) = self.end_date
            && entry.timestamp > end
        {
            return false;
        }
        if let Some(actor_id) = &self.actor_id
            && &entry.actor_id != actor_id
        {
            return false;
        }
        if !self.event_types.is_empty() && !self.event_types.contains(&entry.event_type) {
            return false;
        }
        if let Some(entity_type) = &self.entity_type
            && &entry.entity_type != entity_type
        {
            return false;
        }
        if let Some(severity) = self.severity
            && entry.severity != severity
        {
            return false;
        }
        true
    }
}

/// One page of audit query results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditPage {
    /// The entries on this page, in query order.
    pub entries: Vec<AuditEntry>,
    /// Cursor for the next page, when one exists.
    pub cursor: Option<AuditCursor>,
    /// Whether more entries follow this page.
    pub has_more: bool,
}

/// Aggregated audit statistics over a lookback window.
///
/// Computed client-side by scanning the queried window; the store offers
/// no server-side aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditStats {
    /// Total entries scanned in the window.
    pub total_events: u64,
    /// Entry counts keyed by event type wire name.
    pub events_by_type: HashMap<String, u64>,
    /// Entry counts keyed by `"<initials> (<email>)"`.
    pub events_by_actor: HashMap<String, u64>,
    /// Entry counts keyed by severity wire name.
    pub events_by_severity: HashMap<String, u64>,
    /// The 10 most recent entries in the window.
    pub recent_activity: Vec<AuditEntry>,
    /// Window start.
    pub window_start: DateTime<Utc>,
    /// Window end.
    pub window_end: DateTime<Utc>,
}
