//! Audit trail entities.

pub mod model;
pub mod query;

pub use model::{AuditEntry, AuditEventType, AuditSeverity, NewAuditEvent};
pub use query::{AuditCursor, AuditPage, AuditQuery, AuditStats, SortOrder};
