//! # shifthub-service
//!
//! Business logic service layer for ShiftHub. Each service orchestrates
//! the document store, change subscriptions, and checklist templates to
//! implement application-level use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod audit;
pub mod checklist;
pub mod engine;
pub mod repository;
pub mod shift_clock;
pub mod templates;

pub use audit::AuditLog;
pub use checklist::ChecklistService;
pub use engine::{ChecklistView, EngineState, ShiftSelection, SyncEngine};
pub use repository::{LoadedSession, SessionRepository};
pub use shift_clock::ShiftClock;
pub use templates::{StaticTemplates, TemplateSource};
