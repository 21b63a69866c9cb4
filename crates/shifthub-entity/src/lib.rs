//! # shifthub-entity
//!
//! Domain entity models for ShiftHub. Every struct in this crate
//! represents a persisted document, or a domain value object embedded in
//! one. All entities derive `Debug`, `Clone`, `Serialize`, and
//! `Deserialize`.

pub mod audit;
pub mod checklist;
pub mod session;
