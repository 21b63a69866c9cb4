//! # shifthub-store
//!
//! Remote keyed document store abstraction for ShiftHub. The store
//! contract is deliberately narrow: get, create/replace whole documents,
//! replace whole collections inside a document, and per-key change
//! subscriptions. There are no partial patches and no transactions;
//! concurrent writers are reconciled last-write-wins per document.
//!
//! The in-memory backends under [`memory`] implement the same contract
//! for single-node deployments and tests.

pub mod channel;
pub mod memory;
pub mod traits;

pub use channel::{ChangeChannel, SessionPush, Subscription};
pub use memory::{MemoryAuditStore, MemorySessionStore};
pub use traits::{AuditStore, SessionStore};
