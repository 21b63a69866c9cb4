//! Store traits for session documents and audit entries.

use async_trait::async_trait;

use shifthub_core::AppResult;
use shifthub_core::types::SessionKey;
use shifthub_entity::audit::{AuditEntry, AuditPage, AuditQuery};
use shifthub_entity::checklist::{AuxiliaryItem, Task};
use shifthub_entity::session::Session;

use crate::channel::Subscription;

/// Keyed document store for [`Session`] documents.
///
/// Writes are whole-document or whole-collection replacements; the last
/// write to commit wins. Every committed write is pushed to all active
/// subscribers of the document's key, including the writer's own
/// subscription.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Fetch the document stored under `key`, if any.
    async fn get(&self, key: &SessionKey) -> AppResult<Option<Session>>;

    /// Create or fully replace the document under its own key.
    async fn put(&self, session: Session) -> AppResult<Session>;

    /// Replace the task collection of an existing document and bump
    /// `last_updated`. Fails with `NotFound` when no document exists.
    async fn replace_tasks(&self, key: &SessionKey, tasks: Vec<Task>) -> AppResult<Session>;

    /// Replace the auxiliary checklist of an existing document and bump
    /// `last_updated`. Fails with `NotFound` when no document exists.
    async fn replace_auxiliary(
        &self,
        key: &SessionKey,
        items: Vec<AuxiliaryItem>,
    ) -> AppResult<Session>;

    /// Open a change subscription for `key`.
    ///
    /// The subscription carries the current document (when one exists)
    /// plus a receiver of every subsequently committed version, in commit
    /// order for that key.
    async fn subscribe(&self, key: &SessionKey) -> AppResult<Subscription>;
}

/// Append-only store for [`AuditEntry`] records.
#[async_trait]
pub trait AuditStore: Send + Sync + 'static {
    /// Commit an entry, assigning the store timestamp.
    ///
    /// Timestamps are monotonic per writer; entries are immutable once
    /// accepted.
    async fn append(&self, entry: AuditEntry) -> AppResult<AuditEntry>;

    /// Run a filtered, cursor-paginated query over the trail.
    async fn query(&self, query: &AuditQuery, page_size: u32) -> AppResult<AuditPage>;
}
