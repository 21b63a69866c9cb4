//! In-memory session document store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use shifthub_core::{AppError, AppResult};
use shifthub_core::types::SessionKey;
use shifthub_entity::checklist::{AuxiliaryItem, Task};
use shifthub_entity::session::Session;

use crate::channel::{ChangeChannel, Subscription};
use crate::traits::SessionStore;

/// Single-node [`SessionStore`] backed by a concurrent map.
///
/// Documents are cloned in and out whole, matching the remote store's
/// whole-document-replace contract. Every committed write is published
/// on the shared [`ChangeChannel`].
#[derive(Debug, Clone)]
pub struct MemorySessionStore {
    /// Session key → current document.
    docs: Arc<DashMap<SessionKey, Session>>,
    /// Change fan-out shared by all handles to this store.
    channel: Arc<ChangeChannel>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            docs: Arc::new(DashMap::new()),
            channel: Arc::new(ChangeChannel::new()),
        }
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Returns whether the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: &SessionKey) -> AppResult<Option<Session>> {
        Ok(self.docs.get(key).map(|doc| doc.clone()))
    }

    async fn put(&self, session: Session) -> AppResult<Session> {
        let key = session.session_key.clone();
        self.docs.insert(key.clone(), session.clone());
        self.channel.publish(&key, session.clone()).await;
        Ok(session)
    }

    async fn replace_tasks(&self, key: &SessionKey, tasks: Vec<Task>) -> AppResult<Session> {
        let committed = {
            let mut doc = self
                .docs
                .get_mut(key)
                .ok_or_else(|| AppError::not_found(format!("No session stored under {key}")))?;
            doc.tasks = tasks;
            doc.last_updated = Utc::now();
            doc.clone()
        };
        self.channel.publish(key, committed.clone()).await;
        Ok(committed)
    }

    async fn replace_auxiliary(
        &self,
        key: &SessionKey,
        items: Vec<AuxiliaryItem>,
    ) -> AppResult<Session> {
        let committed = {
            let mut doc = self
                .docs
                .get_mut(key)
                .ok_or_else(|| AppError::not_found(format!("No session stored under {key}")))?;
            doc.auxiliary_checklist = items;
            doc.last_updated = Utc::now();
            doc.clone()
        };
        self.channel.publish(key, committed.clone()).await;
        Ok(committed)
    }

    async fn subscribe(&self, key: &SessionKey) -> AppResult<Subscription> {
        // Register the receiver before reading the snapshot so a write
        // landing in between is not lost to the subscriber.
        let receiver = self.channel.subscribe(key).await;
        let initial = self.docs.get(key).map(|doc| doc.clone());
        Ok(Subscription { initial, receiver })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shifthub_core::types::{ActorId, ShiftName};

    fn night_session(key: &SessionKey) -> Session {
        Session::new(
            key.clone(),
            ShiftName::from("Night"),
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            vec![
                Task::from_template(1, "Handover & Security Round", ""),
                Task::from_template(2, "Count Cash Float", ""),
            ],
            vec![AuxiliaryItem::from_template(1, "1st 01:00")],
        )
    }

    #[tokio::test]
    async fn test_put_then_get_roundtrip() {
        let store = MemorySessionStore::new();
        let key = SessionKey::from("night_2024-03-09".to_string());

        store.put(night_session(&key)).await.unwrap();
        let fetched = store.get(&key).await.unwrap().unwrap();
        assert_eq!(fetched.session_key, key);
        assert_eq!(fetched.tasks.len(), 2);
    }

    #[tokio::test]
    async fn test_replace_tasks_bumps_last_updated() {
        let store = MemorySessionStore::new();
        let key = SessionKey::from("night_2024-03-09".to_string());
        let original = store.put(night_session(&key)).await.unwrap();

        let mut tasks = original.tasks.clone();
        tasks[0].complete(ActorId::from("JD"));
        let committed = store.replace_tasks(&key, tasks).await.unwrap();

        assert!(committed.tasks[0].completed);
        assert!(committed.last_updated >= original.last_updated);
        // Untouched fields survive a collection replace.
        assert_eq!(committed.auxiliary_checklist.len(), 1);
    }

    #[tokio::test]
    async fn test_replace_tasks_on_missing_key_is_not_found() {
        let store = MemorySessionStore::new();
        let key = SessionKey::from("night_2024-03-09".to_string());
        let err = store.replace_tasks(&key, Vec::new()).await.unwrap_err();
        assert_eq!(err.kind, shifthub_core::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_subscribe_delivers_initial_and_own_write() {
        let store = MemorySessionStore::new();
        let key = SessionKey::from("night_2024-03-09".to_string());
        store.put(night_session(&key)).await.unwrap();

        let mut sub = store.subscribe(&key).await.unwrap();
        assert!(sub.initial.is_some());

        let mut tasks = sub.initial.as_ref().unwrap().tasks.clone();
        tasks[1].complete(ActorId::from("AB"));
        store.replace_tasks(&key, tasks).await.unwrap();

        let push = sub.receiver.recv().await.unwrap();
        assert_eq!(push.key, key);
        assert!(push.session.tasks[1].completed);
    }

    #[tokio::test]
    async fn test_subscribe_to_absent_key_has_no_initial() {
        let store = MemorySessionStore::new();
        let key = SessionKey::from("evening_2024-03-09".to_string());
        let sub = store.subscribe(&key).await.unwrap();
        assert!(sub.initial.is_none());
    }

    #[tokio::test]
    async fn test_last_writer_wins_on_concurrent_replace() {
        let store = MemorySessionStore::new();
        let key = SessionKey::from("night_2024-03-09".to_string());
        store.put(night_session(&key)).await.unwrap();
        let base = store.get(&key).await.unwrap().unwrap();

        // Two writers compute updates from the same stale base.
        let mut first = base.tasks.clone();
        first[0].complete(ActorId::from("AA"));
        let mut second = base.tasks.clone();
        second[1].complete(ActorId::from("BB"));

        store.replace_tasks(&key, first).await.unwrap();
        store.replace_tasks(&key, second).await.unwrap();

        let final_doc = store.get(&key).await.unwrap().unwrap();
        // The second whole-collection write discarded the first.
        assert!(!final_doc.tasks[0].completed);
        assert!(final_doc.tasks[1].completed);
        assert_eq!(final_doc.tasks[1].done_by, Some(ActorId::from("BB")));
    }
}
