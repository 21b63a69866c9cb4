//! In-memory append-only audit store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use shifthub_core::AppResult;
use shifthub_entity::audit::{AuditCursor, AuditEntry, AuditPage, AuditQuery, SortOrder};

use crate::traits::AuditStore;

/// Single-node [`AuditStore`] backed by an append-only vector.
///
/// Commit timestamps are assigned at append time and forced strictly
/// increasing, so the `(timestamp, id)` cursor order is total.
#[derive(Debug, Clone)]
pub struct MemoryAuditStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: Vec<AuditEntry>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl MemoryAuditStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }

    /// Total number of committed entries.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// Returns whether the trail is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }
}

impl Default for MemoryAuditStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Position of an entry in cursor order: newest-first `(timestamp, id)`.
fn cursor_position(entry: &AuditEntry) -> (DateTime<Utc>, uuid::Uuid) {
    (entry.timestamp, entry.id)
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn append(&self, mut entry: AuditEntry) -> AppResult<AuditEntry> {
        let mut inner = self.inner.write().await;

        let mut now = Utc::now();
        if let Some(last) = inner.last_timestamp
            && now <= last
        {
            now = last + Duration::microseconds(1);
        }
        entry.timestamp = now;
        inner.last_timestamp = Some(now);
        inner.entries.push(entry.clone());
        Ok(entry)
    }

    async fn query(&self, query: &AuditQuery, page_size: u32) -> AppResult<AuditPage> {
        let inner = self.inner.read().await;

        let mut matched: Vec<AuditEntry> = inner
            .entries
            .iter()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();

        match query.sort_order {
            SortOrder::Descending => {
                matched.sort_by(|a, b| cursor_position(b).cmp(&cursor_position(a)))
            }
            SortOrder::Ascending => {
                matched.sort_by(|a, b| cursor_position(a).cmp(&cursor_position(b)))
            }
        }

        if let Some(cursor) = query.cursor {
            let boundary = (cursor.timestamp, cursor.id);
            matched.retain(|e| match query.sort_order {
                SortOrder::Descending => cursor_position(e) < boundary,
                SortOrder::Ascending => cursor_position(e) > boundary,
            });
        }

        let page_size = page_size.max(1) as usize;
        let has_more = matched.len() > page_size;
        matched.truncate(page_size);
        let cursor = if has_more {
            matched.last().map(AuditCursor::after)
        } else {
            None
        };

        Ok(AuditPage {
            entries: matched,
            cursor,
            has_more,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use shifthub_entity::audit::{AuditEventType, AuditSeverity};
    use uuid::Uuid;

    fn entry(actor_id: &str, event_type: AuditEventType) -> AuditEntry {
        AuditEntry {
            id: Uuid::new_v4(),
            event_type,
            action: "test".to_string(),
            severity: AuditSeverity::Info,
            actor_id: actor_id.to_string(),
            actor_email: "unknown".to_string(),
            actor_initials: "TT".to_string(),
            entity_type: "task".to_string(),
            entity_id: Some("1".to_string()),
            before_state: None,
            after_state: None,
            metadata: HashMap::new(),
            tags: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_append_assigns_strictly_increasing_timestamps() {
        let store = MemoryAuditStore::new();
        let mut previous: Option<DateTime<Utc>> = None;
        for _ in 0..20 {
            let committed = store
                .append(entry("a", AuditEventType::TaskCompleted))
                .await
                .unwrap();
            if let Some(prev) = previous {
                assert!(committed.timestamp > prev);
            }
            previous = Some(committed.timestamp);
        }
    }

    #[tokio::test]
    async fn test_query_default_order_is_newest_first() {
        let store = MemoryAuditStore::new();
        for actor in ["a", "b", "c"] {
            store
                .append(entry(actor, AuditEventType::TaskCompleted))
                .await
                .unwrap();
        }

        let page = store.query(&AuditQuery::default(), 10).await.unwrap();
        assert_eq!(page.entries.len(), 3);
        assert_eq!(page.entries[0].actor_id, "c");
        assert_eq!(page.entries[2].actor_id, "a");
        assert!(!page.has_more);
        assert!(page.cursor.is_none());
    }

    #[tokio::test]
    async fn test_cursor_pagination_walks_the_whole_trail() {
        let store = MemoryAuditStore::new();
        for i in 0..7 {
            store
                .append(entry(&format!("actor{i}"), AuditEventType::TaskCompleted))
                .await
                .unwrap();
        }

        let mut seen = Vec::new();
        let mut query = AuditQuery::default();
        loop {
            let page = store.query(&query, 3).await.unwrap();
            seen.extend(page.entries.iter().map(|e| e.actor_id.clone()));
            match page.cursor {
                Some(cursor) if page.has_more => query.cursor = Some(cursor),
                _ => break,
            }
        }

        assert_eq!(seen.len(), 7);
        // No duplicates and no gaps across pages.
        let mut deduped = seen.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), 7);
        assert_eq!(seen[0], "actor6");
    }

    #[tokio::test]
    async fn test_filters_restrict_results() {
        let store = MemoryAuditStore::new();
        store
            .append(entry("a", AuditEventType::TaskCompleted))
            .await
            .unwrap();
        store
            .append(entry("b", AuditEventType::ChecklistReset))
            .await
            .unwrap();

        let query = AuditQuery {
            event_types: vec![AuditEventType::ChecklistReset],
            ..Default::default()
        };
        let page = store.query(&query, 10).await.unwrap();
        assert_eq!(page.entries.len(), 1);
        assert_eq!(page.entries[0].actor_id, "b");
    }

    #[tokio::test]
    async fn test_ascending_order_with_cursor() {
        let store = MemoryAuditStore::new();
        for actor in ["a", "b", "c", "d"] {
            store
                .append(entry(actor, AuditEventType::TaskCompleted))
                .await
                .unwrap();
        }

        let query = AuditQuery {
            sort_order: SortOrder::Ascending,
            ..Default::default()
        };
        let first = store.query(&query, 2).await.unwrap();
        assert_eq!(first.entries[0].actor_id, "a");
        assert!(first.has_more);

        let second = store
            .query(
                &AuditQuery {
                    sort_order: SortOrder::Ascending,
                    cursor: first.cursor,
                    ..Default::default()
                },
                2,
            )
            .await
            .unwrap();
        assert_eq!(second.entries[0].actor_id, "c");
    }
}
