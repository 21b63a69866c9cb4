//! Audit trail service — validated, best-effort event recording with
//! filtered retrieval and client-side statistics.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{error, info};
use uuid::Uuid;

use shifthub_core::config::audit::AuditConfig;
use shifthub_core::types::Actor;
use shifthub_core::{AppError, AppResult};
use shifthub_entity::audit::model::derive_tags;
use shifthub_entity::audit::{
    AuditEntry, AuditEventType, AuditPage, AuditQuery, AuditSeverity, AuditStats, NewAuditEvent,
};
use shifthub_store::traits::AuditStore;

/// Append-only audit event recorder.
///
/// Recording is best-effort relative to the business mutation it
/// describes: a failed write triggers exactly one fallback write of a
/// synthetic `system_error` entry, and if that also fails the failure is
/// only logged. `record` returns a typed error in every failure case,
/// but callers on the mutation path are expected to ignore it.
#[derive(Clone)]
pub struct AuditLog {
    store: Arc<dyn AuditStore>,
    config: AuditConfig,
}

impl AuditLog {
    /// Create an audit log over a store.
    pub fn new(store: Arc<dyn AuditStore>, config: AuditConfig) -> Self {
        Self { store, config }
    }

    /// Validate and persist one audit event.
    ///
    /// Rejects events missing an action or actor ID with a `Validation`
    /// error before touching the store.
    pub async fn record(&self, event: NewAuditEvent) -> AppResult<AuditEntry> {
        if event.action.trim().is_empty() {
            return Err(AppError::validation("Audit event is missing an action"));
        }
        if event.actor.id.is_empty() {
            return Err(AppError::validation("Audit event is missing an actor ID"));
        }

        let entry = build_entry(&event);
        match self.store.append(entry).await {
            Ok(committed) => {
                info!(
                    event_type = %committed.event_type,
                    action = %committed.action,
                    entry_id = %committed.id,
                    "Audit logged"
                );
                Ok(committed)
            }
            Err(err) => {
                error!(error = %err, event_type = %event.event_type, "Failed to write audit entry");
                self.record_fallback(&event, &err).await;
                Err(AppError::audit(format!(
                    "Audit write failed: {err}"
                )))
            }
        }
    }

    /// One-shot fallback: describe the failed write as a `system_error`
    /// entry. A second failure is only logged.
    async fn record_fallback(&self, original: &NewAuditEvent, cause: &AppError) {
        let mut fallback = NewAuditEvent::new(
            AuditEventType::SystemError,
            "audit_log_failed",
            Actor::system(),
            "audit",
        )
        .severity(AuditSeverity::Error)
        .metadata(
            "original_event_type",
            serde_json::Value::String(original.event_type.as_str().to_string()),
        )
        .metadata("error", serde_json::Value::String(cause.to_string()));
        fallback.metadata.insert(
            "original_actor_id".to_string(),
            serde_json::Value::String(original.actor.id.as_str().to_string()),
        );

        if let Err(fallback_err) = self.store.append(build_entry(&fallback)).await {
            error!(error = %fallback_err, "Failed to write audit fallback entry");
        }
    }

    /// Run a filtered, cursor-paginated query over the trail, newest
    /// first by default.
    pub async fn query(&self, query: AuditQuery) -> AppResult<AuditPage> {
        let page_size = query
            .page_size
            .unwrap_or(self.config.default_page_size)
            .min(self.config.max_page_size);
        self.store.query(&query, page_size).await
    }

    /// Aggregate statistics over the trailing `days` window (the
    /// configured default when `None`), computed client-side.
    pub async fn stats(&self, days: Option<u32>) -> AppResult<AuditStats> {
        let days = days.unwrap_or(self.config.default_stats_days);
        let window_end = Utc::now();
        let window_start = window_end - Duration::days(i64::from(days));

        let query = AuditQuery {
            start_date: Some(window_start),
            page_size: Some(self.config.stats_scan_limit),
            ..Default::default()
        };
        let page = self.store.query(&query, self.config.stats_scan_limit).await?;

        let mut events_by_type: HashMap<String, u64> = HashMap::new();
        let mut events_by_actor: HashMap<String, u64> = HashMap::new();
        let mut events_by_severity: HashMap<String, u64> = HashMap::new();

        for entry in &page.entries {
            *events_by_type
                .entry(entry.event_type.as_str().to_string())
                .or_insert(0) += 1;
            let actor_key = format!("{} ({})", entry.actor_initials, entry.actor_email);
            *events_by_actor.entry(actor_key).or_insert(0) += 1;
            *events_by_severity
                .entry(entry.severity.as_str().to_string())
                .or_insert(0) += 1;
        }

        Ok(AuditStats {
            total_events: page.entries.len() as u64,
            events_by_type,
            events_by_actor,
            events_by_severity,
            recent_activity: page.entries.iter().take(10).cloned().collect(),
            window_start,
            window_end,
        })
    }
}

/// Materialize an event into a store entry. The store reassigns the
/// timestamp at commit time.
fn build_entry(event: &NewAuditEvent) -> AuditEntry {
    AuditEntry {
        id: Uuid::new_v4(),
        event_type: event.event_type,
        action: event.action.clone(),
        severity: event.severity,
        actor_id: event.actor.id.as_str().to_string(),
        actor_email: event
            .actor
            .email
            .clone()
            .unwrap_or_else(|| "unknown".to_string()),
        actor_initials: if event.actor.initials.is_empty() {
            "UNK".to_string()
        } else {
            event.actor.initials.clone()
        },
        entity_type: event.entity_type.clone(),
        entity_id: event.entity_id.clone(),
        before_state: event.before_state.clone(),
        after_state: event.after_state.clone(),
        metadata: event.metadata.clone(),
        tags: derive_tags(event.event_type, &event.action, &event.entity_type),
        timestamp: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shifthub_core::error::ErrorKind;
    use shifthub_store::memory::MemoryAuditStore;

    fn audit_log(store: Arc<dyn AuditStore>) -> AuditLog {
        AuditLog::new(store, AuditConfig::default())
    }

    fn event() -> NewAuditEvent {
        NewAuditEvent::new(
            AuditEventType::TaskCompleted,
            "completed",
            Actor::new("user-1", "JD").with_email("jd@example.com"),
            "task",
        )
        .entity_id("3")
    }

    #[tokio::test]
    async fn test_record_persists_with_derived_tags() {
        let store = Arc::new(MemoryAuditStore::new());
        let log = audit_log(store.clone());

        let entry = log.record(event()).await.unwrap();
        assert_eq!(entry.actor_initials, "JD");
        assert_eq!(entry.actor_email, "jd@example.com");
        assert!(entry.tags.contains(&"checklist".to_string()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_record_rejects_missing_action() {
        let store = Arc::new(MemoryAuditStore::new());
        let log = audit_log(store.clone());

        let mut bad = event();
        bad.action = "  ".to_string();
        let err = log.record(bad).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_record_rejects_missing_actor() {
        let store = Arc::new(MemoryAuditStore::new());
        let log = audit_log(store);

        let mut bad = event();
        bad.actor = Actor::new("", "JD");
        let err = log.record(bad).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    /// Store that fails the first N appends, then delegates to memory.
    struct FlakyAuditStore {
        inner: MemoryAuditStore,
        failures: std::sync::atomic::AtomicU32,
    }

    #[async_trait]
    impl AuditStore for FlakyAuditStore {
        async fn append(&self, entry: AuditEntry) -> AppResult<AuditEntry> {
            use std::sync::atomic::Ordering;
            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                return Err(AppError::store_unavailable("audit store offline"));
            }
            self.inner.append(entry).await
        }

        async fn query(&self, query: &AuditQuery, page_size: u32) -> AppResult<AuditPage> {
            self.inner.query(query, page_size).await
        }
    }

    #[tokio::test]
    async fn test_failed_write_triggers_single_system_error_fallback() {
        let store = Arc::new(FlakyAuditStore {
            inner: MemoryAuditStore::new(),
            failures: std::sync::atomic::AtomicU32::new(1),
        });
        let log = audit_log(store.clone());

        let err = log.record(event()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Audit);

        let page = log.query(AuditQuery::default()).await.unwrap();
        assert_eq!(page.entries.len(), 1);
        let fallback = &page.entries[0];
        assert_eq!(fallback.event_type, AuditEventType::SystemError);
        assert_eq!(fallback.action, "audit_log_failed");
        assert_eq!(fallback.actor_id, "system");
        assert_eq!(
            fallback.metadata.get("original_event_type"),
            Some(&serde_json::Value::String("task_completed".to_string()))
        );
    }

    #[tokio::test]
    async fn test_double_failure_is_swallowed() {
        let store = Arc::new(FlakyAuditStore {
            inner: MemoryAuditStore::new(),
            failures: std::sync::atomic::AtomicU32::new(2),
        });
        let log = audit_log(store.clone());

        // Both the primary and the fallback write fail; record still
        // returns a typed error and nothing panics.
        let err = log.record(event()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Audit);
        assert!(log.query(AuditQuery::default()).await.unwrap().entries.is_empty());
    }

    #[tokio::test]
    async fn test_stats_aggregates_by_type_actor_and_severity() {
        let store = Arc::new(MemoryAuditStore::new());
        let log = audit_log(store);

        log.record(event()).await.unwrap();
        log.record(event()).await.unwrap();
        log.record(
            NewAuditEvent::new(
                AuditEventType::ChecklistReset,
                "reset_all",
                Actor::new("user-2", "AB"),
                "session",
            )
            .severity(AuditSeverity::Warning),
        )
        .await
        .unwrap();

        let stats = log.stats(Some(7)).await.unwrap();
        assert_eq!(stats.total_events, 3);
        assert_eq!(stats.events_by_type.get("task_completed"), Some(&2));
        assert_eq!(stats.events_by_type.get("checklist_reset"), Some(&1));
        assert_eq!(stats.events_by_actor.get("JD (jd@example.com)"), Some(&2));
        assert_eq!(stats.events_by_severity.get("warning"), Some(&1));
        assert_eq!(stats.recent_activity.len(), 3);
        // Newest first.
        assert_eq!(stats.recent_activity[0].action, "reset_all");
    }
}
