//! Shared test helpers for service integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use tokio::sync::watch;

use shifthub_core::config::audit::AuditConfig;
use shifthub_core::config::shifts::ShiftScheduleConfig;
use shifthub_core::types::{Actor, SessionKey, ShiftName};
use shifthub_core::{AppError, AppResult};
use shifthub_entity::checklist::{AuxiliaryItem, Task};
use shifthub_entity::session::Session;
use shifthub_service::{
    AuditLog, ChecklistService, ChecklistView, SessionRepository, ShiftClock, StaticTemplates,
    SyncEngine,
};
use shifthub_store::channel::Subscription;
use shifthub_store::memory::{MemoryAuditStore, MemorySessionStore};
use shifthub_store::traits::SessionStore;

/// One simulated site: a shared session store, a shared audit trail, and
/// as many clients (engines) as the test needs.
pub struct TestSite {
    pub session_store: MemorySessionStore,
    pub audit_store: Arc<MemoryAuditStore>,
    pub audit: Arc<AuditLog>,
}

impl TestSite {
    pub fn new() -> Self {
        let audit_store = Arc::new(MemoryAuditStore::new());
        let audit = Arc::new(AuditLog::new(audit_store.clone(), AuditConfig::default()));
        Self {
            session_store: MemorySessionStore::new(),
            audit_store,
            audit,
        }
    }

    /// A new client process holding its own engine over the shared store.
    pub fn client(&self) -> ChecklistService {
        let repository = SessionRepository::new(
            Arc::new(self.session_store.clone()),
            Arc::new(StaticTemplates::default()),
            ShiftClock::new(ShiftScheduleConfig::default()),
        );
        ChecklistService::new(Arc::new(SyncEngine::new(repository)), self.audit.clone())
    }
}

/// A client whose session store rejects every call, for offline tests.
pub fn offline_client(audit: Arc<AuditLog>) -> ChecklistService {
    let repository = SessionRepository::new(
        Arc::new(UnreachableSessionStore),
        Arc::new(StaticTemplates::default()),
        ShiftClock::new(ShiftScheduleConfig::default()),
    );
    ChecklistService::new(Arc::new(SyncEngine::new(repository)), audit)
}

/// Session store that fails every operation with `StoreUnavailable`.
pub struct UnreachableSessionStore;

#[async_trait]
impl SessionStore for UnreachableSessionStore {
    async fn get(&self, _key: &SessionKey) -> AppResult<Option<Session>> {
        Err(AppError::store_unavailable("store offline"))
    }

    async fn put(&self, _session: Session) -> AppResult<Session> {
        Err(AppError::store_unavailable("store offline"))
    }

    async fn replace_tasks(&self, _key: &SessionKey, _tasks: Vec<Task>) -> AppResult<Session> {
        Err(AppError::store_unavailable("store offline"))
    }

    async fn replace_auxiliary(
        &self,
        _key: &SessionKey,
        _items: Vec<AuxiliaryItem>,
    ) -> AppResult<Session> {
        Err(AppError::store_unavailable("store offline"))
    }

    async fn subscribe(&self, _key: &SessionKey) -> AppResult<Subscription> {
        Err(AppError::store_unavailable("store offline"))
    }
}

/// 23:00 on March 9, 2024, inside the Night shift window.
pub fn night_at_2300() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 9)
        .unwrap()
        .and_hms_opt(23, 0, 0)
        .unwrap()
}

/// 12:00 on March 10, 2024, inside the Morning shift window.
pub fn morning_at_noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 10)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

pub fn night() -> ShiftName {
    ShiftName::from("Night")
}

pub fn alice() -> Actor {
    Actor::new("user-alice", "AL").with_email("alice@example.com")
}

pub fn bob() -> Actor {
    Actor::new("user-bob", "BO").with_email("bob@example.com")
}

/// Wait until the engine view satisfies a predicate, or panic after two
/// seconds.
pub async fn wait_for_view(
    rx: &mut watch::Receiver<ChecklistView>,
    description: &str,
    predicate: impl Fn(&ChecklistView) -> bool,
) {
    let deadline = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if predicate(&rx.borrow()) {
                return;
            }
            rx.changed().await.expect("view channel closed");
        }
    });
    deadline
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for view: {description}"));
}
