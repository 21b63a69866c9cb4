//! Session repository — get-or-create, whole-collection replace, and
//! reset against the keyed document store.

use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use tracing::info;

use shifthub_core::AppResult;
use shifthub_core::types::{SessionKey, ShiftName};
use shifthub_entity::checklist::{AuxiliaryItem, Task};
use shifthub_entity::session::Session;
use shifthub_store::channel::Subscription;
use shifthub_store::traits::SessionStore;

use crate::shift_clock::ShiftClock;
use crate::templates::TemplateSource;

/// Result of [`SessionRepository::get_or_create`].
#[derive(Debug, Clone)]
pub struct LoadedSession {
    /// The stored or freshly seeded session.
    pub session: Session,
    /// Whether the document was created by this call.
    pub created: bool,
}

/// Repository for shift session documents.
///
/// All operations surface store failures as typed errors; callers decide
/// whether to degrade (the sync engine falls back to a locally seeded
/// session when the store is unreachable).
#[derive(Clone)]
pub struct SessionRepository {
    store: Arc<dyn SessionStore>,
    templates: Arc<dyn TemplateSource>,
    clock: ShiftClock,
}

impl SessionRepository {
    /// Create a repository over a store, template source, and shift clock.
    pub fn new(
        store: Arc<dyn SessionStore>,
        templates: Arc<dyn TemplateSource>,
        clock: ShiftClock,
    ) -> Self {
        Self {
            store,
            templates,
            clock,
        }
    }

    /// The clock used for session identity resolution.
    pub fn clock(&self) -> &ShiftClock {
        &self.clock
    }

    /// Seed a session document from the static templates, without
    /// touching the store. Used both for first-time creation and for the
    /// offline fallback.
    pub fn seed_session(&self, shift: &ShiftName, now: NaiveDateTime) -> Session {
        Session::new(
            self.clock.session_key(shift, now),
            shift.clone(),
            self.clock.session_date(shift, now),
            self.templates.tasks_for(shift),
            self.templates.auxiliary_for(shift),
        )
    }

    /// Fetch the session for the shift occurrence at `now`, creating and
    /// seeding it when absent.
    ///
    /// A stored document with an empty task list is treated as
    /// uninitialized and re-seeded in place.
    pub async fn get_or_create(
        &self,
        shift: &ShiftName,
        now: NaiveDateTime,
    ) -> AppResult<LoadedSession> {
        let key = self.clock.session_key(shift, now);

        if let Some(session) = self.store.get(&key).await?
            && !session.tasks.is_empty()
        {
            return Ok(LoadedSession {
                session,
                created: false,
            });
        }

        let seeded = self.seed_session(shift, now);
        let session = self.store.put(seeded).await?;
        info!(session_key = %key, shift = %shift, "Created session document");
        Ok(LoadedSession {
            session,
            created: true,
        })
    }

    /// Replace the full task collection of a session.
    pub async fn replace_tasks(&self, key: &SessionKey, tasks: Vec<Task>) -> AppResult<Session> {
        self.store.replace_tasks(key, tasks).await
    }

    /// Replace the full auxiliary checklist of a session.
    pub async fn replace_auxiliary(
        &self,
        key: &SessionKey,
        items: Vec<AuxiliaryItem>,
    ) -> AppResult<Session> {
        self.store.replace_auxiliary(key, items).await
    }

    /// Re-seed a session's collections to their template state,
    /// overwriting any completion state and notes. `created_at` and the
    /// session identity are preserved.
    pub async fn reset(&self, key: &SessionKey, shift: &ShiftName) -> AppResult<Session> {
        let mut session = match self.store.get(key).await? {
            Some(existing) => existing,
            None => Session::new(
                key.clone(),
                shift.clone(),
                Utc::now().date_naive(),
                Vec::new(),
                Vec::new(),
            ),
        };

        session.tasks = self.templates.tasks_for(shift);
        session.auxiliary_checklist = self.templates.auxiliary_for(shift);
        session.last_updated = Utc::now();

        let committed = self.store.put(session).await?;
        info!(session_key = %key, shift = %shift, "Reset session to template state");
        Ok(committed)
    }

    /// Open a change subscription for a session key.
    pub async fn subscribe(&self, key: &SessionKey) -> AppResult<Subscription> {
        self.store.subscribe(key).await
    }
}
