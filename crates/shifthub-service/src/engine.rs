//! Optimistic realtime synchronization engine.
//!
//! Holds the authoritative local view of the active session's
//! checklists, applies mutations optimistically, persists them as
//! whole-collection replacements, and reconciles with store pushes.
//! Consumers observe state through a `watch` channel, so the
//! reconciliation logic is testable without any UI layer.

use std::sync::Arc;

use chrono::NaiveDateTime;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use shifthub_core::{AppError, AppResult};
use shifthub_core::types::{SessionKey, ShiftName};
use shifthub_entity::checklist::{AuxiliaryItem, Task};
use shifthub_store::channel::SessionPush;

use crate::repository::SessionRepository;

/// Engine lifecycle state for the active shift selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No shift has been selected yet.
    Uninitialized,
    /// A session load is in flight.
    Loading,
    /// A session is loaded and mutations are accepted. `degraded` is set
    /// while the engine is operating on local state the store has not
    /// confirmed (offline fallback or failed persistence).
    Ready {
        /// Whether the store is currently out of sync with local state.
        degraded: bool,
    },
}

/// Snapshot of the engine's local state, published on every change.
#[derive(Debug, Clone)]
pub struct ChecklistView {
    /// Current lifecycle state.
    pub state: EngineState,
    /// Key of the active session, once one is selected.
    pub session_key: Option<SessionKey>,
    /// The active shift, once one is selected.
    pub shift: Option<ShiftName>,
    /// The local task collection (optimistic).
    pub tasks: Vec<Task>,
    /// The local auxiliary checklist (optimistic).
    pub auxiliary: Vec<AuxiliaryItem>,
    /// The most recent persistence or load error, for the non-blocking
    /// offline indicator.
    pub last_error: Option<String>,
}

impl ChecklistView {
    fn empty() -> Self {
        Self {
            state: EngineState::Uninitialized,
            session_key: None,
            shift: None,
            tasks: Vec::new(),
            auxiliary: Vec::new(),
            last_error: None,
        }
    }
}

/// Result of a shift selection.
#[derive(Debug, Clone)]
pub struct ShiftSelection {
    /// The resolved session key.
    pub session_key: SessionKey,
    /// Whether a new session document was created by this selection.
    pub created: bool,
    /// Whether the engine fell back to a locally seeded session.
    pub degraded: bool,
}

#[derive(Debug)]
struct ActiveSession {
    key: SessionKey,
    shift: ShiftName,
    tasks: Vec<Task>,
    auxiliary: Vec<AuxiliaryItem>,
}

#[derive(Debug)]
struct EngineInner {
    state: EngineState,
    active: Option<ActiveSession>,
    pump: Option<JoinHandle<()>>,
    last_error: Option<String>,
}

impl EngineInner {
    fn view(&self) -> ChecklistView {
        ChecklistView {
            state: self.state,
            session_key: self.active.as_ref().map(|a| a.key.clone()),
            shift: self.active.as_ref().map(|a| a.shift.clone()),
            tasks: self
                .active
                .as_ref()
                .map(|a| a.tasks.clone())
                .unwrap_or_default(),
            auxiliary: self
                .active
                .as_ref()
                .map(|a| a.auxiliary.clone())
                .unwrap_or_default(),
            last_error: self.last_error.clone(),
        }
    }

    /// Key and shift of the active session, or `NotReady`.
    fn ready(&self) -> AppResult<(SessionKey, ShiftName)> {
        match (&self.state, &self.active) {
            (EngineState::Ready { .. }, Some(active)) => {
                Ok((active.key.clone(), active.shift.clone()))
            }
            _ => Err(AppError::not_ready(
                "No session is loaded; select a shift first",
            )),
        }
    }
}

/// Stateful coordinator between local checklist state and the store.
///
/// One engine instance serves one client process; multiple processes may
/// hold engines for the same session key simultaneously and converge
/// through store pushes (last write wins, see the crate documentation
/// for the accepted race window).
pub struct SyncEngine {
    repository: SessionRepository,
    inner: Arc<RwLock<EngineInner>>,
    view_tx: Arc<watch::Sender<ChecklistView>>,
}

impl SyncEngine {
    /// Create an engine over a session repository.
    pub fn new(repository: SessionRepository) -> Self {
        let (view_tx, _) = watch::channel(ChecklistView::empty());
        Self {
            repository,
            inner: Arc::new(RwLock::new(EngineInner {
                state: EngineState::Uninitialized,
                active: None,
                pump: None,
                last_error: None,
            })),
            view_tx: Arc::new(view_tx),
        }
    }

    /// The repository this engine persists through.
    pub fn repository(&self) -> &SessionRepository {
        &self.repository
    }

    /// Subscribe to state snapshots.
    pub fn subscribe_view(&self) -> watch::Receiver<ChecklistView> {
        self.view_tx.subscribe()
    }

    /// The current state snapshot.
    pub fn snapshot(&self) -> ChecklistView {
        self.view_tx.borrow().clone()
    }

    /// Switch the engine to the shift occurrence at `now`.
    ///
    /// Tears down the previous change subscription before opening the
    /// new one. When the store is unreachable the engine seeds a local
    /// template session and enters `Ready { degraded: true }` so the
    /// caller stays usable offline.
    pub async fn select_shift(
        &self,
        shift: &ShiftName,
        now: NaiveDateTime,
    ) -> AppResult<ShiftSelection> {
        {
            let mut inner = self.inner.write().await;
            if let Some(pump) = inner.pump.take() {
                pump.abort();
            }
            inner.state = EngineState::Loading;
            inner.active = None;
            inner.last_error = None;
            self.view_tx.send_replace(inner.view());
        }

        let key = self.repository.clock().session_key(shift, now);

        let loaded = match self.repository.get_or_create(shift, now).await {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!(
                    session_key = %key,
                    error = %err,
                    "Store unreachable; falling back to locally seeded session"
                );
                let seeded = self.repository.seed_session(shift, now);
                let mut inner = self.inner.write().await;
                inner.state = EngineState::Ready { degraded: true };
                inner.last_error = Some(err.to_string());
                inner.active = Some(ActiveSession {
                    key: key.clone(),
                    shift: shift.clone(),
                    tasks: seeded.tasks,
                    auxiliary: seeded.auxiliary_checklist,
                });
                self.view_tx.send_replace(inner.view());
                return Ok(ShiftSelection {
                    session_key: key,
                    created: false,
                    degraded: true,
                });
            }
        };

        let (session, degraded, error, receiver) = match self.repository.subscribe(&key).await {
            Ok(sub) => {
                let session = sub.initial.unwrap_or_else(|| loaded.session.clone());
                (session, false, None, Some(sub.receiver))
            }
            Err(err) => {
                warn!(session_key = %key, error = %err, "Change subscription failed");
                (loaded.session.clone(), true, Some(err.to_string()), None)
            }
        };

        // The active session must be in place before the pump starts:
        // a push already queued on the receiver at spawn time has to
        // find it, or a committed version would be consumed and lost.
        {
            let mut inner = self.inner.write().await;
            inner.state = EngineState::Ready { degraded };
            inner.last_error = error;
            inner.active = Some(ActiveSession {
                key: key.clone(),
                shift: shift.clone(),
                tasks: session.tasks,
                auxiliary: session.auxiliary_checklist,
            });
            self.view_tx.send_replace(inner.view());
        }

        if let Some(receiver) = receiver {
            let pump = tokio::spawn(run_pump(
                key.clone(),
                receiver,
                Arc::clone(&self.inner),
                Arc::clone(&self.view_tx),
            ));
            self.inner.write().await.pump = Some(pump);
        }

        info!(session_key = %key, shift = %shift, created = loaded.created, "Shift selected");
        Ok(ShiftSelection {
            session_key: key,
            created: loaded.created,
            degraded,
        })
    }

    /// The active session key, or `NotReady`.
    pub async fn session_key(&self) -> AppResult<SessionKey> {
        let inner = self.inner.read().await;
        inner.ready().map(|(key, _)| key)
    }

    /// The local task collection, or `NotReady`.
    pub async fn current_tasks(&self) -> AppResult<Vec<Task>> {
        let inner = self.inner.read().await;
        inner.ready()?;
        Ok(inner
            .active
            .as_ref()
            .map(|a| a.tasks.clone())
            .unwrap_or_default())
    }

    /// The local auxiliary checklist, or `NotReady`.
    pub async fn current_auxiliary(&self) -> AppResult<Vec<AuxiliaryItem>> {
        let inner = self.inner.read().await;
        inner.ready()?;
        Ok(inner
            .active
            .as_ref()
            .map(|a| a.auxiliary.clone())
            .unwrap_or_default())
    }

    /// Apply a full task collection optimistically, then persist it.
    ///
    /// Persistence failure is recorded in the view (degraded indicator)
    /// but never rolls back the local change; the local state stands
    /// until the next successful push.
    pub async fn replace_tasks(&self, tasks: Vec<Task>) -> AppResult<()> {
        let key = {
            let mut inner = self.inner.write().await;
            let (key, _) = inner.ready()?;
            if let Some(active) = inner.active.as_mut() {
                active.tasks = tasks.clone();
            }
            self.view_tx.send_replace(inner.view());
            key
        };

        let result = self.repository.replace_tasks(&key, tasks).await;
        self.record_persistence(&key, result.map(|_| ())).await;
        Ok(())
    }

    /// Apply a full auxiliary checklist optimistically, then persist it.
    pub async fn replace_auxiliary(&self, items: Vec<AuxiliaryItem>) -> AppResult<()> {
        let key = {
            let mut inner = self.inner.write().await;
            let (key, _) = inner.ready()?;
            if let Some(active) = inner.active.as_mut() {
                active.auxiliary = items.clone();
            }
            self.view_tx.send_replace(inner.view());
            key
        };

        let result = self.repository.replace_auxiliary(&key, items).await;
        self.record_persistence(&key, result.map(|_| ())).await;
        Ok(())
    }

    /// Re-seed the active session to its template state, optimistically
    /// and then in the store. Returns the seeded collections.
    pub async fn reset(&self) -> AppResult<(Vec<Task>, Vec<AuxiliaryItem>)> {
        let (key, shift, tasks, auxiliary) = {
            let mut inner = self.inner.write().await;
            let (key, shift) = inner.ready()?;
            // Seed from templates, not from the stored document, so a
            // reset always lands on the canonical template state.
            let seeded = self
                .repository
                .seed_session(&shift, chrono::Utc::now().naive_utc());
            let seeded_tasks = seeded.tasks;
            let seeded_auxiliary = seeded.auxiliary_checklist;
            if let Some(active) = inner.active.as_mut() {
                active.tasks = seeded_tasks.clone();
                active.auxiliary = seeded_auxiliary.clone();
            }
            self.view_tx.send_replace(inner.view());
            (key, shift, seeded_tasks, seeded_auxiliary)
        };

        let result = self.repository.reset(&key, &shift).await;
        self.record_persistence(&key, result.map(|_| ())).await;
        Ok((tasks, auxiliary))
    }

    /// Record the outcome of a persistence attempt in the view.
    async fn record_persistence(&self, key: &SessionKey, result: AppResult<()>) {
        let mut inner = self.inner.write().await;
        match result {
            Ok(()) => {
                if matches!(inner.state, EngineState::Ready { degraded: true }) {
                    inner.state = EngineState::Ready { degraded: false };
                    inner.last_error = None;
                    self.view_tx.send_replace(inner.view());
                }
            }
            Err(err) => {
                warn!(session_key = %key, error = %err, "Persistence failed; keeping optimistic state");
                inner.state = EngineState::Ready { degraded: true };
                inner.last_error = Some(err.to_string());
                self.view_tx.send_replace(inner.view());
            }
        }
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        // The pump holds no engine Arc cycles, but abort promptly anyway.
        if let Ok(mut inner) = self.inner.try_write()
            && let Some(pump) = inner.pump.take()
        {
            pump.abort();
        }
    }
}

/// Applies store pushes for `key` to the engine state until the channel
/// closes or the engine moves to a different session.
async fn run_pump(
    key: SessionKey,
    mut receiver: tokio::sync::broadcast::Receiver<SessionPush>,
    inner: Arc<RwLock<EngineInner>>,
    view_tx: Arc<watch::Sender<ChecklistView>>,
) {
    loop {
        let push = match receiver.recv().await {
            Ok(push) => push,
            Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                // Whole documents are idempotent; the next push carries
                // the full current state.
                warn!(session_key = %key, skipped, "Change subscription lagged");
                continue;
            }
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        };

        // A push already in flight at switch time may target the old key.
        if push.key != key {
            continue;
        }

        let mut guard = inner.write().await;
        let Some(active) = guard.active.as_mut() else {
            continue;
        };
        if active.key != push.key {
            break;
        }

        active.tasks = push.session.tasks;
        active.auxiliary = push.session.auxiliary_checklist;
        // A delivered push means the store is reachable again.
        guard.state = EngineState::Ready { degraded: false };
        guard.last_error = None;
        view_tx.send_replace(guard.view());
    }
}
