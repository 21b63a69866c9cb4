//! Per-session change broadcast channel.
//!
//! One broadcast channel per session key. Publishing a committed
//! document fans it out to every local subscriber of that key, including
//! the subscriber whose write produced it.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tokio::sync::RwLock;
use tokio::sync::broadcast;
use tracing::debug;

use shifthub_core::types::SessionKey;
use shifthub_entity::session::Session;

/// Default per-key broadcast buffer size.
const DEFAULT_BUFFER_SIZE: usize = 64;

/// One committed document version pushed to subscribers.
///
/// Pushes are tagged with their session key so a consumer that switched
/// sessions can discard stale in-flight pushes for the old key.
#[derive(Debug, Clone)]
pub struct SessionPush {
    /// The key the pushed document is stored under.
    pub key: SessionKey,
    /// The full committed document.
    pub session: Session,
}

/// An open change subscription for one session key.
#[derive(Debug)]
pub struct Subscription {
    /// The document current at subscription time, when one existed.
    pub initial: Option<Session>,
    /// Receiver of every subsequently committed version, in commit order.
    pub receiver: broadcast::Receiver<SessionPush>,
}

/// Fan-out of committed session documents to per-key subscribers.
#[derive(Debug)]
pub struct ChangeChannel {
    /// Session key → broadcast sender.
    channels: RwLock<HashMap<SessionKey, broadcast::Sender<SessionPush>>>,
    /// Buffer size for new channels.
    buffer_size: usize,
}

impl ChangeChannel {
    /// Create a change channel with the default buffer size.
    pub fn new() -> Self {
        Self::with_buffer_size(DEFAULT_BUFFER_SIZE)
    }

    /// Create a change channel with an explicit per-key buffer size.
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            buffer_size,
        }
    }

    /// Publish a committed document to all subscribers of its key.
    pub async fn publish(&self, key: &SessionKey, session: Session) {
        let channels = self.channels.read().await;
        if let Some(tx) = channels.get(key) {
            // Send only fails when no receiver is alive, which is fine.
            let _ = tx.send(SessionPush {
                key: key.clone(),
                session,
            });
        }
    }

    /// Subscribe to committed versions of the given key.
    pub async fn subscribe(&self, key: &SessionKey) -> broadcast::Receiver<SessionPush> {
        let mut channels = self.channels.write().await;
        let tx = match channels.entry(key.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                debug!(session_key = %key, "Opened change channel");
                entry.insert(broadcast::channel(self.buffer_size).0)
            }
        };
        tx.subscribe()
    }

    /// Number of live subscribers for a key.
    pub async fn subscriber_count(&self, key: &SessionKey) -> usize {
        let channels = self.channels.read().await;
        channels.get(key).map(|tx| tx.receiver_count()).unwrap_or(0)
    }
}

impl Default for ChangeChannel {
    fn default() -> Self {
        Self::new()
    }
}
