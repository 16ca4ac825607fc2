//! Per-session state lookup backed by a [`SessionStateStore`].
//!
//! The registry reads the store at the start of every turn and writes it back
//! at the end, so any manager sharing the store sees the same cycle.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sentibot_core::{SessionState, SessionStateStore, StorageError};
use tokio::sync::Mutex;
use tracing::warn;

/// Process-local state store. State is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, SessionState>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

#[async_trait]
impl SessionStateStore for MemorySessionStore {
    async fn load(&self, session_id: &str) -> Result<Option<SessionState>, StorageError> {
        Ok(self.sessions.lock().await.get(session_id).cloned())
    }

    async fn save(&self, session_id: &str, state: &SessionState) -> Result<(), StorageError> {
        self.sessions
            .lock()
            .await
            .insert(session_id.to_string(), state.clone());
        Ok(())
    }

    async fn remove(&self, session_id: &str) -> Result<(), StorageError> {
        self.sessions.lock().await.remove(session_id);
        Ok(())
    }
}

/// Session-keyed access to [`SessionState`].
///
/// Nothing is locked across a whole turn, so two turns racing on the same
/// session see undefined order.
pub struct SessionRegistry {
    store: Arc<dyn SessionStateStore>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }
}

impl SessionRegistry {
    #[must_use]
    pub fn new(store: Arc<dyn SessionStateStore>) -> Self {
        Self { store }
    }

    /// Current state, or a fresh one if the session is unknown or the store
    /// cannot be read.
    pub async fn get(&self, session_id: &str) -> SessionState {
        match self.store.load(session_id).await {
            Ok(state) => state.unwrap_or_default(),
            Err(e) => {
                warn!("Starting session {session_id} from fresh state: {e}");
                SessionState::default()
            }
        }
    }

    /// Best-effort write; the turn has already been answered.
    pub async fn put(&self, session_id: &str, state: &SessionState) {
        if let Err(e) = self.store.save(session_id, state).await {
            warn!("Session state not saved: {e}");
        }
    }

    pub async fn remove(&self, session_id: &str) -> Result<(), StorageError> {
        self.store.remove(session_id).await
    }
}
