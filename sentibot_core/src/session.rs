//! Turn-taking state for one session and the contract for persisting it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Turn-taking state for one session.
///
/// `awaiting_feedback` is only ever set by [`SessionState::record_interaction`]
/// when the count reaches a multiple of the feedback interval, and only
/// cleared by [`SessionState::complete_feedback`], which also zeroes the count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub interaction_count: u32,
    pub awaiting_feedback: bool,
    pub recognized_name: Option<String>,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one normal-path turn. Returns `true` when this turn should ask
    /// for feedback, which also raises the awaiting flag.
    pub fn record_interaction(&mut self, feedback_interval: u32) -> bool {
        self.interaction_count = self.interaction_count.saturating_add(1);
        let solicit = feedback_interval > 0 && self.interaction_count % feedback_interval == 0;
        if solicit {
            self.awaiting_feedback = true;
        }
        solicit
    }

    /// Consume the pending feedback request.
    ///
    /// The recognized name is kept; only the cycle is reset.
    pub const fn complete_feedback(&mut self) {
        self.awaiting_feedback = false;
        self.interaction_count = 0;
    }
}

/// Keyed storage for [`SessionState`], so a session can be resumed by a
/// later process.
#[async_trait]
pub trait SessionStateStore: Send + Sync {
    /// `None` if the session has never been saved.
    async fn load(&self, session_id: &str) -> Result<Option<SessionState>, StorageError>;

    /// Insert or overwrite.
    async fn save(&self, session_id: &str, state: &SessionState) -> Result<(), StorageError>;

    /// Forget the session. Succeeds when there is nothing to remove.
    async fn remove(&self, session_id: &str) -> Result<(), StorageError>;
}

#[async_trait]
impl<T: SessionStateStore + ?Sized> SessionStateStore for std::sync::Arc<T> {
    async fn load(&self, session_id: &str) -> Result<Option<SessionState>, StorageError> {
        (**self).load(session_id).await
    }

    async fn save(&self, session_id: &str, state: &SessionState) -> Result<(), StorageError> {
        (**self).save(session_id, state).await
    }

    async fn remove(&self, session_id: &str) -> Result<(), StorageError> {
        (**self).remove(session_id).await
    }
}
