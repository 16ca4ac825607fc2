//! Transcript entries and the append-only store contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Who produced a transcript line.
///
/// Persisted as the exact strings `"User"` and `"Bot"`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Bot => "Bot",
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Sender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "User" => Ok(Self::User),
            "Bot" => Ok(Self::Bot),
            _ => Err(format!("unknown sender: {s}")),
        }
    }
}

/// One persisted line of dialog. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub sender: Sender,
    pub text: String,
}

impl TranscriptEntry {
    #[must_use]
    pub fn new(session_id: &str, sender: Sender, text: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            session_id: session_id.to_string(),
            timestamp,
            sender,
            text: text.to_string(),
        }
    }
}

/// Append-only log of transcript entries keyed by session.
///
/// Implementations must serialize their own writes so two sessions appending
/// at once never interleave partial rows.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    async fn append(
        &self,
        session_id: &str,
        sender: Sender,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// All entries for the session, oldest first.
    async fn fetch_all(&self, session_id: &str) -> Result<Vec<TranscriptEntry>, StorageError>;

    /// Remove every entry for the session. Succeeds when there is nothing to remove.
    async fn delete_all(&self, session_id: &str) -> Result<(), StorageError>;

    /// Distinct session ids that currently have at least one entry.
    async fn list_sessions(&self) -> Result<Vec<String>, StorageError>;
}

#[async_trait]
impl<T: TranscriptStore + ?Sized> TranscriptStore for std::sync::Arc<T> {
    async fn append(
        &self,
        session_id: &str,
        sender: Sender,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        (**self).append(session_id, sender, text, timestamp).await
    }

    async fn fetch_all(&self, session_id: &str) -> Result<Vec<TranscriptEntry>, StorageError> {
        (**self).fetch_all(session_id).await
    }

    async fn delete_all(&self, session_id: &str) -> Result<(), StorageError> {
        (**self).delete_all(session_id).await
    }

    async fn list_sessions(&self) -> Result<Vec<String>, StorageError> {
        (**self).list_sessions().await
    }
}
