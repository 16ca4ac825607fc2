use thiserror::Error;

/// A sentiment or name-recognition call failed.
///
/// Always recovered inside the turn; never shown to the end user.
#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("sentiment classifier failed: {0}")]
    Sentiment(String),

    #[error("name recognizer failed: {0}")]
    Recognizer(String),

    #[error("polarity out of range: {0}")]
    OutOfRange(f32),
}

/// The transcript or session-state store could not complete an operation.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("transcript store unavailable: {0}")]
    Unavailable(String),

    #[error("failed to append entry for session {session_id}: {reason}")]
    Append { session_id: String, reason: String },

    #[error("failed to fetch transcript for session {session_id}: {reason}")]
    Fetch { session_id: String, reason: String },

    #[error("failed to delete transcript for session {session_id}: {reason}")]
    Delete { session_id: String, reason: String },

    #[error("failed to persist state for session {session_id}: {reason}")]
    State { session_id: String, reason: String },

    #[error("corrupt transcript row {id}: {reason}")]
    Corrupt { id: i64, reason: String },
}
