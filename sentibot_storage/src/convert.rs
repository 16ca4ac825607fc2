use sentibot_core::{Sender, SessionState, StorageError, TranscriptEntry};
use sentibot_entities::{messages, sessions};

pub fn entry_from_model(m: messages::Model) -> Result<TranscriptEntry, StorageError> {
    let sender = m
        .sender
        .parse::<Sender>()
        .map_err(|reason| StorageError::Corrupt { id: m.id, reason })?;

    Ok(TranscriptEntry {
        session_id: m.session_id,
        timestamp: m.timestamp,
        sender,
        text: m.message,
    })
}

pub fn state_from_model(m: sessions::Model) -> Result<SessionState, StorageError> {
    let interaction_count =
        u32::try_from(m.interaction_count).map_err(|e| StorageError::State {
            session_id: m.session_id.clone(),
            reason: format!("interaction_count {}: {e}", m.interaction_count),
        })?;

    Ok(SessionState {
        interaction_count,
        awaiting_feedback: m.awaiting_feedback,
        recognized_name: m.recognized_name,
    })
}
