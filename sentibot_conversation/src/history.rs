//! Read-side view of a session's transcript.
//!
//! Loading never fails: a store error is logged and shows up as an empty
//! history rather than an error page.

use sentibot_core::{TranscriptEntry, TranscriptStore};
use tracing::warn;

/// Chronological transcript of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryView {
    pub session_id: String,
    pub entries: Vec<TranscriptEntry>,
}

impl HistoryView {
    /// Fetch the transcript, degrading to empty on storage failure.
    pub async fn load<S>(store: &S, session_id: &str) -> Self
    where
        S: TranscriptStore + ?Sized,
    {
        let entries = match store.fetch_all(session_id).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Showing empty history for session {session_id}: {e}");
                Vec::new()
            }
        };

        Self {
            session_id: session_id.to_string(),
            entries,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One line per entry: `[timestamp] Sender: text`.
    #[must_use]
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|e| {
                format!(
                    "[{}] {}: {}",
                    e.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    e.sender,
                    e.text
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
