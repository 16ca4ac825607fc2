use sentibot_core::TranscriptStore;

use super::open_store;

/// Strategy for listing sessions that still have transcript entries.
#[derive(Debug, Clone, Copy)]
pub struct SessionsStrategy;

impl super::CommandStrategy for SessionsStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let (_config, store) = open_store().await?;
        let sessions = store.list_sessions().await?;

        if sessions.is_empty() {
            println!("No sessions");
        }
        for session_id in sessions {
            let count = store.count(&session_id).await?;
            println!("{session_id}\t{count} messages");
        }
        Ok(())
    }
}
