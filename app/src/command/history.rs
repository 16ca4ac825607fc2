use sentibot_conversation::HistoryView;

use super::open_store;

/// Strategy for printing a session's transcript, oldest first.
#[derive(Debug, Clone, Copy)]
pub struct HistoryStrategy;

impl super::CommandStrategy for HistoryStrategy {
    type Input = String;

    async fn execute(&self, session_id: Self::Input) -> anyhow::Result<()> {
        let (_config, store) = open_store().await?;
        let view = HistoryView::load(store.as_ref(), &session_id).await;

        if view.is_empty() {
            println!("No messages for session {session_id}");
        } else {
            println!("=== {session_id} ({} messages) ===", view.len());
            println!("{}", view.render());
        }
        Ok(())
    }
}
