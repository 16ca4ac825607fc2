//! Talk to the bot, one message or a whole interactive session.

use sentibot_conversation::TurnContext;
use tracing::info;
use uuid::Uuid;

use super::build_manager;

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Session to continue; a new UUID v7 id is generated if absent
    pub session_id: Option<String>,
    /// Optional single message to send (non-interactive mode)
    pub message: Option<String>,
}

/// Strategy for executing the Chat command.
///
/// Both the transcript and the turn-taking state are stored in the database,
/// so repeated `-m` calls with the same `--session` continue one cycle.
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let manager = build_manager().await?;
        let session_id = input
            .session_id
            .unwrap_or_else(|| Uuid::now_v7().to_string());

        info!("Starting conversation session: {session_id}");

        if let Some(msg) = input.message {
            let result = manager
                .process_turn(&session_id, TurnContext::new(msg))
                .await;
            println!("{}", result.reply);
            info!(
                "Turn {} completed for session {session_id}",
                result.interaction_count
            );
        } else {
            manager.run_interactive(&session_id).await?;
            info!("Conversation ended: {session_id}");
        }

        Ok(())
    }
}
