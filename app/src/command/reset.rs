use super::build_manager;

/// Strategy for wiping one session's transcript and turn-taking state.
#[derive(Debug, Clone, Copy)]
pub struct ResetStrategy;

impl super::CommandStrategy for ResetStrategy {
    type Input = String;

    async fn execute(&self, session_id: Self::Input) -> anyhow::Result<()> {
        let manager = build_manager().await?;
        manager.reset_session(&session_id).await?;
        println!("Session {session_id} cleared");
        Ok(())
    }
}
