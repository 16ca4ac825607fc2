//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy with its own input type, dispatched
//! statically from `main`.

use std::sync::Arc;
use std::time::Duration;

use sentibot_analysis::{LexiconSentimentClassifier, PatternNameRecognizer};
use sentibot_config::Config;
use sentibot_conversation::ConversationManager;
use sentibot_core::{NameRecognizer, SentimentClassifier, SessionStateStore, TranscriptStore};
use sentibot_storage::{SessionStateManager, TranscriptManager};
use tokio::time::sleep;
use tracing::{info, warn};

mod chat;
mod history;
mod info;
mod init;
mod reset;
mod sessions;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use history::HistoryStrategy;
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use reset::ResetStrategy;
pub use sessions::SessionsStrategy;
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
///
/// Each strategy defines its own input type via the associated type, so
/// adding a command only requires implementing this trait.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Connect to the transcript database, backing off between attempts.
///
/// # Retry Behavior
/// - First retry: 1s
/// - Second retry: 2s
/// - Gives up after `MAX_ATTEMPTS`
async fn connect_store_with_retry(database_url: &str) -> anyhow::Result<TranscriptManager> {
    const MAX_ATTEMPTS: u32 = 3;
    const MAX_DELAY: Duration = Duration::from_secs(3);
    const INITIAL_DELAY: Duration = Duration::from_secs(1);

    let mut attempt = 0u32;
    let mut delay = INITIAL_DELAY;

    loop {
        attempt += 1;
        match TranscriptManager::new(database_url).await {
            Ok(store) => {
                info!("Transcript store connected on attempt {attempt}");
                return Ok(store);
            }
            Err(e) if attempt >= MAX_ATTEMPTS => {
                return Err(e.context(format!(
                    "Failed to connect to database after {attempt} attempts"
                )));
            }
            Err(e) => {
                warn!(
                    "Failed to connect to database (attempt {attempt}): {e}. Retrying in {}s...",
                    delay.as_secs()
                );
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}

/// Load the config (or defaults) and open the transcript store.
async fn open_store() -> anyhow::Result<(Config, Arc<TranscriptManager>)> {
    let config = Config::load_or_default()?;
    // The default SQLite file lives in the config directory.
    Config::ensure_config_dir()?;
    let store = Arc::new(connect_store_with_retry(&config.database.url).await?);
    Ok((config, store))
}

/// Wire the built-in classifiers and the configured database into a manager.
///
/// Session state shares the transcript's connection, so `chat --session ID`
/// resumes the feedback cycle across processes.
async fn build_manager() -> anyhow::Result<ConversationManager> {
    let (config, store) = open_store().await?;

    let states: Arc<dyn SessionStateStore> =
        Arc::new(SessionStateManager::from_connection(store.db().clone()).await?);
    let classifier: Arc<dyn SentimentClassifier> = Arc::new(LexiconSentimentClassifier::new()?);
    let recognizer: Arc<dyn NameRecognizer> =
        Arc::new(PatternNameRecognizer::with_extra(&config.recognizer.patterns)?);
    let store: Arc<dyn TranscriptStore> = store;

    Ok(
        ConversationManager::new(store, classifier, recognizer, config.conversation.clone())
            .with_catalog(config.replies.catalog())
            .with_state_store(states),
    )
}
