use sentibot_config::{Config, config_path};
use sentibot_core::SentimentBucket;
use sentibot_storage::TranscriptManager;
use tracing::info;

/// Strategy for displaying configuration information.
///
/// This strategy outputs:
/// - Config file location
/// - Database URL (password masked) and connection status
/// - Conversation and recognizer settings
/// - Reply catalog sizes
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let path = config_path()?;
        let config = Config::load_or_default()?;

        println!("=== sentibot Configuration ===\n");

        println!("Config File:");
        if path.exists() {
            println!("  Path: {}", path.display());
        } else {
            println!("  Path: {} (not found, using defaults)", path.display());
        }
        println!();

        println!("Database:");
        let db_url = &config.database.url;
        println!("  URL: {}", mask_database_url(db_url));

        info!("Testing database connection");
        match TranscriptManager::new(db_url).await {
            Ok(_) => {
                println!("  Status: Connected");
            }
            Err(e) => {
                println!("  Status: Connection failed");
                println!("  Error: {e}");
            }
        }
        println!();

        println!("Conversation:");
        println!(
            "  Feedback Interval: {}",
            config.conversation.feedback_interval
        );
        println!(
            "  On Classifier Failure: {:?}",
            config.conversation.on_classifier_failure
        );
        println!();

        println!("Replies:");
        let catalog = config.replies.catalog();
        for bucket in [
            SentimentBucket::Positive,
            SentimentBucket::Neutral,
            SentimentBucket::Negative,
            SentimentBucket::Fallback,
        ] {
            println!("  {bucket}: {} replies", catalog.replies(bucket).len());
        }
        println!();

        println!("Name Recognizer:");
        if config.recognizer.patterns.is_empty() {
            println!("  Extra Patterns: (none)");
        } else {
            for pattern in &config.recognizer.patterns {
                println!("  Extra Pattern: {pattern}");
            }
        }
        println!();

        println!("Logging:");
        println!("  Level: {}", config.logging.level);

        Ok(())
    }
}

fn mask_database_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };

    let Some((credentials, after_at)) = rest.split_once('@') else {
        return url.to_string();
    };

    let Some((username, _password)) = credentials.split_once(':') else {
        return url.to_string();
    };

    format!("{scheme}://{username}:***@{after_at}")
}
