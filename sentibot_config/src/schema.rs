use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use sentibot_conversation::{ConversationConfig, ReplyCatalog};
use sentibot_core::SentimentBucket;
use tracing::warn;

const CONFIG_DIR: &str = "sentibot";
const CONFIG_FILE: &str = "config.json";
const DATABASE_FILE: &str = "chat_history.db";

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
    #[serde(default)]
    pub replies: RepliesConfig,
    #[serde(default)]
    pub recognizer: RecognizerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    #[serde(default = "DatabaseConfig::default_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
        }
    }
}

impl DatabaseConfig {
    /// SQLite file next to the config, created on first connect.
    fn default_url() -> String {
        config_dir().map_or_else(
            |_| format!("sqlite://{DATABASE_FILE}?mode=rwc"),
            |dir| format!("sqlite://{}?mode=rwc", dir.join(DATABASE_FILE).display()),
        )
    }
}

/// Optional per-bucket overrides of the built-in reply lists.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RepliesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positive: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neutral: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Vec<String>>,
}

impl RepliesConfig {
    /// Build the catalog, keeping the default for any bucket whose override
    /// is empty.
    #[must_use]
    pub fn catalog(&self) -> ReplyCatalog {
        let overrides = [
            (SentimentBucket::Positive, &self.positive),
            (SentimentBucket::Neutral, &self.neutral),
            (SentimentBucket::Negative, &self.negative),
            (SentimentBucket::Fallback, &self.fallback),
        ];

        overrides
            .into_iter()
            .fold(ReplyCatalog::default(), |catalog, (bucket, replies)| {
                let Some(replies) = replies else {
                    return catalog;
                };
                match catalog.clone().with_bucket(bucket, replies.clone()) {
                    Ok(updated) => updated,
                    Err(e) => {
                        warn!("Ignoring reply override: {e}");
                        catalog
                    }
                }
            })
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RecognizerConfig {
    /// Extra name patterns, each with one capture group for the name.
    #[serde(default)]
    pub patterns: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

/// `~/sentibot`
pub fn config_dir() -> anyhow::Result<PathBuf> {
    Ok(dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
        .join(CONFIG_DIR))
}

/// `~/sentibot/config.json`
pub fn config_path() -> anyhow::Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = config_path()?;

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'sentibot init' to create config.",
                config_path.display()
            );
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file if there is one, otherwise run on defaults.
    ///
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default() -> anyhow::Result<Self> {
        let config_path = config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            warn!(
                "No config at {}, using defaults. Run 'sentibot init' to create one.",
                config_path.display()
            );
            Ok(Self::default())
        }
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        std::fs::write(&config_path, Self::template())?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Point database.url at Postgres or MySQL if you don't want SQLite");
        println!("   2. Run 'sentibot chat' to start a conversation");
        println!();
        println!("🔧 Configuration options:");
        println!("   - conversation.feedback_interval: Turns between feedback requests");
        println!("   - conversation.on_classifier_failure: \"neutral\" or \"fallback\"");
        println!("   - replies.<bucket>: Replace the replies for one sentiment bucket");
        println!("   - recognizer.patterns: Extra regexes that capture a user's name");
        println!();
        Ok(())
    }

    fn template() -> String {
        let template = r#"{
  "database": {
    "url": "__DATABASE_URL__"
  },
  "conversation": {
    "feedback_interval": 3,
    "on_classifier_failure": "neutral"
  },
  "replies": {},
  "recognizer": {
    "patterns": []
  },
  "logging": {
    "level": "info"
  }
}"#;
        template.replace("__DATABASE_URL__", &DatabaseConfig::default_url())
    }
}
