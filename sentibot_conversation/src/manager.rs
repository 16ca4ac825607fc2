//! Conversation manager for sentiment-driven dialogue.
//!
//! The `ConversationManager` is the main entry point: hand it a session id
//! and an utterance, get back the reply to show the user.

use std::io::{BufRead, BufReader, Write};
use std::sync::Arc;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use sentibot_core::{
    ClassificationError, NameRecognizer, Sender, SentimentBucket, SentimentClassifier,
    SessionState, SessionStateStore, StorageError, TranscriptEntry, TranscriptStore,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::catalog::{FEEDBACK_ACK, FEEDBACK_SUFFIX, ReplyCatalog, greeting};
use crate::history::HistoryView;
use crate::session::SessionRegistry;

const DEFAULT_FEEDBACK_INTERVAL: u32 = 3;

/// What to do when the sentiment classifier fails.
///
/// `Neutral` answers as if the polarity were exactly zero, which is
/// indistinguishable from a true neutral to the user. `Fallback` answers from
/// the catalog's fallback bucket instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierFailurePolicy {
    #[default]
    Neutral,
    Fallback,
}

impl ClassifierFailurePolicy {
    const fn bucket(self) -> SentimentBucket {
        match self {
            Self::Neutral => SentimentBucket::Neutral,
            Self::Fallback => SentimentBucket::Fallback,
        }
    }
}

/// Configuration for conversation management.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Ask for feedback every this many normal-path turns
    #[serde(default = "ConversationConfig::default_feedback_interval")]
    pub feedback_interval: u32,
    /// Reply policy when sentiment scoring fails
    #[serde(default)]
    pub on_classifier_failure: ClassifierFailurePolicy,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            feedback_interval: DEFAULT_FEEDBACK_INTERVAL,
            on_classifier_failure: ClassifierFailurePolicy::default(),
        }
    }
}

impl ConversationConfig {
    const fn default_feedback_interval() -> u32 {
        DEFAULT_FEEDBACK_INTERVAL
    }

    /// Set the feedback interval.
    #[must_use]
    pub const fn with_feedback_interval(mut self, interval: u32) -> Self {
        self.feedback_interval = interval;
        self
    }

    /// Set the classifier failure policy.
    #[must_use]
    pub const fn with_failure_policy(mut self, policy: ClassifierFailurePolicy) -> Self {
        self.on_classifier_failure = policy;
        self
    }

    fn validated(mut self) -> Self {
        if self.feedback_interval == 0 {
            warn!("feedback_interval of 0 is not allowed, using {DEFAULT_FEEDBACK_INTERVAL}");
            self.feedback_interval = DEFAULT_FEEDBACK_INTERVAL;
        }
        self
    }
}

/// Errors that can occur while setting up a conversation.
///
/// Turns themselves never fail; collaborator errors are logged and degraded.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("reply bucket {0} must not be empty")]
    EmptyBucket(SentimentBucket),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Input for a single turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnContext {
    /// User's utterance, trimmed. May be empty.
    pub utterance: String,
}

impl TurnContext {
    #[must_use]
    pub fn new(input: impl AsRef<str>) -> Self {
        Self {
            utterance: input.as_ref().trim().to_string(),
        }
    }

    /// A missing message field is treated as an empty utterance.
    #[must_use]
    pub fn from_optional(input: Option<String>) -> Self {
        Self::new(input.unwrap_or_default())
    }
}

/// How the reply for a turn was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyKind {
    Greeting { name: String },
    Sentiment(SentimentBucket),
    FeedbackAcknowledged,
}

/// Result of processing a conversation turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnResult {
    pub reply: String,
    pub kind: ReplyKind,
    /// Count after this turn
    pub interaction_count: u32,
    /// Whether the next turn will be taken as feedback
    pub awaiting_feedback: bool,
}

/// Sentiment-driven conversation manager.
///
/// Talks to three collaborators: a transcript store, a sentiment classifier
/// and a name recognizer. Per-session state goes through a
/// [`SessionRegistry`], in memory unless [`Self::with_state_store`] is used.
pub struct ConversationManager<
    T = Arc<dyn TranscriptStore>,
    C = Arc<dyn SentimentClassifier>,
    N = Arc<dyn NameRecognizer>,
> where
    T: Send + Sync,
    C: Send + Sync,
    N: Send + Sync,
{
    store: T,
    classifier: C,
    recognizer: N,
    catalog: ReplyCatalog,
    config: ConversationConfig,
    sessions: SessionRegistry,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl<T, C, N> ConversationManager<T, C, N>
where
    T: TranscriptStore + Send + Sync,
    C: SentimentClassifier + Send + Sync,
    N: NameRecognizer + Send + Sync,
{
    /// Create a manager with the default catalog and an entropy-seeded RNG.
    pub fn new(store: T, classifier: C, recognizer: N, config: ConversationConfig) -> Self {
        let config = config.validated();
        info!(
            "Creating conversation manager (feedback every {} turns, on classifier failure: {:?})",
            config.feedback_interval, config.on_classifier_failure
        );

        Self {
            store,
            classifier,
            recognizer,
            catalog: ReplyCatalog::default(),
            config,
            sessions: SessionRegistry::default(),
            rng: Mutex::new(Box::new(StdRng::from_entropy())),
        }
    }

    /// Replace the reply catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: ReplyCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Keep session state in `store`, so that other managers (or later
    /// processes) sharing it resume the same feedback cycle.
    #[must_use]
    pub fn with_state_store(mut self, store: Arc<dyn SessionStateStore>) -> Self {
        self.sessions = SessionRegistry::new(store);
        self
    }

    /// Replace the random source used for reply draws.
    #[must_use]
    pub fn with_rng<R: RngCore + Send + 'static>(mut self, rng: R) -> Self {
        self.rng = Mutex::new(Box::new(rng));
        self
    }

    #[must_use]
    pub const fn catalog(&self) -> &ReplyCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn config(&self) -> &ConversationConfig {
        &self.config
    }

    /// Handle one turn and return only the reply text.
    pub async fn handle_turn(&self, session_id: &str, utterance: &str) -> String {
        self.process_turn(session_id, TurnContext::new(utterance))
            .await
            .reply
    }

    /// Process a single conversation turn.
    ///
    /// The user's utterance is always logged first. If the session was
    /// waiting for feedback, the utterance is taken as that feedback and the
    /// session's transcript is purged; otherwise a reply is generated,
    /// the turn is counted and the reply is logged.
    pub async fn process_turn(&self, session_id: &str, context: TurnContext) -> TurnResult {
        let utterance = context.utterance;
        let mut state = self.sessions.get(session_id).await;

        self.record(session_id, Sender::User, &utterance).await;

        if state.awaiting_feedback {
            return self.consume_feedback(session_id, &utterance, state).await;
        }

        let (mut reply, kind) = self.generate_reply(&utterance, &mut state).await;

        if state.record_interaction(self.config.feedback_interval) {
            reply.push_str(FEEDBACK_SUFFIX);
            debug!(
                "Soliciting feedback for session {session_id} after {} turns",
                state.interaction_count
            );
        }

        self.record(session_id, Sender::Bot, &reply).await;

        let result = TurnResult {
            reply,
            kind,
            interaction_count: state.interaction_count,
            awaiting_feedback: state.awaiting_feedback,
        };
        self.sessions.put(session_id, &state).await;

        debug!(
            "Turn {} completed for session {session_id}",
            result.interaction_count
        );
        result
    }

    async fn consume_feedback(
        &self,
        session_id: &str,
        feedback: &str,
        mut state: SessionState,
    ) -> TurnResult {
        info!("User feedback for session {session_id}: {feedback}");

        self.record(session_id, Sender::Bot, FEEDBACK_ACK).await;
        if let Err(e) = self.store.delete_all(session_id).await {
            warn!("Failed to purge transcript after feedback: {e}");
        }

        state.complete_feedback();
        self.sessions.put(session_id, &state).await;

        TurnResult {
            reply: FEEDBACK_ACK.to_string(),
            kind: ReplyKind::FeedbackAcknowledged,
            interaction_count: 0,
            awaiting_feedback: false,
        }
    }

    /// Name recognition first; sentiment only when no name was found.
    async fn generate_reply(&self, text: &str, state: &mut SessionState) -> (String, ReplyKind) {
        match self.recognizer.recognize(text).await {
            Ok(Some(name)) => {
                debug!("Recognized name: {name}");
                state.recognized_name = Some(name.clone());
                return (greeting(&name), ReplyKind::Greeting { name });
            }
            Ok(None) => {}
            Err(e) => warn!("Name extraction error: {e}"),
        }

        let bucket = match self.score(text).await {
            Ok(polarity) => SentimentBucket::from_polarity(polarity),
            Err(e) => {
                let bucket = self.config.on_classifier_failure.bucket();
                warn!("Sentiment classification failed, answering from {bucket}: {e}");
                bucket
            }
        };

        let reply = {
            let mut rng = self.rng.lock().await;
            self.catalog.pick(bucket, rng.as_mut()).to_string()
        };
        (reply, ReplyKind::Sentiment(bucket))
    }

    async fn score(&self, text: &str) -> Result<f32, ClassificationError> {
        let polarity = self.classifier.score(text).await?;
        if !(-1.0..=1.0).contains(&polarity) {
            return Err(ClassificationError::OutOfRange(polarity));
        }
        Ok(polarity)
    }

    /// Best-effort append; a storage failure never fails the turn.
    async fn record(&self, session_id: &str, sender: Sender, text: &str) {
        if let Err(e) = self.store.append(session_id, sender, text, Utc::now()).await {
            warn!("Transcript incomplete for session {session_id}: {e}");
        }
    }

    /// Transcript for display, oldest first. Empty if the store fails.
    pub async fn history(&self, session_id: &str) -> Vec<TranscriptEntry> {
        HistoryView::load(&self.store, session_id).await.entries
    }

    /// Snapshot of a session's state.
    pub async fn session_state(&self, session_id: &str) -> SessionState {
        self.sessions.get(session_id).await
    }

    /// Forget a session's state and purge its transcript.
    pub async fn reset_session(&self, session_id: &str) -> Result<(), StorageError> {
        self.sessions.remove(session_id).await?;
        self.store.delete_all(session_id).await?;
        info!("Reset session: {session_id}");
        Ok(())
    }

    /// Run an interactive conversation loop on stdin/stdout.
    pub async fn run_interactive(&self, session_id: &str) -> Result<(), ConversationError> {
        self.run_session(
            session_id,
            BufReader::new(std::io::stdin()),
            std::io::stdout(),
        )
        .await
    }

    /// Conversation loop over arbitrary line input.
    ///
    /// `exit`, `quit` and `q` end the loop, except while the session is
    /// awaiting feedback: then every line, those included, is the feedback.
    pub async fn run_session<R, W>(
        &self,
        session_id: &str,
        mut input: R,
        mut output: W,
    ) -> Result<(), ConversationError>
    where
        R: BufRead,
        W: Write,
    {
        writeln!(output, "=== Conversation Session: {session_id} ===")?;
        writeln!(output, "Type 'exit', 'quit', or Ctrl+C to end the session.\n")?;

        loop {
            write!(output, "> ")?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim();

            let state = self.session_state(session_id).await;
            if !state.awaiting_feedback && matches!(line, "exit" | "quit" | "q") {
                writeln!(
                    output,
                    "\nSession ended. Turns since last feedback: {}",
                    state.interaction_count
                )?;
                break;
            }

            let reply = self.handle_turn(session_id, line).await;
            writeln!(output, "\n{reply}\n")?;
        }

        Ok(())
    }
}
