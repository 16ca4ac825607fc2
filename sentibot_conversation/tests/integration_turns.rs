//! Integration tests for the turn-taking policy.
//!
//! These tests drive `ConversationManager` with scripted collaborators and
//! verify that:
//! - every turn logs the user utterance first
//! - every third normal turn asks for feedback
//! - the feedback turn is acknowledged, resets the cycle and purges history
//! - recognized names preempt sentiment replies
//! - classifier and storage failures degrade instead of failing the turn

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use sentibot_conversation::{
    ClassifierFailurePolicy, ConversationConfig, ConversationManager, FEEDBACK_ACK,
    FEEDBACK_SUFFIX, ReplyCatalog, ReplyKind, TurnContext,
};
use sentibot_core::{
    ClassificationError, NameRecognizer, Sender, SentimentBucket, SentimentClassifier,
    StorageError, TranscriptEntry, TranscriptStore,
};
use tokio::sync::Mutex;

// ── Scripted collaborators ───────────────────────────────────────────────

/// Polarity by exact utterance; unknown text scores 0.0.
struct ScriptedSentiment {
    scores: HashMap<String, f32>,
    fail: bool,
    calls: Mutex<usize>,
}

impl ScriptedSentiment {
    fn new(scores: &[(&str, f32)]) -> Self {
        Self {
            scores: scores.iter().map(|(t, s)| ((*t).to_string(), *s)).collect(),
            fail: false,
            calls: Mutex::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[])
        }
    }

    async fn calls(&self) -> usize {
        *self.calls.lock().await
    }
}

#[async_trait]
impl SentimentClassifier for ScriptedSentiment {
    async fn score(&self, text: &str) -> Result<f32, ClassificationError> {
        *self.calls.lock().await += 1;
        if self.fail {
            return Err(ClassificationError::Sentiment("model offline".to_string()));
        }
        Ok(self.scores.get(text).copied().unwrap_or(0.0))
    }
}

/// Returns a name for exact utterances, or errors on every call.
struct ScriptedNames {
    names: HashMap<String, String>,
    fail: bool,
    calls: Mutex<usize>,
}

impl ScriptedNames {
    fn new(names: &[(&str, &str)]) -> Self {
        Self {
            names: names
                .iter()
                .map(|(t, n)| ((*t).to_string(), (*n).to_string()))
                .collect(),
            fail: false,
            calls: Mutex::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[])
        }
    }

    async fn calls(&self) -> usize {
        *self.calls.lock().await
    }
}

#[async_trait]
impl NameRecognizer for ScriptedNames {
    async fn recognize(&self, text: &str) -> Result<Option<String>, ClassificationError> {
        *self.calls.lock().await += 1;
        if self.fail {
            return Err(ClassificationError::Recognizer("tagger crashed".to_string()));
        }
        Ok(self.names.get(text).cloned())
    }
}

/// In-memory transcript that also records the order of operations.
#[derive(Default)]
struct RecordingStore {
    entries: Mutex<Vec<TranscriptEntry>>,
    ops: Mutex<Vec<String>>,
    unavailable: bool,
}

impl RecordingStore {
    fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    async fn ops(&self) -> Vec<String> {
        self.ops.lock().await.clone()
    }

    async fn clear_ops(&self) {
        self.ops.lock().await.clear();
    }
}

#[async_trait]
impl TranscriptStore for RecordingStore {
    async fn append(
        &self,
        session_id: &str,
        sender: Sender,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        self.ops.lock().await.push(format!("append {sender}"));
        if self.unavailable {
            return Err(StorageError::Unavailable("disk full".to_string()));
        }
        self.entries
            .lock()
            .await
            .push(TranscriptEntry::new(session_id, sender, text, timestamp));
        Ok(())
    }

    async fn fetch_all(&self, session_id: &str) -> Result<Vec<TranscriptEntry>, StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable("disk full".to_string()));
        }
        Ok(self
            .entries
            .lock()
            .await
            .iter()
            .filter(|e| e.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn delete_all(&self, session_id: &str) -> Result<(), StorageError> {
        self.ops.lock().await.push("delete".to_string());
        if self.unavailable {
            return Err(StorageError::Unavailable("disk full".to_string()));
        }
        self.entries
            .lock()
            .await
            .retain(|e| e.session_id != session_id);
        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<String>, StorageError> {
        let mut ids: Vec<String> = self
            .entries
            .lock()
            .await
            .iter()
            .map(|e| e.session_id.clone())
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}

// ── Fixtures ────────────────────────────────────────────────────────────

type Manager = ConversationManager<Arc<RecordingStore>, Arc<ScriptedSentiment>, Arc<ScriptedNames>>;

struct Fixture {
    manager: Manager,
    store: Arc<RecordingStore>,
    sentiment: Arc<ScriptedSentiment>,
    names: Arc<ScriptedNames>,
}

fn fixture_with(
    store: RecordingStore,
    sentiment: ScriptedSentiment,
    names: ScriptedNames,
    config: ConversationConfig,
) -> Fixture {
    let store = Arc::new(store);
    let sentiment = Arc::new(sentiment);
    let names = Arc::new(names);
    let manager = ConversationManager::new(
        Arc::clone(&store),
        Arc::clone(&sentiment),
        Arc::clone(&names),
        config,
    )
    .with_rng(StdRng::seed_from_u64(2024));

    Fixture {
        manager,
        store,
        sentiment,
        names,
    }
}

fn fixture() -> Fixture {
    fixture_with(
        RecordingStore::default(),
        ScriptedSentiment::new(&[
            ("I love this", 0.5),
            ("This is broken", -0.4),
            ("ok", 0.0),
            ("great", 0.8),
        ]),
        ScriptedNames::new(&[("My name is Alex", "Alex")]),
        ConversationConfig::default(),
    )
}

// ── Scenarios ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_three_turns_then_feedback() {
    let f = fixture();
    let catalog = ReplyCatalog::default();

    let r1 = f.manager.process_turn("s1", TurnContext::new("I love this")).await;
    assert!(catalog.contains(SentimentBucket::Positive, &r1.reply));
    assert_eq!(r1.kind, ReplyKind::Sentiment(SentimentBucket::Positive));
    assert_eq!(r1.interaction_count, 1);
    assert!(!r1.awaiting_feedback);

    let r2 = f.manager.process_turn("s1", TurnContext::new("This is broken")).await;
    assert!(catalog.contains(SentimentBucket::Negative, &r2.reply));
    assert_eq!(r2.interaction_count, 2);
    assert!(!r2.awaiting_feedback);

    let r3 = f.manager.process_turn("s1", TurnContext::new("ok")).await;
    let base = r3
        .reply
        .strip_suffix(FEEDBACK_SUFFIX)
        .expect("third reply should ask for feedback");
    assert!(catalog.contains(SentimentBucket::Neutral, base));
    assert_eq!(r3.interaction_count, 3);
    assert!(r3.awaiting_feedback);
    assert_eq!(f.manager.history("s1").await.len(), 6);

    let r4 = f.manager.process_turn("s1", TurnContext::new("it was fine")).await;
    assert_eq!(r4.reply, "Thank you for your feedback!");
    assert_eq!(r4.kind, ReplyKind::FeedbackAcknowledged);

    let state = f.manager.session_state("s1").await;
    assert_eq!(state.interaction_count, 0);
    assert!(!state.awaiting_feedback);
    assert!(f.manager.history("s1").await.is_empty());
}

#[tokio::test]
async fn test_feedback_turn_skips_classification() {
    let f = fixture();
    for text in ["I love this", "ok", "ok"] {
        f.manager.handle_turn("s1", text).await;
    }
    let sentiment_calls = f.sentiment.calls().await;
    let name_calls = f.names.calls().await;

    // Would otherwise be recognized as a name.
    let reply = f.manager.handle_turn("s1", "My name is Alex").await;

    assert_eq!(reply, FEEDBACK_ACK);
    assert_eq!(f.sentiment.calls().await, sentiment_calls);
    assert_eq!(f.names.calls().await, name_calls);
    assert!(f.manager.session_state("s1").await.recognized_name.is_none());
}

#[tokio::test]
async fn test_append_order_on_both_paths() {
    let f = fixture();
    f.manager.handle_turn("s1", "I love this").await;
    assert_eq!(f.store.ops().await, vec!["append User", "append Bot"]);

    f.manager.handle_turn("s1", "ok").await;
    f.manager.handle_turn("s1", "ok").await;
    f.store.clear_ops().await;

    f.manager.handle_turn("s1", "meh").await;
    assert_eq!(
        f.store.ops().await,
        vec!["append User", "append Bot", "delete"]
    );
}

#[tokio::test]
async fn test_count_equals_number_of_normal_turns() {
    let f = fixture_with(
        RecordingStore::default(),
        ScriptedSentiment::new(&[]),
        ScriptedNames::new(&[]),
        ConversationConfig::default().with_feedback_interval(100),
    );
    for n in 1..=25 {
        let result = f.manager.process_turn("s1", TurnContext::new("hello")).await;
        assert_eq!(result.interaction_count, n);
    }
    assert_eq!(f.manager.session_state("s1").await.interaction_count, 25);
}

#[tokio::test]
async fn test_every_third_turn_solicits_across_cycles() {
    let f = fixture();
    for cycle in 0..3 {
        for turn in 1..=3 {
            let result = f.manager.process_turn("s1", TurnContext::new("ok")).await;
            assert_eq!(
                result.reply.ends_with(FEEDBACK_SUFFIX),
                turn == 3,
                "cycle {cycle} turn {turn}"
            );
            assert_eq!(result.awaiting_feedback, turn == 3);
        }
        assert_eq!(f.manager.handle_turn("s1", "feedback").await, FEEDBACK_ACK);
        assert!(f.manager.history("s1").await.is_empty());
    }
}

#[tokio::test]
async fn test_empty_utterance_is_classified() {
    let f = fixture();
    let result = f.manager.process_turn("s1", TurnContext::from_optional(None)).await;
    assert_eq!(result.kind, ReplyKind::Sentiment(SentimentBucket::Neutral));
    assert_eq!(result.interaction_count, 1);

    let history = f.manager.history("s1").await;
    assert_eq!(history[0].sender, Sender::User);
    assert_eq!(history[0].text, "");
}

#[tokio::test]
async fn test_utterance_is_trimmed_before_classification() {
    let f = fixture();
    let reply = f.manager.handle_turn("s1", "   I love this \n").await;
    assert!(ReplyCatalog::default().contains(SentimentBucket::Positive, &reply));
    assert_eq!(f.manager.history("s1").await[0].text, "I love this");
}

// ── Names ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_name_preempts_sentiment() {
    let f = fixture();
    let result = f
        .manager
        .process_turn("s1", TurnContext::new("My name is Alex"))
        .await;

    assert_eq!(result.reply, "Nice to meet you, Alex!");
    assert_eq!(
        result.kind,
        ReplyKind::Greeting {
            name: "Alex".to_string()
        }
    );
    assert_eq!(f.sentiment.calls().await, 0);
    assert_eq!(
        f.manager.session_state("s1").await.recognized_name.as_deref(),
        Some("Alex")
    );
}

#[tokio::test]
async fn test_greeting_counts_toward_feedback_cycle() {
    let f = fixture();
    f.manager.handle_turn("s1", "ok").await;
    f.manager.handle_turn("s1", "ok").await;
    let reply = f.manager.handle_turn("s1", "My name is Alex").await;
    assert_eq!(reply, format!("Nice to meet you, Alex!{FEEDBACK_SUFFIX}"));
    assert!(f.manager.session_state("s1").await.awaiting_feedback);
}

#[tokio::test]
async fn test_name_survives_feedback_cycle() {
    let f = fixture();
    f.manager.handle_turn("s1", "My name is Alex").await;
    f.manager.handle_turn("s1", "ok").await;
    f.manager.handle_turn("s1", "ok").await;
    f.manager.handle_turn("s1", "fine").await;

    let state = f.manager.session_state("s1").await;
    assert_eq!(state.interaction_count, 0);
    assert_eq!(state.recognized_name.as_deref(), Some("Alex"));
}

// ── Failures ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_recognizer_failure_falls_through_to_sentiment() {
    let f = fixture_with(
        RecordingStore::default(),
        ScriptedSentiment::new(&[("great", 0.8)]),
        ScriptedNames::failing(),
        ConversationConfig::default(),
    );
    let result = f.manager.process_turn("s1", TurnContext::new("great")).await;
    assert_eq!(result.kind, ReplyKind::Sentiment(SentimentBucket::Positive));
    assert_eq!(result.interaction_count, 1);
}

#[tokio::test]
async fn test_sentiment_failure_neutral_policy() {
    let f = fixture_with(
        RecordingStore::default(),
        ScriptedSentiment::failing(),
        ScriptedNames::new(&[]),
        ConversationConfig::default(),
    );
    let result = f.manager.process_turn("s1", TurnContext::new("hmm")).await;
    assert_eq!(result.kind, ReplyKind::Sentiment(SentimentBucket::Neutral));
    assert!(ReplyCatalog::default().contains(SentimentBucket::Neutral, &result.reply));
}

#[tokio::test]
async fn test_sentiment_failure_fallback_policy() {
    let f = fixture_with(
        RecordingStore::default(),
        ScriptedSentiment::failing(),
        ScriptedNames::new(&[]),
        ConversationConfig::default().with_failure_policy(ClassifierFailurePolicy::Fallback),
    );
    let result = f.manager.process_turn("s1", TurnContext::new("hmm")).await;
    assert_eq!(result.kind, ReplyKind::Sentiment(SentimentBucket::Fallback));
    assert!(ReplyCatalog::default().contains(SentimentBucket::Fallback, &result.reply));
    assert_eq!(result.interaction_count, 1);
}

#[tokio::test]
async fn test_out_of_range_polarity_is_a_failure() {
    let f = fixture_with(
        RecordingStore::default(),
        ScriptedSentiment::new(&[("wild", 7.5)]),
        ScriptedNames::new(&[]),
        ConversationConfig::default().with_failure_policy(ClassifierFailurePolicy::Fallback),
    );
    let result = f.manager.process_turn("s1", TurnContext::new("wild")).await;
    assert_eq!(result.kind, ReplyKind::Sentiment(SentimentBucket::Fallback));
}

#[tokio::test]
async fn test_storage_failure_still_replies() {
    let f = fixture_with(
        RecordingStore::unavailable(),
        ScriptedSentiment::new(&[("I love this", 0.5)]),
        ScriptedNames::new(&[]),
        ConversationConfig::default(),
    );
    let reply = f.manager.handle_turn("s1", "I love this").await;
    assert!(ReplyCatalog::default().contains(SentimentBucket::Positive, &reply));
    assert!(f.manager.history("s1").await.is_empty());

    f.manager.handle_turn("s1", "ok").await;
    f.manager.handle_turn("s1", "ok").await;
    assert_eq!(f.manager.handle_turn("s1", "bye").await, FEEDBACK_ACK);
    assert_eq!(f.manager.session_state("s1").await.interaction_count, 0);
}

// ── Isolation & history ─────────────────────────────────────────────────

#[tokio::test]
async fn test_sessions_are_isolated() {
    let f = fixture();
    for _ in 0..3 {
        f.manager.handle_turn("a", "ok").await;
    }
    f.manager.handle_turn("b", "I love this").await;

    assert!(f.manager.session_state("a").await.awaiting_feedback);
    let b = f.manager.session_state("b").await;
    assert_eq!(b.interaction_count, 1);
    assert!(!b.awaiting_feedback);

    assert_eq!(f.manager.handle_turn("a", "fine").await, FEEDBACK_ACK);
    assert!(f.manager.history("a").await.is_empty());
    assert_eq!(f.manager.history("b").await.len(), 2);
}

#[tokio::test]
async fn test_history_is_stable_between_reads() {
    let f = fixture();
    f.manager.handle_turn("s1", "I love this").await;
    f.manager.handle_turn("s1", "This is broken").await;

    let first = f.manager.history("s1").await;
    let second = f.manager.history("s1").await;
    assert_eq!(first, second);
    let senders: Vec<Sender> = first.iter().map(|e| e.sender).collect();
    assert_eq!(
        senders,
        vec![Sender::User, Sender::Bot, Sender::User, Sender::Bot]
    );
}

#[tokio::test]
async fn test_reset_session_clears_state_and_transcript() {
    let f = fixture();
    for _ in 0..3 {
        f.manager.handle_turn("s1", "ok").await;
    }
    f.manager.reset_session("s1").await.expect("reset should succeed");

    let state = f.manager.session_state("s1").await;
    assert_eq!(state.interaction_count, 0);
    assert!(!state.awaiting_feedback);
    assert!(f.manager.history("s1").await.is_empty());

    let result = f.manager.process_turn("s1", TurnContext::new("ok")).await;
    assert_eq!(result.kind, ReplyKind::Sentiment(SentimentBucket::Neutral));
}

// ── Interactive loop ────────────────────────────────────────────────────

#[tokio::test]
async fn test_quit_word_is_feedback_when_awaiting() {
    let f = fixture();
    let mut output = Vec::new();
    f.manager
        .run_session("s1", "ok\nok\nok\nq\nI love this\nquit\n".as_bytes(), &mut output)
        .await
        .unwrap();

    let printed = String::from_utf8(output).unwrap();
    assert!(printed.contains(FEEDBACK_ACK), "{printed}");
    assert!(printed.contains("Session ended. Turns since last feedback: 1"));

    let state = f.manager.session_state("s1").await;
    assert_eq!(state.interaction_count, 1);
    assert!(!state.awaiting_feedback);
}

#[tokio::test]
async fn test_quit_word_ends_normal_session() {
    let f = fixture();
    let mut output = Vec::new();
    f.manager
        .run_session("s1", "ok\nexit\nok\n".as_bytes(), &mut output)
        .await
        .unwrap();

    assert_eq!(f.manager.session_state("s1").await.interaction_count, 1);
    assert_eq!(f.manager.history("s1").await.len(), 2);
}

#[tokio::test]
async fn test_end_of_input_ends_session() {
    let f = fixture();
    let mut output = Vec::new();
    f.manager
        .run_session("s1", "I love this\n".as_bytes(), &mut output)
        .await
        .unwrap();

    assert_eq!(f.manager.session_state("s1").await.interaction_count, 1);
}
