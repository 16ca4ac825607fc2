//! Canned replies keyed by sentiment bucket.

use rand::Rng;
use rand::seq::SliceRandom;
use sentibot_core::SentimentBucket;

use crate::manager::ConversationError;

/// Appended to a reply when the turn asks for feedback.
pub const FEEDBACK_SUFFIX: &str = " Can you please provide feedback on our conversation?";

/// Returned verbatim for the feedback turn.
pub const FEEDBACK_ACK: &str = "Thank you for your feedback!";

const POSITIVE: &[&str] = &[
    "I'm glad to hear that! 😊",
    "That’s wonderful! How can I assist further?",
    "Awesome! 😊",
];

const NEUTRAL: &[&str] = &[
    "Alright! How can I assist you further?",
    "Okay, tell me more.",
];

const NEGATIVE: &[&str] = &[
    "I'm sorry you're facing issues. 😔",
    "I'm here to help. What seems to be the problem?",
];

const FALLBACK: &[&str] = &[
    "I’m not sure I understand that.",
    "Could you rephrase?",
    "I'm here to help, but I didn't get that.",
];

/// Reply for a turn where a name was recognized.
#[must_use]
pub fn greeting(name: &str) -> String {
    format!("Nice to meet you, {name}!")
}

/// Four non-empty reply lists. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyCatalog {
    positive: Vec<String>,
    neutral: Vec<String>,
    negative: Vec<String>,
    fallback: Vec<String>,
}

impl Default for ReplyCatalog {
    fn default() -> Self {
        let owned = |list: &[&str]| list.iter().map(ToString::to_string).collect();
        Self {
            positive: owned(POSITIVE),
            neutral: owned(NEUTRAL),
            negative: owned(NEGATIVE),
            fallback: owned(FALLBACK),
        }
    }
}

impl ReplyCatalog {
    /// Replace one bucket. Empty lists are rejected.
    pub fn with_bucket(
        mut self,
        bucket: SentimentBucket,
        replies: Vec<String>,
    ) -> Result<Self, ConversationError> {
        if replies.is_empty() {
            return Err(ConversationError::EmptyBucket(bucket));
        }
        *self.bucket_mut(bucket) = replies;
        Ok(self)
    }

    #[must_use]
    pub fn replies(&self, bucket: SentimentBucket) -> &[String] {
        match bucket {
            SentimentBucket::Positive => &self.positive,
            SentimentBucket::Neutral => &self.neutral,
            SentimentBucket::Negative => &self.negative,
            SentimentBucket::Fallback => &self.fallback,
        }
    }

    const fn bucket_mut(&mut self, bucket: SentimentBucket) -> &mut Vec<String> {
        match bucket {
            SentimentBucket::Positive => &mut self.positive,
            SentimentBucket::Neutral => &mut self.neutral,
            SentimentBucket::Negative => &mut self.negative,
            SentimentBucket::Fallback => &mut self.fallback,
        }
    }

    /// Uniform draw from one bucket. Every call draws afresh.
    pub fn pick<R: Rng + ?Sized>(&self, bucket: SentimentBucket, rng: &mut R) -> &str {
        // Buckets are never empty, so `choose` always yields.
        self.replies(bucket).choose(rng).map_or("", String::as_str)
    }

    #[must_use]
    pub fn contains(&self, bucket: SentimentBucket, reply: &str) -> bool {
        self.replies(bucket).iter().any(|r| r == reply)
    }
}
