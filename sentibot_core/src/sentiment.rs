//! Sentiment buckets and the two classifier contracts consumed per turn.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ClassificationError;

/// Reply bucket selected from a polarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentBucket {
    Positive,
    Neutral,
    Negative,
    /// Used only when the classifier failed and the failure policy asks for it.
    Fallback,
}

impl SentimentBucket {
    /// Bucket a polarity score: strictly positive, strictly negative, or neutral.
    ///
    /// `NaN` compares false both ways and therefore lands in `Neutral`.
    #[must_use]
    pub fn from_polarity(polarity: f32) -> Self {
        if polarity > 0.0 {
            Self::Positive
        } else if polarity < 0.0 {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
            Self::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for SentimentBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SentimentBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "neutral" => Ok(Self::Neutral),
            "negative" => Ok(Self::Negative),
            "fallback" => Ok(Self::Fallback),
            _ => Err(format!("unknown sentiment bucket: {s}")),
        }
    }
}

/// Maps an utterance to a polarity in `[-1.0, 1.0]`.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn score(&self, text: &str) -> Result<f32, ClassificationError>;
}

/// Maps an utterance to at most one person name (first match only).
///
/// `Ok(None)` means no name was found; `Err` means the recognizer itself
/// failed, which callers may want to log differently.
#[async_trait]
pub trait NameRecognizer: Send + Sync {
    async fn recognize(&self, text: &str) -> Result<Option<String>, ClassificationError>;
}

#[async_trait]
impl<T: SentimentClassifier + ?Sized> SentimentClassifier for std::sync::Arc<T> {
    async fn score(&self, text: &str) -> Result<f32, ClassificationError> {
        (**self).score(text).await
    }
}

#[async_trait]
impl<T: NameRecognizer + ?Sized> NameRecognizer for std::sync::Arc<T> {
    async fn recognize(&self, text: &str) -> Result<Option<String>, ClassificationError> {
        (**self).recognize(text).await
    }
}
