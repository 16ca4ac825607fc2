//! Lexicon-based polarity scorer.
//!
//! Each known word carries a weight in `[-1.0, 1.0]`. The polarity of an
//! utterance is the mean weight of the words it hits, after applying
//! negators ("not good") and intensifiers ("very good") that precede a hit.
//! Utterances with no hits score exactly `0.0`.

use std::collections::HashMap;

use async_trait::async_trait;
use regex::Regex;
use sentibot_core::{ClassificationError, SentimentClassifier};

/// (word, weight)
const WORD_TABLE: &[(&str, f32)] = &[
    // favourable
    ("love", 0.5),
    ("loved", 0.7),
    ("like", 0.2),
    ("good", 0.7),
    ("great", 0.8),
    ("nice", 0.6),
    ("fine", 0.4),
    ("happy", 0.8),
    ("glad", 0.5),
    ("awesome", 1.0),
    ("amazing", 0.6),
    ("wonderful", 1.0),
    ("excellent", 1.0),
    ("fantastic", 0.4),
    ("perfect", 1.0),
    ("best", 1.0),
    ("better", 0.5),
    ("thanks", 0.2),
    ("thank", 0.2),
    ("helpful", 0.5),
    ("cool", 0.35),
    ("fun", 0.3),
    ("beautiful", 0.85),
    ("enjoy", 0.4),
    ("pleased", 0.5),
    // unfavourable
    ("bad", -0.7),
    ("worse", -0.4),
    ("worst", -1.0),
    ("hate", -0.8),
    ("terrible", -1.0),
    ("awful", -1.0),
    ("horrible", -1.0),
    ("broken", -0.4),
    ("sad", -0.5),
    ("angry", -0.5),
    ("annoying", -0.8),
    ("annoyed", -0.6),
    ("useless", -0.5),
    ("slow", -0.3),
    ("wrong", -0.5),
    ("poor", -0.4),
    ("problem", -0.2),
    ("issue", -0.2),
    ("issues", -0.2),
    ("fail", -0.5),
    ("failed", -0.5),
    ("frustrated", -0.7),
    ("disappointed", -0.75),
    ("stupid", -0.8),
    ("sorry", -0.5),
];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "nothing", "hardly", "don't", "isn't", "wasn't", "doesn't", "didn't",
    "can't", "won't",
];

/// (word, multiplier)
const INTENSIFIERS: &[(&str, f32)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("so", 1.2),
    ("extremely", 1.5),
    ("totally", 1.3),
    ("quite", 1.1),
    ("pretty", 1.1),
    ("slightly", 0.6),
    ("somewhat", 0.7),
];

/// How far back a negator still flips a hit.
const NEGATION_WINDOW: usize = 3;

/// Words are flipped and damped when negated: "not good" is mildly negative.
const NEGATION_FACTOR: f32 = -0.5;

/// Polarity scorer backed by a static word table.
pub struct LexiconSentimentClassifier {
    words: HashMap<String, f32>,
    tokenizer: Regex,
}

impl LexiconSentimentClassifier {
    /// Build with the default English word table.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            words: WORD_TABLE
                .iter()
                .map(|(w, s)| ((*w).to_string(), *s))
                .collect(),
            tokenizer: Regex::new(r"[a-z]+(?:'[a-z]+)?")?,
        })
    }

    /// Add or override one word weight. The weight is clamped to `[-1.0, 1.0]`.
    #[must_use]
    pub fn with_word(mut self, word: &str, weight: f32) -> Self {
        self.words.insert(word.to_lowercase(), weight.clamp(-1.0, 1.0));
        self
    }

    /// Polarity of `text` in `[-1.0, 1.0]`.
    #[must_use]
    pub fn polarity(&self, text: &str) -> f32 {
        let lower = text.to_lowercase();
        let tokens: Vec<&str> = self
            .tokenizer
            .find_iter(&lower)
            .map(|m| m.as_str())
            .collect();

        let mut total = 0.0_f32;
        let mut hits = 0_usize;

        for (i, token) in tokens.iter().enumerate() {
            let Some(&weight) = self.words.get(*token) else {
                continue;
            };

            let mut score = weight;
            let intensifier = i
                .checked_sub(1)
                .and_then(|prev| INTENSIFIERS.iter().find(|(w, _)| *w == tokens[prev]));
            if let Some(&(_, factor)) = intensifier {
                score *= factor;
            }

            let window_start = i.saturating_sub(NEGATION_WINDOW);
            if tokens[window_start..i].iter().any(|t| NEGATORS.contains(t)) {
                score *= NEGATION_FACTOR;
            }

            total += score.clamp(-1.0, 1.0);
            hits += 1;
        }

        if hits == 0 {
            return 0.0;
        }

        (total / hits as f32).clamp(-1.0, 1.0)
    }
}

#[async_trait]
impl SentimentClassifier for LexiconSentimentClassifier {
    async fn score(&self, text: &str) -> Result<f32, ClassificationError> {
        Ok(self.polarity(text))
    }
}
