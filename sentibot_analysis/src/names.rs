//! Pattern-based person-name recognizer.
//!
//! A name is accepted only when it follows an introduction phrase
//! ("my name is", "call me", ...) and starts with an uppercase letter.
//! Patterns are tried in order and the first accepted match wins.

use async_trait::async_trait;
use regex::Regex;
use sentibot_core::{ClassificationError, NameRecognizer};
use thiserror::Error;
use tracing::debug;

/// Error type for building recognizer patterns.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid name pattern {pattern:?}: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("name pattern {0:?} has no capture group for the name")]
    MissingCapture(String),
}

/// A capitalised word, optionally followed by one more (e.g. "Alex Smith").
const NAME: &str = r"(\p{Lu}[\p{L}'\-]*(?:\s+\p{Lu}[\p{L}'\-]*)?)";

/// Default introduction patterns. Each must capture the name in group 1.
#[must_use]
pub fn default_name_patterns() -> Vec<String> {
    vec![
        format!(r"(?i:\bmy\s+name\s+is|\bmy\s+name's|\bcall\s+me)\s+{NAME}"),
        format!(r"(?i:\bi\s+am|\bi'm|\bthis\s+is|\bit's)\s+{NAME}"),
        format!(r"^{NAME}\s+(?i:here)\b"),
    ]
}

/// Capitalised words that commonly follow "I am" / "this is" but are not names.
const NOT_NAMES: &[&str] = &[
    "A", "An", "The", "Not", "So", "Very", "Really", "Just", "Here", "Back", "Done", "Fine",
    "Good", "Great", "Happy", "Sad", "Sorry", "Sure", "Ok", "Okay", "Tired", "Ready", "Glad",
    "Broken", "It", "That", "This", "What", "Why", "How",
];

/// Recognizes a single introduced name using an ordered list of regexes.
pub struct PatternNameRecognizer {
    patterns: Vec<Regex>,
}

impl PatternNameRecognizer {
    /// Compile `patterns`. Every pattern needs at least one capture group.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, PatternError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                let p = p.as_ref();
                let re = Regex::new(p).map_err(|source| PatternError::Regex {
                    pattern: p.to_string(),
                    source,
                })?;
                if re.captures_len() < 2 {
                    return Err(PatternError::MissingCapture(p.to_string()));
                }
                Ok(re)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    /// Recognizer using [`default_name_patterns`].
    pub fn with_defaults() -> Result<Self, PatternError> {
        Self::new(&default_name_patterns())
    }

    /// Defaults followed by `extra` patterns.
    pub fn with_extra<S: AsRef<str>>(extra: &[S]) -> Result<Self, PatternError> {
        let mut all = default_name_patterns();
        all.extend(extra.iter().map(|s| s.as_ref().to_string()));
        Self::new(&all)
    }

    /// First accepted name in `text`, if any.
    #[must_use]
    pub fn find_name(&self, text: &str) -> Option<String> {
        for re in &self.patterns {
            for caps in re.captures_iter(text) {
                let Some(m) = caps.get(1) else {
                    continue;
                };
                if let Some(name) = accept(m.as_str()) {
                    debug!("Recognized name {name:?}");
                    return Some(name);
                }
            }
        }
        None
    }
}

/// Drop trailing non-name words and reject stop words.
fn accept(candidate: &str) -> Option<String> {
    let words: Vec<&str> = candidate
        .split_whitespace()
        .map(|w| w.trim_end_matches(['\'', '-']))
        .take_while(|w| !NOT_NAMES.contains(w))
        .collect();

    if words.is_empty() {
        return None;
    }
    Some(words.join(" "))
}

#[async_trait]
impl NameRecognizer for PatternNameRecognizer {
    async fn recognize(&self, text: &str) -> Result<Option<String>, ClassificationError> {
        Ok(self.find_name(text))
    }
}
