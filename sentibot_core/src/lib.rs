#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Shared domain types and collaborator contracts for sentibot.
//!
//! The conversation core depends only on the traits defined here, so the
//! sentiment scorer, the name recognizer, the transcript store and the session
//! state store can each be swapped without touching the turn-taking policy.

pub mod error;
pub mod sentiment;
pub mod session;
pub mod transcript;

pub use error::{ClassificationError, StorageError};
pub use sentiment::{NameRecognizer, SentimentBucket, SentimentClassifier};
pub use session::{SessionState, SessionStateStore};
pub use transcript::{Sender, TranscriptEntry, TranscriptStore};
