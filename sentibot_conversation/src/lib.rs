#![warn(
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

//! Session-scoped conversation policy.
//!
//! Each turn is classified (name first, then sentiment), answered from a
//! canned reply catalog, and logged to the transcript store. Every few turns
//! the bot asks for feedback; the next utterance is taken as that feedback,
//! after which the session's transcript is purged and its counter reset.
//!
//! # Key Features
//! - Per-session state behind a pluggable store, in memory or in the database
//! - Injectable random source for reply selection
//! - Classifier and storage failures degrade the turn instead of failing it

mod catalog;
mod history;
mod manager;
mod session;

pub use catalog::{FEEDBACK_ACK, FEEDBACK_SUFFIX, ReplyCatalog, greeting};
pub use history::HistoryView;
pub use manager::{
    ClassifierFailurePolicy, ConversationConfig, ConversationError, ConversationManager,
    ReplyKind, TurnContext, TurnResult,
};
pub use session::{MemorySessionStore, SessionRegistry};
pub use sentibot_core::{SessionState, SessionStateStore};
