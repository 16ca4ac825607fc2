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

//! Persistent transcript and session-state storage backed by sea-orm.
//!
//! Every transcript write is a single SQL statement, so the database serializes
//! concurrent appends from different sessions on its own.

mod convert;
mod manager;
mod state;

// Re-export so callers can name the trait without depending on sentibot_core.
pub use sentibot_core::{SessionStateStore, TranscriptStore};

pub use manager::TranscriptManager;
pub use state::SessionStateManager;
