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
    clippy::missing_errors_doc,
    clippy::cast_precision_loss
)]

//! Built-in, dependency-light classifiers for the conversation core.
//!
//! Both implement the collaborator traits from `sentibot_core`, so a
//! deployment can replace either one with a model-backed service.

pub mod lexicon;
pub mod names;

pub use lexicon::LexiconSentimentClassifier;
pub use names::{PatternError, PatternNameRecognizer, default_name_patterns};
