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
    clippy::missing_errors_doc,
    clippy::module_name_repetitions
)]

//! Configuration for sentibot, read from `~/sentibot/config.json`.

mod schema;

pub use schema::{
    Config, DatabaseConfig, LoggingConfig, RecognizerConfig, RepliesConfig, config_dir,
    config_path,
};
