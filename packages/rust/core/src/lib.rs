//! Fetch, merge, normalize and write the combined user database.
//!
//! This crate ties together discovery, concurrent registry retrieval,
//! identifier-keyed merging and text normalization into the two output
//! entry points ([`write_md380tools_file`], [`write_md2017_file`]).

pub mod aggregator;
pub mod merge;
pub mod output;
pub mod pipeline;
pub mod progress;

pub use pipeline::{WriteSummary, users, write_md2017_file, write_md380tools_file, write_users_file};
pub use progress::{MAX_PROGRESS, MIN_PROGRESS, Progress, ProgressObserver};
